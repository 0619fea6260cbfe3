//! The at-most-once completion boundary.
//!
//! Native work receives a [`ResultChannel`] for a pending call and completes it exactly
//! once with [`ResultChannel::success`] or [`ResultChannel::failure`]. The value is
//! serialized into a heap-allocated [`ResultNative`] record which is handed to the
//! caller's callback; the receiving side owns that record and releases it with
//! [`result_channel_free`].

use std::ptr;

use tracing::warn;

use crate::*;

/// Outcome carried by a [`ResultNative`] record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok = 0,
    Error = 1,
}

/// A serialized result as seen across the boundary.
///
/// The layout matches the C struct `{ int32 status; uint8_t *data; int32_t size; }`.
/// `data` points at `size` bytes owned by the record.
#[repr(C)]
#[derive(Debug)]
pub struct ResultNative {
    status: ResultStatus,
    data: *mut u8,
    size: i32,
}

// The record uniquely owns its payload.
unsafe impl Send for ResultNative {}

/// Function invoked with a completed record. The callee takes ownership of the record.
pub type Callback = unsafe extern "C" fn(*mut ResultNative);

impl ResultNative {
    /// Copies `payload` into a new record.
    ///
    /// # Errors
    /// Returns `SizeOverflow` if the payload is larger than `i32::MAX` bytes.
    pub fn new(status: ResultStatus, payload: &[u8]) -> Result<Box<Self>> {
        let size =
            i32::try_from(payload.len()).map_err(|_| CodecError::SizeOverflow(payload.len()))?;
        let data = Box::into_raw(payload.to_vec().into_boxed_slice()) as *mut u8;
        Ok(Box::new(ResultNative { status, data, size }))
    }

    /// A record with no payload. The receiver sees `size == 0` and a null `data`.
    pub fn empty(status: ResultStatus) -> Box<Self> {
        Box::new(ResultNative {
            status,
            data: ptr::null_mut(),
            size: 0,
        })
    }

    /// Releases ownership of the record to the other side of the boundary.
    pub fn into_raw(self: Box<Self>) -> *mut ResultNative {
        Box::into_raw(self)
    }

    /// Takes back ownership of a record produced by [`ResultNative::into_raw`].
    ///
    /// # Safety
    /// `pointer` must come from `into_raw` and must not be used afterwards.
    pub unsafe fn from_raw(pointer: *mut ResultNative) -> Box<Self> {
        unsafe { Box::from_raw(pointer) }
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    /// The serialized bytes.
    pub fn payload(&self) -> &[u8] {
        if self.data.is_null() || self.size <= 0 {
            return &[];
        }
        // data/size were produced together by `new` and are never modified.
        unsafe { std::slice::from_raw_parts(self.data, self.size as usize) }
    }

    /// Decodes the payload in place with the default codec.
    pub fn value(&self) -> Result<Value> {
        self.value_with(&Codec::default())
    }

    pub fn value_with(&self, codec: &Codec) -> Result<Value> {
        codec.deserialize(self.payload())
    }
}

impl Drop for ResultNative {
    fn drop(&mut self) {
        if self.data.is_null() {
            return;
        }
        let len = self.size.max(0) as usize;
        unsafe { drop(Box::from_raw(ptr::slice_from_raw_parts_mut(self.data, len))) };
        self.data = ptr::null_mut();
    }
}

/// Releases a record received through a [`Callback`]. Null is ignored.
///
/// # Safety
/// `pointer` must be null or a record handed out by this crate that has not been freed.
#[no_mangle]
pub unsafe extern "C" fn result_channel_free(pointer: *mut ResultNative) {
    if pointer.is_null() {
        return;
    }
    drop(unsafe { ResultNative::from_raw(pointer) });
}

/// Handle for one pending call.
///
/// Completing consumes the handle, so a call can be completed at most once. Dropping a
/// handle without completing it leaves the caller waiting and is logged.
#[derive(Debug)]
pub struct ResultChannel {
    callback: Option<Callback>,
    codec: Codec,
}

impl ResultChannel {
    pub fn new(callback: Callback) -> Self {
        Self::with_codec(callback, Codec::default())
    }

    pub fn with_codec(callback: Callback, codec: Codec) -> Self {
        ResultChannel {
            callback: Some(callback),
            codec,
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Completes the call successfully with `value`.
    ///
    /// # Errors
    /// If `value` cannot be serialized the call is still completed, with status
    /// `Error` and the error message as payload, and the error is returned. When the
    /// message itself cannot be encoded the record carries no payload.
    pub fn success(self, value: impl Into<Value>) -> Result<()> {
        self.complete(ResultStatus::Ok, &value.into())
    }

    /// Completes the call with an error `value`.
    ///
    /// # Errors
    /// Same as [`ResultChannel::success`].
    pub fn failure(self, value: impl Into<Value>) -> Result<()> {
        self.complete(ResultStatus::Error, &value.into())
    }

    fn complete(mut self, status: ResultStatus, value: &Value) -> Result<()> {
        let Some(callback) = self.callback.take() else {
            return Ok(());
        };
        match self
            .codec
            .serialize(value)
            .and_then(|payload| ResultNative::new(status, &payload))
        {
            Ok(record) => {
                unsafe { callback(record.into_raw()) };
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to serialize result, failing the call");
                let message = Value::String(err.to_string());
                let record = self
                    .codec
                    .serialize(&message)
                    .and_then(|payload| ResultNative::new(ResultStatus::Error, &payload))
                    .unwrap_or_else(|fallback| {
                        warn!(error = %fallback, "failed to serialize error message");
                        ResultNative::empty(ResultStatus::Error)
                    });
                unsafe { callback(record.into_raw()) };
                Err(err)
            }
        }
    }
}

impl Drop for ResultChannel {
    fn drop(&mut self) {
        if self.callback.is_some() {
            warn!("result channel dropped without being completed");
        }
    }
}
