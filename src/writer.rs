use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::core::padding_for;

/// Capacity a [`Writer`] starts with unless told otherwise.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Growable output buffer with alignment-aware append operations.
///
/// Multi-byte scalars and typed arrays are preceded by zero padding so that their
/// first byte sits at an offset that is a multiple of the element size. Capacity
/// doubles whenever an append would not fit and never shrinks.
///
/// Slices borrowed through [`Writer::as_slice`] cannot outlive the next append;
/// only the [`Bytes`] returned by [`Writer::finish`] is a stable view.
#[derive(Debug)]
pub struct Writer {
    buffer: BytesMut,
    capacity: usize,
}

macro_rules! impl_write_scalar {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, value: $ty) {
            const SIZE: usize = std::mem::size_of::<$ty>();
            self.pad(SIZE);
            self.grow_if_needed(SIZE);
            self.buffer.put_slice(&value.to_ne_bytes());
        }
    };
}

macro_rules! impl_write_array {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, values: &[$ty]) {
            const SIZE: usize = std::mem::size_of::<$ty>();
            self.pad(SIZE);
            self.grow_if_needed(values.len() * SIZE);
            for value in values {
                self.buffer.put_slice(&value.to_ne_bytes());
            }
        }
    };
}

impl Writer {
    /// Creates a writer with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a writer with the given initial capacity.
    ///
    /// # Arguments
    /// * `capacity` - Bytes to reserve up front. Zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Writer {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of bytes written so far; the offset of the next append.
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Current logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    fn grow_if_needed(&mut self, size: usize) {
        let required = self.buffer.len() + size;
        if required <= self.capacity {
            return;
        }
        let mut new_capacity = self.capacity.saturating_mul(2);
        while new_capacity < required {
            new_capacity = new_capacity.saturating_mul(2);
        }
        trace!(
            old_capacity = self.capacity,
            new_capacity,
            "growing writer buffer"
        );
        self.buffer.reserve(new_capacity - self.buffer.len());
        self.capacity = new_capacity;
    }

    fn pad(&mut self, alignment: usize) {
        let padding = padding_for(self.buffer.len(), alignment);
        if padding == 0 {
            return;
        }
        self.grow_if_needed(padding);
        self.buffer.put_bytes(0, padding);
    }

    /// Appends a single byte. Single bytes are never padded.
    pub fn write_u8(&mut self, value: u8) {
        self.grow_if_needed(1);
        self.buffer.put_u8(value);
    }

    impl_write_scalar!(
        /// Appends a 16-bit unsigned integer, 2-aligned.
        write_u16,
        u16
    );
    impl_write_scalar!(
        /// Appends a 32-bit signed integer, 4-aligned.
        write_i32,
        i32
    );
    impl_write_scalar!(
        /// Appends a 64-bit signed integer, 8-aligned.
        write_i64,
        i64
    );
    impl_write_scalar!(
        /// Appends a 32-bit float, 4-aligned.
        write_f32,
        f32
    );
    impl_write_scalar!(
        /// Appends a 64-bit float, 8-aligned.
        write_f64,
        f64
    );

    /// Appends raw bytes without padding.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.grow_if_needed(bytes.len());
        self.buffer.put_slice(bytes);
    }

    impl_write_array!(
        /// Appends packed 32-bit integers, aligning once before the first element.
        write_i32_array,
        i32
    );
    impl_write_array!(
        /// Appends packed 64-bit integers, aligning once before the first element.
        write_i64_array,
        i64
    );
    impl_write_array!(
        /// Appends packed 32-bit floats, aligning once before the first element.
        write_f32_array,
        f32
    );
    impl_write_array!(
        /// Appends packed 64-bit floats, aligning once before the first element.
        write_f64_array,
        f64
    );

    /// Consumes the writer and returns exactly the bytes written.
    ///
    /// # Returns
    /// A frozen view of the buffer from offset 0 to [`Writer::position`]. Unlike
    /// [`Writer::as_slice`] it stays valid after the writer is gone.
    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
