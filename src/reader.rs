use crate::core::padding_for;
use crate::{CodecError, Result};

/// Cursor over an immutable, externally owned byte region.
///
/// Mirrors [`Writer`](crate::Writer): before each multi-byte read the cursor skips the
/// padding the writer would have inserted. Skipped bytes are not checked. The cursor
/// only moves forward.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

macro_rules! impl_read_scalar {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> Result<$ty> {
            const SIZE: usize = std::mem::size_of::<$ty>();
            self.skip_padding(SIZE);
            let bytes = self.take(SIZE)?;
            let mut raw = [0u8; SIZE];
            raw.copy_from_slice(bytes);
            Ok(<$ty>::from_ne_bytes(raw))
        }
    };
}

macro_rules! impl_read_array {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, count: usize) -> Result<Vec<$ty>> {
            const SIZE: usize = std::mem::size_of::<$ty>();
            self.skip_padding(SIZE);
            let needed = count.checked_mul(SIZE).ok_or(CodecError::OutOfBounds {
                position: self.position,
                needed: usize::MAX,
                available: self.remaining(),
            })?;
            let bytes = self.take(needed)?;
            Ok(bytes
                .chunks_exact(SIZE)
                .map(|chunk| {
                    let mut raw = [0u8; SIZE];
                    raw.copy_from_slice(chunk);
                    <$ty>::from_ne_bytes(raw)
                })
                .collect())
        }
    };
}

impl<'a> Reader<'a> {
    /// Creates a cursor at offset 0.
    ///
    /// # Arguments
    /// * `data` - The region to read. It is borrowed, never copied or modified.
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, position: 0 }
    }

    /// Offset of the next read from the start of the region.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn skip_padding(&mut self, alignment: usize) {
        self.position += padding_for(self.position, alignment);
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(needed)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::OutOfBounds {
                position: self.position,
                needed,
                available: self.remaining(),
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Reads a single byte. Single bytes are never padded.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    impl_read_scalar!(
        /// Reads a 2-aligned 16-bit unsigned integer.
        read_u16,
        u16
    );
    impl_read_scalar!(
        /// Reads a 4-aligned 32-bit signed integer.
        read_i32,
        i32
    );
    impl_read_scalar!(
        /// Reads an 8-aligned 64-bit signed integer.
        read_i64,
        i64
    );
    impl_read_scalar!(
        /// Reads a 4-aligned 32-bit float.
        read_f32,
        f32
    );
    impl_read_scalar!(
        /// Reads an 8-aligned 64-bit float.
        read_f64,
        f64
    );

    /// Borrows `len` raw bytes from the region.
    ///
    /// # Returns
    /// A slice of the original region, valid for as long as the region itself.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Borrows `len` bytes from the region as UTF-8.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if fewer than `len` bytes remain and `InvalidUtf8` if the
    /// bytes are not valid UTF-8.
    pub fn read_str(&mut self, len: usize) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.take(len)?)?)
    }

    impl_read_array!(
        /// Reads `count` packed 32-bit integers.
        read_i32_array,
        i32
    );
    impl_read_array!(
        /// Reads `count` packed 64-bit integers.
        read_i64_array,
        i64
    );
    impl_read_array!(
        /// Reads `count` packed 32-bit floats.
        read_f32_array,
        f32
    );
    impl_read_array!(
        /// Reads `count` packed 64-bit floats.
        read_f64_array,
        f64
    );
}
