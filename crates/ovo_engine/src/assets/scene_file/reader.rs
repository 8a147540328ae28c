//! Bounds-checked little-endian cursor over a chunk payload

use crate::foundation::math::{Mat4, Vec3};

/// Failure to decode a value from a chunk payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The payload ended before the value did
    #[error("unexpected end of chunk at offset {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEnd {
        /// Cursor position of the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the payload
        remaining: usize,
    },

    /// A string ran to the end of the payload without a NUL terminator
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Start of the string
        offset: usize,
    },
}

/// Cursor over one chunk payload
///
/// Every read advances the offset and fails instead of reading past the end.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkReader<'a> {
    /// Start reading at the beginning of `data`
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current offset into the payload
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether the whole payload was consumed
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        if count > self.remaining() {
            return Err(ReadError::UnexpectedEnd {
                offset: self.offset,
                needed: count,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    /// Borrow the next `count` bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        self.take(count)
    }

    /// Skip `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<(), ReadError> {
        self.take(count).map(|_| ())
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read a little-endian `f32`
    pub fn read_f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Read three consecutive `f32`s
    pub fn read_vec3(&mut self) -> Result<Vec3, ReadError> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read a column-major 4x4 matrix
    pub fn read_mat4(&mut self) -> Result<Mat4, ReadError> {
        let mut values = [0.0f32; 16];
        for value in &mut values {
            *value = self.read_f32()?;
        }
        Ok(Mat4::from_column_slice(&values))
    }

    /// Read a NUL-terminated string; invalid UTF-8 is replaced lossily
    pub fn read_cstring(&mut self) -> Result<String, ReadError> {
        let start = self.offset;
        let rest = &self.data[start..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(ReadError::UnterminatedString { offset: start });
        };
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.offset += len + 1;
        Ok(text)
    }
}
