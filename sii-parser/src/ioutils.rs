//! Internal reader utilities for in-memory wire buffers

use std::io::Cursor;

use crate::{Error, Result};

/// Generic trait for little-endian reads over an in-memory buffer.
///
/// Every read either returns the decoded value and advances the position by
/// exactly the value's width, or fails with [`Error::Truncated`] and leaves
/// the position where it was. Nothing here ever reads past the end of the
/// buffer.
pub(crate) trait ReadLe<'a> {
    /// Bytes left between the current position and the end of the buffer.
    fn remaining(&self) -> usize;

    /// Take `len` raw bytes from the buffer.
    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]>;

    /// Take a fixed-size byte array from the buffer.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]>;

    /// Read a `u8` from the buffer.
    fn read_u8(&mut self) -> Result<u8>;

    /// Read a little-endian `u16` from the buffer.
    fn read_u16le(&mut self) -> Result<u16>;

    /// Read a little-endian `i16` from the buffer.
    fn read_i16le(&mut self) -> Result<i16>;

    /// Read a little-endian `u32` from the buffer.
    fn read_u32le(&mut self) -> Result<u32>;

    /// Read a little-endian `i32` from the buffer.
    fn read_i32le(&mut self) -> Result<i32>;

    /// Read a little-endian `u64` from the buffer.
    fn read_u64le(&mut self) -> Result<u64>;

    /// Read a little-endian `i64` from the buffer.
    fn read_i64le(&mut self) -> Result<i64>;

    /// Read a little-endian IEEE 754 `f32` from the buffer.
    fn read_f32le(&mut self) -> Result<f32>;
}

impl<'a> ReadLe<'a> for Cursor<&'a [u8]> {
    fn remaining(&self) -> usize {
        let buf = *self.get_ref();
        buf.len().saturating_sub(self.position() as usize)
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let buf = *self.get_ref();
        let start = (self.position() as usize).min(buf.len());
        let available = buf.len() - start;
        if available < len {
            return Err(Error::Truncated {
                offset: start,
                needed: len,
                available,
            });
        }
        self.set_position((start + len) as u64);
        Ok(&buf[start..start + len])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut b = [0; N];
        b.copy_from_slice(self.read_slice(N)?);
        Ok(b)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_i16le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    fn read_u32le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_i32le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    fn read_u64le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    fn read_i64le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    fn read_f32le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }
}
