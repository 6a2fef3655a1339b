//! Bounds-checked big-endian cursor over a class-file byte buffer.

use crate::classfile::DecodeError;

pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.offset).ok_or(DecodeError::Truncated {
            offset: self.offset,
            needed: 1,
        })?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let start = self.offset;
        let end = start.checked_add(len).ok_or(DecodeError::Truncated {
            offset: start,
            needed: len,
        })?;
        let slice = self.data.get(start..end).ok_or(DecodeError::Truncated {
            offset: start,
            needed: len,
        })?;
        self.offset = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.bytes(len)?;
        Ok(())
    }
}
