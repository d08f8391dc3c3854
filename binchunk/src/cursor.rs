// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use num_traits::FromBytes;

use crate::{
    arch::{CInt, CSizeT, LuaInteger, LuaNumber, Word, LONG_STRING_MARKER},
    error::{DecodeError, Result},
};

/// Forward-only reader over an immutable byte buffer.
///
/// Every read checks the remaining length first and fails with
/// [`DecodeError::UnexpectedEndOfInput`] instead of reading short.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads the next `n` bytes, borrowing them from the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEndOfInput {
                offset: self.offset,
                needed: n,
                remaining: self.remaining(),
            });
        }

        let start = self.offset;
        self.offset += n;
        Ok(&self.data[start..self.offset])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    fn read_le<T, const N: usize>(&mut self) -> Result<T>
    where
        T: FromBytes<Bytes = [u8; N]>,
    {
        let bytes = self.read_array::<N>()?;
        Ok(T::from_le_bytes(&bytes))
    }

    pub fn read_u32(&mut self) -> Result<CInt> {
        self.read_le::<CInt, 4>()
    }

    pub fn read_u64(&mut self) -> Result<CSizeT> {
        self.read_le::<CSizeT, 8>()
    }

    pub fn read_word(&mut self) -> Result<Word> {
        self.read_le::<Word, 4>()
    }

    /// Reads a `lua_Integer` as the two's complement of [`Self::read_u64`].
    pub fn read_lua_integer(&mut self) -> Result<LuaInteger> {
        Ok(self.read_u64()? as LuaInteger)
    }

    /// Reads a `lua_Number` by reinterpreting the bits of
    /// [`Self::read_u64`].
    pub fn read_lua_number(&mut self) -> Result<LuaNumber> {
        Ok(LuaNumber::from_bits(self.read_u64()?))
    }

    /// Reads a length-prefixed string, borrowing its payload.
    ///
    /// The prefix byte holds `length + 1`, with `0` meaning the empty string
    /// and [`LONG_STRING_MARKER`] meaning the real `length + 1` follows as a
    /// `size_t`.
    pub fn read_string_bytes(&mut self) -> Result<&'a [u8]> {
        let size = match self.read_byte()? {
            0 => return Ok(&[]),
            LONG_STRING_MARKER => self.read_u64()?,
            short => short as CSizeT,
        };

        // a long size of 0 carries no payload either
        let Some(length) = size.checked_sub(1) else {
            return Ok(&[]);
        };
        self.read_bytes(usize::try_from(length).unwrap_or(usize::MAX))
    }

    /// Reads a length-prefixed name such as a source or variable name.
    /// Names are not guaranteed to be UTF-8, so invalid sequences are
    /// replaced; constants keep their exact bytes instead.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_string_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
