// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use enum_tags::enum_tags;

use crate::{
    arch::{LuaInteger, LuaNumber},
    cursor::Cursor,
    error::{DecodeError, Result},
};

/// Tag byte for strings too long for the producer's short-string table.
/// Decodes exactly like [`Constant::STRING_TAG`].
pub const LONG_STRING_TAG: u8 = 0x14;

/// String constant payload, kept as the exact bytes from the chunk.
///
/// Lua strings are byte strings, so payloads that are not UTF-8 must survive
/// decoding unchanged: `"\xff"` and `"\xfe"` are different constants.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct LuaString(Vec<u8>);

impl LuaString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl From<&[u8]> for LuaString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for LuaString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for LuaString {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for LuaString {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl fmt::Debug for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

/// Quoted, with non-printable bytes escaped.
impl fmt::Display for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An entry in a prototype's constant table.
#[enum_tags(public, repr(u8))]
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    #[tag(0x00)]
    Nil,
    #[tag(0x01)]
    Boolean(bool),
    #[tag(0x03)]
    Float(LuaNumber),
    #[tag(0x13)]
    Integer(LuaInteger),
    #[tag(0x04)]
    String(LuaString),
}

impl Constant {
    /// Reads one tagged constant.
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let tag = cursor.read_byte()?;
        match tag {
            Self::NIL_TAG => Ok(Self::Nil),
            Self::BOOLEAN_TAG => Ok(Self::Boolean(cursor.read_byte()? != 0)),
            Self::FLOAT_TAG => Ok(Self::Float(cursor.read_lua_number()?)),
            Self::INTEGER_TAG => Ok(Self::Integer(cursor.read_lua_integer()?)),
            Self::STRING_TAG | LONG_STRING_TAG => {
                Ok(Self::String(cursor.read_string_bytes()?.into()))
            }
            _ => Err(DecodeError::UnknownConstantTag { tag }),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{}", value),
        }
    }
}
