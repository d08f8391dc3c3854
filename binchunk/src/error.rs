// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use thiserror::Error;

use crate::arch::{LuaInteger, LuaNumber};

/// One of the five size descriptors in a chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    CInt,
    CSizeT,
    Instruction,
    LuaInteger,
    LuaNumber,
}

impl fmt::Display for SizeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CInt => "int",
            Self::CSizeT => "size_t",
            Self::Instruction => "instruction",
            Self::LuaInteger => "lua_Integer",
            Self::LuaNumber => "lua_Number",
        }
        .fmt(f)
    }
}

/// Everything that can go wrong while undumping a chunk. Each one aborts the
/// whole decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes but {remaining} remain")]
    UnexpectedEndOfInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("not a precompiled chunk: bad signature {found:02x?}")]
    SignatureMismatch { found: [u8; 4] },

    #[error("version mismatch: found {found:#04x}")]
    VersionMismatch { found: u8 },

    #[error("format mismatch: found {found}")]
    FormatMismatch { found: u8 },

    #[error("corrupted chunk: bad data marker {found:02x?}")]
    DataMarkerMismatch { found: [u8; 6] },

    #[error("{field} size mismatch: found {found}")]
    SizeMismatch { field: SizeField, found: u8 },

    #[error("endianness mismatch: canary decoded as {found:#x}")]
    EndiannessMismatch { found: LuaInteger },

    #[error("float format mismatch: canary decoded as {found}")]
    FloatFormatMismatch { found: LuaNumber },

    #[error("corrupted chunk: unknown constant tag {tag:#04x}")]
    UnknownConstantTag { tag: u8 },

    #[error("corrupted chunk: functions nested {depth} levels deep")]
    NestingTooDeep { depth: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
