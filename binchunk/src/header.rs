// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{
    arch::{
        CINT_SIZE, CSIZET_SIZE, INSTRUCTION_SIZE, LUAC_DATA, LUAC_FORMAT,
        LUAC_INT, LUAC_NUM, LUAC_VERSION, LUA_INTEGER_SIZE, LUA_NUMBER_SIZE,
        LUA_SIGNATURE,
    },
    cursor::Cursor,
    error::{DecodeError, Result, SizeField},
};

const SIZE_FIELDS: [(SizeField, u8); 5] = [
    (SizeField::CInt, CINT_SIZE),
    (SizeField::CSizeT, CSIZET_SIZE),
    (SizeField::Instruction, INSTRUCTION_SIZE),
    (SizeField::LuaInteger, LUA_INTEGER_SIZE),
    (SizeField::LuaNumber, LUA_NUMBER_SIZE),
];

/// Consumes the chunk header and checks each field against what this crate
/// was built for, stopping at the first mismatch.
pub fn check_header(cursor: &mut Cursor) -> Result<()> {
    let signature = cursor.read_array::<4>()?;
    if signature != LUA_SIGNATURE {
        return Err(DecodeError::SignatureMismatch { found: signature });
    }

    let version = cursor.read_byte()?;
    if version != LUAC_VERSION {
        return Err(DecodeError::VersionMismatch { found: version });
    }

    let format = cursor.read_byte()?;
    if format != LUAC_FORMAT {
        return Err(DecodeError::FormatMismatch { found: format });
    }

    let data = cursor.read_array::<6>()?;
    if data != LUAC_DATA {
        return Err(DecodeError::DataMarkerMismatch { found: data });
    }

    for (field, expected) in SIZE_FIELDS {
        let found = cursor.read_byte()?;
        if found != expected {
            return Err(DecodeError::SizeMismatch { field, found });
        }
    }

    let int_canary = cursor.read_lua_integer()?;
    if int_canary != LUAC_INT {
        return Err(DecodeError::EndiannessMismatch { found: int_canary });
    }

    // exact comparison: any other bit pattern means a different format
    let num_canary = cursor.read_lua_number()?;
    if num_canary != LUAC_NUM {
        return Err(DecodeError::FloatFormatMismatch { found: num_canary });
    }

    Ok(())
}
