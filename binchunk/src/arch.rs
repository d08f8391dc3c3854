// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! Fixed parameters of the binary chunk format this crate understands.

use static_assertions::{const_assert, const_assert_eq};

/// A raw, undecoded instruction.
pub type Word = u32;

/// Native `int` as written by the chunk producer.
pub type CInt = u32;

/// Native `size_t` as written by the chunk producer.
pub type CSizeT = u64;

/// The scripting language's integer type.
pub type LuaInteger = i64;

/// The scripting language's float type.
pub type LuaNumber = f64;

pub const LUA_SIGNATURE: [u8; 4] = *b"\x1bLua";
pub const LUAC_VERSION: u8 = 0x54;
pub const LUAC_FORMAT: u8 = 0;
pub const LUAC_DATA: [u8; 6] = *b"\x19\x93\r\n\x1a\n";

pub const CINT_SIZE: u8 = 4;
pub const CSIZET_SIZE: u8 = 8;
pub const INSTRUCTION_SIZE: u8 = 4;
pub const LUA_INTEGER_SIZE: u8 = 8;
pub const LUA_NUMBER_SIZE: u8 = 8;

// the producer's sizes must agree with the types we decode into
const_assert_eq!(CINT_SIZE as usize, core::mem::size_of::<CInt>());
const_assert_eq!(CSIZET_SIZE as usize, core::mem::size_of::<CSizeT>());
const_assert_eq!(INSTRUCTION_SIZE as usize, core::mem::size_of::<Word>());
const_assert_eq!(LUA_INTEGER_SIZE as usize, core::mem::size_of::<LuaInteger>());
const_assert_eq!(LUA_NUMBER_SIZE as usize, core::mem::size_of::<LuaNumber>());

/// Endianness canary.
pub const LUAC_INT: LuaInteger = 0x5678;

/// Float format canary.
pub const LUAC_NUM: LuaNumber = 370.5;

/// Length of everything before the legacy upvalue count byte.
pub const HEADER_SIZE: usize = LUA_SIGNATURE.len()
    + 2
    + LUAC_DATA.len()
    + 5
    + LUA_INTEGER_SIZE as usize
    + LUA_NUMBER_SIZE as usize;
const_assert_eq!(HEADER_SIZE, 33);

/// Deepest nesting of function prototypes accepted, with the main function
/// at depth 0. Matches the producer's own limit on nested calls.
pub const MAX_NESTING_DEPTH: usize = 200;

/// A string length byte with this value is followed by a `size_t` length.
pub const LONG_STRING_MARKER: u8 = 0xFF;

pub const OPCODE_BITS: usize = 6;
pub const A_BITS: usize = 8;
pub const B_BITS: usize = 9;
pub const C_BITS: usize = 9;
pub const BX_BITS: usize = B_BITS + C_BITS;
pub const AX_BITS: usize = A_BITS + BX_BITS;

const_assert_eq!(OPCODE_BITS + A_BITS + B_BITS + C_BITS, Word::BITS as usize);
const_assert_eq!(OPCODE_BITS + A_BITS + BX_BITS, Word::BITS as usize);
const_assert_eq!(OPCODE_BITS + AX_BITS, Word::BITS as usize);
const_assert!(OPCODE_BITS <= u8::BITS as usize);

pub const MAXARG_BX: Word = (1 << BX_BITS) - 1;

/// Bias subtracted from `Bx` to get the signed `sBx`.
pub const MAXARG_SBX: Word = MAXARG_BX >> 1;
const_assert_eq!(MAXARG_SBX, 131071);
