// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

#![forbid(unsafe_code)]

pub mod arch;
pub mod chunk;
pub mod coding;
pub mod constant;
pub mod cursor;
pub mod error;
pub mod header;
pub mod instruction;
pub mod listing;
pub mod opcodes;
pub mod prototype;

pub use chunk::undump;
pub use constant::{Constant, LuaString};
pub use error::{DecodeError, SizeField};
pub use instruction::{Instruction, OpcodeInfo, OpcodeTable, Operands};
pub use prototype::{LocalVariable, Prototype, Upvalue};
