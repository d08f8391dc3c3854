// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use crate::{
    arch::{Word, AX_BITS, A_BITS, BX_BITS, B_BITS, C_BITS, MAXARG_SBX, OPCODE_BITS},
    decode,
};

/// Smallest sized integer type that can fit an op code.
pub type RawOpCode = u8;

//  +----------------------------------------------------------------+
//  | Encodings, least significant bits first. One of these per op.  |
//  +----------------------------------------------------------------+
//  | iABC:  op[6] A[8] C[9] B[9]                                    |
//  | iABx:  op[6] A[8] Bx[18]                                       |
//  | iAsBx: op[6] A[8] sBx[18], Bx biased by MAXARG_SBX             |
//  | iAx:   op[6] Ax[26]                                            |
//  +----------------------------------------------------------------+

/// Which of the four operand layouts an op uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    IABC,
    IABx,
    IAsBx,
    IAx,
}

/// How an op uses its B or C operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpArgMode {
    /// Not used.
    N,
    /// Used, with no particular meaning.
    U,
    /// A register or a jump offset.
    R,
    /// A constant or a register/constant.
    K,
}

/// Static description of one op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub mode: OpMode,
    pub b_mode: OpArgMode,
    pub c_mode: OpArgMode,
    /// The op is a test and the next instruction is a jump.
    pub test_flag: bool,
    /// The op writes register A.
    pub set_a_flag: bool,
}

/// Lookup from op code to its description.
///
/// The decoder only needs the layout and name of an op, so the table is
/// supplied by whoever interprets the code. See [`crate::opcodes`] for the
/// standard one.
pub trait OpcodeTable {
    fn lookup(&self, opcode: RawOpCode) -> Option<&OpcodeInfo>;
}

impl OpcodeTable for [OpcodeInfo] {
    fn lookup(&self, opcode: RawOpCode) -> Option<&OpcodeInfo> {
        self.get(opcode as usize)
    }
}

impl<const N: usize> OpcodeTable for [OpcodeInfo; N] {
    fn lookup(&self, opcode: RawOpCode) -> Option<&OpcodeInfo> {
        self.as_slice().lookup(opcode)
    }
}

/// Operands of an instruction, viewed through its op's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    Abc { a: u8, b: u16, c: u16 },
    ABx { a: u8, bx: u32 },
    AsBx { a: u8, sbx: i32 },
    Ax { ax: u32 },
}

/// A raw instruction word. Every bit pattern is a valid instruction as far
/// as decoding goes; whether the op exists is up to the [`OpcodeTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction(Word);

impl Instruction {
    pub const fn new(word: Word) -> Self {
        Self(word)
    }

    pub const fn word(self) -> Word {
        self.0
    }

    pub fn opcode(self) -> RawOpCode {
        decode!(self.0; Word;
            @(op: RawOpCode = [..OPCODE_BITS..]) => op
        )
    }

    /// `(A, B, C)` in the iABC layout.
    pub fn abc(self) -> (u8, u16, u16) {
        decode!(self.0; Word;
            @(
                _op: RawOpCode = [..OPCODE_BITS..],
                a: u8 = [..A_BITS..],
                c: u16 = [..C_BITS..],
                b: u16 = [..B_BITS..]
            ) => (a, b, c)
        )
    }

    /// `(A, Bx)` in the iABx layout.
    pub fn abx(self) -> (u8, u32) {
        decode!(self.0; Word;
            @(
                _op: RawOpCode = [..OPCODE_BITS..],
                a: u8 = [..A_BITS..],
                bx: u32 = [..BX_BITS..]
            ) => (a, bx)
        )
    }

    /// `(A, sBx)` in the iAsBx layout, where `sBx` is `Bx` minus a fixed
    /// bias so that it is centered on zero.
    pub fn asbx(self) -> (u8, i32) {
        let (a, bx) = self.abx();
        (a, bx as i32 - MAXARG_SBX as i32)
    }

    /// `Ax` in the iAx layout.
    pub fn ax(self) -> u32 {
        decode!(self.0; Word;
            @(
                _op: RawOpCode = [..OPCODE_BITS..],
                ax: u32 = [..AX_BITS..]
            ) => ax
        )
    }

    pub fn info<T: OpcodeTable + ?Sized>(self, table: &T) -> Option<&OpcodeInfo> {
        table.lookup(self.opcode())
    }

    /// Decodes the operands in the layout `table` gives for this op, or
    /// `None` if the table does not know the op.
    pub fn operands<T: OpcodeTable + ?Sized>(self, table: &T) -> Option<Operands> {
        self.info(table).map(|info| self.operands_as(info.mode))
    }

    pub fn operands_as(self, mode: OpMode) -> Operands {
        match mode {
            OpMode::IABC => {
                let (a, b, c) = self.abc();
                Operands::Abc { a, b, c }
            }
            OpMode::IABx => {
                let (a, bx) = self.abx();
                Operands::ABx { a, bx }
            }
            OpMode::IAsBx => {
                let (a, sbx) = self.asbx();
                Operands::AsBx { a, sbx }
            }
            OpMode::IAx => Operands::Ax { ax: self.ax() },
        }
    }
}

impl From<Word> for Instruction {
    fn from(word: Word) -> Self {
        Self(word)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction({:#010x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Instruction, OpArgMode, OpMode, OpcodeInfo, Operands};
    use crate::arch::{Word, MAXARG_BX, MAXARG_SBX};

    fn abc(op: Word, a: Word, b: Word, c: Word) -> Instruction {
        Instruction::new(op | (a << 6) | (c << 14) | (b << 23))
    }

    fn abx(op: Word, a: Word, bx: Word) -> Instruction {
        Instruction::new(op | (a << 6) | (bx << 14))
    }

    #[test]
    fn decodes_abc_fields() {
        let instruction = abc(5, 2, 0, 3);
        assert_eq!(5, instruction.opcode());
        assert_eq!((2, 0, 3), instruction.abc());

        let instruction = abc(0x3F, 0xFF, 0x1FF, 0x1FE);
        assert_eq!(0x3F, instruction.opcode());
        assert_eq!((0xFF, 0x1FF, 0x1FE), instruction.abc());
    }

    #[test]
    fn decodes_bx_and_sbx() {
        let instruction = abx(1, 7, 100);
        assert_eq!((7, 100), instruction.abx());
        assert_eq!((7, 100 - 131071), instruction.asbx());

        assert_eq!((0, -(MAXARG_SBX as i32)), abx(0, 0, 0).asbx());
        assert_eq!((0, 0), abx(0, 0, MAXARG_SBX).asbx());
        assert_eq!((0, MAXARG_SBX as i32 + 1), abx(0, 0, MAXARG_BX).asbx());
    }

    #[test]
    fn decodes_ax() {
        let instruction = Instruction::new(46 | (0x3FF_FFFF << 6));
        assert_eq!(46, instruction.opcode());
        assert_eq!(0x3FF_FFFF, instruction.ax());
    }

    #[test]
    fn operands_follow_table_mode() {
        let table = [
            OpcodeInfo {
                name: "ABC",
                mode: OpMode::IABC,
                b_mode: OpArgMode::R,
                c_mode: OpArgMode::K,
                test_flag: false,
                set_a_flag: true,
            },
            OpcodeInfo {
                name: "JUMP",
                mode: OpMode::IAsBx,
                b_mode: OpArgMode::R,
                c_mode: OpArgMode::N,
                test_flag: false,
                set_a_flag: false,
            },
        ];

        assert_eq!(
            Some(Operands::Abc { a: 1, b: 2, c: 3 }),
            abc(0, 1, 2, 3).operands(&table)
        );
        assert_eq!(
            Some(Operands::AsBx { a: 0, sbx: -1 }),
            abx(1, 0, MAXARG_SBX - 1).operands(&table)
        );
        assert_eq!(None, abc(2, 0, 0, 0).operands(&table));
        assert_eq!(Some("JUMP"), abx(1, 0, 0).info(&table).map(|info| info.name));
    }

    #[test]
    fn every_word_decodes() {
        for word in [0, 1, Word::MAX, 0x8000_0000, 0xDEAD_BEEF] {
            let instruction = Instruction::from(word);
            for mode in [OpMode::IABC, OpMode::IABx, OpMode::IAsBx, OpMode::IAx] {
                let _ = instruction.operands_as(mode);
            }
        }
    }
}
