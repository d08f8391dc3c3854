// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! The standard op set for chunks in this format.

use paste::paste;

use crate::instruction::{
    OpArgMode::{self, K, N, R, U},
    OpMode::{self, IABx, IAsBx, IAx, IABC},
    OpcodeInfo, RawOpCode,
};

const fn op(
    name: &'static str,
    test_flag: bool,
    set_a_flag: bool,
    b_mode: OpArgMode,
    c_mode: OpArgMode,
    mode: OpMode,
) -> OpcodeInfo {
    OpcodeInfo {
        name,
        mode,
        b_mode,
        c_mode,
        test_flag,
        set_a_flag,
    }
}

/// Declares `OP_<NAME>` constants numbered in order along with the
/// [`STANDARD`] table.
macro_rules! opcodes {
    ($($name:ident: $test:literal, $set_a:literal, $b:ident, $c:ident, $mode:ident;)*) => {
        paste! {
            #[allow(clippy::upper_case_acronyms)]
            #[repr(u8)]
            enum OpcodeIndex {
                $($name,)*
                COUNT,
            }

            $(
                pub const [<OP_ $name>]: RawOpCode =
                    OpcodeIndex::$name as RawOpCode;
            )*

            /// Number of ops in [`STANDARD`].
            pub const COUNT: usize = OpcodeIndex::COUNT as usize;

            /// The standard op table, indexed by op code.
            pub static STANDARD: [OpcodeInfo; COUNT] = [
                $(op(stringify!($name), $test != 0, $set_a != 0, $b, $c, $mode),)*
            ];
        }
    };
}

opcodes! {
    MOVE:     0, 1, R, N, IABC;
    LOADK:    0, 1, K, N, IABx;
    LOADKX:   0, 1, N, N, IABx;
    LOADBOOL: 0, 1, U, U, IABC;
    LOADNIL:  0, 1, U, N, IABC;
    GETUPVAL: 0, 1, U, N, IABC;
    GETTABUP: 0, 1, U, K, IABC;
    GETTABLE: 0, 1, R, K, IABC;
    SETTABUP: 0, 0, K, K, IABC;
    SETUPVAL: 0, 0, U, N, IABC;
    SETTABLE: 0, 0, K, K, IABC;
    NEWTABLE: 0, 1, U, U, IABC;
    SELF:     0, 1, R, K, IABC;
    ADD:      0, 1, K, K, IABC;
    SUB:      0, 1, K, K, IABC;
    MUL:      0, 1, K, K, IABC;
    MOD:      0, 1, K, K, IABC;
    POW:      0, 1, K, K, IABC;
    DIV:      0, 1, K, K, IABC;
    IDIV:     0, 1, K, K, IABC;
    BAND:     0, 1, K, K, IABC;
    BOR:      0, 1, K, K, IABC;
    BXOR:     0, 1, K, K, IABC;
    SHL:      0, 1, K, K, IABC;
    SHR:      0, 1, K, K, IABC;
    UNM:      0, 1, R, N, IABC;
    BNOT:     0, 1, R, N, IABC;
    NOT:      0, 1, R, N, IABC;
    LEN:      0, 1, R, N, IABC;
    CONCAT:   0, 1, R, R, IABC;
    JMP:      0, 0, R, N, IAsBx;
    EQ:       1, 0, K, K, IABC;
    LT:       1, 0, K, K, IABC;
    LE:       1, 0, K, K, IABC;
    TEST:     1, 0, N, U, IABC;
    TESTSET:  1, 1, R, U, IABC;
    CALL:     0, 1, U, U, IABC;
    TAILCALL: 0, 1, U, U, IABC;
    RETURN:   0, 0, U, N, IABC;
    FORLOOP:  0, 1, R, N, IAsBx;
    FORPREP:  0, 1, R, N, IAsBx;
    TFORCALL: 0, 0, N, U, IABC;
    TFORLOOP: 0, 1, R, N, IAsBx;
    SETLIST:  0, 0, U, U, IABC;
    CLOSURE:  0, 1, U, N, IABx;
    VARARG:   0, 1, U, N, IABC;
    EXTRAARG: 0, 0, U, U, IAx;
}
