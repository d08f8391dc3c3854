// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! Human-readable listing of a prototype tree, in the style of `luac -l`.

use std::fmt;

use crate::{
    instruction::{Instruction, OpArgMode, OpcodeTable, Operands},
    prototype::Prototype,
};

/// Which optional sections to print after each function's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub constants: bool,
    pub locals: bool,
    pub upvalues: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            constants: true,
            locals: true,
            upvalues: true,
        }
    }
}

/// Displays a prototype and all its children, decoding instructions with
/// `table`.
pub struct Listing<'a, T: OpcodeTable + ?Sized> {
    proto: &'a Prototype,
    table: &'a T,
    options: ListingOptions,
}

impl<'a, T: OpcodeTable + ?Sized> Listing<'a, T> {
    pub fn new(proto: &'a Prototype, table: &'a T) -> Self {
        Self {
            proto,
            table,
            options: ListingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ListingOptions) -> Self {
        self.options = options;
        self
    }

    fn write_prototype(
        &self,
        f: &mut fmt::Formatter<'_>,
        proto: &Prototype,
        is_main: bool,
    ) -> fmt::Result {
        writeln!(
            f,
            "\n{} <{}:{},{}> ({} instructions)",
            if is_main { "main" } else { "function" },
            proto.source,
            proto.line_defined,
            proto.last_line_defined,
            proto.code.len()
        )?;
        writeln!(
            f,
            "{}{} params, {} slots, {} upvalues, {} locals, {} constants, {} functions",
            proto.num_params,
            if proto.is_vararg() { "+" } else { "" },
            proto.max_stack_size,
            proto.upvalues.len(),
            proto.local_variables.len(),
            proto.constants.len(),
            proto.protos.len()
        )?;

        for (pc, instruction) in proto.instructions().enumerate() {
            match proto.line_of(pc) {
                Some(line) => write!(f, "\t{}\t[{}]\t", pc + 1, line)?,
                None => write!(f, "\t{}\t[-]\t", pc + 1)?,
            }
            self.write_instruction(f, instruction)?;
            writeln!(f)?;
        }

        if self.options.constants {
            writeln!(f, "constants ({}):", proto.constants.len())?;
            for (i, constant) in proto.constants.iter().enumerate() {
                writeln!(f, "\t{}\t{}", i + 1, constant)?;
            }
        }

        if self.options.locals {
            writeln!(f, "locals ({}):", proto.local_variables.len())?;
            for (i, local) in proto.local_variables.iter().enumerate() {
                writeln!(
                    f,
                    "\t{}\t{}\t{}\t{}",
                    i,
                    local.name,
                    local.start_pc + 1,
                    local.end_pc + 1
                )?;
            }
        }

        if self.options.upvalues {
            writeln!(f, "upvalues ({}):", proto.upvalues.len())?;
            for (i, upvalue) in proto.upvalues.iter().enumerate() {
                let name = proto.upvalue_names.get(i).map_or("-", String::as_str);
                writeln!(
                    f,
                    "\t{}\t{}\t{}\t{}",
                    i, name, upvalue.in_stack, upvalue.index
                )?;
            }
        }

        for child in &proto.protos {
            self.write_prototype(f, child, false)?;
        }

        Ok(())
    }

    fn write_instruction(
        &self,
        f: &mut fmt::Formatter<'_>,
        instruction: Instruction,
    ) -> fmt::Result {
        let Some(info) = instruction.info(self.table) else {
            return write!(f, "OP_{}\t{:?}", instruction.opcode(), instruction);
        };

        write!(f, "{:<9}\t", info.name)?;
        match instruction.operands_as(info.mode) {
            Operands::Abc { a, b, c } => {
                write!(f, "{}", a)?;
                if info.b_mode != OpArgMode::N {
                    write!(f, " {}", register_or_constant(b))?;
                }
                if info.c_mode != OpArgMode::N {
                    write!(f, " {}", register_or_constant(c))?;
                }
                Ok(())
            }
            Operands::ABx { a, bx } => {
                write!(f, "{}", a)?;
                match info.b_mode {
                    OpArgMode::K => write!(f, " {}", -1 - bx as i64),
                    OpArgMode::U => write!(f, " {}", bx),
                    OpArgMode::N | OpArgMode::R => Ok(()),
                }
            }
            Operands::AsBx { a, sbx } => write!(f, "{} {}", a, sbx),
            Operands::Ax { ax } => write!(f, "{}", -1 - ax as i64),
        }
    }
}

impl<T: OpcodeTable + ?Sized> fmt::Display for Listing<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_prototype(f, self.proto, true)
    }
}

/// B and C operands above 255 name constant `operand & 0xFF`, printed as a
/// negative number.
fn register_or_constant(operand: u16) -> i64 {
    if operand > 0xFF {
        -1 - (operand & 0xFF) as i64
    } else {
        operand as i64
    }
}
