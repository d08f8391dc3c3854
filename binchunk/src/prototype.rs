// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use tracing::trace;

use crate::{
    arch::{CInt, Word, MAX_NESTING_DEPTH},
    constant::Constant,
    cursor::Cursor,
    error::{DecodeError, Result},
    instruction::Instruction,
};

/// How a closure captures one upvalue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upvalue {
    /// Nonzero if the upvalue is a local of the enclosing function, zero if
    /// it is one of the enclosing function's upvalues.
    pub in_stack: u8,
    pub index: u8,
}

/// Debug information for one local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    /// First instruction where the variable is live.
    pub start_pc: CInt,
    /// First instruction where the variable is dead.
    pub end_pc: CInt,
}

/// A compiled function and, recursively, every function nested in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub source: String,
    pub line_defined: CInt,
    pub last_line_defined: CInt,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,
    pub code: Vec<Word>,
    pub constants: Vec<Constant>,
    pub upvalues: Vec<Upvalue>,
    pub protos: Vec<Prototype>,
    pub line_info: Vec<CInt>,
    pub local_variables: Vec<LocalVariable>,
    pub upvalue_names: Vec<String>,
}

impl Prototype {
    /// Reads one prototype and all of its children. An empty source name
    /// means "same as the enclosing function", so it is replaced with
    /// `parent_source`, which is also what the children inherit.
    ///
    /// Fails with [`DecodeError::NestingTooDeep`] once children nest past
    /// [`MAX_NESTING_DEPTH`].
    pub fn read(cursor: &mut Cursor, parent_source: &str) -> Result<Self> {
        Self::read_nested(cursor, parent_source, 0)
    }

    fn read_nested(
        cursor: &mut Cursor,
        parent_source: &str,
        depth: usize,
    ) -> Result<Self> {
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep { depth });
        }

        let mut source = cursor.read_string()?;
        if source.is_empty() {
            source = parent_source.to_owned();
        }

        let line_defined = cursor.read_u32()?;
        let last_line_defined = cursor.read_u32()?;
        let num_params = cursor.read_byte()?;
        let is_vararg = cursor.read_byte()?;
        let max_stack_size = cursor.read_byte()?;
        let code = read_vec(cursor, 4, Cursor::read_word)?;
        let constants = read_vec(cursor, 1, Constant::read)?;
        let upvalues = read_vec(cursor, 2, |cursor| {
            Ok(Upvalue {
                in_stack: cursor.read_byte()?,
                index: cursor.read_byte()?,
            })
        })?;
        let protos = read_vec(cursor, 1, |cursor| {
            Prototype::read_nested(cursor, &source, depth + 1)
        })?;
        let line_info = read_vec(cursor, 4, Cursor::read_u32)?;
        let local_variables = read_vec(cursor, 9, |cursor| {
            Ok(LocalVariable {
                name: cursor.read_string()?,
                start_pc: cursor.read_u32()?,
                end_pc: cursor.read_u32()?,
            })
        })?;
        let upvalue_names = read_vec(cursor, 1, Cursor::read_string)?;

        trace!(
            source = %source,
            line_defined,
            depth,
            instructions = code.len(),
            children = protos.len(),
            "read prototype"
        );

        Ok(Self {
            source,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            upvalues,
            protos,
            line_info,
            local_variables,
            upvalue_names,
        })
    }

    pub fn is_vararg(&self) -> bool {
        self.is_vararg != 0
    }

    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.code.iter().copied().map(Instruction::new)
    }

    /// Source line of instruction `pc`, if line info was kept.
    pub fn line_of(&self, pc: usize) -> Option<CInt> {
        self.line_info.get(pc).copied()
    }

    /// Number of prototypes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.protos.iter().map(Prototype::count).sum::<usize>()
    }
}

/// Reads a `CInt` element count followed by that many elements.
///
/// `min_element_size` is the fewest bytes one element can take, so a count
/// that cannot possibly fit in the rest of the input is not trusted for
/// preallocation; the element reads then run out of input instead.
fn read_vec<'a, T>(
    cursor: &mut Cursor<'a>,
    min_element_size: usize,
    mut read_element: impl FnMut(&mut Cursor<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = cursor.read_u32()? as usize;
    let capacity = count.min(cursor.remaining() / min_element_size);
    let mut elements = Vec::with_capacity(capacity);
    for _ in 0..count {
        elements.push(read_element(cursor)?);
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{LocalVariable, Prototype, Upvalue};
    use crate::{
        arch::MAX_NESTING_DEPTH, constant::Constant, cursor::Cursor,
        error::DecodeError,
    };

    /// Builds the byte encoding of a prototype field by field.
    #[derive(Default)]
    struct ProtoBytes(Vec<u8>);

    impl ProtoBytes {
        fn byte(mut self, byte: u8) -> Self {
            self.0.push(byte);
            self
        }

        fn int(mut self, value: u32) -> Self {
            self.0.extend_from_slice(&value.to_le_bytes());
            self
        }

        fn string(mut self, value: &str) -> Self {
            if value.is_empty() {
                return self.byte(0);
            }
            self.0.push(value.len() as u8 + 1);
            self.0.extend_from_slice(value.as_bytes());
            self
        }

        fn raw(mut self, bytes: &[u8]) -> Self {
            self.0.extend_from_slice(bytes);
            self
        }

        /// Prototype with no code or debug info and the given children.
        fn leaf_header(self, source: &str, line: u32) -> Self {
            self.string(source)
                .int(line)
                .int(line + 1)
                .byte(0)
                .byte(0)
                .byte(2)
                .int(0) // code
                .int(0) // constants
                .int(0) // upvalues
        }

        fn empty_debug(self) -> Self {
            self.int(0).int(0).int(0)
        }
    }

    fn parse(bytes: &[u8]) -> Result<Prototype, DecodeError> {
        Prototype::read(&mut Cursor::new(bytes), "")
    }

    #[test]
    fn reads_every_section_in_order() {
        let bytes = ProtoBytes::default()
            .string("@main.lua")
            .int(0)
            .int(0)
            .byte(1)
            .byte(1)
            .byte(3)
            .int(2)
            .int(0x0000_0001)
            .int(0x0080_0026)
            .int(2)
            .raw(&[0x13])
            .raw(&42i64.to_le_bytes())
            .raw(&[0x04, 0x02, b'x'])
            .int(1)
            .byte(1)
            .byte(0)
            .int(0) // protos
            .int(2)
            .int(1)
            .int(1)
            .int(1)
            .string("x")
            .int(1)
            .int(2)
            .int(1)
            .string("_ENV");

        let proto = parse(&bytes.0).expect("prototype should decode");
        assert_eq!(
            Prototype {
                source: "@main.lua".into(),
                line_defined: 0,
                last_line_defined: 0,
                num_params: 1,
                is_vararg: 1,
                max_stack_size: 3,
                code: vec![0x0000_0001, 0x0080_0026],
                constants: vec![
                    Constant::Integer(42),
                    Constant::String("x".into())
                ],
                upvalues: vec![Upvalue {
                    in_stack: 1,
                    index: 0
                }],
                protos: vec![],
                line_info: vec![1, 1],
                local_variables: vec![LocalVariable {
                    name: "x".into(),
                    start_pc: 1,
                    end_pc: 2
                }],
                upvalue_names: vec!["_ENV".into()],
            },
            proto
        );
        assert!(proto.is_vararg());
        assert_eq!(Some(1), proto.line_of(1));
        assert_eq!(None, proto.line_of(2));
        assert_eq!(
            vec![1, 0x26],
            proto.instructions().map(|i| i.opcode()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn nested_sources_inherit_resolved_parent_source() {
        let grandchild = ProtoBytes::default().leaf_header("", 3).int(0);
        let child = ProtoBytes::default()
            .leaf_header("", 2)
            .int(1)
            .raw(&grandchild.empty_debug().0);
        let named = ProtoBytes::default().leaf_header("@other.lua", 5).int(0);
        let root = ProtoBytes::default()
            .leaf_header("@root.lua", 0)
            .int(2)
            .raw(&child.empty_debug().0)
            .raw(&named.empty_debug().0)
            .empty_debug();

        let proto = parse(&root.0).expect("prototype should decode");
        assert_eq!("@root.lua", proto.source);
        assert_eq!("@root.lua", proto.protos[0].source);
        assert_eq!("@root.lua", proto.protos[0].protos[0].source);
        assert_eq!("@other.lua", proto.protos[1].source);
        assert_eq!(4, proto.count());
        assert_eq!(
            vec![2, 5],
            proto.protos.iter().map(|p| p.line_defined).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_root_source_stays_empty() {
        let bytes = ProtoBytes::default().leaf_header("", 0).int(0).empty_debug();
        let proto = parse(&bytes.0).expect("prototype should decode");
        assert_eq!("", proto.source);
        assert_eq!(1, proto.count());
    }

    #[test]
    fn bad_constant_aborts_without_reading_further() {
        let bytes = ProtoBytes::default()
            .string("s")
            .int(0)
            .int(0)
            .byte(0)
            .byte(0)
            .byte(2)
            .int(0)
            .int(2)
            .byte(0x99)
            .byte(0x00);

        let mut cursor = Cursor::new(&bytes.0);
        assert_eq!(
            Err(DecodeError::UnknownConstantTag { tag: 0x99 }),
            Prototype::read(&mut cursor, "")
        );
        assert_eq!(bytes.0.len() - 1, cursor.offset());
    }

    #[test]
    fn forged_counts_run_out_of_input() {
        let bytes = ProtoBytes::default()
            .string("s")
            .int(0)
            .int(0)
            .byte(0)
            .byte(0)
            .byte(2)
            .int(u32::MAX)
            .int(1);

        assert!(matches!(
            parse(&bytes.0),
            Err(DecodeError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn forged_child_count_runs_out_of_input() {
        let child =
            ProtoBytes::default().leaf_header("", 1).int(0).empty_debug();
        let bytes = ProtoBytes::default()
            .leaf_header("@main.lua", 0)
            .int(3)
            .raw(&child.0)
            .empty_debug();

        assert!(matches!(
            parse(&bytes.0),
            Err(DecodeError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn forged_local_count_runs_out_of_input() {
        let bytes = ProtoBytes::default()
            .leaf_header("@main.lua", 0)
            .int(0) // protos
            .int(0) // line info
            .int(2)
            .string("x")
            .int(0)
            .int(1);

        assert!(matches!(
            parse(&bytes.0),
            Err(DecodeError::UnexpectedEndOfInput { .. })
        ));
    }

    /// A main function wrapping `levels` functions, each the only child of
    /// the one before.
    fn nested_chain(levels: usize) -> Vec<u8> {
        let opening = ProtoBytes::default().leaf_header("", 0).int(1).0;
        let innermost =
            ProtoBytes::default().leaf_header("", 0).int(0).empty_debug();
        let closing = ProtoBytes::default().empty_debug().0;

        let mut bytes = opening.repeat(levels);
        bytes.extend(innermost.0);
        bytes.extend(closing.repeat(levels));
        bytes
    }

    #[test]
    fn nesting_up_to_the_limit_decodes() {
        let proto = parse(&nested_chain(MAX_NESTING_DEPTH))
            .expect("chain at the limit should decode");
        assert_eq!(MAX_NESTING_DEPTH + 1, proto.count());
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        assert_eq!(
            Err(DecodeError::NestingTooDeep {
                depth: MAX_NESTING_DEPTH + 1
            }),
            parse(&nested_chain(MAX_NESTING_DEPTH + 1))
        );
        assert!(matches!(
            parse(&nested_chain(2000)),
            Err(DecodeError::NestingTooDeep { .. })
        ));
    }
}
