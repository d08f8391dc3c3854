// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use tracing::debug;

use crate::{
    cursor::Cursor, error::Result, header::check_header, prototype::Prototype,
};

/// Loads a precompiled chunk, returning its main function.
///
/// Either the whole tree decodes or the first problem found is returned;
/// nothing partial is ever handed back.
pub fn undump(data: &[u8]) -> Result<Prototype> {
    let mut cursor = Cursor::new(data);
    let result = read_chunk(&mut cursor);

    match &result {
        Ok(main) => debug!(
            prototypes = main.count(),
            trailing = cursor.remaining(),
            "undumped chunk"
        ),
        Err(error) => debug!(offset = cursor.offset(), %error, "undump failed"),
    }

    result
}

fn read_chunk(cursor: &mut Cursor) -> Result<Prototype> {
    check_header(cursor)?;
    debug!("chunk header ok");

    // number of upvalues of the main function; the prototype carries its own
    let _ = cursor.read_byte()?;

    Prototype::read(cursor, "")
}

#[cfg(test)]
mod tests {
    use super::undump;
    use crate::{error::DecodeError, header::tests::valid_header};

    fn minimal_chunk() -> Vec<u8> {
        let mut bytes = valid_header();
        bytes.push(1);
        bytes.extend_from_slice(&[0x06, b'@', b'a', b'.', b'l', b'u']);
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0, 1, 2]);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0x0080_0026u32.to_le_bytes());
        for _ in 0..6 {
            bytes.extend_from_slice(&0u32.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_minimal_chunk() {
        let main = undump(&minimal_chunk()).expect("chunk should decode");
        assert_eq!("@a.lu", main.source);
        assert_eq!(vec![0x0080_0026], main.code);
        assert_eq!(2, main.max_stack_size);
        assert!(main.is_vararg());
    }

    #[test]
    fn legacy_upvalue_count_is_not_checked() {
        let mut bytes = minimal_chunk();
        bytes[33] = 0xEE;
        assert!(undump(&bytes).is_ok());
    }

    #[test]
    fn every_truncation_is_end_of_input() {
        let bytes = minimal_chunk();
        for length in 0..bytes.len() {
            assert!(
                matches!(
                    undump(&bytes[..length]),
                    Err(DecodeError::UnexpectedEndOfInput { .. })
                ),
                "truncated to {} bytes",
                length
            );
        }
    }

    #[test]
    fn header_errors_surface_unchanged() {
        let mut bytes = minimal_chunk();
        bytes[0] = 0;
        assert!(matches!(
            undump(&bytes),
            Err(DecodeError::SignatureMismatch { .. })
        ));
    }
}
