// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::arch::Word;

/// Types that can be read out of a bit field of a [`Word`].
pub trait DecodeFromWord {
    /// Decodes `self` from a `Word`. If `Self` is `n` bits, then the least
    /// significant `n` bits of `encoded` contain the data to decode; any
    /// higher bits are already masked off.
    fn decode_from_word(encoded: Word) -> Self;
}

macro_rules! impl_decode_from_word {
    ($($T:ty),*) => {
        $(
            impl DecodeFromWord for $T {
                fn decode_from_word(encoded: Word) -> Self {
                    encoded as $T
                }
            }
        )*
    };
}

impl_decode_from_word!(u8, u16, u32);

/// Deconstructs a bitset of a given type into consecutive bitfields of given
/// types, least significant field first.
#[macro_export]
macro_rules! decode {
    (
        $encoded:expr; $TEnc:ty;
        @($($out:ident: $T:ty =
            [..$($width:literal)?$($width2:ident)?..]),*)
        => $block:expr
    ) => {{
        let encoded: $TEnc = $encoded;
        let mut __offset: u32 = 0;
        $(
            let op_width = ($($width)*$($width2)*) as u32;
            let mask = (1 as $TEnc).checked_shl(op_width).unwrap_or(0).wrapping_sub(1);
            let unsigned_out = encoded.checked_shr(__offset).unwrap_or(0) & mask;
            let $out = <$T as $crate::coding::DecodeFromWord>::decode_from_word(unsigned_out);
            __offset += op_width;
        )*
        let _ = __offset;
        $block
    }};
}
