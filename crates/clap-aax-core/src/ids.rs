//! Identifier codec
//!
//! AAX wants two kinds of identifiers the CLAP side does not have:
//!
//! - parameter identifiers: strings of at most 31 characters. A CLAP `clap_id`
//!   becomes exactly 8 lowercase hex characters, most significant nibble first.
//! - 4-byte codes (manufacturer, product and plug-in ids): derived from an
//!   arbitrary string through a hash and a 64-symbol printable alphabet.
//!
//! The 4-byte code is one-way. Two inputs may collide; callers that issue many
//! codes track collisions themselves.

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Length of every identifier produced by [`param_identifier`].
pub const PARAM_IDENTIFIER_LEN: usize = 8;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const LCG_MULTIPLIER: u32 = 0x0019_660d;
const LCG_INCREMENT: u32 = 0x3c6e_f35f;

/// Printable alphabet for 4-byte codes, indexed by a 6-bit window.
const CODE_ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz$_";

/// Render a CLAP parameter id as an 8 character lowercase hex identifier.
pub fn param_identifier(id: u32) -> String {
    let mut out = String::with_capacity(PARAM_IDENTIFIER_LEN);
    for shift in (0..PARAM_IDENTIFIER_LEN as u32).rev() {
        let nibble = (id >> (shift * 4)) & 0xf;
        out.push(HEX_DIGITS[nibble as usize] as char);
    }
    out
}

/// Inverse of [`param_identifier`].
///
/// Only identifiers produced by [`param_identifier`] are accepted: exactly
/// 8 lowercase hex characters.
pub fn parse_param_identifier(identifier: &str) -> Option<u32> {
    if identifier.len() != PARAM_IDENTIFIER_LEN {
        return None;
    }
    identifier.bytes().try_fold(0u32, |acc, b| {
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => return None,
        };
        Some((acc << 4) | nibble as u32)
    })
}

/// FNV-1a step followed by an LCG step per input byte.
///
/// Bytes are sign-extended before mixing so ids match those issued by
/// C builds where `char` is signed.
pub fn hash_identifier(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        let hash = hash ^ (byte as i8 as i32 as u32);
        let hash = hash.wrapping_mul(FNV_PRIME);
        LCG_MULTIPLIER.wrapping_mul(hash).wrapping_add(LCG_INCREMENT)
    })
}

/// Derive a printable 4-byte code from an arbitrary string.
///
/// Four 6-bit windows of the hash (bits 0-5, 6-11, 12-17, 18-23) select
/// symbols from the code alphabet; window 0 lands in the most significant
/// byte.
///
/// Window value 63 maps to `_`. Wrappers that index a 63-symbol table plus
/// its NUL terminator emit a `0x00` byte there instead, so codes containing
/// `_` differ from theirs.
pub fn four_char_code(input: &str) -> u32 {
    let hash = hash_identifier(input);
    let symbol = |window: u32| CODE_ALPHABET[((hash >> (window * 6)) & 0x3f) as usize] as u32;
    (symbol(0) << 24) | (symbol(1) << 16) | (symbol(2) << 8) | symbol(3)
}

/// Render a 4-byte code as its four characters, most significant first.
pub fn four_char_code_to_string(code: u32) -> String {
    code.to_be_bytes().iter().map(|&b| b as char).collect()
}
