//! Script-number codec (§4.C): little-endian signed-magnitude byte strings.
//!
//! Zero encodes as the empty string. A nonzero value is encoded as its
//! little-endian magnitude bytes; if the most significant bit of the last
//! magnitude byte is already set, an extra sign byte (`0x00` or `0x80`) is
//! appended so the sign bit never collides with magnitude data. Otherwise
//! the sign bit is OR'd directly into the last magnitude byte.

/// Encode an integer using the script-number rules.
pub fn encode_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }

    let negative = n < 0;
    let mut magnitude = n.unsigned_abs();
    let mut bytes = Vec::new();
    while magnitude > 0 {
        bytes.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    if bytes.last().is_some_and(|b| b & 0x80 != 0) {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *bytes.last_mut().expect("non-zero n has at least one byte") |= 0x80;
    }

    bytes
}

/// Decode a script-number byte string back into an integer.
///
/// Empty input decodes to zero. The sign bit is read from (and stripped
/// out of) the most significant bit of the final byte.
pub fn decode_num(bytes: &[u8]) -> i64 {
    if bytes.is_empty() {
        return 0;
    }

    let mut result: i64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i == bytes.len() - 1 {
            result |= ((b & 0x7f) as i64) << (8 * i);
        } else {
            result |= (b as i64) << (8 * i);
        }
    }

    if bytes[bytes.len() - 1] & 0x80 != 0 {
        -result
    } else {
        result
    }
}

/// Cast a stack element to a script boolean (§3: empty and `0x80` are the
/// two false encodings, everything else is true).
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes.len() == 1 && bytes[0] == 0x80 {
        return false;
    }
    // A "negative zero" of any length (all-zero magnitude with the sign
    // bit set on the final byte) is also false.
    if let Some((&last, rest)) = bytes.split_last() {
        if last == 0x80 && rest.iter().all(|&b| b == 0) {
            return false;
        }
    }
    true
}
