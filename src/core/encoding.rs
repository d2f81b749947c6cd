//! Legacy output decoding.
//!
//! The commands this tool targets emit Shift-JIS bytes on their standard
//! streams. Decoding is best-effort: malformed sequences become replacement
//! characters instead of failing the run.

use encoding_rs::SHIFT_JIS;

/// Decode a captured output buffer from Shift-JIS into native text.
///
/// ASCII passes through unchanged; invalid byte sequences are replaced with
/// U+FFFD rather than reported as errors.
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let (text, _, _) = SHIFT_JIS.decode(bytes);
    text.into_owned()
}
