// Incremental lossy UTF-8 decoding for chunked bodies.

use serde::Deserialize;

/// What to emit for bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Emit U+FFFD for each invalid sequence.
    #[default]
    Replace,
    /// Drop invalid sequences.
    Skip,
}

/// Decodes a byte stream piece by piece.
///
/// A code point split across two chunks is carried over and emitted with the
/// next chunk instead of being treated as invalid. Decoding never fails.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    policy: DecodePolicy,
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub fn new(policy: DecodePolicy) -> Self {
        Self {
            policy,
            carry: Vec::new(),
        }
    }

    /// Bytes of an incomplete code point waiting for the next chunk.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Decode `chunk`, holding back a trailing incomplete sequence.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let input = if self.carry.is_empty() {
            chunk.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.extend_from_slice(chunk);
            joined
        };

        let mut out = String::with_capacity(input.len());
        let mut pieces = input.utf8_chunks().peekable();
        while let Some(piece) = pieces.next() {
            out.push_str(piece.valid());
            let invalid = piece.invalid();
            if invalid.is_empty() {
                continue;
            }
            let is_last = pieces.peek().is_none();
            if is_last && is_incomplete(invalid) {
                self.carry.extend_from_slice(invalid);
            } else {
                self.push_invalid(&mut out);
            }
        }
        out
    }

    /// Flush a carried sequence at end of stream.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        self.carry.clear();
        let mut out = String::new();
        self.push_invalid(&mut out);
        out
    }

    pub fn reset(&mut self) {
        self.carry.clear();
    }

    fn push_invalid(&self, out: &mut String) {
        if self.policy == DecodePolicy::Replace {
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }
}

/// True when `bytes` is a valid prefix of a multi-byte sequence cut short by
/// the end of input.
fn is_incomplete(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => false,
        Err(e) => e.valid_up_to() == 0 && e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii_passthrough() {
        let mut d = StreamDecoder::new(DecodePolicy::Replace);
        assert_eq!(d.decode(b"hello world"), "hello world");
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn test_decode_split_code_point() {
        // "é" is 0xC3 0xA9.
        let mut d = StreamDecoder::new(DecodePolicy::Replace);
        assert_eq!(d.decode(b"caf\xC3"), "caf");
        assert_eq!(d.pending(), 1);
        assert_eq!(d.decode(b"\xA9!"), "\u{e9}!");
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn test_decode_invalid_replace() {
        let mut d = StreamDecoder::new(DecodePolicy::Replace);
        assert_eq!(d.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_decode_invalid_skip() {
        let mut d = StreamDecoder::new(DecodePolicy::Skip);
        assert_eq!(d.decode(b"a\xFF\xFEb"), "ab");
    }

    #[test]
    fn test_finish_flushes_truncated_tail() {
        let mut d = StreamDecoder::new(DecodePolicy::Replace);
        assert_eq!(d.decode(b"end\xE2\x82"), "end");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert_eq!(d.pending(), 0);

        let mut d = StreamDecoder::new(DecodePolicy::Skip);
        d.decode(b"\xE2");
        assert_eq!(d.finish(), "");
    }
}
