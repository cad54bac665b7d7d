//! Incremental UTF-8 decoding for chunked response bodies.
//!
//! Chunk boundaries on a streaming body are arbitrary, so a multi-byte
//! character may arrive split across two (or more) chunks. The decoder keeps
//! the incomplete tail of each chunk and prepends it to the next one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const REPLACEMENT: char = '\u{FFFD}';

/// How invalid byte sequences are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Invalid or truncated sequences become U+FFFD
    #[default]
    Lossy,
    /// Invalid or truncated sequences are errors
    Strict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid UTF-8 sequence at byte {offset}")]
    InvalidSequence { offset: usize },

    #[error("stream ended inside a {pending}-byte incomplete UTF-8 sequence")]
    TruncatedSequence { pending: usize },
}

/// Stateful UTF-8 decoder.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    mode: DecodeMode,
    pending: Vec<u8>,
    consumed: usize,
}

impl Utf8StreamDecoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
            consumed: 0,
        }
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode the next chunk, returning the text it completes.
    ///
    /// The result may be empty when the chunk only extends a pending
    /// character.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let base = self.consumed;
        let mut out = String::with_capacity(buf.len());
        let mut start = 0;

        while start < buf.len() {
            match std::str::from_utf8(&buf[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = buf.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&buf[start..valid_end]));
                    match e.error_len() {
                        None => {
                            self.pending = buf[valid_end..].to_vec();
                            start = buf.len();
                        }
                        Some(len) => match self.mode {
                            DecodeMode::Strict => {
                                return Err(DecodeError::InvalidSequence {
                                    offset: base + valid_end,
                                });
                            }
                            DecodeMode::Lossy => {
                                out.push(REPLACEMENT);
                                start = valid_end + len;
                            }
                        },
                    }
                }
            }
        }

        self.consumed = base + buf.len() - self.pending.len();
        Ok(out)
    }

    /// Flush at end of stream.
    pub fn finish(&mut self) -> Result<String, DecodeError> {
        if self.pending.is_empty() {
            return Ok(String::new());
        }
        let pending = std::mem::take(&mut self.pending);
        self.consumed += pending.len();
        match self.mode {
            DecodeMode::Strict => Err(DecodeError::TruncatedSequence {
                pending: pending.len(),
            }),
            DecodeMode::Lossy => Ok(REPLACEMENT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_chunks(mode: DecodeMode, chunks: &[&[u8]]) -> Result<String, DecodeError> {
        let mut decoder = Utf8StreamDecoder::new(mode);
        let mut text = String::new();
        for chunk in chunks {
            text.push_str(&decoder.decode(chunk)?);
        }
        text.push_str(&decoder.finish()?);
        Ok(text)
    }

    #[test]
    fn ascii_passes_through() {
        let text = decode_chunks(DecodeMode::Strict, &[b"Hi", b" there"]).unwrap();
        assert_eq!(text, "Hi there");
    }

    #[test]
    fn multibyte_split_across_chunks() {
        // 'é' is 0xC3 0xA9
        let mut decoder = Utf8StreamDecoder::default();
        assert_eq!(decoder.decode(b"caf\xC3").unwrap(), "caf");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.decode(&[0xA9]).unwrap(), "é");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn four_byte_char_split_one_byte_at_a_time() {
        let bytes = "🦀".as_bytes();
        let mut decoder = Utf8StreamDecoder::default();
        assert_eq!(decoder.decode(&bytes[0..1]).unwrap(), "");
        assert_eq!(decoder.decode(&bytes[1..2]).unwrap(), "");
        assert_eq!(decoder.decode(&bytes[2..3]).unwrap(), "");
        assert_eq!(decoder.decode(&bytes[3..4]).unwrap(), "🦀");
    }

    #[test]
    fn every_split_point_decodes_correctly() {
        let source = "héllo, 世界 🦀 done";
        let bytes = source.as_bytes();
        for split in 0..=bytes.len() {
            let text =
                decode_chunks(DecodeMode::Strict, &[&bytes[..split], &bytes[split..]]).unwrap();
            assert_eq!(text, source, "split at {}", split);
        }
    }

    #[test]
    fn strict_rejects_invalid_byte() {
        let err = decode_chunks(DecodeMode::Strict, &[b"ok", &[0xFF], b"more"]).unwrap_err();
        assert_eq!(err, DecodeError::InvalidSequence { offset: 2 });
    }

    #[test]
    fn strict_rejects_truncated_tail() {
        let err = decode_chunks(DecodeMode::Strict, &[b"abc", &[0xE4, 0xB8]]).unwrap_err();
        assert_eq!(err, DecodeError::TruncatedSequence { pending: 2 });
    }

    #[test]
    fn lossy_replaces_invalid_and_truncated() {
        let text = decode_chunks(DecodeMode::Lossy, &[b"a", &[0xFF], b"b", &[0xE4, 0xB8]]).unwrap();
        assert_eq!(text, "a\u{FFFD}b\u{FFFD}");
    }

    #[test]
    fn default_mode_keeps_streaming_past_bad_bytes() {
        let mut decoder = Utf8StreamDecoder::default();
        let mut text = String::new();
        for chunk in [&b"ok"[..], &[0xFF], b"ok", &[0xF0, 0x9F]] {
            text.push_str(&decoder.decode(chunk).unwrap());
        }
        text.push_str(&decoder.finish().unwrap());
        assert_eq!(text, "ok\u{FFFD}ok\u{FFFD}");
    }

    #[test]
    fn empty_input_yields_nothing() {
        let text = decode_chunks(DecodeMode::Strict, &[]).unwrap();
        assert_eq!(text, "");
    }
}
