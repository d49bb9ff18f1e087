//! # Base64 Text Stage
//!
//! Lazily strips the standard base64 encoding (RFC 4648 alphabet, `=` padding)
//! from an upstream character source.
//!
//! ## Algorithm
//!
//! 1. Pull up to `chunk_size` characters from upstream, dropping `\r` and `\n`
//! 2. Decode the whole 4-character groups of the chunk
//! 3. Hand decoded bytes out until the buffer drains, then repeat
//!
//! Errors are detected when the chunk containing them is decoded, not at
//! construction. A source that ends inside a 4-character group still yields
//! the complete groups before reporting [`GenesisError::UnexpectedEof`].

use std::io::{self, Read};

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, DecodeSliceError, Engine};
use tracing::{trace, warn};

use crate::error::GenesisError;

const PAD: u8 = b'=';

/// Streaming base64 decoder over an upstream reader.
pub struct Base64Decoder<R> {
    /// Released once exhausted or failed.
    upstream: Option<R>,
    chunk_size: usize,
    /// Characters of the current chunk, line breaks removed.
    chars: Vec<u8>,
    decoded: Vec<u8>,
    pos: usize,
    /// Characters consumed before the current chunk.
    offset: u64,
    /// A padded group has been decoded; nothing may follow it.
    padded: bool,
    /// Reported once `decoded` is drained, then on every later read.
    error: Option<GenesisError>,
}

impl<R: Read> Base64Decoder<R> {
    /// Wrap `upstream`, decoding `chunk_size` characters at a time.
    ///
    /// `chunk_size` is clamped to at least 4 and rounded down to whole groups.
    pub fn new(upstream: R, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(4) / 4 * 4;
        Self {
            upstream: Some(upstream),
            chunk_size,
            chars: Vec::with_capacity(chunk_size),
            decoded: Vec::with_capacity(chunk_size / 4 * 3),
            pos: 0,
            offset: 0,
            padded: false,
            error: None,
        }
    }

    /// Base64 characters consumed so far (line breaks excluded).
    pub fn chars_consumed(&self) -> u64 {
        self.offset
    }

    /// Fill `chars` with the next chunk. Returns `true` once upstream is exhausted.
    fn fill_chars(&mut self) -> Result<bool, GenesisError> {
        self.chars.clear();
        let Some(upstream) = self.upstream.as_mut() else {
            return Ok(true);
        };

        while self.chars.len() < self.chunk_size {
            let start = self.chars.len();
            self.chars.resize(self.chunk_size, 0);
            let read = match upstream.read(&mut self.chars[start..]) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    self.chars.truncate(start);
                    continue;
                }
                Err(err) => {
                    self.chars.truncate(start);
                    return Err(err.into());
                }
            };
            if read == 0 {
                self.chars.truncate(start);
                return Ok(true);
            }

            // Compact the fresh region in place, skipping line breaks.
            let mut kept = start;
            for i in start..start + read {
                let c = self.chars[i];
                if c != b'\r' && c != b'\n' {
                    self.chars[kept] = c;
                    kept += 1;
                }
            }
            self.chars.truncate(kept);
        }

        Ok(false)
    }

    /// Decode the next chunk into `decoded`.
    fn decode_chunk(&mut self) -> Result<(), GenesisError> {
        let exhausted = self.fill_chars()?;
        if exhausted {
            self.upstream = None;
        }
        if self.chars.is_empty() {
            return Ok(());
        }
        if self.padded {
            return Err(GenesisError::InvalidPadding {
                offset: self.offset,
            });
        }

        let whole = self.chars.len() / 4 * 4;
        self.decoded.resize(whole / 4 * 3, 0);
        self.pos = 0;
        let written = match STANDARD.decode_slice(&self.chars[..whole], &mut self.decoded) {
            Ok(written) => written,
            Err(err) => return Err(self.locate(err)),
        };
        self.decoded.truncate(written);

        if whole > 0 && self.chars[whole - 1] == PAD {
            self.padded = true;
        }
        trace!(
            offset = self.offset,
            chars = self.chars.len(),
            bytes = written,
            "decoded base64 chunk"
        );

        let partial = self.chars.len() - whole;
        let chunk_offset = self.offset;
        self.offset += self.chars.len() as u64;

        if partial > 0 {
            // Only the last chunk can be short of a whole group.
            self.error = Some(if self.padded {
                GenesisError::InvalidPadding {
                    offset: chunk_offset + whole as u64,
                }
            } else {
                GenesisError::UnexpectedEof("base64 group")
            });
        }

        Ok(())
    }

    /// Translate a decode failure within the current chunk into an absolute offset.
    fn locate(&self, err: DecodeSliceError) -> GenesisError {
        let base = self.offset;
        let first_pad = || {
            let at = self.chars.iter().position(|&c| c == PAD).unwrap_or(0);
            base + at as u64
        };

        match err {
            DecodeSliceError::DecodeError(DecodeError::InvalidByte(at, PAD)) => {
                GenesisError::InvalidPadding {
                    offset: base + at as u64,
                }
            }
            DecodeSliceError::DecodeError(DecodeError::InvalidByte(at, symbol)) => {
                GenesisError::InvalidSymbol {
                    offset: base + at as u64,
                    symbol,
                }
            }
            DecodeSliceError::DecodeError(DecodeError::InvalidLastSymbol(at, symbol)) => {
                GenesisError::InvalidLastSymbol {
                    offset: base + at as u64,
                    symbol,
                }
            }
            DecodeSliceError::DecodeError(
                DecodeError::InvalidLength(_) | DecodeError::InvalidPadding,
            ) => GenesisError::InvalidPadding {
                offset: first_pad(),
            },
            // `decoded` is sized for three bytes per whole group.
            DecodeSliceError::OutputSliceTooSmall => GenesisError::Io {
                kind: io::ErrorKind::Other,
                message: format!("base64 output buffer too small at offset {base}"),
            },
        }
    }
}

impl<R: Read> Read for Base64Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.pos < self.decoded.len() {
                let n = buf.len().min(self.decoded.len() - self.pos);
                buf[..n].copy_from_slice(&self.decoded[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if let Some(err) = &self.error {
                return Err(err.clone().into());
            }
            if self.upstream.is_none() {
                return Ok(0);
            }

            self.decoded.clear();
            self.pos = 0;
            if let Err(err) = self.decode_chunk() {
                warn!(%err, "embedded genesis base64 layer is malformed");
                self.upstream = None;
                self.decoded.clear();
                self.error = Some(err);
            }
        }
    }
}
