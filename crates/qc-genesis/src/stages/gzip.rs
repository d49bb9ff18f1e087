//! # Gzip Decompression Stage
//!
//! Inflates gzip members pulled from an upstream byte reader, one
//! `flate2::bufread::GzDecoder` per member.
//!
//! ## Read Path
//!
//! 1. **Construction**: flate2 parses the first member header; failures are
//!    returned immediately
//! 2. **Body**: the member decoder inflates into the caller's buffer and
//!    verifies the CRC-32/ISIZE trailer before reporting its end
//! 3. **Multistream**: if more input follows, the buffered upstream is handed
//!    to a decoder for the next member
//!
//! ## Security
//!
//! - Total output is capped by `DecodeConfig::max_decompressed_size`
//! - flate2 only signals end of member after the trailer matched

use std::io::{self, BufRead, BufReader, Read};

use flate2::bufread::GzDecoder;
use tracing::{debug, warn};

use super::header::GzipHeader;
use crate::config::DecodeConfig;
use crate::error::{ErrorKind, GenesisError};

/// Where in a member a flate2 failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    Body,
}

/// Streaming gzip decoder over an upstream reader.
pub struct GzipDecoder<R> {
    /// Decoder of the current member; released at end of stream or failure.
    member: Option<GzDecoder<BufReader<R>>>,
    header: GzipHeader,
    /// Plaintext bytes produced by the current member.
    member_out: u64,
    total_out: u64,
    members: u32,
    max_output: u64,
    multistream: bool,
    failure: Option<GenesisError>,
}

impl<R: Read> GzipDecoder<R> {
    /// Wrap `upstream`, consuming and validating the first member header.
    pub fn new(upstream: R, config: &DecodeConfig) -> Result<Self, GenesisError> {
        let (member, header) = open_member(BufReader::new(upstream), 1)?;

        Ok(Self {
            member: Some(member),
            header,
            member_out: 0,
            total_out: 0,
            members: 1,
            max_output: config.max_decompressed_size,
            multistream: config.multistream,
            failure: None,
        })
    }

    /// Header of the member currently being decoded (or the last one).
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Plaintext bytes produced across all members.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Members whose header has been parsed.
    pub fn members(&self) -> u32 {
        self.members
    }

    /// Whether the upstream has been released (end of stream or failure).
    pub fn is_finished(&self) -> bool {
        self.member.is_none()
    }

    /// Read decompressed bytes into `buf`.
    ///
    /// Returns `Ok(0)` at end of stream, repeatedly. Once a read fails, every
    /// later read returns the same error.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, GenesisError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        match self.inflate_into(buf) {
            Ok(n) => Ok(n),
            Err(err) => {
                match err.kind() {
                    ErrorKind::Integrity | ErrorKind::Format => {
                        warn!(%err, member = self.members, "embedded genesis gzip layer is corrupt")
                    }
                    _ => debug!(%err, member = self.members, "genesis stream failed"),
                }
                self.member = None;
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    fn inflate_into(&mut self, buf: &mut [u8]) -> Result<usize, GenesisError> {
        loop {
            let index = self.members;
            let Some(member) = self.member.as_mut() else {
                return Ok(0);
            };

            let n = member
                .read(buf)
                .map_err(|err| classify(err, Phase::Body, index))?;
            if n > 0 {
                self.member_out += n as u64;
                self.total_out += n as u64;
                if self.total_out > self.max_output {
                    return Err(GenesisError::SizeLimitExceeded {
                        limit: self.max_output,
                    });
                }
                return Ok(n);
            }

            // flate2 reports the end of a member only once its trailer matched.
            debug!(member = index, bytes = self.member_out, "gzip member verified");
            let Some(finished) = self.member.take() else {
                return Ok(0);
            };
            if !self.multistream {
                return Ok(0);
            }

            let mut reader = finished.into_inner();
            let more = !reader
                .fill_buf()
                .map_err(|err| classify(err, Phase::Header, index + 1))?
                .is_empty();
            if !more {
                return Ok(0);
            }

            let (next, header) = open_member(reader, index + 1)?;
            self.member = Some(next);
            self.header = header;
            self.members = index + 1;
            self.member_out = 0;
        }
    }
}

impl<R: Read> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).map_err(io::Error::from)
    }
}

/// Start decoding member `index`, returning its decoder once the header parsed.
fn open_member<R: Read>(
    reader: BufReader<R>,
    index: u32,
) -> Result<(GzDecoder<BufReader<R>>, GzipHeader), GenesisError> {
    let mut member = GzDecoder::new(reader);
    if member.header().is_none() {
        // flate2 keeps a failed header parse and returns it from the next read.
        member
            .read(&mut [0u8; 0])
            .map_err(|err| classify(err, Phase::Header, index))?;
    }
    let header = member
        .header()
        .map(GzipHeader::from)
        .ok_or_else(|| GenesisError::InvalidHeader("incomplete gzip header".into()))?;

    debug!(
        member = index,
        filename = ?header.filename_lossy(),
        mtime = header.modification_time,
        os = header.operating_system,
        "parsed gzip member header"
    );
    Ok((member, header))
}

/// Map a failure surfaced through flate2 onto the genesis taxonomy.
///
/// Errors raised by the text stage pass through unchanged.
fn classify(err: io::Error, phase: Phase, member: u32) -> GenesisError {
    let context = match phase {
        Phase::Header => "gzip header",
        Phase::Body => "gzip member",
    };

    match GenesisError::from_read(err, context) {
        GenesisError::Io {
            kind: io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData,
            message,
        } if phase == Phase::Header => GenesisError::InvalidHeader(message),
        GenesisError::Io {
            kind: io::ErrorKind::InvalidData,
            ..
        } => GenesisError::ChecksumMismatch { member },
        // Some flate2 releases report a trailer mismatch as InvalidInput.
        GenesisError::Io {
            kind: io::ErrorKind::InvalidInput,
            message,
        } if message.contains("checksum") => GenesisError::ChecksumMismatch { member },
        GenesisError::Io {
            kind: io::ErrorKind::InvalidInput,
            ..
        } => GenesisError::CorruptPayload { member },
        other => other,
    }
}
