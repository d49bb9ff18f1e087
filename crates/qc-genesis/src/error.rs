//! # Error Types
//!
//! Failure taxonomy for the embedded genesis pipeline.
//!
//! Every failure maps onto one of four [`ErrorKind`]s so the node runtime can
//! log exactly which layer of the embedded data is broken:
//!
//! | Kind | Layer | Variants |
//! |------|-------|----------|
//! | `Encoding` | base64 text | `InvalidSymbol`, `InvalidPadding`, `InvalidLastSymbol` |
//! | `Format` | gzip header / deflate payload | `InvalidHeader`, `CorruptPayload`, `SizeLimitExceeded` |
//! | `Integrity` | gzip trailer | `ChecksumMismatch` |
//! | `Io` | underlying stream | `UnexpectedEof`, `Io` |
//! | `Config` | caller-supplied settings | `InvalidConfig` |
//!
//! The default genesis is opened with a fixed valid configuration, so
//! `open_genesis_stream()` never reports `Config`.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification of a [`GenesisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The base64 layer is malformed.
    Encoding,
    /// The gzip header or deflate payload is malformed.
    Format,
    /// The gzip trailer does not match the decompressed payload.
    Integrity,
    /// The underlying byte stream ended early or failed.
    Io,
    /// The decode configuration was rejected before any byte was read.
    Config,
}

/// Errors produced while opening or reading the genesis stream.
///
/// Offsets on encoding errors count base64 characters, line breaks excluded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    /// Character outside the base64 alphabet.
    #[error("Invalid base64 symbol {symbol:#04x} at offset {offset}")]
    InvalidSymbol { offset: u64, symbol: u8 },

    /// Padding in the wrong place, in the wrong amount, or followed by data.
    #[error("Malformed base64 padding at offset {offset}")]
    InvalidPadding { offset: u64 },

    /// Final symbol carries non-zero trailing bits.
    #[error("Non-canonical final base64 symbol {symbol:#04x} at offset {offset}")]
    InvalidLastSymbol { offset: u64, symbol: u8 },

    /// Magic number, method, flags or optional header fields are invalid.
    #[error("Invalid gzip header: {0}")]
    InvalidHeader(String),

    /// Deflate payload of the given member could not be decoded.
    #[error("Corrupt deflate stream in gzip member {member}")]
    CorruptPayload { member: u32 },

    /// Decompressed output grew past the configured limit.
    #[error("Decompressed genesis exceeds limit of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    /// Trailer CRC-32 or ISIZE of the given member differs from what was
    /// decompressed.
    #[error("Checksum mismatch in gzip member {member} trailer")]
    ChecksumMismatch { member: u32 },

    /// Upstream ended before the named structure was complete.
    #[error("Unexpected end of stream in {0}")]
    UnexpectedEof(&'static str),

    /// Any other read failure from the upstream source.
    #[error("I/O error ({kind:?}): {message}")]
    Io { kind: io::ErrorKind, message: String },

    /// `DecodeConfig` failed validation.
    #[error("Invalid decode configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl GenesisError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenesisError::InvalidSymbol { .. }
            | GenesisError::InvalidPadding { .. }
            | GenesisError::InvalidLastSymbol { .. } => ErrorKind::Encoding,
            GenesisError::InvalidHeader(_)
            | GenesisError::CorruptPayload { .. }
            | GenesisError::SizeLimitExceeded { .. } => ErrorKind::Format,
            GenesisError::ChecksumMismatch { .. } => ErrorKind::Integrity,
            GenesisError::UnexpectedEof(_) | GenesisError::Io { .. } => ErrorKind::Io,
            GenesisError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Convert a failed read of `context`, turning a bare end-of-file into
    /// [`GenesisError::UnexpectedEof`].
    pub(crate) fn from_read(err: io::Error, context: &'static str) -> Self {
        match GenesisError::from(err) {
            GenesisError::Io {
                kind: io::ErrorKind::UnexpectedEof,
                ..
            } => GenesisError::UnexpectedEof(context),
            other => other,
        }
    }
}

impl From<GenesisError> for io::Error {
    fn from(err: GenesisError) -> Self {
        let kind = match &err {
            GenesisError::UnexpectedEof(_) => io::ErrorKind::UnexpectedEof,
            GenesisError::Io { kind, .. } => *kind,
            GenesisError::InvalidConfig(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

impl From<io::Error> for GenesisError {
    /// Recovers a `GenesisError` carried inside an `io::Error`; anything else
    /// becomes [`GenesisError::Io`].
    fn from(err: io::Error) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err.into_inner().map(|inner| inner.downcast::<GenesisError>()) {
            Some(Ok(genesis)) => *genesis,
            _ => GenesisError::Io { kind, message },
        }
    }
}
