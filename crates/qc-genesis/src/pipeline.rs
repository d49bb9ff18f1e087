//! # Genesis Pipeline
//!
//! Composes the text and gzip stages into the stream handed to the node.
//!
//! ```text
//! DEFAULT_GENESIS_BASE64 ──→ Base64Decoder ──→ GzipDecoder ──→ caller
//!        (&'static)          (lazy chunks)     (header at open)
//! ```
//!
//! Every call builds a fresh pipeline; nothing is shared between streams
//! except the read-only constant.

use std::io::{self, Read};

use tracing::debug;

use crate::config::DecodeConfig;
use crate::constant::DEFAULT_GENESIS_BASE64;
use crate::error::GenesisError;
use crate::stages::{Base64Decoder, GzipDecoder, GzipHeader};

/// Lazily decoded genesis JSON bytes.
///
/// Dropping the stream releases both stages, whether or not it was drained.
pub struct GenesisStream<R = &'static [u8]> {
    inner: GzipDecoder<Base64Decoder<R>>,
}

impl<R: Read> GenesisStream<R> {
    /// Open a pipeline over base64 text read from `encoded`.
    ///
    /// `config` is validated first; nothing is read from `encoded` if it is
    /// rejected. The first gzip header is parsed before returning, so a corrupt
    /// header (or a base64 defect inside the first text chunk) fails here.
    pub fn open(encoded: R, config: &DecodeConfig) -> Result<Self, GenesisError> {
        config.validate()?;
        let text = Base64Decoder::new(encoded, config.text_chunk_size);
        let inner = GzipDecoder::new(text, config)?;
        Ok(Self { inner })
    }

    /// Header of the gzip member currently being decoded.
    pub fn header(&self) -> &GzipHeader {
        self.inner.header()
    }

    /// Read genesis bytes into `buf`, returning the typed error on failure.
    ///
    /// `Ok(0)` means end of stream and is returned again on every later call.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, GenesisError> {
        self.inner.read_chunk(buf)
    }

    /// Genesis bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// Gzip members encountered so far.
    pub fn members(&self) -> u32 {
        self.inner.members()
    }

    /// Whether end of stream (or a failure) has been reached.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<R: Read> Read for GenesisStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Open the build-embedded default genesis.
///
/// Returns an independent stream on every call. Errors from the header parse
/// are returned here; later corruption surfaces from the reads.
pub fn open_genesis_stream() -> Result<GenesisStream, GenesisError> {
    let stream = GenesisStream::open(DEFAULT_GENESIS_BASE64.as_bytes(), &DecodeConfig::default())?;
    debug!(
        filename = ?stream.header().filename_lossy(),
        "opened embedded genesis stream"
    );
    Ok(stream)
}

/// Drain the default genesis into memory.
pub fn read_default_genesis() -> Result<Vec<u8>, GenesisError> {
    let mut stream = open_genesis_stream()?;
    let mut genesis = Vec::new();
    stream.read_to_end(&mut genesis)?;
    Ok(genesis)
}
