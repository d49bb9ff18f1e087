//! # QC Genesis
//!
//! Build-embedded default genesis for the Quantum-Chain node runtime.
//!
//! The genesis JSON is compiled into the binary as base64 text wrapping a gzip
//! member, so a node can bootstrap chain state without an external genesis
//! file. The text is decoded lazily: nothing is materialized until the caller
//! reads.
//!
//! ## Architecture
//!
//! - **Constant** (`constant`): `DEFAULT_GENESIS_BASE64`, the `'static` source
//! - **Stages** (`stages/`): composable `Read` adapters
//!   - `Base64Decoder`: strips the text encoding in bounded chunks
//!   - `GzipDecoder`: flate2 gzip members, size cap, sticky errors
//! - **Pipeline** (`pipeline`): `open_genesis_stream()` wires the stages
//! - **Config** (`config`): `DecodeConfig` for chunking, size cap, multistream
//!
//! ## Error Taxonomy
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `Encoding` | symbol outside the base64 alphabet, misplaced padding |
//! | `Format` | bad gzip magic/method/flags, corrupt deflate data, size cap |
//! | `Integrity` | trailer CRC-32 or length mismatch |
//! | `Io` | source ends before the trailer |
//! | `Config` | `GenesisStream::open` given an invalid `DecodeConfig` |
//!
//! Base64 errors are detected lazily, when the chunk holding them is decoded.
//! The gzip header is parsed at open, so defects in the first text chunk are
//! reported by `open_genesis_stream()` itself.
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::io::Read;
//! use qc_genesis::open_genesis_stream;
//!
//! let mut stream = open_genesis_stream()?;
//! let mut genesis = Vec::new();
//! stream.read_to_end(&mut genesis)?;
//! assert_eq!(genesis[0], b'{');
//! ```
//!
//! Typed parsing of the JSON belongs to the genesis loader, not this crate.

pub mod config;
pub mod constant;
pub mod error;
pub mod pipeline;
pub mod stages;

// Re-exports for convenience
pub use config::{ConfigError, DecodeConfig};
pub use constant::DEFAULT_GENESIS_BASE64;
pub use error::{ErrorKind, GenesisError};
pub use pipeline::{open_genesis_stream, read_default_genesis, GenesisStream};
pub use stages::{Base64Decoder, GzipDecoder, GzipHeader};
