//! # Embedded Genesis
//!
//! The default genesis JSON, gzip-compressed and base64-encoded, compiled into
//! the binary. Trailing line breaks in the asset are skipped by the decoder.

/// Base64 (standard alphabet) of the gzip-compressed default genesis JSON.
pub const DEFAULT_GENESIS_BASE64: &str = include_str!("../assets/default_genesis.b64");
