//! # Decode Stages
//!
//! Composable `Read` adapters, each owning its upstream:
//!
//! - `text` - base64 removal ([`Base64Decoder`])
//! - `header` - gzip member metadata ([`GzipHeader`])
//! - `gzip` - inflate + trailer verification ([`GzipDecoder`])

mod gzip;
mod header;
mod text;

pub use gzip::GzipDecoder;
pub use header::GzipHeader;
pub use text::Base64Decoder;
