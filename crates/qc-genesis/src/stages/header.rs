//! # Gzip Member Header
//!
//! Owned copy of the RFC 1952 member header fields that flate2 parses.
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+
//! |ID1|ID2|CM |FLG|     MTIME     |XFL|OS |
//! +---+---+---+---+---+---+---+---+---+---+
//! [XLEN + extra] [name\0] [comment\0] [CRC16]
//! ```

use std::borrow::Cow;

use flate2::GzHeader;

/// Metadata carried by a gzip member header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GzipHeader {
    /// MTIME in Unix seconds (0 = unknown).
    pub modification_time: u32,
    /// OS that wrote the member (3 = Unix, 255 = unknown).
    pub operating_system: u8,
    /// FEXTRA payload.
    pub extra: Option<Vec<u8>>,
    /// FNAME without the terminator.
    pub filename: Option<Vec<u8>>,
    /// FCOMMENT without the terminator.
    pub comment: Option<Vec<u8>>,
}

impl GzipHeader {
    /// Original file name, if recorded.
    pub fn filename_lossy(&self) -> Option<Cow<'_, str>> {
        self.filename.as_deref().map(String::from_utf8_lossy)
    }

    /// Comment, if recorded.
    pub fn comment_lossy(&self) -> Option<Cow<'_, str>> {
        self.comment.as_deref().map(String::from_utf8_lossy)
    }
}

impl From<&GzHeader> for GzipHeader {
    fn from(header: &GzHeader) -> Self {
        Self {
            modification_time: header.mtime(),
            operating_system: header.operating_system(),
            extra: header.extra().map(<[u8]>::to_vec),
            filename: header.filename().map(<[u8]>::to_vec),
            comment: header.comment().map(<[u8]>::to_vec),
        }
    }
}
