//! # Brutal Tests for the Embedded Genesis (qc-genesis)
//!
//! These tests tamper with the embedded constant and the pipeline to make sure
//! corruption is always reported and never turns into a silent short read.
//!
//! ## Test Categories
//!
//! 1. **Baseline** - default constant decodes to a JSON object
//! 2. **Chunking** - read sizes never change the output
//! 3. **Concurrency** - parallel streams are independent
//! 4. **Tampering** - flipped characters fail deterministically
//! 5. **Truncation** - shortened constants fail with Io / Integrity
//! 6. **End of stream** - repeated reads after the end are clean

use std::io::{Read, Write};
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use proptest::prelude::*;

use qc_genesis::{
    open_genesis_stream, read_default_genesis, DecodeConfig, ErrorKind, GenesisError,
    GenesisStream, DEFAULT_GENESIS_BASE64,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn drain_encoded(encoded: &[u8], config: &DecodeConfig) -> Result<Vec<u8>, GenesisError> {
    let mut stream = GenesisStream::open(encoded, config)?;
    let mut out = Vec::new();
    stream.read_to_end(&mut out)?;
    Ok(out)
}

fn drain_with_chunk(stream: &mut impl Read, chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = stream.read(&mut buf).expect("read genesis");
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// Replace the character at `index` with another symbol from the alphabet.
fn flip(index: usize) -> Vec<u8> {
    let mut bytes = DEFAULT_GENESIS_BASE64.as_bytes().to_vec();
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    bytes
}

fn encode_gzip(data: &[u8]) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).expect("write");
    STANDARD.encode(encoder.finish().expect("finish"))
}

// =============================================================================
// BASELINE
// =============================================================================

#[test]
fn test_default_genesis_starts_with_object() {
    let genesis = read_default_genesis().expect("embedded genesis must decode");
    assert_eq!(genesis[0], b'{');

    let value: serde_json::Value = serde_json::from_slice(&genesis).expect("valid JSON");
    assert!(value.get("alloc").is_some());
}

#[test]
fn test_default_genesis_is_deterministic() {
    assert_eq!(
        read_default_genesis().expect("first"),
        read_default_genesis().expect("second")
    );
}

#[test]
fn test_constant_with_line_breaks_decodes_identically() {
    let wrapped: String = DEFAULT_GENESIS_BASE64
        .as_bytes()
        .chunks(64)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect();

    let out = drain_encoded(wrapped.as_bytes(), &DecodeConfig::default()).expect("decode");
    assert_eq!(out, read_default_genesis().expect("default"));
}

// =============================================================================
// CHUNKING
// =============================================================================

#[test]
fn test_single_byte_reads_match_single_large_read() {
    let mut small = open_genesis_stream().expect("open");
    let byte_by_byte = drain_with_chunk(&mut small, 1);

    let mut large = open_genesis_stream().expect("open");
    let mut buf = vec![0u8; 1 << 20];
    let n = large.read(&mut buf).expect("read");
    let mut whole = buf[..n].to_vec();
    large.read_to_end(&mut whole).expect("rest");

    assert_eq!(byte_by_byte, whole);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_read_size_does_not_change_output(chunk in 1usize..8192) {
        let mut stream = open_genesis_stream().expect("open");
        let out = drain_with_chunk(&mut stream, chunk);
        prop_assert_eq!(out, read_default_genesis().expect("default"));
    }

    #[test]
    fn prop_text_chunk_size_does_not_change_output(groups in 1usize..2048) {
        let config = DecodeConfig::default().with_text_chunk_size(groups * 4);
        let out = drain_encoded(DEFAULT_GENESIS_BASE64.as_bytes(), &config).expect("decode");
        prop_assert_eq!(out, read_default_genesis().expect("default"));
    }
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_streams_are_independent() {
    let (a, b) = thread::scope(|scope| {
        let first = scope.spawn(|| {
            let mut stream = open_genesis_stream().expect("open");
            drain_with_chunk(&mut stream, 7)
        });
        let second = scope.spawn(|| {
            let mut stream = open_genesis_stream().expect("open");
            drain_with_chunk(&mut stream, 4096)
        });
        (
            first.join().expect("first thread"),
            second.join().expect("second thread"),
        )
    });

    assert_eq!(a, b);
    assert_eq!(a[0], b'{');
}

#[test]
fn test_interleaved_reads_do_not_interfere() {
    let mut left = open_genesis_stream().expect("open");
    let mut right = open_genesis_stream().expect("open");
    let mut left_out = Vec::new();
    let mut right_out = Vec::new();
    let mut buf = [0u8; 333];

    loop {
        let l = left.read_chunk(&mut buf).expect("left");
        left_out.extend_from_slice(&buf[..l]);
        let r = right.read_chunk(&mut buf[..100]).expect("right");
        right_out.extend_from_slice(&buf[..r]);
        if l == 0 && r == 0 {
            break;
        }
    }

    assert_eq!(left_out, right_out);
}

// =============================================================================
// TAMPERING
// =============================================================================

#[test]
fn test_symbol_outside_alphabet_is_encoding_error() {
    for index in [100, 5_000, 20_000] {
        let mut bytes = DEFAULT_GENESIS_BASE64.as_bytes().to_vec();
        bytes[index] = b'*';

        let err = drain_encoded(&bytes, &DecodeConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding, "index {index}: {err}");
        assert_eq!(
            err,
            GenesisError::InvalidSymbol {
                offset: index as u64,
                symbol: b'*'
            }
        );
    }
}

#[test]
fn test_error_in_first_chunk_surfaces_at_open() {
    let mut bytes = DEFAULT_GENESIS_BASE64.as_bytes().to_vec();
    bytes[2] = b'!';

    let err = GenesisStream::open(&bytes[..], &DecodeConfig::default())
        .err()
        .expect("open must fail");
    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[test]
fn test_error_in_later_chunk_surfaces_at_read() {
    let mut bytes = DEFAULT_GENESIS_BASE64.as_bytes().to_vec();
    bytes[10_000] = b'!';

    let mut stream = GenesisStream::open(&bytes[..], &DecodeConfig::default()).expect("open");
    let mut out = Vec::new();
    let err = GenesisError::from(stream.read_to_end(&mut out).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Encoding);
    // Everything before the bad chunk was still delivered.
    assert!(!out.is_empty());
}

#[test]
fn test_flipped_magic_is_format_error() {
    // "H4sI" encodes 1f 8b 08 ..; any change to the first symbol breaks ID1.
    let err = drain_encoded(&flip(0), &DecodeConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, GenesisError::InvalidHeader(_)), "{err:?}");
}

#[test]
fn test_flipped_payload_never_succeeds() {
    for index in [40, 1_000, 13_000, 25_000] {
        let result = drain_encoded(&flip(index), &DecodeConfig::default());
        assert!(result.is_err(), "flip at {index} decoded successfully");

        let again = drain_encoded(&flip(index), &DecodeConfig::default());
        assert_eq!(result, again, "flip at {index} is not deterministic");
    }
}

#[test]
fn test_flipped_deflate_code_is_corrupt_payload() {
    // Both flips land in deflate block headers that no longer decode.
    for index in [40, 1_000] {
        let err = drain_encoded(&flip(index), &DecodeConfig::default()).unwrap_err();
        assert_eq!(err, GenesisError::CorruptPayload { member: 1 }, "index {index}");
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn test_flipped_literal_is_caught_by_trailer() {
    // These flips still inflate; only the CRC-32 exposes them.
    for index in [13_000, 25_000, 26_000] {
        let err = drain_encoded(&flip(index), &DecodeConfig::default()).unwrap_err();
        assert_eq!(err, GenesisError::ChecksumMismatch { member: 1 }, "index {index}");
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }
}

#[test]
fn test_tampered_checksum_is_integrity_error() {
    let mut gz = {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(br#"{"chainId":1}"#).expect("write");
        encoder.finish().expect("finish")
    };
    let crc_at = gz.len() - 8;
    gz[crc_at] ^= 0x80;
    let encoded = STANDARD.encode(&gz);

    let err = drain_encoded(encoded.as_bytes(), &DecodeConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_alternative_encoded_genesis() {
    let encoded = encode_gzip(br#"{"chainId":31337}"#);
    let out = drain_encoded(encoded.as_bytes(), &DecodeConfig::default()).expect("decode");
    assert_eq!(out, br#"{"chainId":31337}"#);
}

// =============================================================================
// TRUNCATION
// =============================================================================

#[test]
fn test_constant_ends_on_padding() {
    assert!(DEFAULT_GENESIS_BASE64.ends_with('='));
    assert_eq!(DEFAULT_GENESIS_BASE64.len() % 4, 0);
}

#[test]
fn test_dropping_last_character_fails() {
    let full = DEFAULT_GENESIS_BASE64.as_bytes();
    let err = drain_encoded(&full[..full.len() - 1], &DecodeConfig::default())
        .expect_err("one character short must not decode");
    assert_eq!(err, GenesisError::UnexpectedEof("base64 group"));
}

#[test]
fn test_truncated_constant_never_reads_short() {
    let full = DEFAULT_GENESIS_BASE64.as_bytes();
    for removed in [1, 2, 3, 4, 5, 8, 11, 12, 100, 1_000, 20_000] {
        let err = drain_encoded(&full[..full.len() - removed], &DecodeConfig::default())
            .expect_err("truncated genesis must not decode");
        assert!(
            matches!(err.kind(), ErrorKind::Io | ErrorKind::Integrity),
            "removed {removed}: {err:?}"
        );
    }
}

#[test]
fn test_empty_constant_fails_at_open() {
    let err = GenesisStream::open(&b""[..], &DecodeConfig::default())
        .err()
        .expect("open must fail");
    assert_eq!(err, GenesisError::UnexpectedEof("gzip header"));
}

// =============================================================================
// END OF STREAM
// =============================================================================

#[test]
fn test_reads_after_end_are_idempotent() {
    let mut stream = open_genesis_stream().expect("open");
    let mut out = Vec::new();
    stream.read_to_end(&mut out).expect("drain");

    let mut buf = [0u8; 64];
    for _ in 0..5 {
        assert_eq!(stream.read(&mut buf).expect("eof"), 0);
        assert_eq!(stream.read_chunk(&mut buf).expect("eof"), 0);
    }
}

#[test]
fn test_abandoned_stream_releases_cleanly() {
    let mut stream = open_genesis_stream().expect("open");
    let mut buf = [0u8; 10];
    stream.read_exact(&mut buf).expect("partial read");
    assert_eq!(buf[0], b'{');
    drop(stream);

    // A fresh stream is unaffected by the abandoned one.
    assert_eq!(read_default_genesis().expect("default")[..10], buf);
}
