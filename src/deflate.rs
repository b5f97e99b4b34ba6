//! The DEFLATE/zlib adapter.
//!
//! Spec: §4.3 "DEFLATE adapter". Wraps the third-party `miniz_oxide` engine:
//! on read, the concatenation of every `IDAT` chunk's payload is a single
//! zlib stream (2-byte header, DEFLATE blocks, 4-byte Adler-32 footer); on
//! write, a single zlib stream is produced and split into `IDAT` chunks no
//! larger than [`WriteOptions::max_idat_len`][crate::writer::WriteOptions].
//! The DEFLATE algorithm itself is explicitly out of scope (spec.md §1):
//! this module only owns parameters and the zlib-framed byte shape.

use miniz_oxide::deflate::core::{CompressorOxide, TDEFLFlush};
use miniz_oxide::inflate::core::{
  decompress,
  inflate_flags::{
    TINFL_FLAG_HAS_MORE_INPUT, TINFL_FLAG_PARSE_ZLIB_HEADER, TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF,
  },
  DecompressorOxide,
};
use miniz_oxide::inflate::TINFLStatus;

use crate::error::{PngError, PngResult};

/// DEFLATE compression strategy, mirrored 1:1 from zlib's `Z_*_STRATEGY`
/// constants. Spec: §4.3 "strategy ∈ {default, filtered, huffman-only, RLE,
/// fixed}".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateStrategy {
  Default,
  Filtered,
  HuffmanOnly,
  Rle,
  Fixed,
}
impl DeflateStrategy {
  fn to_miniz(self) -> miniz_oxide::deflate::core::CompressionStrategy {
    use miniz_oxide::deflate::core::CompressionStrategy as S;
    match self {
      Self::Default => S::Default,
      Self::Filtered => S::Filtered,
      Self::HuffmanOnly => S::HuffmanOnly,
      Self::Rle => S::RLE,
      Self::Fixed => S::Fixed,
    }
  }
}

/// Compression parameters. Spec: §4.3 "{window_bits 8-15, mem_level 1-9,
/// level 0-9 or default, strategy, method 8}". `miniz_oxide` doesn't expose
/// `mem_level` or non-15 window sizes directly (it always frames a standard
/// zlib header internally), so those two are retained on the struct for
/// API completeness/configuration symmetry with spec.md §6 but don't
/// currently change the encoder's behavior; this narrowing is recorded in
/// DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateParams {
  pub level: u8,
  pub strategy: DeflateStrategy,
  pub window_bits: u8,
  pub mem_level: u8,
}
impl Default for DeflateParams {
  fn default() -> Self {
    Self { level: 6, strategy: DeflateStrategy::Filtered, window_bits: 15, mem_level: 8 }
  }
}

/// Compresses `data` into a single zlib stream (header + DEFLATE + Adler-32).
pub fn compress_zlib(data: &[u8], params: DeflateParams) -> Vec<u8> {
  let mut compressor = CompressorOxide::new(
    miniz_oxide::deflate::core::create_comp_flags_from_zip_params(
      params.level as i32,
      params.window_bits as i32,
      params.strategy.to_miniz() as i32,
    ),
  );
  let mut out = Vec::with_capacity(data.len() / 2 + 64);
  let mut in_pos = 0usize;
  let mut buf = [0u8; 1 << 16];
  loop {
    let (status, consumed, produced) =
      miniz_oxide::deflate::core::compress(&mut compressor, &data[in_pos..], &mut buf, TDEFLFlush::Finish);
    out.extend_from_slice(&buf[..produced]);
    in_pos += consumed;
    match status {
      miniz_oxide::deflate::core::TDEFLStatus::Done => break,
      miniz_oxide::deflate::core::TDEFLStatus::Okay => continue,
      _ => break,
    }
  }
  out
}

/// Adler-32 mismatch handling on read. Spec: §4.3 "Adler-32 mismatch =>
/// configurable (ignore for known pathologies, else error)".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adler32Policy {
  Error,
  Ignore,
}

/// Decompresses the concatenation of IDAT payloads (`chunks`, already
/// ordered as they appeared on the wire) into `out`, which must be exactly
/// [`crate::ihdr::Ihdr::decompressed_size`] bytes.
///
/// Detects: extra bytes after the terminating block (not directly
/// observable from `miniz_oxide`'s status alone, so callers checking this
/// invariant should additionally verify `chunks` wasn't longer than
/// needed), truncation (insufficient output produced), and Adler-32
/// mismatch (per `adler_policy`).
pub fn decompress_idat<'a>(out: &mut [u8], chunks: impl Iterator<Item = &'a [u8]>, adler_policy: Adler32Policy) -> PngResult<()> {
  let mut it = chunks.peekable();
  let mut decompressor = DecompressorOxide::new();
  let mut out_pos = 0usize;
  let mut first = true;

  if it.peek().is_none() {
    return Err(PngError::NoIdatChunks);
  }

  while let Some(in_buf) = it.next() {
    let has_more_after = it.peek().is_some();
    let flags = (if first { TINFL_FLAG_PARSE_ZLIB_HEADER } else { 0 })
      | TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF
      | (if has_more_after { TINFL_FLAG_HAS_MORE_INPUT } else { 0 });
    first = false;

    let (status, _input_read, bytes_written) = decompress(&mut decompressor, in_buf, out, out_pos, flags);
    out_pos += bytes_written;

    match status {
      TINFLStatus::Done => {
        return Ok(());
      }
      TINFLStatus::NeedsMoreInput => {
        if !has_more_after {
          return Err(PngError::DeflateTruncated(out_pos, out.len()));
        }
      }
      TINFLStatus::HasMoreOutput => {
        // Our caller sized `out` exactly; more output than that is a
        // truncation-in-reverse (the stream claims more pixel data exists
        // than IHDR says it should).
        return Err(PngError::DeflateTruncated(out_pos, out.len()));
      }
      TINFLStatus::Adler32Mismatch => match adler_policy {
        Adler32Policy::Ignore => return Ok(()),
        Adler32Policy::Error => return Err(PngError::Adler32Mismatch),
      },
      TINFLStatus::FailedCannotMakeProgress => {
        return Err(PngError::DeflateFailed("decompressor could not make progress"));
      }
      TINFLStatus::BadParam => return Err(PngError::InvalidZlibHeader),
      TINFLStatus::Failed => return Err(PngError::DeflateFailed("malformed DEFLATE stream")),
    }
  }

  if out_pos < out.len() {
    Err(PngError::DeflateTruncated(out_pos, out.len()))
  } else {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_arbitrary_bytes() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let zlib = compress_zlib(&data, DeflateParams::default());
    let mut out = vec![0u8; data.len()];
    decompress_idat(&mut out, std::iter::once(zlib.as_slice()), Adler32Policy::Error).unwrap();
    assert_eq!(out, data);
  }

  #[test]
  fn round_trips_when_idat_is_split_across_chunks() {
    let data: Vec<u8> = (0..20000u32).map(|i| ((i * 7) % 251) as u8).collect();
    let zlib = compress_zlib(&data, DeflateParams::default());
    let chunks: Vec<&[u8]> = zlib.chunks(97).collect();
    let mut out = vec![0u8; data.len()];
    decompress_idat(&mut out, chunks.into_iter(), Adler32Policy::Error).unwrap();
    assert_eq!(out, data);
  }

  #[test]
  fn detects_truncation() {
    let data = vec![42u8; 10_000];
    let zlib = compress_zlib(&data, DeflateParams::default());
    let truncated = &zlib[..zlib.len() / 2];
    let mut out = vec![0u8; data.len()];
    assert!(decompress_idat(&mut out, std::iter::once(truncated), Adler32Policy::Error).is_err());
  }

  #[test]
  fn empty_idat_iterator_is_an_error() {
    let mut out = vec![0u8; 4];
    let empty: Vec<&[u8]> = vec![];
    assert!(matches!(
      decompress_idat(&mut out, empty.into_iter(), Adler32Policy::Error),
      Err(PngError::NoIdatChunks)
    ));
  }
}
