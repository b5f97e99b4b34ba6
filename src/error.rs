//! Error and warning types.
//!
//! Spec: §4.7 "Error handling", §7 "Error handling design", §9 Design Notes
//! ("Non-local exit on fatal errors"). libpng threads a `jmp_buf` rescue
//! point through every call; we model the same "abandon this stream, release
//! everything allocated so far" contract as an ordinary [`Result`] that
//! propagates with `?`, since there's no non-local exit to reach for outside
//! of the small callback boundary (see [`crate::chunk`] dispatch and
//! [`crate::deflate`]).

use crate::chunk::ChunkType;

/// Every error kind is fatal: it abandons the stream that raised it.
///
/// The variants are grouped to match the error-kind taxonomy in spec.md §7:
/// signature/format, chunk-structure, semantic, DEFLATE, resource, user.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PngError {
  // --- signature / format ---
  #[error("input does not start with the 8-byte PNG signature")]
  NoPngSignature,
  #[error(
    "input looks like a PNG signature that has been corrupted by ASCII \
     text-mode translation (CRLF/EOF byte mangling)"
  )]
  AsciiTranslatedSignature,
  #[error("input ended before a complete chunk header could be read")]
  UnexpectedEndOfInput,

  // --- chunk structure ---
  #[error("chunk {0} declares a length that is larger than the remaining input")]
  ChunkLengthOverflow(ChunkType),
  #[error("chunk {0} failed its CRC-32 check (declared {declared:#010x}, computed {computed:#010x})", declared = .1, computed = .2)]
  CrcMismatch(ChunkType, u32, u32),
  #[error("the first chunk in the stream was {0}, not IHDR")]
  FirstChunkNotIhdr,
  #[error("a second IHDR chunk was encountered")]
  DuplicateIhdr,
  #[error("a second PLTE chunk was encountered")]
  DuplicatePlte,
  #[error("PLTE appeared after the first IDAT chunk")]
  PlteAfterIdat,
  #[error("a chunk of type {0} appeared between two IDAT chunks, splitting the image data stream")]
  NonIdatBetweenIdat(ChunkType),
  #[error("a second IEND chunk was encountered")]
  DuplicateIend,
  #[error("unknown critical chunk {0} encountered and not explicitly whitelisted")]
  UnknownCriticalChunk(ChunkType),
  #[error("chunk {0} appeared before IHDR")]
  ChunkBeforeIhdr(ChunkType),
  #[error("no IDAT chunk was found before IEND")]
  NoIdatChunks,

  // --- semantic ---
  #[error("IHDR declared an illegal color-type/bit-depth combination: color type {0}, bit depth {1}")]
  IllegalColorTypeBitDepthCombination(u8, u8),
  #[error("IHDR compression method {0} is not the single legal value 0")]
  IllegalCompressionMethod(u8),
  #[error("IHDR filter method {0} is not the single legal value 0")]
  IllegalFilterMethod(u8),
  #[error("IHDR interlace method {0} is neither 0 (none) nor 1 (Adam7)")]
  IllegalInterlaceMethod(u8),
  #[error("IHDR width is zero")]
  WidthIsZero,
  #[error("IHDR height is zero")]
  HeightIsZero,
  #[error("width * height overflows when computing required buffer size")]
  DimensionsOverflow,
  #[error("PLTE is required for indexed-color images but is missing")]
  PlteRequiredButMissing,
  #[error("PLTE is forbidden for this color type but was present")]
  PlteForbidden,
  #[error("PLTE has {0} entries, more than the 256 maximum")]
  PlteTooLarge(usize),
  #[error("PLTE byte length {0} is not a multiple of 3")]
  PlteLengthNotMultipleOfThree(usize),
  #[error("tRNS is forbidden for this color type but was present")]
  TrnsForbidden,
  #[error("tRNS has more entries ({0}) than PLTE ({1})")]
  TrnsLongerThanPlte(usize, usize),
  #[error("a pixel's palette index {0} is out of range for a palette of length {1}")]
  PaletteIndexOutOfRange(u8, usize),
  #[error("chunk {0} has an invalid structure or length ({1} bytes)")]
  MalformedChunk(ChunkType, usize),
  #[error("two iCCP/sRGB chunks declaring conflicting color management were both present")]
  ConflictingColorManagement,

  // --- DEFLATE ---
  #[error("zlib stream has an invalid 2-byte header")]
  InvalidZlibHeader,
  #[error("zlib stream uses a preset dictionary, which PNG does not allow")]
  ZlibPresetDictionaryNotAllowed,
  #[error("DEFLATE decompression failed: {0}")]
  DeflateFailed(&'static str),
  #[error("DEFLATE stream produced fewer bytes ({0}) than the image needs ({1})")]
  DeflateTruncated(usize, usize),
  #[error("DEFLATE stream has trailing bytes after its final block")]
  DeflateTrailingData,
  #[error("zlib Adler-32 checksum mismatch")]
  Adler32Mismatch,

  // --- resource ---
  #[error("required allocation of {0} bytes failed")]
  AllocationFailed(usize),
  #[error("a decoded row would overflow its destination buffer")]
  RowBufferOverflow,

  // --- user ---
  #[error("caller supplied {0} rows, but the image has {1}")]
  RowCountMismatch(usize, usize),
  #[error("caller supplied a row of {0} bytes, expected {1}")]
  RowLengthMismatch(usize, usize),
  #[error("requested transform is not representable for this pixel format")]
  UnsupportedTransform,
  #[error("the simplified API does not support the requested pixel layout")]
  UnsupportedSimplifiedLayout,
  #[error("write_info was not called before writing rows")]
  InfoNotWritten,
  #[error("IHDR has not been set on this write stream")]
  IhdrNotSet,
  #[error("caller-provided I/O failed: {0}")]
  Io(String),
}

impl From<std::io::Error> for PngError {
  fn from(e: std::io::Error) -> Self {
    PngError::Io(e.to_string())
  }
}

pub type PngResult<T> = Result<T, PngError>;

/// Non-fatal conditions, delivered through the caller's warning callback.
///
/// Spec: §4.7 "Warnings do not [abandon the stream]". If the caller installs
/// no callback the default sink logs through `log::warn!` and otherwise has
/// no effect on stream state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngWarning {
  /// A CRC mismatch was tolerated per the active [`crate::chunk::ChunkLocation`]-
  /// independent `CrcAction`.
  CrcMismatchTolerated(ChunkType),
  /// A single-instance ancillary chunk appeared more than once; the second
  /// occurrence was discarded.
  DuplicateAncillaryDiscarded(ChunkType),
  /// An ancillary chunk's value was out of the range the spec allows, but
  /// `benign_errors` was enabled so it was tolerated.
  BenignOutOfRangeValue(ChunkType, String),
  /// A `tRNS` chunk had more entries than `PLTE`; the excess was truncated
  /// under benign-error mode instead of being rejected.
  TrnsTruncated(usize, usize),
  /// The zlib Adler-32 checksum didn't match, but this was tolerated by
  /// configuration.
  Adler32MismatchTolerated,
  /// An unknown ancillary chunk could not be parsed and was skipped.
  UnparseableAncillaryChunk(ChunkType),
}

impl std::fmt::Display for PngWarning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PngWarning::CrcMismatchTolerated(ty) => write!(f, "CRC mismatch tolerated for {ty}"),
      PngWarning::DuplicateAncillaryDiscarded(ty) => {
        write!(f, "duplicate {ty} chunk discarded")
      }
      PngWarning::BenignOutOfRangeValue(ty, msg) => {
        write!(f, "{ty}: {msg}")
      }
      PngWarning::TrnsTruncated(trns_len, plte_len) => {
        write!(f, "tRNS length {trns_len} truncated to PLTE length {plte_len}")
      }
      PngWarning::Adler32MismatchTolerated => write!(f, "Adler-32 mismatch tolerated"),
      PngWarning::UnparseableAncillaryChunk(ty) => {
        write!(f, "{ty} chunk could not be parsed and was skipped")
      }
    }
  }
}

/// A callback invoked for every non-fatal condition.
///
/// Boxed so that [`crate::reader::ReadOptions`] and
/// [`crate::writer::WriteOptions`] stay `Send`-agnostic and cheap to
/// construct with a default (logging) sink.
pub type WarningSink<'a> = Box<dyn FnMut(PngWarning) + 'a>;

/// The default warning sink: forwards to the `log` crate.
pub fn default_warning_sink(warning: PngWarning) {
  log::warn!("{warning}");
}
