//! The chunk dispatcher and state machine, driving a [`std::io::Read`] byte
//! source into a validated [`Ihdr`] + [`PngInfo`] + deinterlaced,
//! unfiltered pixel buffer.
//!
//! Spec: §4.2 "Chunk dispatcher and state machine", §4.1 "Wire I/O
//! adapter". The state machine enforces: IHDR first, PLTE only before the
//! first IDAT (and only for color types that allow it), every IDAT
//! contiguous, IEND last.

use std::io::Read;

use crate::adam7;
use crate::chunk::{ChunkLocation, ChunkType, UnknownChunk, PNG_SIGNATURE};
use crate::crc::Crc32;
use crate::deflate::{self, Adler32Policy, DeflateParams};
use crate::error::{default_warning_sink, PngError, PngResult, PngWarning, WarningSink};
use crate::filtering;
use crate::ihdr::Ihdr;
use crate::metadata::{
  Bkgd, Chrm, Gama, Hist, Iccp, Offs, Pcal, Phys, Plte, PngInfo, Sbit, Scal, Srgb, Time, Trns, ITXt, TEXt, ZTXt,
};
use crate::metadata::SuggestedPalette;

/// How a CRC mismatch is handled. Spec: §6 "Configuration ... CRC action".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcAction {
  /// Fatal: abandon the stream.
  Error,
  /// Tolerate, log a warning, and use the chunk's data.
  WarnAndUse,
  /// Tolerate silently and use the chunk's data.
  QuietUse,
  /// Tolerate, log a warning, and drop the chunk (ancillary only; a
  /// critical chunk always errors instead, since it can't be "dropped").
  WarnAndDiscard,
  /// Tolerate silently and drop the chunk (ancillary only).
  QuietDiscard,
}
impl Default for CrcAction {
  fn default() -> Self {
    Self::Error
  }
}

/// Tunables for a read stream. Spec: §6 "Configuration"; SPEC_FULL §A.3.
pub struct ReadOptions<'a> {
  pub crc_action: CrcAction,
  /// Downgrades a documented set of otherwise-fatal semantic checks to
  /// warnings. See `SPEC_FULL.md` §B for the exact list this crate
  /// downgrades.
  pub benign_errors: bool,
  /// Critical chunk types beyond the five the dispatcher itself knows,
  /// accepted as unknown-but-tolerated rather than rejected outright.
  pub critical_chunk_whitelist: Vec<ChunkType>,
  /// Adler-32 mismatch policy for the DEFLATE adapter.
  pub adler32_policy: Adler32Policy,
  pub warning_sink: WarningSink<'a>,
}
impl<'a> Default for ReadOptions<'a> {
  fn default() -> Self {
    Self {
      crc_action: CrcAction::default(),
      benign_errors: false,
      critical_chunk_whitelist: Vec::new(),
      adler32_policy: Adler32Policy::Error,
      warning_sink: Box::new(default_warning_sink),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
  BeforeIhdr,
  AfterIhdr,
  AfterPlte,
  InIdat,
  AfterIdat,
  Done,
}

/// The fully decoded (but not yet transformed) contents of a PNG stream.
///
/// `rows` holds the deinterlaced, unfiltered scanlines in canonical
/// top-to-bottom order, at the wire bit depth/color type — exactly
/// `ihdr.height` rows of `ihdr.row_bytes()` bytes each, with no leading
/// filter-type byte.
pub struct DecodedImage {
  pub ihdr: Ihdr,
  pub info: PngInfo,
  pub rows: Vec<Vec<u8>>,
}

/// Reads a complete PNG stream from `reader` into a [`DecodedImage`].
///
/// This is the `read_info` + `read_image` + `read_end` sequence collapsed
/// into one call, matching the common case; the dispatcher state machine
/// underneath enforces every ordering rule regardless.
pub fn read_png<R: Read>(mut reader: R, mut options: ReadOptions<'_>) -> PngResult<DecodedImage> {
  read_signature(&mut reader)?;

  let mut state = ReadState::BeforeIhdr;
  let mut ihdr: Option<Ihdr> = None;
  let mut info = PngInfo::default();
  let mut idat_chunks: Vec<Vec<u8>> = Vec::new();
  let mut saw_idat = false;
  let mut saw_iend = false;

  while !saw_iend {
    let Some((chunk_type, data)) = read_chunk(&mut reader, &mut options)? else {
      continue;
    };
    log::trace!("read chunk {chunk_type} ({} bytes)", data.len());

    if chunk_type == ChunkType::IHDR {
      if state != ReadState::BeforeIhdr {
        return Err(PngError::DuplicateIhdr);
      }
      ihdr = Some(Ihdr::parse(&data)?);
      state = ReadState::AfterIhdr;
      continue;
    }
    let Some(hdr) = ihdr else {
      if state == ReadState::BeforeIhdr {
        return Err(PngError::FirstChunkNotIhdr);
      }
      return Err(PngError::ChunkBeforeIhdr(chunk_type));
    };

    if chunk_type == ChunkType::IEND {
      saw_iend = true;
      state = ReadState::Done;
      continue;
    }

    if chunk_type == ChunkType::IDAT {
      if state == ReadState::AfterIdat {
        return Err(PngError::NonIdatBetweenIdat(chunk_type));
      }
      saw_idat = true;
      state = ReadState::InIdat;
      idat_chunks.push(data);
      continue;
    }
    if state == ReadState::InIdat {
      state = ReadState::AfterIdat;
    }

    if chunk_type == ChunkType::PLTE {
      if info.plte.is_some() {
        return Err(PngError::DuplicatePlte);
      }
      if state as u8 > ReadState::AfterIhdr as u8 {
        return Err(PngError::PlteAfterIdat);
      }
      if hdr.color_type == crate::ihdr::ColorType::Grayscale || hdr.color_type == crate::ihdr::ColorType::GrayscaleAlpha {
        return Err(PngError::PlteForbidden);
      }
      info.plte = Some(Plte::parse(&data)?);
      state = ReadState::AfterPlte;
      continue;
    }

    let location = if info.plte.is_none() {
      ChunkLocation::BeforePlte
    } else if !saw_idat {
      ChunkLocation::BeforeIdat
    } else {
      ChunkLocation::AfterIdat
    };
    dispatch_ancillary(chunk_type, &data, &hdr, location, &mut info, &mut options)?;
  }

  let ihdr = ihdr.ok_or(PngError::FirstChunkNotIhdr)?;
  if !saw_idat {
    return Err(PngError::NoIdatChunks);
  }
  if ihdr.color_type == crate::ihdr::ColorType::Palette && info.plte.is_none() {
    return Err(PngError::PlteRequiredButMissing);
  }

  let rows = decode_rows(&ihdr, &idat_chunks, options.adler32_policy)?;
  Ok(DecodedImage { ihdr, info, rows })
}

fn read_signature<R: Read>(reader: &mut R) -> PngResult<()> {
  let mut sig = [0u8; 8];
  reader.read_exact(&mut sig).map_err(|e| {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
      PngError::UnexpectedEndOfInput
    } else {
      PngError::from(e)
    }
  })?;
  if sig == PNG_SIGNATURE {
    return Ok(());
  }
  if sig[0] == PNG_SIGNATURE[0] && sig[1..4] == PNG_SIGNATURE[1..4] {
    return Err(PngError::AsciiTranslatedSignature);
  }
  Err(PngError::NoPngSignature)
}

/// Reads one chunk, validating its CRC per `options.crc_action`.
/// `Ok(None)` means the chunk was discarded per a `*Discard` CRC action and
/// the caller should continue its loop.
fn read_chunk<R: Read>(reader: &mut R, options: &mut ReadOptions<'_>) -> PngResult<Option<(ChunkType, Vec<u8>)>> {
  let mut header = [0u8; 8];
  reader.read_exact(&mut header).map_err(|e| {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
      PngError::UnexpectedEndOfInput
    } else {
      PngError::from(e)
    }
  })?;
  let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
  let chunk_type = ChunkType::new([header[4], header[5], header[6], header[7]]);
  if length > i32::MAX as usize {
    return Err(PngError::ChunkLengthOverflow(chunk_type));
  }

  // Don't trust `length` enough to pre-allocate it outright: a corrupt or
  // adversarial stream can claim a multi-gigabyte chunk backed by only a
  // handful of real bytes. Grow the buffer as bytes actually arrive instead.
  let mut data = Vec::new();
  let read = reader.take(length as u64).read_to_end(&mut data)?;
  if read != length {
    return Err(PngError::ChunkLengthOverflow(chunk_type));
  }
  let mut declared_crc = [0u8; 4];
  reader.read_exact(&mut declared_crc)?;
  let declared_crc = u32::from_be_bytes(declared_crc);

  let mut crc = Crc32::new();
  crc.update(&chunk_type.as_bytes());
  crc.update(&data);
  let computed_crc = crc.finalize();

  if declared_crc == computed_crc {
    return Ok(Some((chunk_type, data)));
  }

  match options.crc_action {
    CrcAction::Error => Err(PngError::CrcMismatch(chunk_type, declared_crc, computed_crc)),
    CrcAction::WarnAndUse => {
      (options.warning_sink)(PngWarning::CrcMismatchTolerated(chunk_type));
      Ok(Some((chunk_type, data)))
    }
    CrcAction::QuietUse => Ok(Some((chunk_type, data))),
    CrcAction::WarnAndDiscard | CrcAction::QuietDiscard if chunk_type.is_critical() => {
      Err(PngError::CrcMismatch(chunk_type, declared_crc, computed_crc))
    }
    CrcAction::WarnAndDiscard => {
      (options.warning_sink)(PngWarning::CrcMismatchTolerated(chunk_type));
      Ok(None)
    }
    CrcAction::QuietDiscard => Ok(None),
  }
}

fn dispatch_ancillary(
  chunk_type: ChunkType,
  data: &[u8],
  hdr: &Ihdr,
  location: ChunkLocation,
  info: &mut PngInfo,
  options: &mut ReadOptions<'_>,
) -> PngResult<()> {
  macro_rules! warn {
    ($w:expr) => {
      (options.warning_sink)($w)
    };
  }

  match chunk_type {
    ChunkType::TRNS => {
      if hdr.color_type.has_alpha() {
        return Err(PngError::TrnsForbidden);
      }
      let trns = Trns::parse(hdr.color_type, data)?;
      if let Some(plte) = &info.plte {
        if let Some(truncated) = trns.validate_against_palette(plte.entries.len(), options.benign_errors)? {
          warn!(PngWarning::TrnsTruncated(data.len(), plte.entries.len()));
          info.trns = Some(truncated);
          return Ok(());
        }
      }
      set_once(&mut info.trns, trns, chunk_type, options)
    }
    ChunkType::GAMA => set_once(&mut info.gama, Gama::parse(data)?, chunk_type, options),
    ChunkType::CHRM => set_once(&mut info.chrm, Chrm::parse(data)?, chunk_type, options),
    ChunkType::SRGB => set_once(&mut info.srgb, Srgb::parse(data)?, chunk_type, options),
    ChunkType::ICCP => set_once(&mut info.iccp, Iccp::parse(data)?, chunk_type, options),
    ChunkType::SBIT => {
      match Sbit::parse(hdr.color_type, hdr.bit_depth, data) {
        Ok(sbit) => set_once(&mut info.sbit, sbit, chunk_type, options),
        Err(e) if options.benign_errors => {
          warn!(PngWarning::BenignOutOfRangeValue(chunk_type, e.to_string()));
          Ok(())
        }
        Err(e) => Err(e),
      }
    }
    ChunkType::BKGD => set_once(&mut info.bkgd, Bkgd::parse(hdr.color_type, data)?, chunk_type, options),
    ChunkType::HIST => {
      let plte_len = info.plte.as_ref().map(|p| p.entries.len()).unwrap_or(0);
      match Hist::parse(plte_len, data) {
        Ok(hist) => set_once(&mut info.hist, hist, chunk_type, options),
        Err(e) if options.benign_errors => {
          warn!(PngWarning::BenignOutOfRangeValue(chunk_type, e.to_string()));
          Ok(())
        }
        Err(e) => Err(e),
      }
    }
    ChunkType::PHYS => set_once(&mut info.phys, Phys::parse(data)?, chunk_type, options),
    ChunkType::TIME => set_once(&mut info.time, Time::parse(data)?, chunk_type, options),
    ChunkType::OFFS => set_once(&mut info.offs, Offs::parse(data)?, chunk_type, options),
    ChunkType::SCAL => set_once(&mut info.scal, Scal::parse(data)?, chunk_type, options),
    ChunkType::PCAL => set_once(&mut info.pcal, Pcal::parse(data)?, chunk_type, options),
    ChunkType::TEXT => {
      info.text.push(TEXt::parse(data)?);
      Ok(())
    }
    ChunkType::ZTXT => {
      info.ztxt.push(ZTXt::parse(data)?);
      Ok(())
    }
    ChunkType::ITXT => {
      info.itxt.push(ITXt::parse(data)?);
      Ok(())
    }
    ChunkType::SPLT => {
      info.splt.push(SuggestedPalette::parse(data)?);
      Ok(())
    }
    other => {
      if other.is_critical() && !options.critical_chunk_whitelist.contains(&other) {
        return Err(PngError::UnknownCriticalChunk(other));
      }
      info.unknown.push(UnknownChunk { chunk_type: other, data: data.to_vec(), location });
      Ok(())
    }
  }
}

fn set_once<T>(slot: &mut Option<T>, value: T, chunk_type: ChunkType, options: &mut ReadOptions<'_>) -> PngResult<()> {
  if slot.is_some() {
    (options.warning_sink)(PngWarning::DuplicateAncillaryDiscarded(chunk_type));
    return Ok(());
  }
  *slot = Some(value);
  Ok(())
}

fn decode_rows(ihdr: &Ihdr, idat_chunks: &[Vec<u8>], adler32_policy: Adler32Policy) -> PngResult<Vec<Vec<u8>>> {
  let mut decompressed = vec![0u8; ihdr.decompressed_size()];
  deflate::decompress_idat(&mut decompressed, idat_chunks.iter().map(|v| v.as_slice()), adler32_policy)?;

  let bpp = ihdr.filter_bpp();
  let mut rows = vec![vec![0u8; ihdr.row_bytes().ok_or(PngError::DimensionsOverflow)?]; ihdr.height as usize];

  if !ihdr.interlaced {
    let mut prev = vec![0u8; ihdr.row_bytes().unwrap()];
    let mut cursor = &decompressed[..];
    for row in rows.iter_mut() {
      let line_len = 1 + row.len();
      let (line, rest) = cursor.split_at(line_len);
      cursor = rest;
      let filter_byte = line[0];
      let mut body = line[1..].to_vec();
      filtering::unfilter_line(filter_byte, bpp, &mut body, &prev)?;
      *row = body.clone();
      prev = body;
    }
  } else {
    let mut cursor = &decompressed[..];
    for pass in adam7::passes(ihdr.width, ihdr.height) {
      if !pass.is_nonempty() {
        continue;
      }
      let pass_row_bytes = ihdr.row_bytes_for_width(pass.width);
      let mut prev = vec![0u8; pass_row_bytes];
      for py in 0..pass.height {
        let line_len = 1 + pass_row_bytes;
        let (line, rest) = cursor.split_at(line_len);
        cursor = rest;
        let filter_byte = line[0];
        let mut body = line[1..].to_vec();
        filtering::unfilter_line(filter_byte, bpp, &mut body, &prev)?;
        scatter_pass_row(ihdr, &pass, py, &body, &mut rows);
        prev = body;
      }
    }
  }
  Ok(rows)
}

/// Scatters one already-unfiltered Adam7 pass scanline's bits into the
/// full-width canonical row buffer, bit-packing-aware.
fn scatter_pass_row(ihdr: &Ihdr, pass: &adam7::Pass, reduced_y: u32, body: &[u8], rows: &mut [Vec<u8>]) {
  let bits_per_pixel = ihdr.bits_per_pixel();
  for reduced_x in 0..pass.width {
    let (full_x, full_y) = pass.to_full_pos(reduced_x, reduced_y);
    let src_bit = reduced_x as usize * bits_per_pixel;
    let dst_bit = full_x as usize * bits_per_pixel;
    copy_bits(body, src_bit, &mut rows[full_y as usize], dst_bit, bits_per_pixel);
  }
}

fn copy_bits(src: &[u8], src_bit: usize, dst: &mut [u8], dst_bit: usize, bits: usize) {
  for i in 0..bits {
    let s_byte = (src_bit + i) / 8;
    let s_shift = 7 - (src_bit + i) % 8;
    let bit = (src[s_byte] >> s_shift) & 1;

    let d_byte = (dst_bit + i) / 8;
    let d_shift = 7 - (dst_bit + i) % 8;
    if bit == 1 {
      dst[d_byte] |= 1 << d_shift;
    } else {
      dst[d_byte] &= !(1 << d_shift);
    }
  }
}

/// A best-effort incremental reader: buffers whatever bytes are pushed and
/// parses once `finish` is called. Spec.md §5's "suspension points" /
/// progressive-read variant is narrowed to this shape — see `SPEC_FULL.md`
/// §C — since arbitrary mid-chunk DEFLATE suspension isn't supported.
#[derive(Default)]
pub struct PushReader {
  buffered: Vec<u8>,
}
impl PushReader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, bytes: &[u8]) {
    self.buffered.extend_from_slice(bytes);
  }

  pub fn finish(self, options: ReadOptions<'_>) -> PngResult<DecodedImage> {
    read_png(self.buffered.as_slice(), options)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::writer::{write_png, EncodedImage, WriteOptions};
  use crate::ihdr::ColorType;

  fn tiny_rgba(width: u32, height: u32) -> (Ihdr, Vec<Vec<u8>>) {
    let ihdr = Ihdr { width, height, bit_depth: 8, color_type: ColorType::Rgba, interlaced: false };
    let rows: Vec<Vec<u8>> =
      (0..height).map(|y| (0..width).flat_map(|x| [(x * 10) as u8, (y * 10) as u8, 5u8, 255u8]).collect()).collect();
    (ihdr, rows)
  }

  #[test]
  fn signature_rejects_non_png() {
    let mut bytes = vec![0u8; 8];
    assert!(matches!(read_signature(&mut bytes.as_slice()), Err(PngError::NoPngSignature)));
  }

  #[test]
  fn round_trips_a_small_rgba_image() {
    let (ihdr, rows) = tiny_rgba(3, 2);
    let encoded = write_png(EncodedImage { ihdr, info: PngInfo::default(), rows: rows.clone() }, WriteOptions::default()).unwrap();
    let decoded = read_png(encoded.as_slice(), ReadOptions::default()).unwrap();
    assert_eq!(decoded.ihdr, ihdr);
    assert_eq!(decoded.rows, rows);
  }

  #[test]
  fn round_trips_interlaced_image() {
    let mut ihdr = Ihdr { width: 5, height: 5, bit_depth: 8, color_type: ColorType::Rgb, interlaced: true };
    let rows: Vec<Vec<u8>> =
      (0..5u32).map(|y| (0..5u32).flat_map(|x| [(x * 20) as u8, (y * 20) as u8, 7u8]).collect()).collect();
    let encoded = write_png(EncodedImage { ihdr, info: PngInfo::default(), rows: rows.clone() }, WriteOptions::default()).unwrap();
    let decoded = read_png(encoded.as_slice(), ReadOptions::default()).unwrap();
    ihdr.interlaced = true;
    assert_eq!(decoded.ihdr, ihdr);
    assert_eq!(decoded.rows, rows);
  }

  #[test]
  fn rejects_idat_before_ihdr() {
    let mut bytes = PNG_SIGNATURE.to_vec();
    let mut crc = Crc32::new();
    crc.update(b"IDAT");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(b"IDAT");
    bytes.extend_from_slice(&crc.finalize().to_be_bytes());
    assert!(matches!(read_png(bytes.as_slice(), ReadOptions::default()), Err(PngError::FirstChunkNotIhdr)));
  }

  #[test]
  fn unknown_critical_chunk_is_fatal_unless_whitelisted() {
    let mut info = PngInfo::default();
    let hdr = Ihdr { width: 1, height: 1, bit_depth: 8, color_type: ColorType::Rgba, interlaced: false };
    let mut options = ReadOptions::default();
    let weird = ChunkType::new(*b"weXt".map(|b| if b == b'w' { b'W' } else { b }));
    assert!(matches!(
      dispatch_ancillary(weird, &[], &hdr, ChunkLocation::BeforeIdat, &mut info, &mut options),
      Err(PngError::UnknownCriticalChunk(_))
    ));

    options.critical_chunk_whitelist.push(weird);
    dispatch_ancillary(weird, &[], &hdr, ChunkLocation::BeforeIdat, &mut info, &mut options).unwrap();
    assert_eq!(info.unknown.len(), 1);
    assert_eq!(info.unknown[0].chunk_type, weird);
  }

  #[test]
  fn unknown_chunk_after_idat_is_tagged_accordingly() {
    let (ihdr, rows) = tiny_rgba(2, 2);
    let mut image =
      write_png(EncodedImage { ihdr, info: PngInfo::default(), rows: rows.clone() }, WriteOptions::default()).unwrap();

    // Splice a harmless private ancillary chunk ("spAx") in right before IEND.
    let iend_pos = image.len() - 12;
    let mut chunk = Vec::new();
    chunk.extend_from_slice(&0u32.to_be_bytes());
    chunk.extend_from_slice(b"spAx");
    chunk.extend_from_slice(&crate::crc::crc32_of_chunk(*b"spAx", &[]).to_be_bytes());
    image.splice(iend_pos..iend_pos, chunk);

    let decoded = read_png(image.as_slice(), ReadOptions::default()).unwrap();
    assert_eq!(decoded.info.unknown.len(), 1);
    assert_eq!(decoded.info.unknown[0].location, ChunkLocation::AfterIdat);
  }
}
