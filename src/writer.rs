//! The write-side chunk emitter: assembles an [`Ihdr`] + [`PngInfo`] +
//! scanlines into a conforming byte stream, filtering, interlacing, and
//! DEFLATE-compressing as configured.
//!
//! Spec: §4.2 "the dispatcher-defined order" (write direction), §4.4
//! (interlacing), §4.5 (filter selection).

use std::io::Write;

use crate::adam7;
use crate::chunk::ChunkType;
use crate::crc::crc32_of_chunk;
use crate::deflate::{self, DeflateParams};
use crate::error::{PngError, PngResult};
use crate::filtering::{self, FilterMask};
use crate::ihdr::Ihdr;
use crate::metadata::PngInfo;

/// Tunables for a write stream. Spec: §6 "Configuration"; SPEC_FULL §A.3.
#[derive(Debug, Clone)]
pub struct WriteOptions {
  pub deflate: DeflateParams,
  /// Largest an emitted `IDAT` chunk's data may be, before it's split into
  /// a following `IDAT`. Spec: §6 "max IDAT = 8192".
  pub max_idat_len: usize,
  pub filter_mask: FilterMask,
  /// Forces `FilterType::None` for every row, trading ratio for speed.
  pub fast_mode: bool,
}
impl Default for WriteOptions {
  fn default() -> Self {
    Self { deflate: DeflateParams::default(), max_idat_len: 8192, filter_mask: FilterMask::default(), fast_mode: false }
  }
}

/// Everything needed to emit one PNG stream.
pub struct EncodedImage {
  pub ihdr: Ihdr,
  pub info: PngInfo,
  /// Exactly `ihdr.height` rows, each `ihdr.row_bytes()` bytes, at the wire
  /// bit depth/color type, top-to-bottom canonical order (the writer
  /// re-interlaces internally when `ihdr.interlaced`).
  pub rows: Vec<Vec<u8>>,
}

/// Serializes `image` into a complete PNG byte stream.
pub fn write_png(image: EncodedImage, options: WriteOptions) -> PngResult<Vec<u8>> {
  let EncodedImage { ihdr, info, rows } = image;
  validate_rows(&ihdr, &rows)?;

  let mut out = Vec::new();
  out.extend_from_slice(&crate::chunk::PNG_SIGNATURE);

  write_chunk(&mut out, ChunkType::IHDR, &ihdr.to_bytes());

  if let Some(srgb) = &info.srgb {
    write_chunk(&mut out, ChunkType::SRGB, &srgb.to_bytes());
  } else if let Some(iccp) = &info.iccp {
    write_chunk(&mut out, ChunkType::ICCP, &iccp.to_bytes(options.deflate));
  }
  if let Some(gama) = &info.gama {
    write_chunk(&mut out, ChunkType::GAMA, &gama.to_bytes());
  }
  if let Some(chrm) = &info.chrm {
    write_chunk(&mut out, ChunkType::CHRM, &chrm.to_bytes());
  }
  if let Some(sbit) = &info.sbit {
    write_chunk(&mut out, ChunkType::SBIT, &sbit.to_bytes());
  }
  for unknown in info.unknown.iter().filter(|u| u.location == crate::chunk::ChunkLocation::BeforePlte) {
    write_chunk(&mut out, unknown.chunk_type, &unknown.data);
  }

  if let Some(plte) = &info.plte {
    write_chunk(&mut out, ChunkType::PLTE, &plte.to_bytes());
  } else if ihdr.color_type == crate::ihdr::ColorType::Palette {
    return Err(PngError::PlteRequiredButMissing);
  }
  if let Some(hist) = &info.hist {
    write_chunk(&mut out, ChunkType::HIST, &hist.to_bytes());
  }
  if let Some(trns) = &info.trns {
    write_chunk(&mut out, ChunkType::TRNS, &trns.to_bytes());
  }
  if let Some(bkgd) = &info.bkgd {
    write_chunk(&mut out, ChunkType::BKGD, &bkgd.to_bytes());
  }
  if let Some(phys) = &info.phys {
    write_chunk(&mut out, ChunkType::PHYS, &phys.to_bytes());
  }
  if let Some(offs) = &info.offs {
    write_chunk(&mut out, ChunkType::OFFS, &offs.to_bytes());
  }
  if let Some(scal) = &info.scal {
    write_chunk(&mut out, ChunkType::SCAL, &scal.to_bytes());
  }
  if let Some(pcal) = &info.pcal {
    write_chunk(&mut out, ChunkType::PCAL, &pcal.to_bytes());
  }
  for splt in &info.splt {
    write_chunk(&mut out, ChunkType::SPLT, &splt.to_bytes());
  }
  for unknown in info.unknown.iter().filter(|u| u.location == crate::chunk::ChunkLocation::BeforeIdat) {
    write_chunk(&mut out, unknown.chunk_type, &unknown.data);
  }

  let idat_payload = compress_rows(&ihdr, &rows, &options)?;
  for chunk_data in idat_payload.chunks(options.max_idat_len.max(1)) {
    write_chunk(&mut out, ChunkType::IDAT, chunk_data);
  }

  if let Some(time) = &info.time {
    write_chunk(&mut out, ChunkType::TIME, &time.to_bytes());
  }
  for text in &info.text {
    write_chunk(&mut out, ChunkType::TEXT, &text.to_bytes());
  }
  for ztxt in &info.ztxt {
    write_chunk(&mut out, ChunkType::ZTXT, &ztxt.to_bytes(options.deflate));
  }
  for itxt in &info.itxt {
    write_chunk(&mut out, ChunkType::ITXT, &itxt.to_bytes(options.deflate));
  }
  for unknown in info.unknown.iter().filter(|u| u.location == crate::chunk::ChunkLocation::AfterIdat) {
    write_chunk(&mut out, unknown.chunk_type, &unknown.data);
  }

  write_chunk(&mut out, ChunkType::IEND, &[]);
  Ok(out)
}

/// Writes `image` directly to `writer`, avoiding a second full-stream copy
/// for callers who already have the whole byte buffer built elsewhere.
pub fn write_png_to<W: Write>(mut writer: W, image: EncodedImage, options: WriteOptions) -> PngResult<()> {
  let bytes = write_png(image, options)?;
  writer.write_all(&bytes)?;
  Ok(())
}

fn validate_rows(ihdr: &Ihdr, rows: &[Vec<u8>]) -> PngResult<()> {
  if rows.len() != ihdr.height as usize {
    return Err(PngError::RowCountMismatch(rows.len(), ihdr.height as usize));
  }
  let expected = ihdr.row_bytes().ok_or(PngError::DimensionsOverflow)?;
  for row in rows {
    if row.len() != expected {
      return Err(PngError::RowLengthMismatch(row.len(), expected));
    }
  }
  Ok(())
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&chunk_type.as_bytes());
  out.extend_from_slice(data);
  out.extend_from_slice(&crc32_of_chunk(chunk_type.as_bytes(), data).to_be_bytes());
}

fn compress_rows(ihdr: &Ihdr, rows: &[Vec<u8>], options: &WriteOptions) -> PngResult<Vec<u8>> {
  let bpp = ihdr.filter_bpp();
  let mut raw = Vec::with_capacity(ihdr.decompressed_size());

  if !ihdr.interlaced {
    let mut prev = vec![0u8; ihdr.row_bytes().ok_or(PngError::DimensionsOverflow)?];
    for row in rows {
      filter_and_append(row, &prev, bpp, options, &mut raw);
      prev = row.clone();
    }
  } else {
    for pass in adam7::passes(ihdr.width, ihdr.height) {
      if !pass.is_nonempty() {
        continue;
      }
      let pass_row_bytes = ihdr.row_bytes_for_width(pass.width);
      let mut prev = vec![0u8; pass_row_bytes];
      for reduced_y in 0..pass.height {
        let mut body = vec![0u8; pass_row_bytes];
        gather_pass_row(ihdr, &pass, reduced_y, rows, &mut body);
        filter_and_append(&body, &prev, bpp, options, &mut raw);
        prev = body;
      }
    }
  }

  Ok(deflate::compress_zlib(&raw, options.deflate))
}

fn filter_and_append(row: &[u8], prev: &[u8], bpp: usize, options: &WriteOptions, out: &mut Vec<u8>) {
  let (filter, filtered) = if options.fast_mode {
    let filter = filtering::select_filter_fast();
    let mut buf = vec![0u8; row.len()];
    filtering::apply_filter(filter, bpp, row, prev, &mut buf);
    (filter, buf)
  } else {
    filtering::select_filter_minsad(bpp, row, prev, options.filter_mask)
  };
  out.push(filter as u8);
  out.extend_from_slice(&filtered);
}

fn gather_pass_row(ihdr: &Ihdr, pass: &adam7::Pass, reduced_y: u32, rows: &[Vec<u8>], body: &mut [u8]) {
  let bits_per_pixel = ihdr.bits_per_pixel();
  for reduced_x in 0..pass.width {
    let (full_x, full_y) = pass.to_full_pos(reduced_x, reduced_y);
    let src_bit = full_x as usize * bits_per_pixel;
    let dst_bit = reduced_x as usize * bits_per_pixel;
    copy_bits(&rows[full_y as usize], src_bit, body, dst_bit, bits_per_pixel);
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

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ihdr::ColorType;

  #[test]
  fn rejects_row_count_mismatch() {
    let ihdr = Ihdr { width: 2, height: 2, bit_depth: 8, color_type: ColorType::Grayscale, interlaced: false };
    let image = EncodedImage { ihdr, info: PngInfo::default(), rows: vec![vec![0, 0]] };
    assert!(matches!(write_png(image, WriteOptions::default()), Err(PngError::RowCountMismatch(1, 2))));
  }

  #[test]
  fn emits_signature_and_iend() {
    let ihdr = Ihdr { width: 1, height: 1, bit_depth: 8, color_type: ColorType::Grayscale, interlaced: false };
    let image = EncodedImage { ihdr, info: PngInfo::default(), rows: vec![vec![128]] };
    let bytes = write_png(image, WriteOptions::default()).unwrap();
    assert_eq!(&bytes[..8], &crate::chunk::PNG_SIGNATURE);
    assert_eq!(&bytes[bytes.len() - 12..bytes.len() - 8], b"IEND");
  }

  #[test]
  fn max_idat_len_splits_payload() {
    let ihdr = Ihdr { width: 64, height: 64, bit_depth: 8, color_type: ColorType::Rgba, interlaced: false };
    let rows: Vec<Vec<u8>> = (0..64).map(|y| (0..64).flat_map(|x| [(x + y) as u8; 4]).collect()).collect();
    let mut options = WriteOptions::default();
    options.max_idat_len = 16;
    let image = EncodedImage { ihdr, info: PngInfo::default(), rows };
    let bytes = write_png(image, options).unwrap();
    let idat_count = bytes.windows(4).filter(|w| *w == b"IDAT").count();
    assert!(idat_count > 1);
  }
}
