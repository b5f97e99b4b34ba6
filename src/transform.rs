//! The pixel-format transform pipeline.
//!
//! Spec: §4.6 "Transform pipeline: an ordered sequence of independent,
//! composable stages applied to each decoded scanline". Transforms never
//! touch the wire framing (CRC, chunk structure) or the DEFLATE layer; they
//! operate entirely on already-unfiltered, already-deinterlaced sample rows.
//!
//! A row is represented at working precision as [`PixelRow`]: one `u16` per
//! channel per pixel, regardless of the on-wire bit depth, so every stage
//! downstream of unpacking is bit-depth-agnostic. [`PixelRow::pack`] is the
//! only place that re-quantizes back down to a wire bit depth.

use crate::bit_depth_changes::int_make_depth_8;
use crate::error::{PngError, PngResult};
use crate::ihdr::{ColorType, Ihdr};
use crate::metadata::{Bkgd, Plte, Trns};

/// One decoded scanline at working precision: `width * channels` samples,
/// row-major, channel-interleaved (matching the wire's interleaving).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRow {
  pub width: u32,
  pub channels: u8,
  /// The bit depth each sample is meaningful to — values never exceed
  /// `(1 << bit_depth) - 1`, even though the backing type is always `u16`.
  pub bit_depth: u8,
  pub samples: Vec<u16>,
}
impl PixelRow {
  fn max_value(bit_depth: u8) -> u32 {
    (1u32 << bit_depth) - 1
  }

  fn pixel(&self, x: u32) -> &[u16] {
    let start = x as usize * self.channels as usize;
    &self.samples[start..start + self.channels as usize]
  }

  fn pixel_mut(&mut self, x: u32) -> &mut [u16] {
    let start = x as usize * self.channels as usize;
    &mut self.samples[start..start + self.channels as usize]
  }

  /// Unpacks a filtered-and-reconstructed scanline's raw bytes (without the
  /// leading filter-type byte) into working precision, per `ihdr`.
  ///
  /// Palette color types are unpacked to their raw index values, not
  /// expanded to RGB; call [`expand_palette`] for that.
  pub fn unpack(ihdr: &Ihdr, row_bytes: &[u8]) -> Self {
    let channels = ihdr.color_type.channel_count();
    let mut samples = Vec::with_capacity(ihdr.width as usize * channels as usize);
    match ihdr.bit_depth {
      16 => {
        for chunk in row_bytes.chunks_exact(2) {
          samples.push(u16::from_be_bytes([chunk[0], chunk[1]]));
        }
      }
      8 => {
        samples.extend(row_bytes.iter().map(|&b| b as u16));
      }
      sub @ (1 | 2 | 4) => {
        let per_byte = 8 / sub;
        let total = ihdr.width as usize * channels as usize;
        'outer: for &byte in row_bytes {
          for i in 0..per_byte {
            if samples.len() as usize >= total {
              break 'outer;
            }
            let shift = 8 - sub * (i + 1);
            let mask = (1u16 << sub) - 1;
            samples.push((byte as u16 >> shift) & mask);
          }
        }
      }
      other => unreachable!("illegal bit depth {other} should have been rejected by Ihdr::parse"),
    }
    Self { width: ihdr.width, channels, bit_depth: ihdr.bit_depth, samples }
  }

  /// Packs working-precision samples back down into wire bytes at
  /// `self.bit_depth`. The caller is responsible for having already brought
  /// `self.bit_depth` to a depth legal for the target color type (see
  /// [`scale_bit_depth`]).
  pub fn pack(&self) -> Vec<u8> {
    match self.bit_depth {
      16 => self.samples.iter().flat_map(|s| s.to_be_bytes()).collect(),
      8 => self.samples.iter().map(|&s| s as u8).collect(),
      sub @ (1 | 2 | 4) => {
        let per_byte = 8 / sub;
        let mut out = Vec::with_capacity((self.samples.len() + per_byte as usize - 1) / per_byte as usize);
        for chunk in self.samples.chunks(per_byte as usize) {
          let mut byte = 0u8;
          for (i, &sample) in chunk.iter().enumerate() {
            let shift = 8 - sub * (i as u8 + 1);
            byte |= (sample as u8) << shift;
          }
          out.push(byte);
        }
        out
      }
      other => unreachable!("illegal bit depth {other}"),
    }
  }
}

/// Expands palette indices to RGB samples using `plte`. Spec: §4.6 "Palette
/// expand: indices -> RGB(A) via PLTE/tRNS".
pub fn expand_palette(row: &PixelRow, plte: &Plte) -> PngResult<PixelRow> {
  debug_assert_eq!(row.channels, 1);
  let mut samples = Vec::with_capacity(row.width as usize * 3);
  for x in 0..row.width {
    let index = row.pixel(x)[0] as usize;
    let entry = plte.entries.get(index).ok_or(PngError::PaletteIndexOutOfRange(index as u8, plte.entries.len()))?;
    samples.extend([entry[0] as u16, entry[1] as u16, entry[2] as u16]);
  }
  Ok(PixelRow { width: row.width, channels: 3, bit_depth: 8, samples })
}

/// Appends an alpha channel derived from `tRNS`. Spec: §4.6 "tRNS-to-alpha:
/// key-color or per-index transparency to an explicit alpha channel".
///
/// `row` must already be expanded to RGB (for `Trns::Palette`, pass the
/// *index* row, before [`expand_palette`], so per-index alphas can be
/// looked up) or be a 1- or 3-channel color row (for key-color matching).
pub fn apply_trns(row: &PixelRow, trns: &Trns, color_type: ColorType) -> PixelRow {
  let max = PixelRow::max_value(row.bit_depth) as u16;
  let mut samples = Vec::with_capacity(row.width as usize * (row.channels as usize + 1));
  for x in 0..row.width {
    let pixel = row.pixel(x);
    samples.extend_from_slice(pixel);
    let alpha = match (trns, color_type) {
      (Trns::Palette(alphas), ColorType::Palette) => {
        let index = pixel[0] as usize;
        alphas.get(index).map(|&a| a as u16).unwrap_or(0xff)
      }
      (Trns::Grayscale(key), ColorType::Grayscale) => {
        if pixel[0] == *key {
          0
        } else {
          max
        }
      }
      (Trns::Rgb { r, g, b }, ColorType::Rgb) => {
        if pixel[0] == *r && pixel[1] == *g && pixel[2] == *b {
          0
        } else {
          max
        }
      }
      _ => max,
    };
    samples.push(alpha);
  }
  PixelRow { width: row.width, channels: row.channels + 1, bit_depth: row.bit_depth, samples }
}

/// Rescales every sample from `row.bit_depth` to `target_depth`. Handles
/// both 8<->16 widening/narrowing and the sub-byte expand-to-8 case (used
/// ahead of RGB conversion, filler add, etc., since those stages assume
/// byte-aligned samples).
///
/// Narrowing 16->8 truncates to the high byte (spec.md §4.6 "strip"); the
/// "scale" variant that proportionally rescales instead is
/// [`scale_bit_depth_proportional`], used when dithering down for display
/// rather than losing the low byte outright.
pub fn scale_bit_depth(row: &PixelRow, target_depth: u8) -> PixelRow {
  if row.bit_depth == target_depth {
    return row.clone();
  }
  let samples = match (row.bit_depth, target_depth) {
    (16, 8) => row.samples.iter().map(|&s| (s >> 8)).collect(),
    (8, 16) => row.samples.iter().map(|&s| (s << 8) | s).collect(),
    (1, 8) => row.samples.iter().map(|&s| int_make_depth_8::<1>(s as u32) as u16).collect(),
    (2, 8) => row.samples.iter().map(|&s| int_make_depth_8::<2>(s as u32) as u16).collect(),
    (4, 8) => row.samples.iter().map(|&s| int_make_depth_8::<4>(s as u32) as u16).collect(),
    (from, to) => {
      let from_max = PixelRow::max_value(from) as f64;
      let to_max = PixelRow::max_value(to) as f64;
      row.samples.iter().map(|&s| ((s as f64 / from_max) * to_max).round() as u16).collect()
    }
  };
  PixelRow { width: row.width, channels: row.channels, bit_depth: target_depth, samples }
}

/// Proportional 16->8 scale, `(x*255 + 32895) >> 16`, as opposed to
/// [`scale_bit_depth`]'s high-byte strip. Spec: §4.6 "16->8 scale: Rescale
/// 16-bit -> 8-bit with rounding (x*255 + 32895) >> 16".
pub fn scale_bit_depth_proportional_16_to_8(row: &PixelRow) -> PixelRow {
  debug_assert_eq!(row.bit_depth, 16);
  let samples = row.samples.iter().map(|&s| (((s as u32) * 255 + 32895) >> 16) as u16).collect();
  PixelRow { width: row.width, channels: row.channels, bit_depth: 8, samples }
}

/// Converts grayscale (1 or 2 channel) samples to RGB(A) by replicating the
/// gray sample into R, G, and B.
pub fn gray_to_rgb(row: &PixelRow) -> PixelRow {
  let has_alpha = row.channels == 2;
  let out_channels = if has_alpha { 4 } else { 3 };
  let mut samples = Vec::with_capacity(row.width as usize * out_channels as usize);
  for x in 0..row.width {
    let pixel = row.pixel(x);
    let gray = pixel[0];
    samples.extend([gray, gray, gray]);
    if has_alpha {
      samples.push(pixel[1]);
    }
  }
  PixelRow { width: row.width, channels: out_channels, bit_depth: row.bit_depth, samples }
}

/// Converts RGB(A) samples to grayscale. Spec: §4.6 "RGB->Gray: Y =
/// round(0.21268*R + 0.71514*G + 0.07218*B) with configurable error action".
pub fn rgb_to_gray(row: &PixelRow) -> PixelRow {
  let has_alpha = row.channels == 4;
  let out_channels = if has_alpha { 2 } else { 1 };
  let mut samples = Vec::with_capacity(row.width as usize * out_channels as usize);
  for x in 0..row.width {
    let pixel = row.pixel(x);
    let (r, g, b) = (pixel[0] as f64, pixel[1] as f64, pixel[2] as f64);
    let gray = (0.21268 * r + 0.71514 * g + 0.07218 * b).round() as u16;
    samples.push(gray);
    if has_alpha {
      samples.push(pixel[3]);
    }
  }
  PixelRow { width: row.width, channels: out_channels, bit_depth: row.bit_depth, samples }
}

/// Rescales each channel's significant bits (per `sBIT`) up to the full
/// range of `row.bit_depth`. Spec: §4.6 "sBIT shift: rescale
/// significant-bits range to full range".
pub fn sbit_shift(row: &PixelRow, significant_bits: &[u8]) -> PixelRow {
  let full_max = PixelRow::max_value(row.bit_depth) as f64;
  let mut samples = row.samples.clone();
  for (i, sample) in samples.iter_mut().enumerate() {
    let channel = i % row.channels as usize;
    let Some(&sig) = significant_bits.get(channel) else { continue };
    if sig == 0 || sig as u32 >= row.bit_depth as u32 {
      continue;
    }
    let sig_max = ((1u32 << sig) - 1) as f64;
    let truncated = (*sample as u32 >> (row.bit_depth - sig)) as f64;
    *sample = (truncated / sig_max * full_max).round() as u16;
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

/// Applies a gamma LUT to the color channels of a row (alpha, if present,
/// passes through unchanged). Spec: §4.6 "Gamma" stage.
pub fn apply_gamma_8(row: &PixelRow, lut: &[u8; 256], has_alpha: bool) -> PixelRow {
  debug_assert_eq!(row.bit_depth, 8);
  let color_channels = if has_alpha { row.channels - 1 } else { row.channels };
  let mut samples = row.samples.clone();
  for (i, sample) in samples.iter_mut().enumerate() {
    if (i % row.channels as usize) < color_channels as usize {
      *sample = lut[*sample as usize] as u16;
    }
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

/// Applies a 16-bit gamma LUT ([`crate::gamma::Lut16`]) to the color
/// channels of a row (alpha, if present, passes through unchanged).
/// Spec: §4.6 "Gamma" stage; the 16-bit counterpart of [`apply_gamma_8`].
pub fn apply_gamma_16(row: &PixelRow, lut: &crate::gamma::Lut16, has_alpha: bool) -> PixelRow {
  debug_assert_eq!(row.bit_depth, 16);
  let color_channels = if has_alpha { row.channels - 1 } else { row.channels };
  let mut samples = row.samples.clone();
  for (i, sample) in samples.iter_mut().enumerate() {
    if (i % row.channels as usize) < color_channels as usize {
      *sample = lut.apply(*sample);
    }
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

/// Composites an alpha-carrying row over an opaque `background`, dropping
/// the alpha channel. Spec: §4.6 "background compose: alpha-composite over
/// a caller/bKGD-supplied color, dropping alpha".
pub fn compose_over_background(row: &PixelRow, background: &[u16]) -> PixelRow {
  let color_channels = row.channels - 1;
  debug_assert_eq!(background.len(), color_channels as usize);
  let max = PixelRow::max_value(row.bit_depth) as u32;
  let mut samples = Vec::with_capacity(row.width as usize * color_channels as usize);
  for x in 0..row.width {
    let pixel = row.pixel(x);
    let alpha = pixel[color_channels as usize] as u32;
    for c in 0..color_channels as usize {
      let fg = pixel[c] as u32;
      let bg = background[c] as u32;
      let composited = (fg * alpha + bg * (max - alpha) + max / 2) / max;
      samples.push(composited as u16);
    }
  }
  PixelRow { width: row.width, channels: color_channels, bit_depth: row.bit_depth, samples }
}

/// Resolves a composite-over background from `bKGD`, converting palette or
/// grayscale shapes to the row's current (already-expanded) channel
/// arrangement.
pub fn background_to_samples(bkgd: &Bkgd, plte: Option<&Plte>, want_channels: u8) -> PngResult<Vec<u16>> {
  let (r, g, b) = match bkgd {
    Bkgd::Rgb { r, g, b } => (*r, *g, *b),
    Bkgd::Grayscale(v) => (*v, *v, *v),
    Bkgd::Palette(index) => {
      let plte = plte.ok_or(PngError::PlteRequiredButMissing)?;
      let entry = plte.entries.get(*index as usize).ok_or(PngError::PaletteIndexOutOfRange(*index, plte.entries.len()))?;
      (entry[0] as u16, entry[1] as u16, entry[2] as u16)
    }
  };
  Ok(match want_channels {
    1 => vec![r],
    3 => vec![r, g, b],
    _ => return Err(PngError::UnsupportedTransform),
  })
}

/// A simple ordered (Bayer 4x4) dither down to a reduced bit depth, used
/// ahead of 8-bit palette quantization. Spec: §4.6 "dither/quantize: reduce
/// to a palette or a lower bit depth with an ordered-dither option".
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

pub fn ordered_dither_to_depth(row: &PixelRow, target_depth: u8, y: u32) -> PixelRow {
  debug_assert_eq!(row.bit_depth, 8);
  let levels = (1u32 << target_depth) - 1;
  let step = 256 / (levels + 1);
  let mut samples = Vec::with_capacity(row.samples.len());
  for x in 0..row.width {
    let pixel = row.pixel(x);
    for (c, &sample) in pixel.iter().enumerate() {
      let threshold = BAYER_4X4[(y as usize) % 4][(x as usize + c) % 4] as u32;
      let dithered = (sample as u32 + threshold * step / 16).min(255);
      let quantized = (dithered * levels + 127) / 255;
      samples.push(quantized as u16);
    }
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: target_depth, samples }
}

/// Nearest-color palette quantization (no dithering). Spec: §4.6
/// "dither/quantize ... or exact/nearest palette match".
pub fn quantize_to_palette(row: &PixelRow, plte: &Plte) -> PixelRow {
  debug_assert_eq!(row.bit_depth, 8);
  debug_assert!(row.channels == 3 || row.channels == 4);
  let mut samples = Vec::with_capacity(row.width as usize);
  for x in 0..row.width {
    let pixel = row.pixel(x);
    let (r, g, b) = (pixel[0] as i32, pixel[1] as i32, pixel[2] as i32);
    let mut best_index = 0usize;
    let mut best_dist = i32::MAX;
    for (i, entry) in plte.entries.iter().enumerate() {
      let dr = r - entry[0] as i32;
      let dg = g - entry[1] as i32;
      let db = b - entry[2] as i32;
      let dist = dr * dr + dg * dg + db * db;
      if dist < best_dist {
        best_dist = dist;
        best_index = i;
      }
    }
    samples.push(best_index as u16);
  }
  PixelRow { width: row.width, channels: 1, bit_depth: 8, samples }
}

/// Channel reorderings that don't change channel count: BGR/BGRA (swap red
/// and blue), ARGB/AGRA (move alpha first), and the legacy 16-bit
/// byte-order swap (handled separately via [`PixelRow::pack`] callers, since
/// it's a byte-level not sample-level operation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSwap {
  Bgr,
  AlphaFirst,
}

pub fn apply_channel_swap(row: &PixelRow, swap: ChannelSwap) -> PixelRow {
  let mut samples = row.samples.clone();
  let channels = row.channels as usize;
  for pixel in samples.chunks_mut(channels) {
    match swap {
      ChannelSwap::Bgr => {
        if channels >= 3 {
          pixel.swap(0, 2);
        }
      }
      ChannelSwap::AlphaFirst => {
        if channels == 4 {
          pixel.rotate_right(1);
        } else if channels == 2 {
          pixel.rotate_right(1);
        }
      }
    }
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

/// Adds (or strips) a constant filler channel. Spec: §4.6 "filler: add or
/// strip a constant-value channel (commonly used to pad RGB to RGBX)".
pub fn add_filler(row: &PixelRow, filler_value: u16, before: bool) -> PixelRow {
  let channels = row.channels as usize;
  let mut samples = Vec::with_capacity(row.samples.len() + row.width as usize);
  for pixel in row.samples.chunks(channels) {
    if before {
      samples.push(filler_value);
      samples.extend_from_slice(pixel);
    } else {
      samples.extend_from_slice(pixel);
      samples.push(filler_value);
    }
  }
  PixelRow { width: row.width, channels: row.channels + 1, bit_depth: row.bit_depth, samples }
}

pub fn strip_filler(row: &PixelRow, before: bool) -> PixelRow {
  let channels = row.channels as usize;
  let mut samples = Vec::with_capacity(row.samples.len() - row.width as usize);
  for pixel in row.samples.chunks(channels) {
    if before {
      samples.extend_from_slice(&pixel[1..]);
    } else {
      samples.extend_from_slice(&pixel[..channels - 1]);
    }
  }
  PixelRow { width: row.width, channels: row.channels - 1, bit_depth: row.bit_depth, samples }
}

/// Inverts the alpha channel in place (`alpha' = max - alpha`), used by
/// consumers that treat 0 as opaque. Spec: §4.6 "invert alpha".
pub fn invert_alpha(row: &PixelRow) -> PixelRow {
  let max = PixelRow::max_value(row.bit_depth) as u16;
  let channels = row.channels as usize;
  let mut samples = row.samples.clone();
  for pixel in samples.chunks_mut(channels) {
    if let Some(alpha) = pixel.last_mut() {
      *alpha = max - *alpha;
    }
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

/// Inverts grayscale (monochrome) samples in place, excluding alpha.
/// Spec: §4.6 "invert mono".
pub fn invert_mono(row: &PixelRow) -> PixelRow {
  let max = PixelRow::max_value(row.bit_depth) as u16;
  let has_alpha = row.channels == 2;
  let channels = row.channels as usize;
  let mut samples = row.samples.clone();
  for pixel in samples.chunks_mut(channels) {
    pixel[0] = max - pixel[0];
    let _ = has_alpha;
  }
  PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ihdr(color_type: ColorType, bit_depth: u8, width: u32) -> Ihdr {
    Ihdr { width, height: 1, bit_depth, color_type, interlaced: false }
  }

  #[test]
  fn unpack_pack_round_trips_sub_byte_depth() {
    let h = ihdr(ColorType::Grayscale, 2, 5);
    let raw = vec![0b00_01_10_11, 0b10_00_00_00];
    let row = PixelRow::unpack(&h, &raw);
    assert_eq!(row.samples, vec![0, 1, 2, 3, 2]);
    let packed = row.pack();
    assert_eq!(packed, raw);
  }

  #[test]
  fn unpack_pack_round_trips_16_bit() {
    let h = ihdr(ColorType::Grayscale, 16, 2);
    let raw = vec![0x01, 0x02, 0xff, 0xee];
    let row = PixelRow::unpack(&h, &raw);
    assert_eq!(row.samples, vec![0x0102, 0xffee]);
    assert_eq!(row.pack(), raw);
  }

  #[test]
  fn expand_palette_maps_indices() {
    let plte = Plte { entries: vec![[10, 20, 30], [40, 50, 60]] };
    let row = PixelRow { width: 2, channels: 1, bit_depth: 8, samples: vec![1, 0] };
    let expanded = expand_palette(&row, &plte).unwrap();
    assert_eq!(expanded.samples, vec![40, 50, 60, 10, 20, 30]);
  }

  #[test]
  fn expand_palette_rejects_out_of_range_index() {
    let plte = Plte { entries: vec![[10, 20, 30]] };
    let row = PixelRow { width: 1, channels: 1, bit_depth: 8, samples: vec![5] };
    assert!(expand_palette(&row, &plte).is_err());
  }

  #[test]
  fn scale_16_to_8_strips_high_byte() {
    let row = PixelRow { width: 1, channels: 1, bit_depth: 16, samples: vec![0xab_cd] };
    let scaled = scale_bit_depth(&row, 8);
    assert_eq!(scaled.samples, vec![0xab]);
  }

  #[test]
  fn gray_to_rgb_replicates_channel() {
    let row = PixelRow { width: 1, channels: 1, bit_depth: 8, samples: vec![42] };
    let rgb = gray_to_rgb(&row);
    assert_eq!(rgb.samples, vec![42, 42, 42]);
  }

  #[test]
  fn compose_over_background_is_identity_for_opaque_pixel() {
    let row = PixelRow { width: 1, channels: 4, bit_depth: 8, samples: vec![10, 20, 30, 255] };
    let composited = compose_over_background(&row, &[0, 0, 0]);
    assert_eq!(composited.samples, vec![10, 20, 30]);
  }

  #[test]
  fn compose_over_background_is_background_for_transparent_pixel() {
    let row = PixelRow { width: 1, channels: 4, bit_depth: 8, samples: vec![10, 20, 30, 0] };
    let composited = compose_over_background(&row, &[99, 98, 97]);
    assert_eq!(composited.samples, vec![99, 98, 97]);
  }

  #[test]
  fn filler_add_then_strip_round_trips() {
    let row = PixelRow { width: 2, channels: 3, bit_depth: 8, samples: vec![1, 2, 3, 4, 5, 6] };
    let filled = add_filler(&row, 0xff, false);
    assert_eq!(filled.samples, vec![1, 2, 3, 0xff, 4, 5, 6, 0xff]);
    let stripped = strip_filler(&filled, false);
    assert_eq!(stripped, row);
  }

  #[test]
  fn invert_alpha_flips_full_range() {
    let row = PixelRow { width: 1, channels: 2, bit_depth: 8, samples: vec![50, 255] };
    let inverted = invert_alpha(&row);
    assert_eq!(inverted.samples, vec![50, 0]);
  }

  #[test]
  fn apply_gamma_16_leaves_alpha_unchanged() {
    let lut = crate::gamma::Lut16::new(1.0 / 2.2, 1.0);
    let row = PixelRow { width: 1, channels: 2, bit_depth: 16, samples: vec![40000, 12345] };
    let out = apply_gamma_16(&row, &lut, true);
    assert_eq!(out.samples[1], 12345, "alpha channel must not be gamma-corrected");
    assert_ne!(out.samples[0], 40000);
  }

  #[test]
  fn bgr_swap_is_its_own_inverse() {
    let row = PixelRow { width: 1, channels: 3, bit_depth: 8, samples: vec![1, 2, 3] };
    let swapped = apply_channel_swap(&row, ChannelSwap::Bgr);
    assert_eq!(swapped.samples, vec![3, 2, 1]);
    let back = apply_channel_swap(&swapped, ChannelSwap::Bgr);
    assert_eq!(back, row);
  }
}
