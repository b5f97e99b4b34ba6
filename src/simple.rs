//! The simplified, one-call facade over the full read/write pipeline.
//!
//! Spec: §4.6 "Simplified API: a one-call facade exposes a closed set of
//! pixel layouts {Gray, GrayA, AGray, RGB, BGR, RGBA, ARGB, BGRA, ABGR} x
//! {8-bit, 16-bit linear} x {direct, colormap}; it composes the [pipeline]
//! above to deliver the requested layout from any PNG input, or to write
//! any PNG format from the supplied layout." §6 "Simplified API ... a
//! one-call facade suitable for callers who want a pixel buffer in a
//! standard layout."
//!
//! This module only implements the *direct* layouts (§4.6's "direct"
//! half of the `{direct, colormap}` axis): every decode path here returns
//! already-expanded samples. The "colormap" half — requesting an indexed
//! buffer plus a caller-visible palette rather than direct samples — is
//! left to [`crate::transform::quantize_to_palette`] directly, since a
//! caller asking for a colormap output also needs to supply or inspect a
//! `PLTE`, which doesn't fit a single closed return type; this narrowing
//! is recorded in `DESIGN.md`.

use std::io::{Read, Write};

use crate::error::{PngError, PngResult};
use crate::gamma::{self, Lut16};
use crate::ihdr::{ColorType, Ihdr};
use crate::metadata::{Gama, PngInfo, Trns};
use crate::reader::{read_png, ReadOptions};
use crate::transform::{
  add_filler, apply_channel_swap, apply_gamma_16, apply_gamma_8, apply_trns, background_to_samples,
  compose_over_background, expand_palette, gray_to_rgb, rgb_to_gray, scale_bit_depth,
  scale_bit_depth_proportional_16_to_8, sbit_shift, strip_filler, ChannelSwap, PixelRow,
};
use crate::writer::{write_png_to, EncodedImage, WriteOptions};

/// The channel arrangement half of a simplified-API layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
  Gray,
  GrayAlpha,
  AlphaGray,
  Rgb,
  Bgr,
  Rgba,
  Argb,
  Bgra,
  Abgr,
}
impl Channels {
  /// True if this layout carries an alpha channel.
  const fn has_alpha(self) -> bool {
    matches!(self, Self::GrayAlpha | Self::AlphaGray | Self::Rgba | Self::Argb | Self::Bgra | Self::Abgr)
  }

  /// True if this layout is color (RGB-family) as opposed to grayscale.
  const fn is_color(self) -> bool {
    matches!(self, Self::Rgb | Self::Bgr | Self::Rgba | Self::Argb | Self::Bgra | Self::Abgr)
  }

  /// Samples per pixel this layout carries.
  const fn channel_count(self) -> u8 {
    match (self.is_color(), self.has_alpha()) {
      (true, true) => 4,
      (true, false) => 3,
      (false, true) => 2,
      (false, false) => 1,
    }
  }
}

/// The sample-width half of a simplified-API layout. "16-bit linear" per
/// spec.md §4.6; this facade does not itself enforce that the 16-bit
/// samples are *linear light* (it applies whatever gamma the caller asks
/// for) — the "linear" framing describes the typical calling convention,
/// not a distinct wire behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
  Eight,
  Sixteen,
}

/// A full simplified-API layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
  pub channels: Channels,
  pub width: SampleWidth,
}
impl Layout {
  pub const fn new(channels: Channels, width: SampleWidth) -> Self {
    Self { channels, width }
  }
}

/// Tunables for [`decode`], beyond the underlying [`ReadOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleReadOptions {
  /// If the source has alpha (native or via `tRNS`) but the requested
  /// layout has none, composite over this background instead of just
  /// dropping the alpha channel outright. Given in the image's *wire* bit
  /// depth — the same depth a `bKGD` chunk for this image would use (e.g.
  /// a value of `15` for a 4-bit grayscale source, not a pre-scaled `255`);
  /// [`decode`] replicates it up to 8 bits alongside the sample data before
  /// compositing, the same way [`crate::metadata::Bkgd`] values are always
  /// stored relative to the image's own bit depth.
  pub background: Option<[u16; 3]>,
  /// The screen gamma to correct for, applied against the file's `gAMA`
  /// (or 1.0 if the file declares none). `None` skips the gamma stage
  /// entirely.
  pub screen_gamma: Option<f64>,
}

/// A decoded image in a simplified-API [`Layout`].
pub struct SimpleImage {
  pub width: u32,
  pub height: u32,
  pub layout: Layout,
  /// Row-major, channel-interleaved samples at `layout`'s arrangement and
  /// sample width, each sample stored as a native-endian `u8` or `u16`
  /// (widened into the low byte of a `u16` slot when `layout.width` is
  /// [`SampleWidth::Eight`], for a single uniform in-memory shape).
  pub rows: Vec<Vec<u16>>,
}
impl SimpleImage {
  /// Packs one row into the exact byte layout of the [`crate::pixel_formats`]
  /// struct matching `self.layout` — e.g. `Layout::new(Channels::Rgba,
  /// SampleWidth::Eight)` produces bytes identical to
  /// `&[pixel_formats::Rgba8]`, reinterpretable via `bytemuck::cast_slice`
  /// without a copy.
  pub fn row_bytes(&self, y: usize) -> Vec<u8> {
    match self.layout.width {
      SampleWidth::Eight => self.rows[y].iter().map(|&s| s as u8).collect(),
      SampleWidth::Sixteen => self.rows[y].iter().flat_map(|&s| s.to_ne_bytes()).collect(),
    }
  }
}

/// Decodes `reader` into `layout`, running the full expand / tRNS / gray-rgb
/// / background-compose / gamma / channel-swap pipeline per scanline.
///
/// Spec: §4.6 "it composes the pipeline above to deliver the requested
/// layout from any PNG input".
pub fn decode<R: Read>(reader: R, read_options: ReadOptions<'_>, layout: Layout, simple: SimpleReadOptions) -> PngResult<SimpleImage> {
  let decoded = read_png(reader, read_options)?;
  let ihdr = decoded.ihdr;
  let mut out_rows = Vec::with_capacity(decoded.rows.len());

  let lut8 = simple.screen_gamma.map(|screen| {
    let file_gamma = decoded.info.gama.map(|g| g.as_f64()).unwrap_or(1.0);
    (file_gamma, screen)
  });

  for row_bytes in &decoded.rows {
    let mut row = decode_one_row(&ihdr, row_bytes, &decoded.info, layout, &simple, lut8)?;
    row = scale_to_width(&row, layout.width);
    row = arrange_channels(&row, layout.channels);
    out_rows.push(row.samples);
  }

  Ok(SimpleImage { width: ihdr.width, height: ihdr.height, layout, rows: out_rows })
}

fn decode_one_row(
  ihdr: &crate::ihdr::Ihdr,
  row_bytes: &[u8],
  info: &crate::metadata::PngInfo,
  layout: Layout,
  simple: &SimpleReadOptions,
  lut8: Option<(f64, f64)>,
) -> PngResult<PixelRow> {
  let mut row = if ihdr.color_type == ColorType::Palette {
    let idx_row = PixelRow::unpack(ihdr, row_bytes);
    let plte = info.plte.as_ref().ok_or(PngError::PlteRequiredButMissing)?;
    let mut expanded = expand_palette(&idx_row, plte)?;
    if let Some(Trns::Palette(alphas)) = &info.trns {
      let alpha_samples: Vec<u16> = idx_row
        .samples
        .iter()
        .map(|&idx| alphas.get(idx as usize).copied().unwrap_or(0xff) as u16)
        .collect();
      let mut with_alpha = Vec::with_capacity(expanded.samples.len() + alpha_samples.len());
      for (pixel, alpha) in expanded.samples.chunks(3).zip(alpha_samples) {
        with_alpha.extend_from_slice(pixel);
        with_alpha.push(alpha);
      }
      expanded = PixelRow { width: expanded.width, channels: 4, bit_depth: 8, samples: with_alpha };
    }
    expanded
  } else {
    let mut row = PixelRow::unpack(ihdr, row_bytes);
    // tRNS key matching and sBIT's significant-bits shift both compare
    // against the *wire* bit depth, so both run before any bit-depth
    // scaling widens the sample range.
    if let Some(trns) = &info.trns {
      if matches!(trns, Trns::Grayscale(_) | Trns::Rgb { .. }) {
        row = apply_trns(&row, trns, ihdr.color_type);
      }
    }
    if let Some(sbit) = &info.sbit {
      row = sbit_shift(&row, &sbit_channel_widths(sbit));
    }
    if ihdr.bit_depth < 8 {
      row = scale_bit_depth(&row, 8);
    }
    row
  };

  let want_color = layout.channels.is_color();
  let is_color = row.channels == 3 || row.channels == 4;
  if want_color && !is_color {
    row = gray_to_rgb(&row);
  } else if !want_color && is_color {
    row = rgb_to_gray(&row);
  }

  let has_alpha = row.channels == 2 || row.channels == 4;
  let want_alpha = layout.channels.has_alpha();
  if want_alpha && !has_alpha {
    let max = ((1u32 << row.bit_depth) - 1) as u16;
    row = add_filler(&row, max, false);
  } else if !want_alpha && has_alpha {
    row = if let Some(bg) = simple.background {
      let color_channels = row.channels - 1;
      let scaled = bg.map(|v| scale_background_sample(v, ihdr.bit_depth));
      let background = if color_channels == 1 { vec![scaled[0]] } else { vec![scaled[0], scaled[1], scaled[2]] };
      compose_over_background(&row, &background)
    } else {
      strip_filler(&row, false)
    };
  }

  if let Some((file_gamma, screen_gamma)) = lut8 {
    if !gamma::is_noop(file_gamma, screen_gamma) {
      let alpha_now = row.channels == 2 || row.channels == 4;
      row = match row.bit_depth {
        8 => apply_gamma_8(&row, &gamma::build_lut_8(file_gamma, screen_gamma), alpha_now),
        16 => apply_gamma_16(&row, &Lut16::new(file_gamma, screen_gamma), alpha_now),
        _ => row,
      };
    }
  }
  Ok(row)
}

/// Replicates a background channel value from the image's wire bit depth
/// up to 8 bits, matching the point in [`decode_one_row`] where sub-8-bit
/// sample rows have already been scaled to 8 bits before compositing.
/// 8-bit and 16-bit sources pass through unchanged, since the row is still
/// at that same bit depth when the composite runs.
fn scale_background_sample(value: u16, bit_depth: u8) -> u16 {
  use crate::bit_depth_changes::int_make_depth_8;
  match bit_depth {
    1 => int_make_depth_8::<1>(value as u32) as u16,
    2 => int_make_depth_8::<2>(value as u32) as u16,
    4 => int_make_depth_8::<4>(value as u32) as u16,
    _ => value,
  }
}

fn sbit_channel_widths(sbit: &crate::metadata::Sbit) -> Vec<u8> {
  use crate::metadata::Sbit::*;
  match *sbit {
    Grayscale(y) => vec![y],
    Rgb { r, g, b } | Palette { r, g, b } => vec![r, g, b],
    GrayscaleAlpha { gray, alpha } => vec![gray, alpha],
    Rgba { r, g, b, a } => vec![r, g, b, a],
  }
}

fn scale_to_width(row: &PixelRow, width: SampleWidth) -> PixelRow {
  match (row.bit_depth, width) {
    (16, SampleWidth::Eight) => scale_bit_depth_proportional_16_to_8(row),
    (8, SampleWidth::Sixteen) => scale_bit_depth(row, 16),
    _ => row.clone(),
  }
}

fn arrange_channels(row: &PixelRow, channels: Channels) -> PixelRow {
  match channels {
    Channels::Gray | Channels::GrayAlpha | Channels::Rgb | Channels::Rgba => row.clone(),
    Channels::AlphaGray | Channels::Argb => apply_channel_swap(row, ChannelSwap::AlphaFirst),
    Channels::Bgr | Channels::Bgra => apply_channel_swap(row, ChannelSwap::Bgr),
    Channels::Abgr => {
      let bgr = apply_channel_swap(row, ChannelSwap::Bgr);
      apply_channel_swap(&bgr, ChannelSwap::AlphaFirst)
    }
  }
}

/// Tunables for [`encode`], beyond the underlying [`WriteOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWriteOptions {
  /// Declares a file gamma (embeds a `gAMA` chunk) and gamma-encodes the
  /// supplied samples into it before packing to the wire — the write-side
  /// mirror of [`SimpleReadOptions::screen_gamma`]. `None` writes no `gAMA`
  /// chunk and packs the samples unchanged.
  pub file_gamma: Option<f64>,
}

/// Encodes `rows` (each `width * layout.channels.channel_count()` samples,
/// in `layout`'s channel arrangement) into a PNG written to `writer`.
///
/// Spec: §2 "write-from-buffer"; §4.6 "[the simplified API] compose[s] the
/// pipeline above ... to write any PNG format from the supplied layout."
/// This is [`decode`]'s mirror: it restores `layout`'s channel arrangement
/// to canonical order (color first, alpha last, RGB not BGR), optionally
/// gamma-encodes, and packs to the wire color type implied by
/// `layout.channels` (e.g. `Channels::Bgra` writes `ColorType::Rgba` on the
/// wire, channel order corrected first) at `layout.width`'s bit depth.
pub fn encode<W: Write>(
  writer: W,
  width: u32,
  height: u32,
  layout: Layout,
  rows: &[Vec<u16>],
  simple: SimpleWriteOptions,
  write_options: WriteOptions,
) -> PngResult<()> {
  if rows.len() != height as usize {
    return Err(PngError::RowCountMismatch(rows.len(), height as usize));
  }
  let bit_depth = match layout.width {
    SampleWidth::Eight => 8,
    SampleWidth::Sixteen => 16,
  };
  let ihdr = Ihdr { width, height, bit_depth, color_type: canonical_color_type(layout.channels), interlaced: false };

  let mut info = PngInfo::default();
  if let Some(file_gamma) = simple.file_gamma {
    info.gama = Some(Gama { gamma_scaled: (file_gamma * 100_000.0).round() as u32 });
  }

  let mut packed_rows = Vec::with_capacity(rows.len());
  for samples in rows {
    packed_rows.push(encode_one_row(width, samples, layout, simple.file_gamma)?);
  }

  write_png_to(writer, EncodedImage { ihdr, info, rows: packed_rows }, write_options)
}

/// The canonical wire [`ColorType`] a [`Layout`]'s channel arrangement
/// writes as, ignoring channel order (BGR/alpha-first layouts still write
/// as their RGB-order counterpart; only the byte order on the wire
/// differs, which [`to_canonical_order`] restores before packing).
fn canonical_color_type(channels: Channels) -> ColorType {
  match (channels.is_color(), channels.has_alpha()) {
    (true, true) => ColorType::Rgba,
    (true, false) => ColorType::Rgb,
    (false, true) => ColorType::GrayscaleAlpha,
    (false, false) => ColorType::Grayscale,
  }
}

fn encode_one_row(width: u32, samples: &[u16], layout: Layout, file_gamma: Option<f64>) -> PngResult<Vec<u8>> {
  let channels = layout.channels.channel_count();
  let expected = width as usize * channels as usize;
  if samples.len() != expected {
    return Err(PngError::RowLengthMismatch(samples.len(), expected));
  }
  let bit_depth = match layout.width {
    SampleWidth::Eight => 8,
    SampleWidth::Sixteen => 16,
  };

  let mut row = PixelRow { width, channels, bit_depth, samples: samples.to_vec() };
  row = to_canonical_order(&row, layout.channels);

  if let Some(file_gamma) = file_gamma {
    if !gamma::is_noop(file_gamma, 1.0) {
      let has_alpha = layout.channels.has_alpha();
      row = match row.bit_depth {
        8 => apply_gamma_8(&row, &gamma::build_lut_8(file_gamma, 1.0), has_alpha),
        16 => apply_gamma_16(&row, &Lut16::new(file_gamma, 1.0), has_alpha),
        _ => row,
      };
    }
  }

  Ok(row.pack())
}

/// Undoes [`arrange_channels`]'s rearrangement: restores a row already in
/// `channels`' arrangement back to canonical channel order (color first,
/// alpha last, RGB not BGR). `Bgr`/`Bgra` and `AlphaGray` swaps are their
/// own inverse (each only transposes a pair of channels), but `Argb`'s and
/// `Abgr`'s rotations are not, so those two are inverted explicitly rather
/// than by calling [`apply_channel_swap`] a second time.
fn to_canonical_order(row: &PixelRow, channels: Channels) -> PixelRow {
  match channels {
    Channels::Gray | Channels::GrayAlpha | Channels::Rgb | Channels::Rgba => row.clone(),
    Channels::AlphaGray => apply_channel_swap(row, ChannelSwap::AlphaFirst),
    Channels::Bgr | Channels::Bgra => apply_channel_swap(row, ChannelSwap::Bgr),
    Channels::Argb => {
      let mut samples = row.samples.clone();
      for pixel in samples.chunks_mut(4) {
        pixel.rotate_left(1);
      }
      PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
    }
    Channels::Abgr => {
      let mut samples = row.samples.clone();
      for pixel in samples.chunks_mut(4) {
        pixel.rotate_left(1);
        pixel.swap(0, 2);
      }
      PixelRow { width: row.width, channels: row.channels, bit_depth: row.bit_depth, samples }
    }
  }
}

/// Resolves a decoded image's own `bKGD` chunk, if any, into the `[r, g, b]`
/// triple [`SimpleReadOptions::background`] expects — still in the image's
/// wire bit depth, resolving a palette index through `info.plte` when the
/// chunk stores one. Returns `Ok(None)` when the image has no `bKGD`.
pub fn background_from_info(info: &crate::metadata::PngInfo) -> PngResult<Option<[u16; 3]>> {
  let Some(bkgd) = &info.bkgd else { return Ok(None) };
  let samples = background_to_samples(bkgd, info.plte.as_ref(), 3)?;
  Ok(Some([samples[0], samples[1], samples[2]]))
}

/// Converts one linear-16 premultiplied-alpha RGBA sample to 8-bit sRGB
/// RGBA, un-premultiplying alpha first.
///
/// Spec: §4.6 "When the input has linear 16-bit samples and the target is
/// 8-bit sRGB, alpha is un-premultiplied before sRGB encoding using
/// `UNP_RECIPROCAL`". S6: `(R=65535,G=65535,B=65535,A=32768)` must decode
/// to `R=G=B=255, A=128 (+/-1)`.
pub fn unpremultiply_linear16_to_srgb8(r: u16, g: u16, b: u16, a: u16) -> (u8, u8, u8, u8) {
  let out_r = gamma::unpremultiply_reciprocal(r, a);
  let out_g = gamma::unpremultiply_reciprocal(g, a);
  let out_b = gamma::unpremultiply_reciprocal(b, a);
  let out_a = (((a as u32) * 255 + 32895) >> 16) as u8;
  (out_r, out_g, out_b, out_a)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::metadata::{Bkgd, Sbit};
  use crate::writer::write_png;

  #[test]
  fn scenario_s6_unpremultiply() {
    let (r, g, b, a) = unpremultiply_linear16_to_srgb8(65535, 65535, 65535, 32768);
    assert_eq!((r, g, b), (255, 255, 255));
    assert!((a as i32 - 128).abs() <= 1);
  }

  #[test]
  fn row_bytes_matches_pixel_formats_rgb8_layout() {
    let ihdr = Ihdr { width: 1, height: 1, bit_depth: 8, color_type: ColorType::Rgb, interlaced: false };
    let rows = vec![vec![10, 20, 30]];
    let encoded =
      write_png(EncodedImage { ihdr, info: PngInfo::default(), rows }, WriteOptions::default()).unwrap();
    let decoded = decode(
      encoded.as_slice(),
      ReadOptions::default(),
      Layout::new(Channels::Rgb, SampleWidth::Eight),
      SimpleReadOptions::default(),
    )
    .unwrap();
    let bytes = decoded.row_bytes(0);
    let pixels: &[crate::pixel_formats::Rgb8] = bytemuck::cast_slice(&bytes);
    assert_eq!(pixels[0], crate::pixel_formats::Rgb8 { r: 10, g: 20, b: 30 });
  }

  #[test]
  fn decode_rgba_to_gray_layout() {
    let ihdr = Ihdr { width: 1, height: 1, bit_depth: 8, color_type: ColorType::Rgba, interlaced: false };
    let rows = vec![vec![10, 20, 30, 255]];
    let encoded =
      write_png(EncodedImage { ihdr, info: PngInfo::default(), rows }, WriteOptions::default()).unwrap();
    let decoded = decode(
      encoded.as_slice(),
      ReadOptions::default(),
      Layout::new(Channels::Gray, SampleWidth::Eight),
      SimpleReadOptions::default(),
    )
    .unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.rows[0].len(), 1);
  }

  #[test]
  fn scenario_s1_background_compose_to_white() {
    // 1x1 RGBA (0,0,0,0) with bKGD (255,255,255): decoded gray must be 255.
    let ihdr = Ihdr { width: 1, height: 1, bit_depth: 8, color_type: ColorType::Rgba, interlaced: false };
    let mut info = PngInfo::default();
    info.bkgd = Some(Bkgd::Rgb { r: 255, g: 255, b: 255 });
    let rows = vec![vec![0, 0, 0, 0]];
    let encoded = write_png(EncodedImage { ihdr, info, rows }, WriteOptions::default()).unwrap();

    let decoded_full = read_png(encoded.as_slice(), ReadOptions::default()).unwrap();
    let bkgd = background_from_info(&decoded_full.info).unwrap().unwrap();
    let opts = SimpleReadOptions { background: Some(bkgd), screen_gamma: None };
    let decoded = decode(encoded.as_slice(), ReadOptions::default(), Layout::new(Channels::Gray, SampleWidth::Eight), opts).unwrap();
    assert_eq!(decoded.rows[0][0], 255);
  }

  #[test]
  fn scenario_s2_sbit_and_background() {
    // 1x1 4-bit gray, sBIT=4, tRNS key=10, sample value 10, bKGD=15:
    // expand + trns-to-alpha + background must produce 8-bit gray 255.
    let ihdr = Ihdr { width: 1, height: 1, bit_depth: 4, color_type: ColorType::Grayscale, interlaced: false };
    let mut info = PngInfo::default();
    info.sbit = Some(Sbit::Grayscale(4));
    info.trns = Some(Trns::Grayscale(10));
    info.bkgd = Some(Bkgd::Grayscale(15));
    let rows = vec![vec![0b1010_0000]]; // single 4-bit sample = 10, padded
    let encoded = write_png(EncodedImage { ihdr, info, rows }, WriteOptions::default()).unwrap();

    // bKGD is stored at the image's own 4-bit depth (15 = max), not
    // pre-scaled; `decode` is responsible for replicating it to 8 bits
    // the same way it replicates the sample data.
    let decoded_full = read_png(encoded.as_slice(), ReadOptions::default()).unwrap();
    let bg = background_from_info(&decoded_full.info).unwrap().unwrap();
    let opts = SimpleReadOptions { background: Some(bg), screen_gamma: None };
    let decoded = decode(encoded.as_slice(), ReadOptions::default(), Layout::new(Channels::Gray, SampleWidth::Eight), opts).unwrap();
    assert_eq!(decoded.rows[0][0], 255);
  }

  #[test]
  fn encode_then_decode_round_trips_rgba() {
    let layout = Layout::new(Channels::Rgba, SampleWidth::Eight);
    let rows = vec![vec![10, 20, 30, 255], vec![40, 50, 60, 128]];
    let mut buffer = Vec::new();
    encode(&mut buffer, 1, 2, layout, &rows, SimpleWriteOptions::default(), WriteOptions::default()).unwrap();

    let decoded = decode(buffer.as_slice(), ReadOptions::default(), layout, SimpleReadOptions::default()).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 2);
    assert_eq!(decoded.rows, rows);
  }

  #[test]
  fn encode_restores_bgra_and_argb_channel_order_on_the_wire() {
    // Whatever order the caller's layout puts the channels in, the wire
    // must always end up holding canonical (R,G,B,A) — that's what a PNG's
    // own RGBA color type means, regardless of how the layout's samples
    // were ordered going in.
    let canonical_rgba = PixelRow { width: 1, channels: 4, bit_depth: 8, samples: vec![10, 20, 30, 255] };
    for channels in [Channels::Bgra, Channels::Argb, Channels::Abgr] {
      let layout = Layout::new(channels, SampleWidth::Eight);
      let arranged = arrange_channels(&canonical_rgba, channels);

      let mut buffer = Vec::new();
      encode(&mut buffer, 1, 1, layout, &[arranged.samples.clone()], SimpleWriteOptions::default(), WriteOptions::default())
        .unwrap();
      let decoded_raw = read_png(buffer.as_slice(), ReadOptions::default()).unwrap();
      assert_eq!(
        decoded_raw.rows[0],
        [10u8, 20, 30, 255],
        "{channels:?} did not restore canonical channel order on the wire"
      );
    }
  }

  #[test]
  fn encode_embeds_and_applies_file_gamma() {
    let layout = Layout::new(Channels::Gray, SampleWidth::Eight);
    let rows = vec![vec![128]];
    let mut buffer = Vec::new();
    let opts = SimpleWriteOptions { file_gamma: Some(1.0 / 2.2) };
    encode(&mut buffer, 1, 1, layout, &rows, opts, WriteOptions::default()).unwrap();

    let decoded_raw = read_png(buffer.as_slice(), ReadOptions::default()).unwrap();
    let gama = decoded_raw.info.gama.expect("gAMA chunk must be written");
    assert!((gama.as_f64() - 1.0 / 2.2).abs() < 1e-3);
    assert_ne!(decoded_raw.rows[0][0], 128, "file_gamma must have been applied before packing");
  }
}
