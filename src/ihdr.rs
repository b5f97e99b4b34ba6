//! `IHDR`: the image header chunk and the pixel-format model it selects.
//!
//! Spec: §3 "Image header (IHDR)", "Pixel format". The header is immutable
//! once set on a stream (spec.md §3 "Lifecycle"); every other component
//! (filter pipeline, interlace pass machine, transform pipeline) is driven
//! off the values recorded here.

use crate::error::{PngError, PngResult};

/// The five color types a PNG pixel format may declare.
///
/// Spec: §3 "color_type ∈ {Gray(0), RGB(2), Palette(3), GrayAlpha(4),
/// RGBA(6)}".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  Grayscale = 0,
  Rgb = 2,
  Palette = 3,
  GrayscaleAlpha = 4,
  Rgba = 6,
}
impl ColorType {
  /// Number of samples per pixel, not counting any `tRNS`-derived alpha.
  #[inline]
  pub const fn channel_count(self) -> u8 {
    match self {
      Self::Grayscale => 1,
      Self::Rgb => 3,
      Self::Palette => 1,
      Self::GrayscaleAlpha => 2,
      Self::Rgba => 4,
    }
  }

  /// True if this color type carries its own alpha channel (as opposed to
  /// alpha arriving only via `tRNS`).
  #[inline]
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::GrayscaleAlpha | Self::Rgba)
  }

  /// The bit depths legal for this color type, per spec.md §3: "Palette
  /// requires bit_depth ≤ 8; RGB, GA, RGBA require bit_depth ≥ 8".
  #[inline]
  pub const fn legal_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Grayscale => &[1, 2, 4, 8, 16],
      Self::Rgb => &[8, 16],
      Self::Palette => &[1, 2, 4, 8],
      Self::GrayscaleAlpha => &[8, 16],
      Self::Rgba => &[8, 16],
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = u8;
  #[inline]
  fn try_from(value: u8) -> Result<Self, u8> {
    Ok(match value {
      0 => Self::Grayscale,
      2 => Self::Rgb,
      3 => Self::Palette,
      4 => Self::GrayscaleAlpha,
      6 => Self::Rgba,
      other => return Err(other),
    })
  }
}

/// The PNG image header. Immutable once read or once written with
/// [`crate::writer::PngWriter::set_ihdr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ihdr {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: ColorType,
  pub interlaced: bool,
}
impl Ihdr {
  pub const WIRE_LEN: usize = 13;

  /// Validates and constructs an `IHDR` from its 13-byte wire payload.
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let data: [u8; 13] = data.try_into().map_err(|_| PngError::MalformedChunk(
      crate::chunk::ChunkType::IHDR,
      data.len(),
    ))?;
    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let bit_depth = data[8];
    let color_type =
      ColorType::try_from(data[9]).map_err(|c| PngError::IllegalColorTypeBitDepthCombination(c, bit_depth))?;
    let compression_method = data[10];
    let filter_method = data[11];
    let interlace_method = data[12];

    if width == 0 {
      return Err(PngError::WidthIsZero);
    }
    if height == 0 {
      return Err(PngError::HeightIsZero);
    }
    if compression_method != 0 {
      return Err(PngError::IllegalCompressionMethod(compression_method));
    }
    if filter_method != 0 {
      return Err(PngError::IllegalFilterMethod(filter_method));
    }
    if !color_type.legal_bit_depths().contains(&bit_depth) {
      return Err(PngError::IllegalColorTypeBitDepthCombination(color_type as u8, bit_depth));
    }
    let interlaced = match interlace_method {
      0 => false,
      1 => true,
      other => return Err(PngError::IllegalInterlaceMethod(other)),
    };

    let ihdr = Self { width, height, bit_depth, color_type, interlaced };
    // width*height must not overflow what a usize-addressed buffer can hold.
    (width as u64)
      .checked_mul(height as u64)
      .ok_or(PngError::DimensionsOverflow)?;
    ihdr.row_bytes().ok_or(PngError::DimensionsOverflow)?;
    Ok(ihdr)
  }

  /// Serializes to the 13-byte wire payload.
  pub fn to_bytes(self) -> [u8; 13] {
    let mut out = [0u8; 13];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.bit_depth;
    out[9] = self.color_type as u8;
    out[10] = 0; // compression method
    out[11] = 0; // filter method
    out[12] = self.interlaced as u8;
    out
  }

  /// Bits needed to store one pixel in the wire format.
  #[inline]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * (self.color_type.channel_count() as usize)
  }

  /// `bpp` for filtering purposes: bytes per *whole* pixel, minimum 1.
  /// Spec: §4.5 "`bpp = max(1, ⌈channels×bit_depth/8⌉)`".
  #[inline]
  pub const fn filter_bpp(&self) -> usize {
    let bits = self.bits_per_pixel();
    let bytes = (bits + 7) / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Row byte length (without the leading filter-type byte) for a scanline
  /// of the given width, at this header's bit depth and color type.
  /// Spec: §3 "Row byte length = ⌈width × channels × bit_depth / 8⌉".
  #[inline]
  pub const fn row_bytes_for_width(&self, width: u32) -> usize {
    let bits = (width as usize) * self.bits_per_pixel();
    (bits + 7) / 8
  }

  /// Row byte length for the full image width.
  #[inline]
  pub fn row_bytes(&self) -> Option<usize> {
    (self.width as u64)
      .checked_mul(self.bits_per_pixel() as u64)
      .map(|bits| ((bits + 7) / 8) as usize)
  }

  /// Row byte length including the leading filter-type byte.
  #[inline]
  pub fn filter_line_bytes_for_width(&self, width: u32) -> usize {
    1 + self.row_bytes_for_width(width)
  }

  /// Total decompressed byte count the DEFLATE adapter must produce: the
  /// sum, over every scanline of every pass (just one "pass" when not
  /// interlaced), of the filter-line byte length.
  pub fn decompressed_size(&self) -> usize {
    if self.interlaced {
      crate::adam7::passes(self.width, self.height)
        .map(|p| p.height as usize * self.filter_line_bytes_for_width(p.width))
        .sum()
    } else {
      self.height as usize * self.filter_line_bytes_for_width(self.width)
    }
  }
}
