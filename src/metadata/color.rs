//! Colorimetry chunks: `gAMA`, `cHRM`, `sRGB`, `iCCP`, `sBIT`.
//!
//! Spec: §3 "gAMA, cHRM, sRGB, iCCP carry colorimetry". Values in `cHRM`
//! and `gAMA` are fixed-point integers scaled by 100,000.

use crate::chunk::ChunkType;
use crate::error::{PngError, PngResult};
use crate::ihdr::ColorType;

/// `gAMA`: image gamma, stored as an integer 100,000x the float value (a
/// gamma of 1/2.2 is stored as 45455).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gama {
  pub gamma_scaled: u32,
}
impl Gama {
  pub fn as_f64(self) -> f64 {
    self.gamma_scaled as f64 / 100_000.0
  }

  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let bytes: [u8; 4] =
      data.try_into().map_err(|_| PngError::MalformedChunk(ChunkType::GAMA, data.len()))?;
    Ok(Self { gamma_scaled: u32::from_be_bytes(bytes) })
  }

  pub fn to_bytes(self) -> [u8; 4] {
    self.gamma_scaled.to_be_bytes()
  }
}

/// `cHRM`: white point and primary chromaticities, each scaled 100,000x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrm {
  pub white_x: u32,
  pub white_y: u32,
  pub red_x: u32,
  pub red_y: u32,
  pub green_x: u32,
  pub green_y: u32,
  pub blue_x: u32,
  pub blue_y: u32,
}
impl Chrm {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    if data.len() != 32 {
      return Err(PngError::MalformedChunk(ChunkType::CHRM, data.len()));
    }
    let mut v = [0u32; 8];
    for (i, chunk) in data.chunks_exact(4).enumerate() {
      v[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    Ok(Self {
      white_x: v[0],
      white_y: v[1],
      red_x: v[2],
      red_y: v[3],
      green_x: v[4],
      green_y: v[5],
      blue_x: v[6],
      blue_y: v[7],
    })
  }

  pub fn to_bytes(self) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, v) in [
      self.white_x,
      self.white_y,
      self.red_x,
      self.red_y,
      self.green_x,
      self.green_y,
      self.blue_x,
      self.blue_y,
    ]
    .into_iter()
    .enumerate()
    {
      out[i * 4..i * 4 + 4].copy_from_slice(&v.to_be_bytes());
    }
    out
  }
}

/// Rendering intent, per the ICC spec, as carried by `sRGB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SrgbIntent {
  Perceptual = 0,
  RelativeColorimetric = 1,
  Saturation = 2,
  AbsoluteColorimetric = 3,
}
impl TryFrom<u8> for SrgbIntent {
  type Error = u8;
  fn try_from(v: u8) -> Result<Self, u8> {
    Ok(match v {
      0 => Self::Perceptual,
      1 => Self::RelativeColorimetric,
      2 => Self::Saturation,
      3 => Self::AbsoluteColorimetric,
      other => return Err(other),
    })
  }
}

/// `sRGB`: the image conforms to the sRGB color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Srgb {
  pub intent: SrgbIntent,
}
impl Srgb {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    match data {
      [b] => Ok(Self { intent: SrgbIntent::try_from(*b).map_err(|_| PngError::MalformedChunk(ChunkType::SRGB, 1))? }),
      _ => Err(PngError::MalformedChunk(ChunkType::SRGB, data.len())),
    }
  }

  pub fn to_bytes(self) -> [u8; 1] {
    [self.intent as u8]
  }
}

/// `iCCP`: an embedded, zlib-compressed ICC color profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iccp {
  pub profile_name: Vec<u8>,
  pub profile: Vec<u8>,
}
impl Iccp {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let mut it = data.splitn(2, |&b| b == 0);
    let name = it.next().ok_or(PngError::MalformedChunk(ChunkType::ICCP, data.len()))?;
    let rest = it.next().ok_or(PngError::MalformedChunk(ChunkType::ICCP, data.len()))?;
    let (&compression_method, zlib_data) =
      rest.split_first().ok_or(PngError::MalformedChunk(ChunkType::ICCP, data.len()))?;
    if compression_method != 0 {
      return Err(PngError::MalformedChunk(ChunkType::ICCP, data.len()));
    }
    let profile = miniz_oxide::inflate::decompress_to_vec_zlib(zlib_data)
      .map_err(|_| PngError::DeflateFailed("iCCP profile failed to decompress"))?;
    Ok(Self { profile_name: name.to_vec(), profile })
  }

  pub fn to_bytes(&self, deflate_params: crate::deflate::DeflateParams) -> Vec<u8> {
    let compressed = crate::deflate::compress_zlib(&self.profile, deflate_params);
    let mut out = Vec::with_capacity(self.profile_name.len() + 2 + compressed.len());
    out.extend_from_slice(&self.profile_name);
    out.push(0);
    out.push(0); // compression method
    out.extend_from_slice(&compressed);
    out
  }
}

/// `sBIT`: the number of significant bits actually used per channel, which
/// may be fewer than the IHDR bit depth implies.
///
/// Spec: §3 "bKGD/hIST/sBIT bit widths tied to IHDR"; §4.6 "sBIT shift:
/// Rescale significant-bits range to full range".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sbit {
  Grayscale(u8),
  Rgb { r: u8, g: u8, b: u8 },
  Palette { r: u8, g: u8, b: u8 },
  GrayscaleAlpha { gray: u8, alpha: u8 },
  Rgba { r: u8, g: u8, b: u8, a: u8 },
}
impl Sbit {
  pub fn parse(color_type: ColorType, bit_depth: u8, data: &[u8]) -> PngResult<Self> {
    let result = match (color_type, data) {
      (ColorType::Grayscale, &[y]) => Self::Grayscale(y),
      (ColorType::Rgb, &[r, g, b]) => Self::Rgb { r, g, b },
      (ColorType::Palette, &[r, g, b]) => Self::Palette { r, g, b },
      (ColorType::GrayscaleAlpha, &[gray, alpha]) => Self::GrayscaleAlpha { gray, alpha },
      (ColorType::Rgba, &[r, g, b, a]) => Self::Rgba { r, g, b, a },
      _ => return Err(PngError::MalformedChunk(ChunkType::SBIT, data.len())),
    };
    let max = if color_type == ColorType::Palette { 8 } else { bit_depth };
    let in_range = |v: u8| v > 0 && v <= max;
    let ok = match result {
      Self::Grayscale(y) => in_range(y),
      Self::Rgb { r, g, b } | Self::Palette { r, g, b } => [r, g, b].into_iter().all(in_range),
      Self::GrayscaleAlpha { gray, alpha } => in_range(gray) && in_range(alpha),
      Self::Rgba { r, g, b, a } => [r, g, b, a].into_iter().all(in_range),
    };
    if !ok {
      return Err(PngError::MalformedChunk(ChunkType::SBIT, data.len()));
    }
    Ok(result)
  }

  pub fn to_bytes(self) -> Vec<u8> {
    match self {
      Self::Grayscale(y) => vec![y],
      Self::Rgb { r, g, b } | Self::Palette { r, g, b } => vec![r, g, b],
      Self::GrayscaleAlpha { gray, alpha } => vec![gray, alpha],
      Self::Rgba { r, g, b, a } => vec![r, g, b, a],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gama_round_trip() {
    let g = Gama { gamma_scaled: 45455 };
    assert!((g.as_f64() - (1.0 / 2.2)).abs() < 1e-3);
    assert_eq!(Gama::parse(&g.to_bytes()).unwrap(), g);
  }

  #[test]
  fn sbit_rejects_out_of_range() {
    assert!(Sbit::parse(ColorType::Grayscale, 4, &[5]).is_err());
    assert!(Sbit::parse(ColorType::Grayscale, 4, &[0]).is_err());
    assert!(Sbit::parse(ColorType::Grayscale, 4, &[4]).is_ok());
  }

  #[test]
  fn iccp_round_trips_through_compression() {
    let iccp = Iccp { profile_name: b"sRGB built-in".to_vec(), profile: vec![1, 2, 3, 4, 5, 6, 7, 8] };
    let bytes = iccp.to_bytes(crate::deflate::DeflateParams::default());
    let parsed = Iccp::parse(&bytes).unwrap();
    assert_eq!(parsed, iccp);
  }
}
