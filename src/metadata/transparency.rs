//! `PLTE`, `tRNS`, `bKGD`, `hIST`: the palette and the chunks whose shape
//! depends on it.
//!
//! Spec: §3 "PLTE required for Palette, forbidden for Gray/GrayAlpha";
//! "tRNS shape depends on color_type"; "bKGD/hIST bit widths tied to IHDR".

use crate::error::{PngError, PngResult};
use crate::ihdr::ColorType;

/// `PLTE`: the palette, up to 256 RGB entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plte {
  pub entries: Vec<[u8; 3]>,
}
impl Plte {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    if data.len() % 3 != 0 {
      return Err(PngError::PlteLengthNotMultipleOfThree(data.len()));
    }
    let entries: Vec<[u8; 3]> = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    if entries.len() > 256 {
      return Err(PngError::PlteTooLarge(entries.len()));
    }
    Ok(Self { entries })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    self.entries.iter().flatten().copied().collect()
  }
}

/// `tRNS`: transparency data, shaped by the image's color type.
///
/// Spec: §3 "tRNS forbidden for color types 4 and 6 (already carry alpha)".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trns {
  /// One alpha byte per palette entry, in palette order. May be shorter
  /// than `PLTE`; entries past the end of `tRNS` are fully opaque.
  Palette(Vec<u8>),
  /// The single gray value that should be rendered transparent.
  Grayscale(u16),
  /// The single RGB value that should be rendered transparent.
  Rgb { r: u16, g: u16, b: u16 },
}
impl Trns {
  pub fn parse(color_type: ColorType, data: &[u8]) -> PngResult<Self> {
    match color_type {
      ColorType::Palette => Ok(Self::Palette(data.to_vec())),
      ColorType::Grayscale => match data {
        &[hi, lo] => Ok(Self::Grayscale(u16::from_be_bytes([hi, lo]))),
        _ => Err(PngError::MalformedChunk(crate::chunk::ChunkType::TRNS, data.len())),
      },
      ColorType::Rgb => match data {
        &[rh, rl, gh, gl, bh, bl] => Ok(Self::Rgb {
          r: u16::from_be_bytes([rh, rl]),
          g: u16::from_be_bytes([gh, gl]),
          b: u16::from_be_bytes([bh, bl]),
        }),
        _ => Err(PngError::MalformedChunk(crate::chunk::ChunkType::TRNS, data.len())),
      },
      ColorType::GrayscaleAlpha | ColorType::Rgba => Err(PngError::TrnsForbidden),
    }
  }

  /// Validates a palette-shaped `tRNS` against the palette it applies to,
  /// truncating if `benign_errors` allows it.
  ///
  /// Spec: §B "tRNS longer than PLTE: benign under relaxed CRC/benign-error
  /// mode, truncated with a warning; fatal otherwise".
  pub fn validate_against_palette(&self, plte_len: usize, benign_errors: bool) -> PngResult<Option<Self>> {
    if let Self::Palette(alphas) = self {
      if alphas.len() > plte_len {
        if benign_errors {
          return Ok(Some(Self::Palette(alphas[..plte_len].to_vec())));
        }
        return Err(PngError::TrnsLongerThanPlte(alphas.len(), plte_len));
      }
    }
    Ok(None)
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      Self::Palette(alphas) => alphas.clone(),
      Self::Grayscale(v) => v.to_be_bytes().to_vec(),
      Self::Rgb { r, g, b } => {
        let mut out = Vec::with_capacity(6);
        out.extend_from_slice(&r.to_be_bytes());
        out.extend_from_slice(&g.to_be_bytes());
        out.extend_from_slice(&b.to_be_bytes());
        out
      }
    }
  }
}

/// `bKGD`: the recommended background color against which to composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bkgd {
  Palette(u8),
  Grayscale(u16),
  Rgb { r: u16, g: u16, b: u16 },
}
impl Bkgd {
  pub fn parse(color_type: ColorType, data: &[u8]) -> PngResult<Self> {
    match (color_type, data) {
      (ColorType::Palette, &[index]) => Ok(Self::Palette(index)),
      (ColorType::Grayscale | ColorType::GrayscaleAlpha, &[hi, lo]) => Ok(Self::Grayscale(u16::from_be_bytes([hi, lo]))),
      (ColorType::Rgb | ColorType::Rgba, &[rh, rl, gh, gl, bh, bl]) => Ok(Self::Rgb {
        r: u16::from_be_bytes([rh, rl]),
        g: u16::from_be_bytes([gh, gl]),
        b: u16::from_be_bytes([bh, bl]),
      }),
      _ => Err(PngError::MalformedChunk(crate::chunk::ChunkType::BKGD, data.len())),
    }
  }

  pub fn to_bytes(self) -> Vec<u8> {
    match self {
      Self::Palette(index) => vec![index],
      Self::Grayscale(v) => v.to_be_bytes().to_vec(),
      Self::Rgb { r, g, b } => {
        let mut out = Vec::with_capacity(6);
        out.extend_from_slice(&r.to_be_bytes());
        out.extend_from_slice(&g.to_be_bytes());
        out.extend_from_slice(&b.to_be_bytes());
        out
      }
    }
  }
}

/// `hIST`: approximate palette-entry usage frequency, parallel to `PLTE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hist {
  pub frequencies: Vec<u16>,
}
impl Hist {
  pub fn parse(plte_len: usize, data: &[u8]) -> PngResult<Self> {
    if data.len() != plte_len * 2 {
      return Err(PngError::MalformedChunk(crate::chunk::ChunkType::HIST, data.len()));
    }
    let frequencies = data.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
    Ok(Self { frequencies })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    self.frequencies.iter().flat_map(|v| v.to_be_bytes()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plte_rejects_non_multiple_of_three() {
    assert!(Plte::parse(&[1, 2]).is_err());
  }

  #[test]
  fn plte_rejects_too_many_entries() {
    let data = vec![0u8; 257 * 3];
    assert!(matches!(Plte::parse(&data), Err(PngError::PlteTooLarge(257))));
  }

  #[test]
  fn trns_is_forbidden_for_rgba() {
    assert!(matches!(Trns::parse(ColorType::Rgba, &[]), Err(PngError::TrnsForbidden)));
  }

  #[test]
  fn trns_palette_truncates_under_benign_errors() {
    let trns = Trns::Palette(vec![1, 2, 3, 4, 5]);
    let truncated = trns.validate_against_palette(3, true).unwrap().unwrap();
    assert_eq!(truncated, Trns::Palette(vec![1, 2, 3]));
    assert!(trns.validate_against_palette(3, false).is_err());
  }

  #[test]
  fn hist_round_trips() {
    let hist = Hist { frequencies: vec![10, 20, 30] };
    let bytes = hist.to_bytes();
    assert_eq!(Hist::parse(3, &bytes).unwrap(), hist);
  }
}
