//! `pHYs`, `tIME`, `oFFs`, `sCAL`, `pCAL`: physical-dimension and
//! calibration metadata.
//!
//! `oFFs`, `sCAL`, and `pCAL` have no wire layout in spec.md itself; their
//! shape here follows libpng's `pngset.c`/`pngget.c` (see `SPEC_FULL.md`
//! §B). All three are carried as inert, round-tripped metadata: no
//! calibration math is performed on pixel values.

use std::str::FromStr;

use crate::chunk::ChunkType;
use crate::error::{PngError, PngResult};

/// `pHYs`: physical pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phys {
  pub ppu_x: u32,
  pub ppu_y: u32,
  pub is_meters: bool,
}
impl Phys {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let data: [u8; 9] = data.try_into().map_err(|_| PngError::MalformedChunk(ChunkType::PHYS, data.len()))?;
    let ppu_x = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let ppu_y = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let is_meters = match data[8] {
      0 => false,
      1 => true,
      _ => return Err(PngError::MalformedChunk(ChunkType::PHYS, 9)),
    };
    Ok(Self { ppu_x, ppu_y, is_meters })
  }

  pub fn to_bytes(self) -> [u8; 9] {
    let mut out = [0u8; 9];
    out[0..4].copy_from_slice(&self.ppu_x.to_be_bytes());
    out[4..8].copy_from_slice(&self.ppu_y.to_be_bytes());
    out[8] = self.is_meters as u8;
    out
  }
}

/// `tIME`: last-modification timestamp, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
  pub year: u16,
  pub month: u8,
  pub day: u8,
  pub hour: u8,
  pub minute: u8,
  pub second: u8,
}
impl Time {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let data: [u8; 7] = data.try_into().map_err(|_| PngError::MalformedChunk(ChunkType::TIME, data.len()))?;
    Ok(Self {
      year: u16::from_be_bytes([data[0], data[1]]),
      month: data[2],
      day: data[3],
      hour: data[4],
      minute: data[5],
      second: data[6],
    })
  }

  pub fn to_bytes(self) -> [u8; 7] {
    let mut out = [0u8; 7];
    out[0..2].copy_from_slice(&self.year.to_be_bytes());
    out[2] = self.month;
    out[3] = self.day;
    out[4] = self.hour;
    out[5] = self.minute;
    out[6] = self.second;
    out
  }
}

/// Unit for the `oFFs` chunk's offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsUnit {
  Pixel,
  Micrometer,
}

/// `oFFs`: the image position on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offs {
  pub x: i32,
  pub y: i32,
  pub unit: OffsUnit,
}
impl Offs {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let data: [u8; 9] = data.try_into().map_err(|_| PngError::MalformedChunk(ChunkType::OFFS, data.len()))?;
    let x = i32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let y = i32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let unit = match data[8] {
      0 => OffsUnit::Pixel,
      1 => OffsUnit::Micrometer,
      _ => return Err(PngError::MalformedChunk(ChunkType::OFFS, 9)),
    };
    Ok(Self { x, y, unit })
  }

  pub fn to_bytes(self) -> [u8; 9] {
    let mut out = [0u8; 9];
    out[0..4].copy_from_slice(&self.x.to_be_bytes());
    out[4..8].copy_from_slice(&self.y.to_be_bytes());
    out[8] = match self.unit {
      OffsUnit::Pixel => 0,
      OffsUnit::Micrometer => 1,
    };
    out
  }
}

/// Unit for the `sCAL` chunk's physical dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalUnit {
  Meter,
  Radian,
}

/// `sCAL`: the physical size of each pixel, as ASCII decimal floats.
#[derive(Debug, Clone, PartialEq)]
pub struct Scal {
  pub unit: ScalUnit,
  pub width: f64,
  pub height: f64,
}
impl Scal {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let (&unit_byte, rest) = data.split_first().ok_or(PngError::MalformedChunk(ChunkType::SCAL, data.len()))?;
    let unit = match unit_byte {
      1 => ScalUnit::Meter,
      2 => ScalUnit::Radian,
      _ => return Err(PngError::MalformedChunk(ChunkType::SCAL, data.len())),
    };
    let mut parts = rest.splitn(2, |&b| b == 0);
    let width_str = parts.next().ok_or(PngError::MalformedChunk(ChunkType::SCAL, data.len()))?;
    let height_str = parts.next().ok_or(PngError::MalformedChunk(ChunkType::SCAL, data.len()))?;
    let width = parse_ascii_float(width_str)?;
    let height = parse_ascii_float(height_str)?;
    Ok(Self { unit, width, height })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(match self.unit {
      ScalUnit::Meter => 1,
      ScalUnit::Radian => 2,
    });
    out.extend_from_slice(format!("{}", self.width).as_bytes());
    out.push(0);
    out.extend_from_slice(format!("{}", self.height).as_bytes());
    out
  }
}

/// `pCAL`: a calibration curve mapping raw sample values to physical units.
/// Carried inert: `equation_type`/`params` are round-tripped, not evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcal {
  pub calibration_name: Vec<u8>,
  pub x0: i32,
  pub x1: i32,
  pub equation_type: u8,
  pub unit_name: Vec<u8>,
  pub params: Vec<f64>,
}
impl Pcal {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let mut it = data.splitn(2, |&b| b == 0);
    let name = it.next().ok_or(PngError::MalformedChunk(ChunkType::PCAL, data.len()))?;
    let rest = it.next().ok_or(PngError::MalformedChunk(ChunkType::PCAL, data.len()))?;
    if rest.len() < 10 {
      return Err(PngError::MalformedChunk(ChunkType::PCAL, data.len()));
    }
    let x0 = i32::from_be_bytes(rest[0..4].try_into().unwrap());
    let x1 = i32::from_be_bytes(rest[4..8].try_into().unwrap());
    let equation_type = rest[8];
    let num_params = rest[9];
    let mut it2 = rest[10..].splitn(2, |&b| b == 0);
    let unit_name = it2.next().ok_or(PngError::MalformedChunk(ChunkType::PCAL, data.len()))?;
    let params_blob = it2.next().ok_or(PngError::MalformedChunk(ChunkType::PCAL, data.len()))?;
    let mut params = Vec::with_capacity(num_params as usize);
    for field in params_blob.split(|&b| b == 0) {
      if field.is_empty() && params.len() == num_params as usize {
        break;
      }
      if field.is_empty() {
        continue;
      }
      params.push(parse_ascii_float(field)?);
    }
    if params.len() != num_params as usize {
      return Err(PngError::MalformedChunk(ChunkType::PCAL, data.len()));
    }
    Ok(Self { calibration_name: name.to_vec(), x0, x1, equation_type, unit_name: unit_name.to_vec(), params })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&self.calibration_name);
    out.push(0);
    out.extend_from_slice(&self.x0.to_be_bytes());
    out.extend_from_slice(&self.x1.to_be_bytes());
    out.push(self.equation_type);
    out.push(self.params.len() as u8);
    out.extend_from_slice(&self.unit_name);
    out.push(0);
    for (i, param) in self.params.iter().enumerate() {
      if i > 0 {
        out.push(0);
      }
      out.extend_from_slice(format!("{param}").as_bytes());
    }
    out
  }
}

fn parse_ascii_float(bytes: &[u8]) -> PngResult<f64> {
  let s = std::str::from_utf8(bytes).map_err(|_| PngError::MalformedChunk(ChunkType::SCAL, bytes.len()))?;
  f64::from_str(s).map_err(|_| PngError::MalformedChunk(ChunkType::SCAL, bytes.len()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phys_round_trips() {
    let phys = Phys { ppu_x: 2835, ppu_y: 2835, is_meters: true };
    assert_eq!(Phys::parse(&phys.to_bytes()).unwrap(), phys);
  }

  #[test]
  fn offs_round_trips() {
    let offs = Offs { x: -100, y: 200, unit: OffsUnit::Micrometer };
    let bytes = offs.to_bytes();
    let parsed = Offs::parse(&bytes).unwrap();
    assert_eq!(parsed.x, offs.x);
    assert_eq!(parsed.y, offs.y);
  }

  #[test]
  fn scal_round_trips() {
    let scal = Scal { unit: ScalUnit::Meter, width: 0.123, height: 4.5 };
    let bytes = scal.to_bytes();
    let parsed = Scal::parse(&bytes).unwrap();
    assert!((parsed.width - scal.width).abs() < 1e-9);
    assert!((parsed.height - scal.height).abs() < 1e-9);
  }

  #[test]
  fn pcal_round_trips() {
    let pcal = Pcal {
      calibration_name: b"linear".to_vec(),
      x0: 0,
      x1: 255,
      equation_type: 0,
      unit_name: b"degC".to_vec(),
      params: vec![1.0, 2.5],
    };
    let bytes = pcal.to_bytes();
    let parsed = Pcal::parse(&bytes).unwrap();
    assert_eq!(parsed.calibration_name, pcal.calibration_name);
    assert_eq!(parsed.x0, pcal.x0);
    assert_eq!(parsed.x1, pcal.x1);
    assert_eq!(parsed.unit_name, pcal.unit_name);
    assert_eq!(parsed.params, pcal.params);
  }

  #[test]
  fn time_round_trips() {
    let t = Time { year: 2024, month: 3, day: 14, hour: 9, minute: 26, second: 53 };
    assert_eq!(Time::parse(&t.to_bytes()).unwrap(), t);
  }
}
