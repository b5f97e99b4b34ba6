//! `sPLT`: a suggested reduced-color palette for quantizing renderers.

use crate::chunk::ChunkType;
use crate::error::{PngError, PngResult};

/// One suggested-palette entry, sample depth carried by [`SuggestedPalette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpltEntry {
  pub r: u16,
  pub g: u16,
  pub b: u16,
  pub a: u16,
  pub frequency: u16,
}

/// Either 8-bit or 16-bit suggested-palette entries, per the chunk's
/// declared sample depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpltEntries {
  Depth8(Vec<SpltEntry>),
  Depth16(Vec<SpltEntry>),
}

/// `sPLT`: a named suggested palette with a sample depth and entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedPalette {
  pub name: Vec<u8>,
  pub entries: SpltEntries,
}
impl SuggestedPalette {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let name_end = data.iter().position(|&b| b == 0).ok_or(PngError::MalformedChunk(ChunkType::SPLT, data.len()))?;
    let name = data[..name_end].to_vec();
    let rest = &data[name_end + 1..];
    let (&sample_depth, entries_data) = rest.split_first().ok_or(PngError::MalformedChunk(ChunkType::SPLT, data.len()))?;

    let entries = match sample_depth {
      8 => {
        if entries_data.len() % 6 != 0 {
          return Err(PngError::MalformedChunk(ChunkType::SPLT, data.len()));
        }
        SpltEntries::Depth8(
          entries_data
            .chunks_exact(6)
            .map(|c| SpltEntry {
              r: c[0] as u16,
              g: c[1] as u16,
              b: c[2] as u16,
              a: c[3] as u16,
              frequency: u16::from_be_bytes([c[4], c[5]]),
            })
            .collect(),
        )
      }
      16 => {
        if entries_data.len() % 10 != 0 {
          return Err(PngError::MalformedChunk(ChunkType::SPLT, data.len()));
        }
        SpltEntries::Depth16(
          entries_data
            .chunks_exact(10)
            .map(|c| SpltEntry {
              r: u16::from_be_bytes([c[0], c[1]]),
              g: u16::from_be_bytes([c[2], c[3]]),
              b: u16::from_be_bytes([c[4], c[5]]),
              a: u16::from_be_bytes([c[6], c[7]]),
              frequency: u16::from_be_bytes([c[8], c[9]]),
            })
            .collect(),
        )
      }
      other => return Err(PngError::MalformedChunk(ChunkType::SPLT, other as usize)),
    };
    Ok(Self { name, entries })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = self.name.clone();
    out.push(0);
    match &self.entries {
      SpltEntries::Depth8(entries) => {
        out.push(8);
        for e in entries {
          out.extend_from_slice(&[e.r as u8, e.g as u8, e.b as u8, e.a as u8]);
          out.extend_from_slice(&e.frequency.to_be_bytes());
        }
      }
      SpltEntries::Depth16(entries) => {
        out.push(16);
        for e in entries {
          out.extend_from_slice(&e.r.to_be_bytes());
          out.extend_from_slice(&e.g.to_be_bytes());
          out.extend_from_slice(&e.b.to_be_bytes());
          out.extend_from_slice(&e.a.to_be_bytes());
          out.extend_from_slice(&e.frequency.to_be_bytes());
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splt_depth8_round_trips() {
    let splt = SuggestedPalette {
      name: b"two-color".to_vec(),
      entries: SpltEntries::Depth8(vec![
        SpltEntry { r: 255, g: 0, b: 0, a: 255, frequency: 100 },
        SpltEntry { r: 0, g: 255, b: 0, a: 255, frequency: 50 },
      ]),
    };
    let bytes = splt.to_bytes();
    assert_eq!(SuggestedPalette::parse(&bytes).unwrap(), splt);
  }

  #[test]
  fn splt_depth16_round_trips() {
    let splt = SuggestedPalette {
      name: b"hi-depth".to_vec(),
      entries: SpltEntries::Depth16(vec![SpltEntry { r: 1000, g: 2000, b: 3000, a: 65535, frequency: 1 }]),
    };
    let bytes = splt.to_bytes();
    assert_eq!(SuggestedPalette::parse(&bytes).unwrap(), splt);
  }

  #[test]
  fn rejects_unknown_sample_depth() {
    let mut data = b"x".to_vec();
    data.push(0);
    data.push(12); // invalid depth
    assert!(SuggestedPalette::parse(&data).is_err());
  }
}
