//! The five PNG scanline filters, and the per-row filter selection used on
//! write.
//!
//! Spec: §4.5 "Filter pipeline". Filters operate on **bytes**, not pixels,
//! regardless of bit depth or color type; only `bpp` (bytes per whole
//! pixel, minimum 1) distinguishes one color/depth combination from
//! another.

use crate::error::PngError;

/// Filter type tags as they appear as the first byte of each scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl FilterType {
  pub const ALL: [FilterType; 5] =
    [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = u8;
  #[inline]
  fn try_from(value: u8) -> Result<Self, u8> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(other),
    })
  }
}

/// A bitmask restricting which filters the write-side heuristic may choose
/// from. Spec: §4.5 "respect a caller-supplied filter-mask that may
/// restrict candidates".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMask(u8);
impl FilterMask {
  pub const NONE: Self = Self(1 << 0);
  pub const SUB: Self = Self(1 << 1);
  pub const UP: Self = Self(1 << 2);
  pub const AVERAGE: Self = Self(1 << 3);
  pub const PAETH: Self = Self(1 << 4);
  pub const ALL: Self = Self(0b1_1111);

  #[inline]
  pub const fn contains(self, filter: FilterType) -> bool {
    (self.0 & (1 << filter as u8)) != 0
  }

  #[inline]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}
impl Default for FilterMask {
  #[inline]
  fn default() -> Self {
    Self::ALL
  }
}

/// The Paeth filter function: predicts the current byte from its left (`a`),
/// above (`b`), and upper-left (`c`) neighbors.
///
/// PNG spec: "The calculations within the PaethPredictor function shall be
/// performed exactly, without overflow." The tie-break order below is part
/// of the format and must not be reordered.
const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_.wrapping_add(b_).wrapping_sub(c_);
  let pa = p.wrapping_sub(a_).wrapping_abs();
  let pb = p.wrapping_sub(b_).wrapping_abs();
  let pc = p.wrapping_sub(c_).wrapping_abs();
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

#[inline]
const fn byte_at(row: &[u8], bpp: usize, i: usize) -> u8 {
  if i < bpp {
    0
  } else {
    row[i - bpp]
  }
}

/// Applies `filter` to `raw` (the current unfiltered scanline), given
/// `prev` (the previous scanline's *unfiltered* bytes, or an all-zero slice
/// for the first line of a pass), writing the filtered bytes into `out`.
pub fn apply_filter(filter: FilterType, bpp: usize, raw: &[u8], prev: &[u8], out: &mut [u8]) {
  debug_assert_eq!(raw.len(), out.len());
  match filter {
    FilterType::None => out.copy_from_slice(raw),
    FilterType::Sub => {
      for i in 0..raw.len() {
        out[i] = raw[i].wrapping_sub(byte_at(raw, bpp, i));
      }
    }
    FilterType::Up => {
      for i in 0..raw.len() {
        let b = prev.get(i).copied().unwrap_or(0);
        out[i] = raw[i].wrapping_sub(b);
      }
    }
    FilterType::Average => {
      for i in 0..raw.len() {
        let a = byte_at(raw, bpp, i) as u16;
        let b = prev.get(i).copied().unwrap_or(0) as u16;
        out[i] = raw[i].wrapping_sub(((a + b) / 2) as u8);
      }
    }
    FilterType::Paeth => {
      for i in 0..raw.len() {
        let a = byte_at(raw, bpp, i);
        let b = prev.get(i).copied().unwrap_or(0);
        let c = if i < bpp { 0 } else { prev.get(i - bpp).copied().unwrap_or(0) };
        out[i] = raw[i].wrapping_sub(paeth_predictor(a, b, c));
      }
    }
  }
}

/// Reverses [`apply_filter`] in place: `line` holds the filtered bytes on
/// entry and the reconstructed (raw) bytes on exit. `prev` is the
/// already-reconstructed previous scanline (or all zero for a pass's first
/// line).
pub fn unfilter_in_place(filter: FilterType, bpp: usize, line: &mut [u8], prev: &[u8]) {
  match filter {
    FilterType::None => {}
    FilterType::Sub => {
      for i in 0..line.len() {
        let a = byte_at(line, bpp, i);
        line[i] = line[i].wrapping_add(a);
      }
    }
    FilterType::Up => {
      for i in 0..line.len() {
        let b = prev.get(i).copied().unwrap_or(0);
        line[i] = line[i].wrapping_add(b);
      }
    }
    FilterType::Average => {
      for i in 0..line.len() {
        let a = byte_at(line, bpp, i) as u16;
        let b = prev.get(i).copied().unwrap_or(0) as u16;
        line[i] = line[i].wrapping_add(((a + b) / 2) as u8);
      }
    }
    FilterType::Paeth => {
      for i in 0..line.len() {
        let a = byte_at(line, bpp, i);
        let b = prev.get(i).copied().unwrap_or(0);
        let c = if i < bpp { 0 } else { prev.get(i - bpp).copied().unwrap_or(0) };
        line[i] = line[i].wrapping_add(paeth_predictor(a, b, c));
      }
    }
  }
}

/// Unfilters `filter_byte` (read from the wire) in place.
pub fn unfilter_line(filter_byte: u8, bpp: usize, line: &mut [u8], prev: &[u8]) -> Result<(), PngError> {
  let filter =
    FilterType::try_from(filter_byte).map_err(|_| PngError::DeflateFailed("unknown scanline filter type byte"))?;
  unfilter_in_place(filter, bpp, line, prev);
  Ok(())
}

/// Sum of absolute signed-byte values, the default filter-selection metric.
/// Spec: §4.5 "compute the sum of absolute signed byte values of each
/// candidate filtered row, pick the filter with the smallest sum".
fn sum_of_absolute_values(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&b| (b as i8).unsigned_abs() as u64).sum()
}

/// "Fast" mode: always emits [`FilterType::None`], matching the spec's
/// escape hatch for callers who want encode speed over ratio.
pub fn select_filter_fast() -> FilterType {
  FilterType::None
}

/// Chooses the filter with the smallest sum-of-absolute-values among
/// `mask`'s candidates, ties broken by filter index (ascending), and
/// returns it along with its filtered bytes.
pub fn select_filter_minsad(bpp: usize, raw: &[u8], prev: &[u8], mask: FilterMask) -> (FilterType, Vec<u8>) {
  let mut scratch = vec![0u8; raw.len()];
  let mut best: Option<(FilterType, u64, Vec<u8>)> = None;
  for filter in FilterType::ALL {
    if !mask.contains(filter) {
      continue;
    }
    apply_filter(filter, bpp, raw, prev, &mut scratch);
    let score = sum_of_absolute_values(&scratch);
    let better = match &best {
      None => true,
      Some((_, best_score, _)) => score < *best_score,
    };
    if better {
      best = Some((filter, score, scratch.clone()));
    }
  }
  // WriteOptions always constructs a non-empty mask, so this is structural.
  best.map(|(f, _, bytes)| (f, bytes)).expect("filter mask excluded every candidate")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scenario_s4_filter_shapes() {
    let raw: Vec<u8> = (1..=16).collect();
    let prev = vec![0u8; 16];
    let bpp = 1;

    let mut sub = vec![0u8; 16];
    apply_filter(FilterType::Sub, bpp, &raw, &prev, &mut sub);
    assert_eq!(sub, vec![1u8; 16]);

    let mut up = vec![0u8; 16];
    apply_filter(FilterType::Up, bpp, &raw, &prev, &mut up);
    assert_eq!(up, raw, "Up against an all-zero previous row is a no-op");
  }

  #[test]
  fn every_filter_inverts_for_arbitrary_rows() {
    let raw: Vec<u8> = (0..37).map(|i| (i * 37 + 11) as u8).collect();
    let prev: Vec<u8> = (0..37).map(|i| (i * 13 + 1) as u8).collect();
    let bpp = 4;
    for filter in FilterType::ALL {
      let mut filtered = raw.clone();
      apply_filter(filter, bpp, &raw, &prev, &mut filtered);
      unfilter_in_place(filter, bpp, &mut filtered, &prev);
      assert_eq!(filtered, raw, "filter {:?} failed to invert", filter);
    }
  }

  #[test]
  fn every_filter_inverts_on_first_row_of_a_pass() {
    // prev is conceptually all-zero for the first row.
    let raw: Vec<u8> = (0..20).map(|i| (i * 7 + 3) as u8).collect();
    let prev = vec![0u8; 20];
    let bpp = 3;
    for filter in FilterType::ALL {
      let mut filtered = raw.clone();
      apply_filter(filter, bpp, &raw, &prev, &mut filtered);
      unfilter_in_place(filter, bpp, &mut filtered, &prev);
      assert_eq!(filtered, raw);
    }
  }

  #[test]
  fn minsad_picks_up_for_a_row_identical_to_previous() {
    let raw = vec![5u8; 32];
    let prev = vec![5u8; 32];
    let (filter, bytes) = select_filter_minsad(1, &raw, &prev, FilterMask::ALL);
    assert_eq!(filter, FilterType::Up);
    assert!(bytes.iter().all(|&b| b == 0));
  }

  #[test]
  fn minsad_respects_mask() {
    let raw = vec![5u8; 32];
    let prev = vec![5u8; 32];
    let (filter, _) = select_filter_minsad(1, &raw, &prev, FilterMask::NONE);
    assert_eq!(filter, FilterType::None);
  }

  #[test]
  fn fast_mode_always_none() {
    assert_eq!(select_filter_fast(), FilterType::None);
  }
}
