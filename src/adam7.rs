//! The Adam7 interlace pass machine.
//!
//! Spec: §4.4 "Interlace pass machine (Adam7)". Enumerates the seven passes
//! of the PNG interlace scheme and drives per-pass row expansion/combination
//! (`sparkle` and `block` modes) as well as caller-driven pass-only access.

/// Starting X offset, per pass (1-indexed passes 1..=7, stored 0-indexed).
const X0: [u32; 7] = [0, 4, 0, 2, 0, 1, 0];
/// Starting Y offset, per pass.
const Y0: [u32; 7] = [0, 0, 4, 0, 2, 0, 1];
/// X increment, per pass.
const XI: [u32; 7] = [8, 8, 4, 4, 2, 2, 1];
/// Y increment, per pass.
const YI: [u32; 7] = [8, 8, 8, 4, 4, 2, 2];

/// Dimensions and placement parameters for a single Adam7 pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
  /// 0-indexed pass number, 0..=6 (spec's "pass 1".."pass 7").
  pub index: usize,
  pub x0: u32,
  pub y0: u32,
  pub xi: u32,
  pub yi: u32,
  /// Reduced-image width for this pass; zero if the pass contributes no
  /// pixels (still counted, per spec.md §4.4).
  pub width: u32,
  /// Reduced-image height for this pass.
  pub height: u32,
}
impl Pass {
  /// True if this pass has at least one pixel and therefore appears in the
  /// filter/DEFLATE stream.
  #[inline]
  pub const fn is_nonempty(&self) -> bool {
    self.width != 0 && self.height != 0
  }

  /// Maps a pixel's position within this pass's reduced image to its
  /// position in the full image.
  #[inline]
  pub const fn to_full_pos(&self, reduced_x: u32, reduced_y: u32) -> (u32, u32) {
    (self.x0 + reduced_x * self.xi, self.y0 + reduced_y * self.yi)
  }
}

/// Per-pass dimensions for an image of the given full size.
/// Spec: §4.4 "`Wp = ⌈(W − x0)/xi⌉`, `Hp = ⌈(H − y0)/yi⌉`".
#[inline]
pub fn pass_dimensions(width: u32, height: u32, index: usize) -> (u32, u32) {
  let x0 = X0[index];
  let y0 = Y0[index];
  let xi = XI[index];
  let yi = YI[index];
  let w = if width > x0 { (width - x0 + xi - 1) / xi } else { 0 };
  let h = if height > y0 { (height - y0 + yi - 1) / yi } else { 0 };
  (w, h)
}

/// Enumerates all seven Adam7 passes (including empty ones) for an image of
/// the given full dimensions, in canonical pass order.
pub fn passes(width: u32, height: u32) -> impl Iterator<Item = Pass> {
  (0..7).map(move |index| {
    let (w, h) = pass_dimensions(width, height, index);
    Pass { index, x0: X0[index], y0: Y0[index], xi: XI[index], yi: YI[index], width: w, height: h }
  })
}

/// How a library-driven de-interlace combines a pass's own pixels with
/// whatever the caller's full-width row buffer already holds from earlier
/// passes.
///
/// Spec: §4.4, mode 1 "library-driven de-interlace": "sparkle" overwrites
/// only pass-owned pixels; "block" additionally fills the pixels a later
/// pass would own, for progressive display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
  Sparkle,
  Block,
}

/// For [`CombineMode::Block`], returns the full-image rectangle (inclusive
/// x range, inclusive y range) that a single pass pixel at `(full_x,
/// full_y)` should be replicated into, bounded by the image dimensions.
///
/// This lets a block combine give every pixel a plausible value as soon as
/// any covering pass has been decoded, which is what makes progressive
/// display "blocky" instead of "sparkly".
pub fn block_fill_rect(pass: &Pass, full_x: u32, full_y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
  let x_end = (full_x + pass.xi).min(width);
  let y_end = (full_y + pass.yi).min(height);
  (full_x, x_end, full_y, y_end)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn pass_union_and_disjointness_8x8() {
    // S5 / invariant 5: every pixel covered exactly once across all 7 passes.
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    for pass in passes(8, 8) {
      for ry in 0..pass.height {
        for rx in 0..pass.width {
          let pos = pass.to_full_pos(rx, ry);
          assert!(seen.insert(pos), "pixel {:?} covered twice", pos);
        }
      }
    }
    let expected: HashSet<(u32, u32)> = (0..8).flat_map(|y| (0..8).map(move |x| (x, y))).collect();
    assert_eq!(seen, expected);
  }

  #[test]
  fn scenario_s5_pass_membership() {
    let ps: Vec<Pass> = passes(8, 8).collect();
    assert_eq!(ps[0].width, 1);
    assert_eq!(ps[0].height, 1);
    assert_eq!(ps[0].to_full_pos(0, 0), (0, 0));

    assert_eq!(ps[1].to_full_pos(0, 0), (4, 0));

    let pass3: Vec<_> = (0..ps[2].height)
      .flat_map(|ry| (0..ps[2].width).map(move |rx| (rx, ry)))
      .map(|(rx, ry)| ps[2].to_full_pos(rx, ry))
      .collect();
    assert_eq!(pass3, vec![(0, 4), (4, 4)]);

    let pass4: Vec<_> = (0..ps[3].height)
      .flat_map(|ry| (0..ps[3].width).map(move |rx| (rx, ry)))
      .map(|(rx, ry)| ps[3].to_full_pos(rx, ry))
      .collect();
    assert_eq!(pass4, vec![(2, 0), (6, 0), (2, 4), (6, 4)]);
  }

  #[test]
  fn disjoint_for_arbitrary_sizes() {
    for (w, h) in [(1, 1), (3, 5), (17, 1), (1, 17), (100, 73)] {
      let mut seen: HashSet<(u32, u32)> = HashSet::new();
      for pass in passes(w, h) {
        for ry in 0..pass.height {
          for rx in 0..pass.width {
            let pos = pass.to_full_pos(rx, ry);
            assert!(pos.0 < w && pos.1 < h);
            assert!(seen.insert(pos));
          }
        }
      }
      assert_eq!(seen.len(), (w * h) as usize);
    }
  }
}
