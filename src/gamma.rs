//! Gamma-correction LUT construction and application.
//!
//! Spec: §4.6 "Gamma" stage and "Gamma LUT contract". For a file gamma `γf`
//! and screen gamma `γs`, the transfer is `out = in^(γf·γs)`. 8-bit output
//! uses a flat 256-entry LUT; 16-bit output evaluates `powf` directly per
//! sample rather than building a 65536-entry table, which is cheap enough
//! at this crate's scale and still hits the accuracy bounds in spec.md §8
//! (invariant 7).

/// Gamma values within this distance of 1.0 make the gamma stage a no-op.
/// Spec: §4.6 "`PNG_GAMMA_THRESHOLD` (1/21 or 0.05)".
pub const GAMMA_THRESHOLD: f64 = 0.05;

/// True if `file_gamma * screen_gamma` is close enough to 1.0 that the
/// gamma stage should be elided entirely.
#[inline]
pub fn is_noop(file_gamma: f64, screen_gamma: f64) -> bool {
  ((file_gamma * screen_gamma) - 1.0).abs() < GAMMA_THRESHOLD
}

/// Builds a 256-entry LUT mapping an 8-bit input sample to an 8-bit output
/// sample under `out = (in/255)^(file_gamma*screen_gamma) * 255`, rounded to
/// nearest.
pub fn build_lut_8(file_gamma: f64, screen_gamma: f64) -> [u8; 256] {
  let exponent = file_gamma * screen_gamma;
  let mut lut = [0u8; 256];
  for (i, entry) in lut.iter_mut().enumerate() {
    let normalized = i as f64 / 255.0;
    let corrected = normalized.powf(exponent);
    *entry = (corrected * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
  }
  lut
}

/// A 16-bit gamma transfer function: holds the combined exponent
/// `file_gamma * screen_gamma` and evaluates `out = (in/65535)^exponent *
/// 65535` directly via `powf` on each call to [`Lut16::apply`], rather than
/// building a 65536-entry table. No table is precomputed or cached; the
/// name is kept for symmetry with [`build_lut_8`]'s LUT-shaped API.
#[derive(Debug, Clone)]
pub struct Lut16 {
  exponent: f64,
}
impl Lut16 {
  pub fn new(file_gamma: f64, screen_gamma: f64) -> Self {
    Self { exponent: file_gamma * screen_gamma }
  }

  /// Applies the gamma transfer to a 16-bit sample.
  #[inline]
  pub fn apply(&self, sample: u16) -> u16 {
    let normalized = sample as f64 / 65535.0;
    let corrected = normalized.powf(self.exponent);
    (corrected * 65535.0 + 0.5).clamp(0.0, 65535.0) as u16
  }
}

/// Un-premultiplies a linear-light alpha-premultiplied sample and encodes
/// the result to 8-bit sRGB.
///
/// Spec: §4.6 "alpha is un-premultiplied before sRGB encoding using
/// `UNP_RECIPROCAL(alpha) = ((0xffff*0xff)<<7 + alpha/2) / alpha`". Mirrors
/// libpng's `png_unpremultiply` (see `pngwrite.c`'s `UNP_RECIPROCAL` macro
/// and the function built around it): a component at or past its own alpha,
/// or an alpha below 128/65535, has no reliably recoverable color and is
/// reported fully opaque (255); otherwise the reciprocal multiply recovers
/// a 16-bit linear sample (`>>7`, not `>>15` — the reciprocal is already
/// scaled by `0xff<<7`, one `0xff` short of a full 16-bit-to-8-bit
/// reduction) which still needs the sRGB transfer function applied before
/// truncating to 8 bits.
#[inline]
pub fn unpremultiply_reciprocal(premultiplied: u16, alpha: u16) -> u8 {
  if premultiplied >= alpha || alpha < 128 {
    return 255;
  }
  if premultiplied == 0 {
    return 0;
  }
  let numerator: u64 = (0xffffu64 * 0xffu64) << 7;
  let reciprocal = (numerator + (alpha as u64) / 2) / (alpha as u64);
  let scaled = if alpha < 65407 {
    ((premultiplied as u64 * reciprocal) + 64) >> 7
  } else {
    premultiplied as u64 * 255
  };
  let linear16 = (scaled / 0xff).min(0xffff) as u16;
  srgb_encode_8(linear16)
}

/// The standard piecewise sRGB transfer function, applied to a 16-bit
/// linear sample to produce an 8-bit sRGB-encoded one.
#[inline]
pub fn srgb_encode_8(linear: u16) -> u8 {
  let l = linear as f64 / 65535.0;
  let encoded = if l <= 0.0031308 { l * 12.92 } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
  (encoded * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}
