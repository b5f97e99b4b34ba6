//! Plain-old-data pixel layouts for the [`crate::simple`] facade.
//!
//! Spec: §4.6 "Simplified API: a one-shot facade exposes a closed set of
//! pixel layouts {Gray, GrayA, AGray, RGB, BGR, RGBA, ARGB, BGRA, ABGR} x
//! {8-bit, 16-bit linear}". Each struct here is `#[repr(C)]` and derives
//! `bytemuck::Pod`/`Zeroable` so a caller can reinterpret a decoded row as
//! a `&[T]` slice (or vice versa on encode) without a copy, the same
//! pattern the teacher crate's own `pixel_formats`-style structs used.

use bytemuck::{Pod, Zeroable};

macro_rules! pixel_struct {
  ($(#[$meta:meta])* $name:ident { $($field:ident: $ty:ty),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
    #[repr(C)]
    pub struct $name {
      $(pub $field: $ty,)+
    }
  };
}

pixel_struct!(
  /// Grayscale, 8-bit.
  Gray8 { y: u8 }
);
pixel_struct!(
  /// Grayscale, 16-bit.
  Gray16 { y: u16 }
);
pixel_struct!(
  /// Grayscale + alpha, 8-bit, alpha last.
  GrayA8 { y: u8, a: u8 }
);
pixel_struct!(
  /// Grayscale + alpha, 16-bit, alpha last.
  GrayA16 { y: u16, a: u16 }
);
pixel_struct!(
  /// Grayscale + alpha, 8-bit, alpha first.
  AGray8 { a: u8, y: u8 }
);
pixel_struct!(
  /// Grayscale + alpha, 16-bit, alpha first.
  AGray16 { a: u16, y: u16 }
);
pixel_struct!(
  /// RGB, 8-bit per channel.
  Rgb8 { r: u8, g: u8, b: u8 }
);
pixel_struct!(
  /// RGB, 16-bit per channel.
  Rgb16 { r: u16, g: u16, b: u16 }
);
pixel_struct!(
  /// BGR, 8-bit per channel.
  Bgr8 { b: u8, g: u8, r: u8 }
);
pixel_struct!(
  /// BGR, 16-bit per channel.
  Bgr16 { b: u16, g: u16, r: u16 }
);
pixel_struct!(
  /// RGBA, 8-bit per channel, alpha last.
  Rgba8 { r: u8, g: u8, b: u8, a: u8 }
);
pixel_struct!(
  /// RGBA, 16-bit per channel, alpha last.
  Rgba16 { r: u16, g: u16, b: u16, a: u16 }
);
pixel_struct!(
  /// ARGB, 8-bit per channel, alpha first.
  Argb8 { a: u8, r: u8, g: u8, b: u8 }
);
pixel_struct!(
  /// ARGB, 16-bit per channel, alpha first.
  Argb16 { a: u16, r: u16, g: u16, b: u16 }
);
pixel_struct!(
  /// BGRA, 8-bit per channel, alpha last.
  Bgra8 { b: u8, g: u8, r: u8, a: u8 }
);
pixel_struct!(
  /// BGRA, 16-bit per channel, alpha last.
  Bgra16 { b: u16, g: u16, r: u16, a: u16 }
);
pixel_struct!(
  /// ABGR, 8-bit per channel, alpha first.
  Abgr8 { a: u8, b: u8, g: u8, r: u8 }
);
pixel_struct!(
  /// ABGR, 16-bit per channel, alpha first.
  Abgr16 { a: u16, b: u16, g: u16, r: u16 }
);

#[cfg(test)]
mod tests {
  use super::*;
  use core::mem::size_of;

  #[test]
  fn layouts_are_exactly_channel_count_times_sample_width() {
    assert_eq!(size_of::<Gray8>(), 1);
    assert_eq!(size_of::<GrayA8>(), 2);
    assert_eq!(size_of::<Rgb8>(), 3);
    assert_eq!(size_of::<Rgba8>(), 4);
    assert_eq!(size_of::<Rgba16>(), 8);
  }

  #[test]
  fn bgr_and_rgb_agree_on_component_values_in_swapped_positions() {
    let rgb = Rgb8 { r: 1, g: 2, b: 3 };
    let bgr = Bgr8 { b: rgb.b, g: rgb.g, r: rgb.r };
    assert_eq!(bgr, Bgr8 { r: 1, g: 2, b: 3 });
  }
}
