//! The typed, validated metadata store: one module per family of ancillary
//! chunks, aggregated here into [`PngInfo`].
//!
//! Spec: §3 "Metadata store ... typed, validated in-memory representation
//! of IHDR and every ancillary chunk". Unlike `IHDR`, ancillary chunks are
//! all optional and most are single-instance (spec.md §3 "Each ancillary
//! chunk may appear at most once" except `tEXt`/`zTXt`/`iTXt`/`sPLT`).

mod color;
mod physical;
mod splt;
mod text;
mod transparency;

pub use color::{Chrm, Gama, Iccp, Sbit, Srgb, SrgbIntent};
pub use physical::{Offs, OffsUnit, Pcal, Phys, Scal, ScalUnit, Time};
pub use splt::{SpltEntries, SpltEntry, SuggestedPalette};
pub use text::{ITXt, TEXt, ZTXt};
pub use transparency::{Bkgd, Hist, Plte, Trns};

use crate::chunk::UnknownChunk;

/// Everything the metadata store holds for one PNG stream, beyond `IHDR`
/// and the pixel data itself.
///
/// All fields default to "absent"; a reader only populates the ones whose
/// chunks were actually present (and structurally valid) in the file.
#[derive(Debug, Clone, Default)]
pub struct PngInfo {
  pub plte: Option<Plte>,
  pub trns: Option<Trns>,
  pub gama: Option<Gama>,
  pub chrm: Option<Chrm>,
  pub srgb: Option<Srgb>,
  pub iccp: Option<Iccp>,
  pub sbit: Option<Sbit>,
  pub bkgd: Option<Bkgd>,
  pub hist: Option<Hist>,
  pub phys: Option<Phys>,
  pub time: Option<Time>,
  pub offs: Option<Offs>,
  pub scal: Option<Scal>,
  pub pcal: Option<Pcal>,
  pub text: Vec<TEXt>,
  pub ztxt: Vec<ZTXt>,
  pub itxt: Vec<ITXt>,
  pub splt: Vec<SuggestedPalette>,
  pub unknown: Vec<UnknownChunk>,
}
impl PngInfo {
  /// Spec: §3 "sRGB and iCCP are mutually exclusive (a writer that declares
  /// sRGB must not also emit iCCP; readers accepting both should prefer
  /// sRGB)". This doesn't reject the metadata outright on read (that's
  /// exactly the tolerant case spec.md calls out); it just tells a
  /// transform/writer which one wins.
  pub fn prefers_srgb_over_iccp(&self) -> bool {
    self.srgb.is_some()
  }
}
