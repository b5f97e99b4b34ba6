#![forbid(unsafe_code)]
//#![warn(missing_docs)]

//! `pngforge`: a PNG 1.2 / ISO 15948 codec.
//!
//! The crate is organized leaf-first, matching the component breakdown in
//! `SPEC_FULL.md` §2:
//!
//! - [`chunk`], [`crc`]: wire-level chunk framing and the CRC-32 engine.
//! - [`ihdr`]: the image header and the pixel-format model it selects.
//! - [`deflate`]: the zlib/DEFLATE adapter, built on `miniz_oxide`.
//! - [`filtering`]: the five PNG scanline filters and write-side filter
//!   selection.
//! - [`adam7`]: the Adam7 interlace pass machine.
//! - [`metadata`]: the typed, validated ancillary-chunk store.
//! - [`transform`]: the pixel-format transform pipeline (expand, gamma,
//!   background compose, dither, channel swaps, ...).
//! - [`gamma`]: gamma LUT construction, shared by [`transform`] and
//!   [`simple`].
//! - [`reader`], [`writer`]: the chunk dispatcher / state machine for each
//!   direction, tying every component above into a complete stream codec.
//! - [`simple`]: the one-call facade over [`reader`]/[`writer`]/[`transform`]
//!   for callers who just want pixels in a standard layout.
//! - [`error`]: the fatal [`error::PngError`] and non-fatal
//!   [`error::PngWarning`] types every fallible operation in the crate
//!   returns or reports through.

pub mod adam7;
pub mod bit_depth_changes;
pub mod chunk;
pub mod crc;
pub mod deflate;
pub mod error;
pub mod filtering;
pub mod gamma;
pub mod ihdr;
pub mod metadata;
pub mod pixel_formats;
pub mod reader;
pub mod simple;
pub mod transform;
pub mod writer;

pub use error::{PngError, PngResult, PngWarning};
pub use ihdr::{ColorType, Ihdr};
pub use reader::{read_png, DecodedImage, PushReader, ReadOptions};
pub use writer::{write_png, write_png_to, EncodedImage, WriteOptions};
