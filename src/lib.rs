// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! FreeType font engine bindings
//!
//! This crate wraps the FreeType library with owned handles and checked
//! views:
//!
//! -   An [`Engine`] is a native library instance. All other objects are
//!     created through one.
//! -   A [`Face`] is an open font face. It owns a glyph slot ([`GlyphSlot`]),
//!     an active [`Size`] and a list of [`CharMap`]s, all exposed as views
//!     which remain valid only while the face is alive.
//! -   A [`Glyph`] is an independently owned glyph image, extracted from the
//!     slot. It outlives its face.
//! -   [`Bitmap`] and [`Outline`] are views into a slot or a glyph; they go
//!     stale when their owner's image is replaced.
//!
//! Misuse never touches freed memory: it yields a [`LifetimeError`].
//! Failures reported by the engine yield an [`EngineError`] carrying the
//! native status code and the engine's description of it.
//!
//! ```no_run
//! use ft2::{Engine, Face, LoadFlags, RenderMode};
//!
//! # fn main() -> ft2::Result<()> {
//! let engine = Engine::init()?;
//! let mut face = Face::open(&engine, "DejaVuSans.ttf")?;
//! face.set_pixel_sizes(0, 16)?;
//! face.load_char('A' as u32, LoadFlags::DEFAULT)?;
//!
//! let mut slot = face.glyph()?.expect("face has a glyph slot");
//! slot.render(RenderMode::Normal)?;
//! let bitmap = slot.bitmap()?;
//! println!("{}x{} pixels", bitmap.width()?, bitmap.rows()?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod conv;
pub use conv::{BBox, F16Dot16, F26Dot6, Matrix, Vector};

mod error;
pub use error::{describe, EngineError, Error, LifetimeError, Result, UsageError};

pub(crate) mod ffi;
mod handle;

mod engine;
pub use engine::{Config, Engine, ShutdownPolicy};

mod flags;
pub use flags::*;

mod face;
pub use face::{BitmapSize, Face};

mod charmap;
pub use charmap::{CharMap, Chars};

mod slot;
pub use slot::{GlyphMetrics, GlyphSlot, SubGlyph};

mod size;
pub use size::{Size, SizeMetrics};

mod glyph;
pub use glyph::{BitmapGlyph, Glyph, GlyphKind};

mod bitmap;
pub use bitmap::Bitmap;

mod outline;
pub use outline::Outline;
