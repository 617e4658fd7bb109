// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Standalone glyph images
//!
//! A [`Glyph`] is a copy of a glyph image detached from its face. It is
//! created by [`GlyphSlot::glyph`](crate::GlyphSlot::glyph) or
//! [`Glyph::copy`], owns its native object, and remains valid after the face
//! it came from is released.

use crate::bitmap::Bitmap;
use crate::conv::{BBox, Matrix, Vector};
use crate::engine::{Engine, EngineInner};
use crate::error::{check, EngineError, LifetimeError, Result, UsageError};
use crate::ffi::{self, FT_BitmapGlyph, FT_Glyph, FT_GlyphRec};
use crate::flags::{BBoxMode, GlyphFormat, RenderMode};
use crate::handle::{Arena, Borrowed, Owned, Resource};
use crate::outline::Outline;
use std::ptr;

slotmap::new_key_type! {
    pub(crate) struct GlyphKey;
}

/// Arena entry for a standalone glyph
pub(crate) struct GlyphEntry {
    pub(crate) glyph: FT_Glyph,
    /// Bumped whenever `glyph` is replaced
    epoch: u64,
}

impl Resource for GlyphEntry {
    type Key = GlyphKey;

    fn arena(engine: &EngineInner) -> &Arena<GlyphKey, Self> {
        &engine.glyphs
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }

    fn release(self) -> Result<(), EngineError> {
        // Safety: the entry was removed from its arena, so this is the only
        // release of `glyph`.
        unsafe { ffi::FT_Done_Glyph(self.glyph) };
        Ok(())
    }
}

/// Kind of a glyph image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphKind {
    /// Use [`Glyph::as_bitmap`]
    Bitmap,
    /// Use [`Glyph::as_outline`]
    Outline,
    /// Another format with no typed accessor
    Other(GlyphFormat),
}

/// An independently owned glyph image
///
/// Dropping the glyph (or calling [`Glyph::release`]) frees it.
#[derive(Debug)]
pub struct Glyph {
    handle: Owned<GlyphEntry>,
}

impl Glyph {
    /// Take ownership of a native glyph
    pub(crate) fn adopt(engine: &Engine, glyph: FT_Glyph) -> Self {
        let entry = GlyphEntry { glyph, epoch: 0 };
        Glyph {
            handle: Owned::new(engine, entry),
        }
    }

    /// True until the glyph is released
    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }

    /// Release the glyph now
    pub fn release(self) -> Result<()> {
        self.handle.release()
    }

    fn raw(&self) -> Result<FT_Glyph, LifetimeError> {
        self.handle.with(|entry| entry.glyph)
    }

    fn rec<T>(&self, f: impl FnOnce(&FT_GlyphRec) -> T) -> Result<T> {
        // Safety: the glyph is live while its entry exists.
        Ok(self.handle.with(|entry| f(unsafe { &*entry.glyph }))?)
    }

    pub fn format(&self) -> Result<GlyphFormat> {
        self.rec(|g| GlyphFormat::from_raw(g.format))
    }

    /// Advance vector, 16.16 pixels
    pub fn advance(&self) -> Result<Vector> {
        self.rec(|g| Vector::from_raw(g.advance))
    }

    pub fn kind(&self) -> Result<GlyphKind> {
        Ok(match self.format()? {
            GlyphFormat::Bitmap => GlyphKind::Bitmap,
            GlyphFormat::Outline => GlyphKind::Outline,
            other => GlyphKind::Other(other),
        })
    }

    /// Deep-copy into a new, independently owned glyph
    pub fn copy(&self) -> Result<Glyph> {
        let source = self.raw()?;
        let mut target: FT_Glyph = ptr::null_mut();
        // Safety: source is live; target is a valid out-pointer.
        check(unsafe { ffi::FT_Glyph_Copy(source, &mut target) })?;
        Ok(Glyph::adopt(self.handle.engine(), target))
    }

    /// Transform the glyph image
    ///
    /// `matrix` applies to outline glyphs only; `delta` is a 26.6
    /// translation. Bitmap glyphs accept only a `delta`.
    pub fn transform(&mut self, matrix: Option<&Matrix>, delta: Option<Vector>) -> Result<()> {
        let glyph = self.raw()?;
        let mut matrix = matrix.map(Matrix::to_raw).transpose()?;
        let mut delta = delta.map(Vector::to_raw).transpose()?;
        let m = matrix.as_mut().map_or(ptr::null_mut(), |m| m as *mut _);
        let d = delta.as_mut().map_or(ptr::null_mut(), |d| d as *mut _);
        // Safety: glyph is live; both pointers are null or point to locals.
        check(unsafe { ffi::FT_Glyph_Transform(glyph, m, d) })?;
        Ok(())
    }

    /// Control box: the box enclosing all outline points, including
    /// control points
    ///
    /// Units depend on `mode`; [`BBoxMode::Pixels`] is the usual choice.
    pub fn cbox(&self, mode: BBoxMode) -> Result<BBox> {
        let glyph = self.raw()?;
        let mut bbox = ffi::FT_BBox::default();
        // Safety: glyph is live; bbox is a valid out-pointer.
        unsafe { ffi::FT_Glyph_Get_CBox(glyph, mode.to_raw(), &mut bbox) };
        Ok(BBox::from_raw(bbox))
    }

    /// Convert to a bitmap glyph in place
    ///
    /// `origin` (26.6) translates the image before rendering. If the glyph
    /// is already a bitmap nothing happens and `None` is returned.
    ///
    /// If `destroy` is true, the previous image is freed and `None` is
    /// returned. Otherwise the previous image is handed back as a new
    /// [`Glyph`]. On failure the glyph is left unchanged.
    ///
    /// Views from [`Glyph::as_bitmap`] and [`Glyph::as_outline`] go stale.
    pub fn to_bitmap(&mut self, mode: RenderMode, origin: Option<Vector>, destroy: bool) -> Result<Option<Glyph>> {
        let original = self.raw()?;
        let mut origin = origin.map(Vector::to_raw).transpose()?;
        let o = origin.as_mut().map_or(ptr::null_mut(), |o| o as *mut _);
        let mut glyph = original;
        // Safety: glyph is live; o is null or points to a local. On success
        // the engine replaces `glyph`, freeing `original` only if `destroy`.
        check(unsafe { ffi::FT_Glyph_To_Bitmap(&mut glyph, mode.to_raw(), o, u8::from(destroy)) })?;
        if glyph == original {
            return Ok(None);
        }

        self.handle.with_mut(|entry| {
            entry.glyph = glyph;
            entry.epoch += 1;
        })?;
        log::trace!("glyph converted to bitmap ({mode:?})");
        Ok((!destroy).then(|| Glyph::adopt(self.handle.engine(), original)))
    }

    /// View as a bitmap glyph
    pub fn as_bitmap(&self) -> Result<BitmapGlyph> {
        if self.format()? != GlyphFormat::Bitmap {
            return Err(UsageError::WrongKind { expected: "bitmap" }.into());
        }
        Ok(BitmapGlyph {
            glyph: self.handle.borrow()?,
        })
    }

    /// View the outline of an outline glyph
    pub fn as_outline(&self) -> Result<Outline> {
        if self.format()? != GlyphFormat::Outline {
            return Err(UsageError::WrongKind { expected: "outline" }.into());
        }
        Ok(Outline::from_glyph(self.handle.borrow()?))
    }
}

/// View of a [`Glyph`] in bitmap format
#[derive(Clone, Debug)]
pub struct BitmapGlyph {
    glyph: Borrowed<GlyphEntry>,
}

impl BitmapGlyph {
    fn field<T>(&self, f: impl FnOnce(&ffi::FT_BitmapGlyphRec) -> T) -> Result<T> {
        // Safety: the epoch check ensures the entry still holds the bitmap
        // glyph this view was taken from.
        Ok(self
            .glyph
            .with_current(|entry| f(unsafe { &*(entry.glyph as FT_BitmapGlyph) }))?)
    }

    /// Distance from the origin to the bitmap's left edge, in pixels
    pub fn left(&self) -> Result<i32> {
        self.field(|g| g.left)
    }

    /// Distance from the baseline to the bitmap's top edge, in pixels
    pub fn top(&self) -> Result<i32> {
        self.field(|g| g.top)
    }

    pub fn bitmap(&self) -> Result<Bitmap> {
        self.glyph.with_current(|_| ())?;
        Ok(Bitmap::from_glyph(self.glyph.clone()))
    }
}
