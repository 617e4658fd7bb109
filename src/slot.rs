// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The glyph slot
//!
//! Each face has one slot holding the most recently loaded glyph. The slot
//! moves through three states:
//!
//! ```text
//! EMPTY --load--> LOADED --render--> RENDERED
//!   ^               |  ^                 |
//!   +---------------+  +------load-------+
//! ```
//!
//! Loading or rendering replaces the slot contents, so [`Bitmap`] and
//! [`Outline`] views taken earlier report [`LifetimeError::Stale`].
//! [`GlyphSlot::metrics`] and similar return copies and are unaffected.

use crate::bitmap::Bitmap;
use crate::conv::{pos, to_usize, F16Dot16, Matrix, Vector};
use crate::error::{check, LifetimeError, Result, UsageError};
use crate::face::FaceEntry;
use crate::ffi::{self, FT_Glyph, FT_GlyphSlot, FT_GlyphSlotRec, FT_Glyph_Metrics, FT_Int, FT_Matrix, FT_UInt};
use crate::flags::{GlyphFormat, RenderMode};
use crate::glyph::Glyph;
use crate::handle::Borrowed;
use crate::outline::Outline;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ptr;

/// Metrics of a loaded glyph
///
/// Values are 26.6 pixels, or font units if the glyph was loaded with
/// [`LoadFlags::NO_SCALE`](crate::LoadFlags::NO_SCALE).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlyphMetrics {
    pub width: i64,
    pub height: i64,
    /// Left side bearing, horizontal layout
    pub hori_bearing_x: i64,
    /// Top side bearing, horizontal layout
    pub hori_bearing_y: i64,
    pub hori_advance: i64,
    pub vert_bearing_x: i64,
    pub vert_bearing_y: i64,
    pub vert_advance: i64,
}

impl GlyphMetrics {
    fn from_raw(m: &FT_Glyph_Metrics) -> Self {
        GlyphMetrics {
            width: pos(m.width),
            height: pos(m.height),
            hori_bearing_x: pos(m.horiBearingX),
            hori_bearing_y: pos(m.horiBearingY),
            hori_advance: pos(m.horiAdvance),
            vert_bearing_x: pos(m.vertBearingX),
            vert_bearing_y: pos(m.vertBearingY),
            vert_advance: pos(m.vertAdvance),
        }
    }
}

/// One component of a composite glyph
///
/// Only available when loading with
/// [`LoadFlags::NO_RECURSE`](crate::LoadFlags::NO_RECURSE).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubGlyph {
    /// Glyph index of the component
    pub index: i32,
    /// `FT_SUBGLYPH_FLAG_*` bits
    pub flags: u32,
    pub arg1: i32,
    pub arg2: i32,
    pub transform: Matrix,
}

/// View of a face's glyph slot
///
/// Valid until the face is released.
#[derive(Clone, Debug)]
pub struct GlyphSlot {
    face: Borrowed<FaceEntry>,
}

impl GlyphSlot {
    pub(crate) fn new(face: Borrowed<FaceEntry>) -> Self {
        GlyphSlot { face }
    }

    fn raw(&self) -> Result<FT_GlyphSlot> {
        // Safety: the face is live while its entry exists.
        let slot = self.face.with(|entry| unsafe { (*entry.face).glyph })?;
        if slot.is_null() {
            Err(LifetimeError::Stale.into())
        } else {
            Ok(slot)
        }
    }

    fn rec<T>(&self, f: impl FnOnce(&FT_GlyphSlotRec) -> T) -> Result<T> {
        let slot = self.raw()?;
        // Safety: the slot is owned by the live face.
        Ok(f(unsafe { &*slot }))
    }

    /// Snapshot the current glyph's metrics
    pub fn metrics(&self) -> Result<GlyphMetrics> {
        self.rec(|s| GlyphMetrics::from_raw(&s.metrics))
    }

    /// Unhinted horizontal advance, 16.16 pixels
    ///
    /// In font units if loaded with
    /// [`LoadFlags::LINEAR_DESIGN`](crate::LoadFlags::LINEAR_DESIGN).
    pub fn linear_hori_advance(&self) -> Result<F16Dot16> {
        self.rec(|s| F16Dot16::from_raw(s.linearHoriAdvance))
    }

    /// Unhinted vertical advance, 16.16 pixels
    pub fn linear_vert_advance(&self) -> Result<F16Dot16> {
        self.rec(|s| F16Dot16::from_raw(s.linearVertAdvance))
    }

    /// Transformed, hinted advance (26.6 pixels)
    pub fn advance(&self) -> Result<Vector> {
        self.rec(|s| Vector::from_raw(s.advance))
    }

    pub fn format(&self) -> Result<GlyphFormat> {
        self.rec(|s| GlyphFormat::from_raw(s.format))
    }

    /// True if no glyph has been loaded
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.format()? == GlyphFormat::None)
    }

    /// The slot's bitmap
    ///
    /// Meaningful once the slot is rendered (or a bitmap glyph is loaded).
    /// The view goes stale on the next load or render.
    pub fn bitmap(&self) -> Result<Bitmap> {
        Ok(Bitmap::from_slot(self.face.refresh()?))
    }

    /// Distance from the origin to the bitmap's left edge, in pixels
    pub fn bitmap_left(&self) -> Result<i32> {
        self.rec(|s| s.bitmap_left)
    }

    /// Distance from the baseline to the bitmap's top edge, in pixels
    /// (upwards positive)
    pub fn bitmap_top(&self) -> Result<i32> {
        self.rec(|s| s.bitmap_top)
    }

    /// The slot's outline
    ///
    /// Fails unless the current glyph is in outline format. The view goes
    /// stale on the next load or render.
    pub fn outline(&self) -> Result<Outline> {
        if self.format()? != GlyphFormat::Outline {
            return Err(UsageError::WrongKind { expected: "outline" }.into());
        }
        Ok(Outline::from_slot(self.face.refresh()?))
    }

    pub fn num_subglyphs(&self) -> Result<u32> {
        self.rec(|s| s.num_subglyphs)
    }

    /// Components of the current composite glyph
    pub fn subglyphs(&self) -> Result<Vec<SubGlyph>> {
        let slot = self.raw()?;
        let n = self.num_subglyphs()?;
        let mut list = Vec::with_capacity(to_usize(n));
        for i in 0..n {
            let (mut index, mut flags, mut arg1, mut arg2): (FT_Int, FT_UInt, FT_Int, FT_Int) =
                (0, 0, 0, 0);
            let mut transform = FT_Matrix {
                xx: 0,
                xy: 0,
                yx: 0,
                yy: 0,
            };
            // Safety: slot is live and i < num_subglyphs; out-pointers are
            // valid.
            check(unsafe {
                ffi::FT_Get_SubGlyph_Info(
                    slot,
                    i,
                    &mut index,
                    &mut flags,
                    &mut arg1,
                    &mut arg2,
                    &mut transform,
                )
            })?;
            list.push(SubGlyph {
                index,
                flags,
                arg1,
                arg2,
                transform: Matrix::from_raw(transform),
            });
        }
        Ok(list)
    }

    /// Glyph program (hinting instructions) of the current glyph
    pub fn control_data(&self) -> Result<Vec<u8>> {
        self.rec(|s| {
            let len = usize::try_from(s.control_len).unwrap_or(0);
            // Safety: control_data holds control_len bytes, or is null.
            unsafe { ffi::copy_array(s.control_data.cast::<u8>(), len, |b| b) }
        })
    }

    pub fn control_len(&self) -> Result<i64> {
        self.rec(|s| i64::from(s.control_len))
    }

    /// Left side bearing change due to hinting (26.6)
    pub fn lsb_delta(&self) -> Result<i64> {
        self.rec(|s| pos(s.lsb_delta))
    }

    /// Right side bearing change due to hinting (26.6)
    pub fn rsb_delta(&self) -> Result<i64> {
        self.rec(|s| pos(s.rsb_delta))
    }

    /// Render the loaded glyph to a bitmap
    ///
    /// Rendering an already rendered slot does nothing.
    pub fn render(&mut self, mode: RenderMode) -> Result<()> {
        let slot = self.raw()?;
        if self.is_empty()? {
            return Err(UsageError::SlotEmpty.into());
        }
        log::trace!("render({mode:?})");
        // Safety: slot is live.
        let result = check(unsafe { ffi::FT_Render_Glyph(slot, mode.to_raw()) });
        self.face.with_mut(FaceEntry::touch_slot)?;
        Ok(result?)
    }

    /// Copy the current glyph image into a new, independently owned [`Glyph`]
    pub fn glyph(&self) -> Result<Glyph> {
        let slot = self.raw()?;
        if self.is_empty()? {
            return Err(UsageError::SlotEmpty.into());
        }
        let mut glyph: FT_Glyph = ptr::null_mut();
        // Safety: slot is live; glyph is a valid out-pointer.
        check(unsafe { ffi::FT_Get_Glyph(slot, &mut glyph) })?;
        Ok(Glyph::adopt(self.face.engine(), glyph))
    }
}
