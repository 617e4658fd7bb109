// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Vector outlines

use crate::conv::{BBox, Vector};
use crate::error::{Result, UsageError};
use crate::face::FaceEntry;
use crate::ffi::{self, FT_Outline, FT_OutlineGlyph};
use crate::glyph::GlyphEntry;
use crate::handle::Borrowed;
use std::fmt;

#[derive(Clone)]
enum Source {
    Slot(Borrowed<FaceEntry>),
    Glyph(Borrowed<GlyphEntry>),
}

/// View of an outline owned by a glyph slot or an outline [`Glyph`](crate::Glyph)
///
/// Coordinates are 26.6 pixels, or font units when the glyph was loaded
/// with [`LoadFlags::NO_SCALE`](crate::LoadFlags::NO_SCALE). The view goes
/// stale once its owner's image is replaced.
#[derive(Clone)]
pub struct Outline {
    source: Source,
}

impl Outline {
    pub(crate) fn from_slot(face: Borrowed<FaceEntry>) -> Self {
        Outline {
            source: Source::Slot(face),
        }
    }

    pub(crate) fn from_glyph(glyph: Borrowed<GlyphEntry>) -> Self {
        Outline {
            source: Source::Glyph(glyph),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&FT_Outline) -> T) -> Result<T> {
        match &self.source {
            Source::Slot(face) => {
                let value = face.with_current(|entry| {
                    // Safety: the face (and so its slot) is live while its
                    // entry exists.
                    unsafe {
                        let slot = (*entry.face).glyph;
                        (!slot.is_null()).then(|| f(&(*slot).outline))
                    }
                })?;
                Ok(value.ok_or(UsageError::SlotEmpty)?)
            }
            Source::Glyph(glyph) => {
                // Safety: the view was taken from an outline glyph and the
                // epoch check ensures it has not been replaced.
                Ok(glyph.with_current(|entry| unsafe {
                    f(&(*(entry.glyph as FT_OutlineGlyph)).outline)
                })?)
            }
        }
    }

    pub fn n_contours(&self) -> Result<i16> {
        self.with(|o| o.n_contours)
    }

    pub fn n_points(&self) -> Result<i16> {
        self.with(|o| o.n_points)
    }

    /// Copy of the outline points
    pub fn points(&self) -> Result<Vec<Vector>> {
        self.with(|o| {
            let len = usize::try_from(o.n_points).unwrap_or(0);
            // Safety: points holds n_points entries.
            unsafe { ffi::copy_array(o.points, len, Vector::from_raw) }
        })
    }

    /// Copy of the per-point tags
    ///
    /// Bit 0 is set for on-curve points. Otherwise bit 1 distinguishes a
    /// cubic (set) from a conic (clear) control point.
    pub fn tags(&self) -> Result<Vec<u8>> {
        self.with(|o| {
            let len = usize::try_from(o.n_points).unwrap_or(0);
            // Safety: tags holds n_points entries.
            unsafe { ffi::copy_array(o.tags, len, |t| t as u8) }
        })
    }

    /// Copy of the contour end-point indices
    pub fn contours(&self) -> Result<Vec<i16>> {
        self.with(|o| {
            let len = usize::try_from(o.n_contours).unwrap_or(0);
            // Safety: contours holds n_contours entries.
            unsafe { ffi::copy_array(o.contours, len, |c| c) }
        })
    }

    /// `FT_OUTLINE_*` flag bits
    pub fn flags(&self) -> Result<i32> {
        self.with(|o| o.flags)
    }

    /// Control box of the outline points
    pub fn cbox(&self) -> Result<BBox> {
        self.with(|o| {
            let mut bbox = ffi::FT_BBox::default();
            // Safety: o is a live outline; bbox is a valid out-pointer.
            unsafe { ffi::FT_Outline_Get_CBox(o, &mut bbox) };
            BBox::from_raw(bbox)
        })
    }
}

impl fmt::Debug for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Slot(_) => "slot",
            Source::Glyph(_) => "glyph",
        };
        f.debug_struct("Outline")
            .field("source", &source)
            .field("n_contours", &self.n_contours().ok())
            .field("n_points", &self.n_points().ok())
            .finish()
    }
}
