// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Bitmaps

use crate::conv::{to_usize, try_u32};
use crate::error::{Result, UsageError};
use crate::face::FaceEntry;
use crate::ffi::{self, FT_Bitmap, FT_BitmapGlyph};
use crate::flags::PixelMode;
use crate::glyph::GlyphEntry;
use crate::handle::Borrowed;
use std::fmt;

#[derive(Clone)]
enum Source {
    Slot(Borrowed<FaceEntry>),
    Glyph(Borrowed<GlyphEntry>),
}

/// View of a bitmap owned by a glyph slot or a bitmap [`Glyph`](crate::Glyph)
///
/// Accessors copy out of the live bitmap. Once the owner's image is
/// replaced (the slot is reloaded or re-rendered, the glyph converted) they
/// fail with [`LifetimeError::Stale`](crate::LifetimeError::Stale).
#[derive(Clone)]
pub struct Bitmap {
    source: Source,
}

impl Bitmap {
    pub(crate) fn from_slot(face: Borrowed<FaceEntry>) -> Self {
        Bitmap {
            source: Source::Slot(face),
        }
    }

    pub(crate) fn from_glyph(glyph: Borrowed<GlyphEntry>) -> Self {
        Bitmap {
            source: Source::Glyph(glyph),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&FT_Bitmap) -> T) -> Result<T> {
        match &self.source {
            Source::Slot(face) => {
                let value = face.with_current(|entry| {
                    // Safety: the face (and so its slot) is live while its
                    // entry exists.
                    unsafe {
                        let slot = (*entry.face).glyph;
                        (!slot.is_null()).then(|| f(&(*slot).bitmap))
                    }
                })?;
                Ok(value.ok_or(UsageError::SlotEmpty)?)
            }
            Source::Glyph(glyph) => {
                // Safety: the view was taken from a bitmap glyph and the
                // epoch check ensures it has not been replaced.
                Ok(glyph.with_current(|entry| unsafe {
                    f(&(*(entry.glyph as FT_BitmapGlyph)).bitmap)
                })?)
            }
        }
    }

    /// Number of rows
    pub fn rows(&self) -> Result<u32> {
        Ok(self.with(|b| try_u32(b.rows))??)
    }

    /// Number of pixels per row
    ///
    /// For [`PixelMode::Lcd`] this is three times the pixel width.
    pub fn width(&self) -> Result<u32> {
        Ok(self.with(|b| try_u32(b.width))??)
    }

    /// Bytes per row; negative if rows are stored bottom-up
    pub fn pitch(&self) -> Result<i32> {
        self.with(|b| b.pitch)
    }

    /// Copy of the pixel data: `|pitch| * rows` bytes
    pub fn buffer(&self) -> Result<Vec<u8>> {
        self.with(|b| {
            let rows = usize::try_from(b.rows).unwrap_or(0);
            let len = to_usize(b.pitch.unsigned_abs()) * rows;
            // Safety: the engine allocates |pitch| * rows bytes.
            unsafe { ffi::copy_array(b.buffer, len, |x| x) }
        })
    }

    /// Number of gray levels, for [`PixelMode::Gray`]
    pub fn num_grays(&self) -> Result<i32> {
        self.with(|b| i32::from(b.num_grays))
    }

    pub fn pixel_mode(&self) -> Result<PixelMode> {
        self.with(|b| PixelMode::from_raw(u32::from(b.pixel_mode as u8)))
    }

    /// Palette mode
    ///
    /// Palette-based bitmaps are not produced by current engine versions;
    /// this always fails with [`UsageError::Unsupported`].
    pub fn palette_mode(&self) -> Result<u8> {
        Err(UsageError::Unsupported("bitmap palette").into())
    }

    /// Palette data
    ///
    /// Always fails with [`UsageError::Unsupported`]; see
    /// [`Bitmap::palette_mode`].
    pub fn palette(&self) -> Result<Vec<u8>> {
        Err(UsageError::Unsupported("bitmap palette").into())
    }

    /// Read one pixel's coverage, scaled to `0..=255`
    ///
    /// Supports [`PixelMode::Mono`] and [`PixelMode::Gray`]; other modes
    /// fail with [`UsageError::Unsupported`]. Out-of-range coordinates
    /// yield `None`.
    pub fn coverage(&self, x: u32, y: u32) -> Result<Option<u8>> {
        let mode = self.pixel_mode()?;
        self.with(|b| {
            let (rows, width) = (
                usize::try_from(b.rows).unwrap_or(0),
                usize::try_from(b.width).unwrap_or(0),
            );
            let (x, y) = (to_usize(x), to_usize(y));
            if x >= width || y >= rows || b.buffer.is_null() {
                return Ok(None);
            }
            let pitch = to_usize(b.pitch.unsigned_abs());
            let row = if b.pitch < 0 { rows - 1 - y } else { y };
            let index = match mode {
                PixelMode::Mono => row * pitch + x / 8,
                PixelMode::Gray => row * pitch + x,
                _ => return Err(UsageError::Unsupported("coverage for this pixel mode").into()),
            };
            // Safety: index < |pitch| * rows.
            let byte = unsafe { *b.buffer.add(index) };
            Ok(Some(match mode {
                PixelMode::Mono => {
                    if byte & (0x80 >> (x % 8)) != 0 {
                        255
                    } else {
                        0
                    }
                }
                _ => byte,
            }))
        })?
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Slot(_) => "slot",
            Source::Glyph(_) => "glyph",
        };
        f.debug_struct("Bitmap")
            .field("source", &source)
            .field("rows", &self.rows().ok())
            .field("width", &self.width().ok())
            .field("pitch", &self.pitch().ok())
            .finish()
    }
}
