// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Character maps

use crate::conv::try_u32;
use crate::engine::Engine;
use crate::error::{LifetimeError, Result};
use crate::face::{FaceEntry, FaceKey};
use crate::ffi::{self, FT_CharMap, FT_CharMapRec, FT_Face, FT_UInt, FT_ULong};
use crate::flags::Encoding;
use crate::handle::Borrowed;
use std::fmt;

/// First entry of the selected charmap
///
/// # Safety
///
/// `face` must be live.
pub(crate) unsafe fn first_char(face: FT_Face) -> Result<(u32, u32)> {
    let mut index: FT_UInt = 0;
    let code = ffi::FT_Get_First_Char(face, &mut index);
    Ok((try_u32(code)?, index))
}

/// Entry following `code` in the selected charmap
///
/// # Safety
///
/// `face` must be live.
pub(crate) unsafe fn next_char(face: FT_Face, code: u32) -> Result<(u32, u32)> {
    let mut index: FT_UInt = 0;
    let code = ffi::FT_Get_Next_Char(face, FT_ULong::from(code), &mut index);
    Ok((try_u32(code)?, index))
}

/// A view of one charmap of a [`Face`](crate::Face)
///
/// Charmaps live as long as their face.
#[derive(Clone)]
pub struct CharMap {
    face: Borrowed<FaceEntry>,
    index: i32,
}

impl CharMap {
    pub(crate) fn new(face: Borrowed<FaceEntry>, index: i32) -> Self {
        CharMap { face, index }
    }

    pub(crate) fn face_key(&self) -> FaceKey {
        self.face.key()
    }

    pub(crate) fn engine(&self) -> &Engine {
        self.face.engine()
    }

    pub(crate) fn raw(&self) -> Result<FT_CharMap> {
        let index = self.index;
        let raw = self.face.with(|entry| {
            // Safety: the face is live while its entry exists.
            let face = unsafe { &*entry.face };
            if index < 0 || index >= face.num_charmaps {
                return None;
            }
            // Safety: index is within the charmaps array.
            Some(unsafe { *face.charmaps.offset(index as isize) })
        })?;
        Ok(raw.ok_or(LifetimeError::Stale)?)
    }

    fn rec<T>(&self, f: impl FnOnce(&FT_CharMapRec) -> T) -> Result<T> {
        let raw = self.raw()?;
        // Safety: raw is owned by the face, checked live by `raw()`.
        Ok(f(unsafe { &*raw }))
    }

    /// Position of this charmap within the face's list
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn encoding(&self) -> Result<Encoding> {
        self.rec(|cm| Encoding::from_raw(cm.encoding))
    }

    /// Platform identifier, as in the TrueType `cmap` table
    pub fn platform_id(&self) -> Result<u16> {
        self.rec(|cm| cm.platform_id)
    }

    /// Platform-specific encoding identifier
    pub fn encoding_id(&self) -> Result<u16> {
        self.rec(|cm| cm.encoding_id)
    }
}

impl PartialEq for CharMap {
    fn eq(&self, other: &Self) -> bool {
        self.face.key() == other.face.key() && self.index == other.index
    }
}

impl fmt::Debug for CharMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharMap")
            .field("index", &self.index)
            .field("encoding", &self.encoding().ok())
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
enum Cursor {
    Start,
    After(u32),
    Done,
}

/// Iterator over `(code, glyph index)` pairs of a face's selected charmap
///
/// Produced by [`Face::chars`](crate::Face::chars). Each step queries the
/// engine afresh, so the face must stay alive; if it is released, the next
/// step yields an error and iteration ends.
pub struct Chars {
    face: Borrowed<FaceEntry>,
    cursor: Cursor,
}

impl Chars {
    pub(crate) fn new(face: Borrowed<FaceEntry>) -> Self {
        Chars {
            face,
            cursor: Cursor::Start,
        }
    }
}

impl Iterator for Chars {
    type Item = Result<(u32, u32)>;

    fn next(&mut self) -> Option<Self::Item> {
        let after = match self.cursor {
            Cursor::Start => None,
            Cursor::After(code) => Some(code),
            Cursor::Done => return None,
        };
        let step = self.face.with(|entry| entry.face).map_err(Into::into).and_then(|face| {
            // Safety: the face is live (checked by `with`).
            match after {
                None => unsafe { first_char(face) },
                Some(code) => unsafe { next_char(face, code) },
            }
        });
        match step {
            Ok((code, index)) if index != 0 => {
                self.cursor = Cursor::After(code);
                Some(Ok((code, index)))
            }
            Ok(_) => {
                self.cursor = Cursor::Done;
                None
            }
            Err(err) => {
                self.cursor = Cursor::Done;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Chars {}
