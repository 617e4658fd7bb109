// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font faces

use crate::charmap::{first_char, next_char, CharMap, Chars};
use crate::conv::{pos, BBox, F26Dot6, Matrix, Vector};
use crate::engine::{Engine, EngineInner};
use crate::error::{check, EngineError, LifetimeError, Result, UsageError};
use crate::ffi::{self, c_string, FT_Face, FT_FaceRec, FT_Long, FT_UInt, FT_ULong};
use crate::flags::{Encoding, FaceFlags, KerningMode, LoadFlags, StyleFlags};
use crate::handle::{Arena, Owned, Resource};
use crate::size::Size;
use crate::slot::GlyphSlot;
use easy_cast::Conv;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;

slotmap::new_key_type! {
    pub(crate) struct FaceKey;
}

/// Arena entry for an open face
pub(crate) struct FaceEntry {
    pub(crate) face: FT_Face,
    /// Bumped whenever the glyph slot contents are replaced
    slot_epoch: u64,
    /// Backing store of memory faces; must outlive `face`
    data: Option<Box<[u8]>>,
}

impl FaceEntry {
    pub(crate) fn touch_slot(&mut self) {
        self.slot_epoch += 1;
    }
}

impl Resource for FaceEntry {
    type Key = FaceKey;

    fn arena(engine: &EngineInner) -> &Arena<FaceKey, Self> {
        &engine.faces
    }

    fn epoch(&self) -> u64 {
        self.slot_epoch
    }

    fn release(self) -> Result<(), EngineError> {
        // Safety: the entry was removed from its arena, so this is the only
        // release of `face`. FT_Done_Face also frees the slot, size and
        // charmaps.
        let result = check(unsafe { ffi::FT_Done_Face(self.face) });
        drop(self.data);
        log::debug!("face released");
        result
    }
}

/// A fixed bitmap strike
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitmapSize {
    /// Vertical distance between baselines, in pixels
    pub height: i16,
    /// Average glyph width, in pixels
    pub width: i16,
    /// Nominal size
    pub size: F26Dot6,
    pub x_ppem: F26Dot6,
    pub y_ppem: F26Dot6,
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString, UsageError> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| UsageError::InvalidPath)
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString, UsageError> {
    let path = path.to_str().ok_or(UsageError::InvalidPath)?;
    CString::new(path).map_err(|_| UsageError::InvalidPath)
}

/// An open font face
///
/// A `Face` owns its native object: dropping it (or calling [`Face::close`])
/// releases the face along with its glyph slot, size and charmaps. Views of
/// those ([`GlyphSlot`], [`Size`], [`CharMap`]) report
/// [`LifetimeError::OwnerReleased`] afterwards. [`Glyph`](crate::Glyph)s
/// extracted from the slot are independent and stay usable.
///
/// Values are in font design units unless stated otherwise.
#[derive(Debug)]
pub struct Face {
    handle: Owned<FaceEntry>,
}

impl Face {
    /// Open the first face of a font file
    pub fn open(engine: &Engine, path: impl AsRef<Path>) -> Result<Face> {
        Face::open_index(engine, path, 0)
    }

    /// Open face `index` of a font file (or collection)
    pub fn open_index(engine: &Engine, path: impl AsRef<Path>, index: u32) -> Result<Face> {
        let library = engine.library()?;
        let path = path.as_ref();
        let c_path = path_to_cstring(path)?;
        let mut face: FT_Face = ptr::null_mut();
        // Safety: library is live; c_path is NUL-terminated.
        let code = unsafe {
            ffi::FT_New_Face(library, c_path.as_ptr(), FT_Long::try_conv(index)?, &mut face)
        };
        check(code).inspect_err(|err| {
            log::debug!("failed to open face {index} of {}: {err}", path.display());
        })?;
        log::debug!("opened face {index} of {}", path.display());
        Ok(Face::adopt(engine, face, None))
    }

    /// Open the first face of an in-memory font
    ///
    /// The data is moved (or copied) into storage owned by the face, so the
    /// caller's buffer need not outlive it.
    pub fn from_memory(engine: &Engine, data: impl Into<Vec<u8>>) -> Result<Face> {
        Face::from_memory_index(engine, data, 0)
    }

    /// Open face `index` of an in-memory font
    pub fn from_memory_index(engine: &Engine, data: impl Into<Vec<u8>>, index: u32) -> Result<Face> {
        let library = engine.library()?;
        let data: Box<[u8]> = data.into().into_boxed_slice();
        let mut face: FT_Face = ptr::null_mut();
        // Safety: library is live; `data` is kept alive by the entry until
        // after FT_Done_Face. Moving the box does not move its contents.
        check(unsafe {
            ffi::FT_New_Memory_Face(
                library,
                data.as_ptr(),
                FT_Long::try_conv(data.len())?,
                FT_Long::try_conv(index)?,
                &mut face,
            )
        })?;
        log::debug!("opened face {index} from {} bytes", data.len());
        Ok(Face::adopt(engine, face, Some(data)))
    }

    fn adopt(engine: &Engine, face: FT_Face, data: Option<Box<[u8]>>) -> Self {
        let entry = FaceEntry {
            face,
            slot_epoch: 0,
            data,
        };
        Face {
            handle: Owned::new(engine, entry),
        }
    }

    /// The engine this face was opened with
    pub fn engine(&self) -> &Engine {
        self.handle.engine()
    }

    pub(crate) fn key(&self) -> FaceKey {
        self.handle.key()
    }

    /// True until the face is released
    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }

    /// Release the face now
    ///
    /// Errors reported by the engine are returned here; when a face is
    /// dropped instead they can only be logged.
    pub fn close(self) -> Result<()> {
        self.handle.release()
    }

    fn raw(&self) -> Result<FT_Face, LifetimeError> {
        self.handle.with(|entry| entry.face)
    }

    fn rec<T>(&self, f: impl FnOnce(&FT_FaceRec) -> T) -> Result<T> {
        // Safety: the face is live while its entry exists.
        Ok(self.handle.with(|entry| f(unsafe { &*entry.face }))?)
    }

    fn touch_slot(&self) -> Result<(), LifetimeError> {
        self.handle.with_mut(FaceEntry::touch_slot)
    }

    /// Number of faces in the font file
    pub fn num_faces(&self) -> Result<i64> {
        self.rec(|f| i64::from(f.num_faces))
    }

    /// Index of this face within its font file
    pub fn face_index(&self) -> Result<i64> {
        self.rec(|f| i64::from(f.face_index) & 0xFFFF)
    }

    pub fn face_flags(&self) -> Result<FaceFlags> {
        self.rec(|f| FaceFlags::from_bits_retain(f.face_flags as u32))
    }

    pub fn style_flags(&self) -> Result<StyleFlags> {
        self.rec(|f| StyleFlags::from_bits_retain(f.style_flags as u32 & 0xFFFF))
    }

    fn has_flag(&self, flag: FaceFlags) -> Result<bool> {
        Ok(self.face_flags()?.contains(flag))
    }

    /// Outlines are available (glyphs may be scaled to any size)
    pub fn is_scalable(&self) -> Result<bool> {
        self.has_flag(FaceFlags::SCALABLE)
    }

    /// Embedded bitmap strikes are available; see [`Face::available_sizes`]
    pub fn has_fixed_sizes(&self) -> Result<bool> {
        self.has_flag(FaceFlags::FIXED_SIZES)
    }

    pub fn is_fixed_width(&self) -> Result<bool> {
        self.has_flag(FaceFlags::FIXED_WIDTH)
    }

    pub fn has_horizontal_metrics(&self) -> Result<bool> {
        self.has_flag(FaceFlags::HORIZONTAL)
    }

    pub fn has_vertical_metrics(&self) -> Result<bool> {
        self.has_flag(FaceFlags::VERTICAL)
    }

    pub fn is_sfnt(&self) -> Result<bool> {
        self.has_flag(FaceFlags::SFNT)
    }

    /// The face carries a kerning table usable by [`Face::kerning`]
    pub fn has_kerning(&self) -> Result<bool> {
        self.has_flag(FaceFlags::KERNING)
    }

    pub fn has_glyph_names(&self) -> Result<bool> {
        self.has_flag(FaceFlags::GLYPH_NAMES)
    }

    pub fn is_external_stream(&self) -> Result<bool> {
        self.has_flag(FaceFlags::EXTERNAL_STREAM)
    }

    pub fn has_fast_glyphs(&self) -> Result<bool> {
        self.has_flag(FaceFlags::FAST_GLYPHS)
    }

    pub fn is_bold(&self) -> Result<bool> {
        Ok(self.style_flags()?.contains(StyleFlags::BOLD))
    }

    pub fn is_italic(&self) -> Result<bool> {
        Ok(self.style_flags()?.contains(StyleFlags::ITALIC))
    }

    /// Number of glyphs in the face
    pub fn num_glyphs(&self) -> Result<i64> {
        self.rec(|f| i64::from(f.num_glyphs))
    }

    /// Family name, e.g. "DejaVu Sans"
    pub fn family_name(&self) -> Result<Option<String>> {
        // Safety: the string is owned by the face, which is live.
        self.rec(|f| unsafe { c_string(f.family_name) })
    }

    /// Style name, e.g. "Bold"
    pub fn style_name(&self) -> Result<Option<String>> {
        // Safety: as above
        self.rec(|f| unsafe { c_string(f.style_name) })
    }

    pub fn num_fixed_sizes(&self) -> Result<usize> {
        self.rec(|f| usize::try_from(f.num_fixed_sizes).unwrap_or(0))
    }

    /// Embedded bitmap strikes
    pub fn available_sizes(&self) -> Result<Vec<BitmapSize>> {
        self.rec(|f| {
            let len = usize::try_from(f.num_fixed_sizes).unwrap_or(0);
            // Safety: the engine allocates `num_fixed_sizes` entries.
            unsafe {
                ffi::copy_array(f.available_sizes, len, |s| BitmapSize {
                    height: s.height,
                    width: s.width,
                    size: F26Dot6(pos(s.size)),
                    x_ppem: F26Dot6(pos(s.x_ppem)),
                    y_ppem: F26Dot6(pos(s.y_ppem)),
                })
            }
        })
    }

    pub fn num_charmaps(&self) -> Result<usize> {
        self.rec(|f| usize::try_from(f.num_charmaps).unwrap_or(0))
    }

    /// All charmaps of this face
    pub fn charmaps(&self) -> Result<Vec<CharMap>> {
        let n = self.rec(|f| f.num_charmaps)?;
        let view = self.handle.borrow()?;
        Ok((0..n).map(|i| CharMap::new(view.clone(), i)).collect())
    }

    /// Bounding box of all glyphs, in font units
    pub fn bbox(&self) -> Result<BBox> {
        self.rec(|f| BBox::from_raw(f.bbox))
    }

    /// Font units per EM square
    pub fn units_per_em(&self) -> Result<u16> {
        self.rec(|f| f.units_per_EM)
    }

    pub fn ascender(&self) -> Result<i16> {
        self.rec(|f| f.ascender)
    }

    /// Typographic descender (usually negative)
    pub fn descender(&self) -> Result<i16> {
        self.rec(|f| f.descender)
    }

    /// Default line spacing (baseline-to-baseline)
    pub fn height(&self) -> Result<i16> {
        self.rec(|f| f.height)
    }

    pub fn max_advance_width(&self) -> Result<i16> {
        self.rec(|f| f.max_advance_width)
    }

    pub fn max_advance_height(&self) -> Result<i16> {
        self.rec(|f| f.max_advance_height)
    }

    pub fn underline_position(&self) -> Result<i16> {
        self.rec(|f| f.underline_position)
    }

    pub fn underline_thickness(&self) -> Result<i16> {
        self.rec(|f| f.underline_thickness)
    }

    /// The glyph slot
    ///
    /// The view stays usable until the face is released.
    pub fn glyph(&self) -> Result<Option<GlyphSlot>> {
        if self.rec(|f| f.glyph.is_null())? {
            return Ok(None);
        }
        Ok(Some(GlyphSlot::new(self.handle.borrow()?)))
    }

    /// The active size
    pub fn size(&self) -> Result<Option<Size>> {
        if self.rec(|f| f.size.is_null())? {
            return Ok(None);
        }
        Ok(Some(Size::new(self.handle.borrow()?)))
    }

    /// The selected charmap, if any
    pub fn charmap(&self) -> Result<Option<CharMap>> {
        let charmap = self.rec(|f| f.charmap)?;
        if charmap.is_null() {
            return Ok(None);
        }
        // Safety: charmap belongs to the live face.
        let index = unsafe { ffi::FT_Get_Charmap_Index(charmap) };
        Ok(Some(CharMap::new(self.handle.borrow()?, index)))
    }

    /// Merge a supplementary metrics file (e.g. AFM for a Type 1 font)
    pub fn attach_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let face = self.raw()?;
        let c_path = path_to_cstring(path.as_ref())?;
        // Safety: face is live; c_path is NUL-terminated.
        check(unsafe { ffi::FT_Attach_File(face, c_path.as_ptr()) })?;
        Ok(())
    }

    /// Load glyph `index` into the slot
    ///
    /// Bitmap and outline views previously taken from the slot become stale.
    pub fn load_glyph(&mut self, index: u32, flags: LoadFlags) -> Result<()> {
        let face = self.raw()?;
        log::trace!("load_glyph({index}, {flags:?})");
        // Safety: face is live.
        let result = check(unsafe { ffi::FT_Load_Glyph(face, index, flags.bits()) });
        self.touch_slot()?;
        Ok(result?)
    }

    /// Load the glyph for character `code` (in the selected charmap) into
    /// the slot
    ///
    /// Returns the glyph index loaded. A code with no mapping loads glyph 0,
    /// the "missing glyph".
    pub fn load_char(&mut self, code: u32, flags: LoadFlags) -> Result<u32> {
        let face = self.raw()?;
        log::trace!("load_char({code:#x}, {flags:?})");
        // Safety: face is live.
        let index = unsafe {
            if (*face).charmap.is_null() {
                code
            } else {
                ffi::FT_Get_Char_Index(face, FT_ULong::from(code))
            }
        };
        // Safety: as above.
        let result = check(unsafe { ffi::FT_Load_Glyph(face, index, flags.bits()) });
        self.touch_slot()?;
        result?;
        Ok(index)
    }

    /// Glyph index of `code` in the selected charmap; 0 if undefined
    pub fn char_index(&self, code: u32) -> Result<u32> {
        let face = self.raw()?;
        // Safety: face is live.
        Ok(unsafe { ffi::FT_Get_Char_Index(face, FT_ULong::from(code)) })
    }

    /// Glyph index of the glyph named `name`; 0 if undefined
    pub fn name_index(&self, name: &str) -> Result<u32> {
        let face = self.raw()?;
        let name = CString::new(name)?;
        // Safety: face is live; name is NUL-terminated.
        Ok(unsafe { ffi::FT_Get_Name_Index(face, name.as_ptr()) })
    }

    /// Kerning between two glyphs
    ///
    /// Faces without a kerning table yield a zero vector.
    pub fn kerning(&self, left: u32, right: u32, mode: KerningMode) -> Result<Vector> {
        let face = self.raw()?;
        let mut v = ffi::FT_Vector::default();
        // Safety: face is live; v is a valid out-pointer.
        check(unsafe { ffi::FT_Get_Kerning(face, left, right, mode.to_raw(), &mut v) })?;
        Ok(Vector::from_raw(v))
    }

    /// Name of glyph `index`, if it has one
    ///
    /// Fails if the face carries no glyph names; see
    /// [`Face::has_glyph_names`].
    pub fn glyph_name(&self, index: u32) -> Result<Option<String>> {
        let face = self.raw()?;
        let mut buf = [0u8; 1024];
        // Safety: face is live; the engine writes at most `buf.len()` bytes
        // including the terminator.
        check(unsafe {
            ffi::FT_Get_Glyph_Name(face, index, buf.as_mut_ptr().cast(), buf.len() as FT_UInt)
        })?;
        let name = match CStr::from_bytes_until_nul(&buf) {
            Ok(s) => s.to_string_lossy().into_owned(),
            Err(_) => String::from_utf8_lossy(&buf).into_owned(),
        };
        Ok(if name.is_empty() { None } else { Some(name) })
    }

    /// PostScript name of the face
    pub fn postscript_name(&self) -> Result<Option<String>> {
        let face = self.raw()?;
        // Safety: face is live; the returned string is owned by the face.
        Ok(unsafe { c_string(ffi::FT_Get_Postscript_Name(face)) })
    }

    /// Select a charmap by encoding
    pub fn select_charmap(&mut self, encoding: Encoding) -> Result<()> {
        let face = self.raw()?;
        // Safety: face is live.
        check(unsafe { ffi::FT_Select_Charmap(face, encoding.to_raw()) })?;
        Ok(())
    }

    /// Select a charmap of this face
    pub fn set_charmap(&mut self, charmap: &CharMap) -> Result<()> {
        if charmap.face_key() != self.key() || charmap.engine() != self.engine() {
            return Err(UsageError::ForeignCharMap.into());
        }
        let face = self.raw()?;
        let raw = charmap.raw()?;
        // Safety: face is live and raw is one of its charmaps.
        check(unsafe { ffi::FT_Set_Charmap(face, raw) })?;
        Ok(())
    }

    /// First `(code, glyph index)` pair of the selected charmap
    ///
    /// A glyph index of 0 means the charmap is empty.
    pub fn first_char(&self) -> Result<(u32, u32)> {
        // Safety: face is live.
        unsafe { first_char(self.raw()?) }
    }

    /// The `(code, glyph index)` pair following `code` in the selected
    /// charmap
    ///
    /// A glyph index of 0 means iteration is complete.
    pub fn next_char(&self, code: u32) -> Result<(u32, u32)> {
        // Safety: face is live.
        unsafe { next_char(self.raw()?, code) }
    }

    /// Iterate over `(code, glyph index)` pairs of the selected charmap
    pub fn chars(&self) -> Result<Chars> {
        Ok(Chars::new(self.handle.borrow()?))
    }

    /// Collect the whole selected charmap
    ///
    /// Large charmaps (e.g. CJK fonts) yield tens of thousands of entries.
    pub fn char_map(&self) -> Result<BTreeMap<u32, u32>> {
        let face = self.raw()?;
        let mut map = BTreeMap::new();
        // Safety: face is live throughout; nothing here can release it.
        let (mut code, mut index) = unsafe { first_char(face)? };
        while index != 0 {
            map.insert(code, index);
            (code, index) = unsafe { next_char(face, code)? };
        }
        Ok(map)
    }

    /// Set the nominal size in points
    ///
    /// `width` and `height` are 26.6 points; a zero value copies the other.
    /// `hres` and `vres` are in dots per inch; zero means 72.
    pub fn set_char_size(&mut self, width: F26Dot6, height: F26Dot6, hres: u32, vres: u32) -> Result<()> {
        let face = self.raw()?;
        let (w, h) = (width.to_raw()?, height.to_raw()?);
        // Safety: face is live.
        check(unsafe { ffi::FT_Set_Char_Size(face, w, h, hres, vres) })?;
        Ok(())
    }

    /// Set the nominal size in pixels; a zero value copies the other
    pub fn set_pixel_sizes(&mut self, width: u32, height: u32) -> Result<()> {
        let face = self.raw()?;
        // Safety: face is live.
        check(unsafe { ffi::FT_Set_Pixel_Sizes(face, width, height) })?;
        Ok(())
    }

    /// Set the transform applied to subsequently loaded glyphs
    ///
    /// `None` resets the matrix to identity and the delta (26.6) to zero.
    pub fn set_transform(&mut self, matrix: Option<&Matrix>, delta: Option<Vector>) -> Result<()> {
        let face = self.raw()?;
        let mut matrix = matrix.map(Matrix::to_raw).transpose()?;
        let mut delta = delta.map(Vector::to_raw).transpose()?;
        let m = matrix.as_mut().map_or(ptr::null_mut(), |m| m as *mut _);
        let d = delta.as_mut().map_or(ptr::null_mut(), |d| d as *mut _);
        // Safety: face is live; both pointers are null or point to locals.
        unsafe { ffi::FT_Set_Transform(face, m, d) };
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bad_path() {
        let engine = Engine::init().unwrap();
        let err = Face::open(&engine, "/nonexistent/font.ttf").unwrap_err();
        assert_eq!(err.code(), Some(0x01));
        assert_eq!(err.to_string(), "cannot open resource");
        assert_eq!(engine.num_faces(), 0);
    }

    #[test]
    fn bad_data() {
        let engine = Engine::init().unwrap();
        let err = Face::from_memory(&engine, vec![0u8; 64]).unwrap_err();
        // The exact code varies between FreeType releases
        assert!(matches!(err, crate::Error::Engine(_)));
        assert_eq!(engine.num_faces(), 0);
    }

    #[test]
    fn path_with_nul() {
        let engine = Engine::init().unwrap();
        let err = Face::open(&engine, "bad\0path.ttf").unwrap_err();
        assert_eq!(err, crate::Error::Usage(UsageError::InvalidPath));
    }
}
