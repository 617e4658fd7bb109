// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Native call surface
//!
//! Declarations come from `freetype-sys`, which also links the library.
//! Entry points it does not declare are listed here.

#![allow(non_snake_case)]

pub(crate) use freetype_sys::*;

extern "C" {
    pub(crate) fn FT_Library_Version(
        library: FT_Library,
        amajor: *mut FT_Int,
        aminor: *mut FT_Int,
        apatch: *mut FT_Int,
    );
}

/// `FT_GLYPH_FORMAT_SVG`: tag `'SVG '`
pub(crate) const FT_GLYPH_FORMAT_SVG: FT_Glyph_Format = 0x5356_4720;

/// Read a nullable C string owned by the engine
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string which stays valid
/// for the duration of this call.
pub(crate) unsafe fn c_string(ptr: *const std::os::raw::c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(
            std::ffi::CStr::from_ptr(ptr)
                .to_string_lossy()
                .into_owned(),
        )
    }
}

/// Copy a native array into a `Vec`
///
/// # Safety
///
/// `ptr` must be null (in which case `len` is ignored) or valid for reading
/// `len` elements.
pub(crate) unsafe fn copy_array<T: Copy, U>(ptr: *const T, len: usize, f: impl Fn(T) -> U) -> Vec<U> {
    if ptr.is_null() || len == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(ptr, len)
            .iter()
            .map(|x| f(*x))
            .collect()
    }
}
