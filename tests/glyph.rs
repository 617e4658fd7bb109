// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Glyph slot, rendering and standalone glyphs

use ft2::*;
use std::path::PathBuf;

fn sans(engine: &Engine, px: u32) -> Face {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/DejaVuSans.ttf");
    let mut face = Face::open(engine, path).unwrap();
    face.set_pixel_sizes(0, px).unwrap();
    face
}

#[test]
fn render() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let mut slot = face.glyph().unwrap().unwrap();
    assert_eq!(slot.format().unwrap(), GlyphFormat::Outline);

    slot.render(RenderMode::Normal).unwrap();
    assert_eq!(slot.format().unwrap(), GlyphFormat::Bitmap);
    let bitmap = slot.bitmap().unwrap();
    let (width, rows) = (bitmap.width().unwrap(), bitmap.rows().unwrap());
    assert!(width > 0 && rows > 0);
    assert_eq!(bitmap.pixel_mode().unwrap(), PixelMode::Gray);
    assert_eq!(bitmap.num_grays().unwrap(), 256);

    let pitch = bitmap.pitch().unwrap();
    assert!(pitch.unsigned_abs() >= width);
    let buffer = bitmap.buffer().unwrap();
    assert_eq!(buffer.len(), pitch.unsigned_abs() as usize * rows as usize);
    assert!(buffer.iter().any(|&b| b != 0));
    assert!(slot.bitmap_top().unwrap() > 0);

    // Rendering a rendered slot changes nothing
    slot.render(RenderMode::Normal).unwrap();
    let again = slot.bitmap().unwrap();
    assert_eq!(again.width().unwrap(), width);
    assert_eq!(again.rows().unwrap(), rows);
    assert_eq!(again.buffer().unwrap(), buffer);
}

#[test]
fn render_mono() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 24);
    face.load_char('H' as u32, LoadFlags::DEFAULT).unwrap();
    let mut slot = face.glyph().unwrap().unwrap();
    slot.render(RenderMode::Mono).unwrap();

    let bitmap = slot.bitmap().unwrap();
    assert_eq!(bitmap.pixel_mode().unwrap(), PixelMode::Mono);
    let width = bitmap.width().unwrap();
    assert!(bitmap.pitch().unwrap().unsigned_abs() >= width.div_ceil(8));

    let mut ink = 0;
    for y in 0..bitmap.rows().unwrap() {
        for x in 0..width {
            match bitmap.coverage(x, y).unwrap() {
                Some(0) => (),
                Some(255) => ink += 1,
                other => panic!("unexpected coverage {other:?}"),
            }
        }
    }
    assert!(ink > 0);
    assert_eq!(bitmap.coverage(width, 0).unwrap(), None);
}

#[test]
fn render_empty_slot() {
    let engine = Engine::init().unwrap();
    let face = sans(&engine, 16);
    let mut slot = face.glyph().unwrap().unwrap();
    assert!(slot.is_empty().unwrap());
    assert_eq!(
        slot.render(RenderMode::Normal).unwrap_err(),
        Error::Usage(UsageError::SlotEmpty)
    );
    assert_eq!(slot.glyph().unwrap_err(), Error::Usage(UsageError::SlotEmpty));
}

#[test]
fn palette_unsupported() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    face.load_char('a' as u32, LoadFlags::RENDER).unwrap();
    let bitmap = face.glyph().unwrap().unwrap().bitmap().unwrap();
    assert!(matches!(
        bitmap.palette(),
        Err(Error::Usage(UsageError::Unsupported(_)))
    ));
    assert!(matches!(
        bitmap.palette_mode(),
        Err(Error::Usage(UsageError::Unsupported(_)))
    ));
}

#[test]
fn slot_outline() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 32);
    face.load_char('O' as u32, LoadFlags::NO_HINTING).unwrap();
    let slot = face.glyph().unwrap().unwrap();
    let outline = slot.outline().unwrap();

    // 'O' has an outer and an inner contour
    assert_eq!(outline.n_contours().unwrap(), 2);
    let n = usize::try_from(outline.n_points().unwrap()).unwrap();
    assert_eq!(outline.points().unwrap().len(), n);
    assert_eq!(outline.tags().unwrap().len(), n);
    let contours = outline.contours().unwrap();
    assert_eq!(contours.len(), 2);
    assert_eq!(usize::try_from(*contours.last().unwrap()).unwrap(), n - 1);

    let cbox = outline.cbox().unwrap();
    assert!(cbox.width() > 0 && cbox.height() > 0);
}

#[test]
fn subglyphs() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    // 'A' is a simple glyph: no components
    face.load_char('A' as u32, LoadFlags::NO_RECURSE).unwrap();
    let slot = face.glyph().unwrap().unwrap();
    assert_eq!(slot.num_subglyphs().unwrap(), 0);
    assert!(slot.subglyphs().unwrap().is_empty());

    // 'Á' is 'A' (glyph 36) plus an accent
    face.load_char(0xC1, LoadFlags::NO_RECURSE).unwrap();
    assert_eq!(slot.format().unwrap(), GlyphFormat::Composite);
    assert_eq!(slot.num_subglyphs().unwrap(), 2);
    let parts = slot.subglyphs().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].index, 36);
    assert_ne!(parts[1].index, 36);
}

#[test]
fn control_data() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    let slot = face.glyph().unwrap().unwrap();

    face.load_char('a' as u32, LoadFlags::NO_HINTING).unwrap();
    assert_eq!(slot.control_len().unwrap(), 0);
    assert!(slot.control_data().unwrap().is_empty());
    assert_eq!(slot.lsb_delta().unwrap(), 0);
    assert_eq!(slot.rsb_delta().unwrap(), 0);

    face.load_char('a' as u32, LoadFlags::DEFAULT).unwrap();
    let len = usize::try_from(slot.control_len().unwrap()).unwrap();
    assert_eq!(slot.control_data().unwrap().len(), len);
    slot.lsb_delta().unwrap();
    slot.rsb_delta().unwrap();
}

#[test]
fn extract() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    face.load_char('g' as u32, LoadFlags::DEFAULT).unwrap();
    let slot = face.glyph().unwrap().unwrap();

    let glyph = slot.glyph().unwrap();
    assert_eq!(engine.num_glyphs(), 1);
    assert_eq!(glyph.format().unwrap(), GlyphFormat::Outline);
    assert_eq!(glyph.kind().unwrap(), GlyphKind::Outline);
    // Glyph advances are 16.16; the slot's are 26.6
    assert_eq!(glyph.advance().unwrap().x, slot.advance().unwrap().x << 10);

    let copy = glyph.copy().unwrap();
    assert_eq!(engine.num_glyphs(), 2);
    assert_eq!(copy.format().unwrap(), glyph.format().unwrap());
    assert_eq!(copy.advance().unwrap(), glyph.advance().unwrap());
    assert_eq!(copy.cbox(BBoxMode::Pixels).unwrap(), glyph.cbox(BBoxMode::Pixels).unwrap());

    let outline = glyph.as_outline().unwrap();
    assert_eq!(outline.points().unwrap(), copy.as_outline().unwrap().points().unwrap());
    assert!(matches!(
        glyph.as_bitmap(),
        Err(Error::Usage(UsageError::WrongKind { .. }))
    ));

    copy.release().unwrap();
    assert_eq!(engine.num_glyphs(), 1);
    drop(glyph);
    assert_eq!(engine.num_glyphs(), 0);
}

#[test]
fn transform() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    face.load_char('l' as u32, LoadFlags::DEFAULT).unwrap();
    let mut glyph = face.glyph().unwrap().unwrap().glyph().unwrap();
    let before = glyph.cbox(BBoxMode::Subpixels).unwrap();

    // Translate by 2 pixels right, 1 down
    glyph.transform(None, Some(Vector::new(128, -64))).unwrap();
    let after = glyph.cbox(BBoxMode::Subpixels).unwrap();
    assert_eq!(after.x_min, before.x_min + 128);
    assert_eq!(after.y_max, before.y_max - 64);

    glyph.transform(Some(&Matrix::scale(2.0, 1.0)), None).unwrap();
    let scaled = glyph.cbox(BBoxMode::Subpixels).unwrap();
    assert_eq!(scaled.width(), 2 * after.width());
}

#[test]
fn to_bitmap() {
    let engine = Engine::init().unwrap();
    let mut face = sans(&engine, 16);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let mut glyph = face.glyph().unwrap().unwrap().glyph().unwrap();
    let outline = glyph.as_outline().unwrap();

    let original = glyph.to_bitmap(RenderMode::Normal, None, false).unwrap().unwrap();
    assert_eq!(engine.num_glyphs(), 2);
    assert_eq!(original.kind().unwrap(), GlyphKind::Outline);
    assert_eq!(glyph.kind().unwrap(), GlyphKind::Bitmap);
    assert_eq!(outline.n_points().unwrap_err(), Error::Lifetime(LifetimeError::Stale));

    let bitmap_glyph = glyph.as_bitmap().unwrap();
    let bitmap = bitmap_glyph.bitmap().unwrap();
    assert!(bitmap.width().unwrap() > 0 && bitmap.rows().unwrap() > 0);
    assert!(bitmap_glyph.top().unwrap() > 0);

    // Already a bitmap: nothing happens
    assert!(glyph.to_bitmap(RenderMode::Normal, None, true).unwrap().is_none());
    assert!(bitmap.width().is_ok());

    let mut other = original.copy().unwrap();
    assert!(other.to_bitmap(RenderMode::Mono, None, true).unwrap().is_none());
    assert_eq!(other.as_bitmap().unwrap().bitmap().unwrap().pixel_mode().unwrap(), PixelMode::Mono);
    assert_eq!(engine.num_glyphs(), 3);
}
