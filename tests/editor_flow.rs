//! End-to-end editor flows against synthetic images: load, transform, crop,
//! and walk the history in both directions.

use eframe::egui::Pos2;
use image::{DynamicImage, Rgba, RgbaImage};
use retouch::editor::EditorState;
use retouch::filters::{FilterParams, Preset};
use retouch::io::LoadedImage;

fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 2) as u8, (y * 2) as u8, 99, 255])
    }))
}

fn load(editor: &mut EditorState, w: u32, h: u32) {
    editor
        .load(LoadedImage {
            image: gradient(w, h),
            source_label: "TEST".into(),
            byte_size: None,
        })
        .unwrap();
}

#[test]
fn load_pushes_the_first_snapshot() {
    let mut editor = EditorState::new();
    assert!(!editor.has_image());
    load(&mut editor, 100, 80);
    assert_eq!(editor.dimensions(), Some((100, 80)));
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
}

#[test]
fn edits_before_any_image_are_silent_noops() {
    let mut editor = EditorState::new();
    editor.rotate_90().unwrap();
    editor.flip_horizontal().unwrap();
    editor.reset().unwrap();
    editor.enter_crop();
    editor.confirm_crop().unwrap();
    editor.undo().unwrap();
    editor.redo().unwrap();
    assert!(!editor.has_image());
    assert!(editor.history().is_empty());
}

#[test]
fn rotate_swaps_dimensions_and_snapshots() {
    let mut editor = EditorState::new();
    load(&mut editor, 120, 60);
    editor.rotate_90().unwrap();
    assert_eq!(editor.dimensions(), Some((60, 120)));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn crop_commit_produces_exact_sub_surface_and_one_entry() {
    let mut editor = EditorState::new();
    load(&mut editor, 200, 200);
    let before = editor.history().len();

    editor.enter_crop();
    // Drag a fresh selection from the origin corner out to (50, 50). The
    // default selection sits centered, so the press at (0, 0) lands outside
    // its handles and starts a new rect.
    editor.crop.pointer_down(Pos2::new(0.0, 0.0));
    editor.crop.pointer_move(Pos2::new(50.0, 50.0));
    editor.crop.pointer_up();
    editor.confirm_crop().unwrap();

    assert_eq!(editor.dimensions(), Some((50, 50)));
    assert_eq!(editor.history().len(), before + 1);
    assert!(!editor.crop.is_active());
}

#[test]
fn crop_bakes_filters_and_resets_sliders() {
    let mut editor = EditorState::new();
    load(&mut editor, 100, 100);
    editor.set_filters(FilterParams {
        brightness: 160,
        ..Default::default()
    });
    let brightened = editor.composited().unwrap().to_rgba8();

    editor.enter_crop();
    editor.confirm_crop().unwrap();

    // Sliders are back at identity but the pixels kept the brightness.
    assert_eq!(editor.filters, FilterParams::default());
    let (w, h) = editor.dimensions().unwrap();
    assert_eq!((w, h), (50, 50)); // default selection is the centered half
    let cropped = editor.current().unwrap().to_rgba8();
    let sample = cropped.get_pixel(0, 0);
    assert_eq!(sample, brightened.get_pixel(25, 25));
}

#[test]
fn undo_restores_pre_crop_surface_and_redo_returns() {
    let mut editor = EditorState::new();
    load(&mut editor, 200, 100);
    editor.enter_crop();
    editor.confirm_crop().unwrap();
    assert_eq!(editor.dimensions(), Some((100, 50)));

    editor.undo().unwrap();
    assert_eq!(editor.dimensions(), Some((200, 100)));
    editor.redo().unwrap();
    assert_eq!(editor.dimensions(), Some((100, 50)));
}

#[test]
fn undo_restores_filter_snapshot_wholesale() {
    let mut editor = EditorState::new();
    load(&mut editor, 64, 64);
    editor.apply_preset(Preset::Cold).unwrap();
    editor.apply_preset(Preset::Warm).unwrap();
    assert_eq!(editor.filters, Preset::Warm.params());

    editor.undo().unwrap();
    assert_eq!(editor.filters, Preset::Cold.params());
    editor.undo().unwrap();
    assert_eq!(editor.filters, FilterParams::default());
}

#[test]
fn mutation_after_undo_discards_the_redo_branch() {
    let mut editor = EditorState::new();
    load(&mut editor, 80, 80);
    editor.flip_horizontal().unwrap();
    editor.flip_vertical().unwrap();
    editor.undo().unwrap();
    assert!(editor.can_redo());

    editor.rotate_90().unwrap();
    assert!(!editor.can_redo());
}

#[test]
fn reset_recovers_the_originally_loaded_pixels() {
    let mut editor = EditorState::new();
    load(&mut editor, 90, 70);
    let original = editor.current().unwrap().to_rgba8();

    editor.rotate_90().unwrap();
    editor.apply_preset(Preset::Sepia).unwrap();
    editor.enter_crop();
    editor.confirm_crop().unwrap();

    editor.reset().unwrap();
    assert_eq!(editor.filters, FilterParams::default());
    assert_eq!(editor.current().unwrap().to_rgba8(), original);
}

#[test]
fn loading_a_new_image_cancels_an_active_crop() {
    let mut editor = EditorState::new();
    load(&mut editor, 100, 100);
    editor.enter_crop();
    assert!(editor.crop.is_active());
    load(&mut editor, 40, 40);
    assert!(!editor.crop.is_active());
}
