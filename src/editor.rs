use image::DynamicImage;

use crate::crop::CropEngine;
use crate::error::EditorError;
use crate::filters::{self, FilterParams, Preset};
use crate::history::{History, HistoryEntry};
use crate::io::{self, LoadedImage};

/// Details for the info line, captured at load time.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    pub source_label: String,
    pub byte_size: Option<u64>,
}

/// The single owner of all mutable editor state. Everything runs on the UI
/// thread inside event handlers; there is no other access path.
pub struct EditorState {
    /// The image as it was loaded, kept for `reset`.
    original: Option<DynamicImage>,
    /// The working image: transforms and crops bake into this, filters do not.
    current: Option<DynamicImage>,
    pub filters: FilterParams,
    pub crop: CropEngine,
    history: History,
    pub info: Option<ImageInfo>,
    /// Bumped on every visible-state change so the view knows to re-render.
    revision: u64,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            original: None,
            current: None,
            filters: FilterParams::default(),
            crop: CropEngine::new(),
            history: History::new(),
            info: None,
            revision: 0,
        }
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&DynamicImage> {
        self.current.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(|i| (i.width(), i.height()))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The displayed surface: current image with the live filters applied.
    pub fn composited(&self) -> Option<DynamicImage> {
        self.current.as_ref().map(|img| filters::render(img, &self.filters))
    }

    /// Install a decoded image as the new working state and snapshot it.
    pub fn load(&mut self, loaded: LoadedImage) -> Result<(), EditorError> {
        log::info!(
            "loaded {}x{} image ({})",
            loaded.image.width(),
            loaded.image.height(),
            loaded.source_label
        );
        self.crop.cancel();
        self.original = Some(loaded.image.clone());
        self.current = Some(loaded.image);
        self.filters = FilterParams::default();
        self.info = Some(ImageInfo {
            source_label: loaded.source_label,
            byte_size: loaded.byte_size,
        });
        self.snapshot()?;
        self.touch();
        Ok(())
    }

    pub fn rotate_90(&mut self) -> Result<(), EditorError> {
        self.transform(|img| img.rotate90())
    }

    pub fn flip_horizontal(&mut self) -> Result<(), EditorError> {
        self.transform(|img| img.fliph())
    }

    pub fn flip_vertical(&mut self) -> Result<(), EditorError> {
        self.transform(|img| img.flipv())
    }

    fn transform(
        &mut self,
        op: impl FnOnce(&DynamicImage) -> DynamicImage,
    ) -> Result<(), EditorError> {
        let Some(img) = self.current.as_ref() else {
            return Ok(()); // no image loaded: silently ignore
        };
        // A pending selection is meaningless against the transformed surface.
        self.crop.cancel();
        self.current = Some(op(img));
        self.snapshot()?;
        self.touch();
        Ok(())
    }

    /// Back to the originally loaded pixels and identity filters.
    pub fn reset(&mut self) -> Result<(), EditorError> {
        let Some(original) = self.original.clone() else {
            return Ok(());
        };
        self.crop.cancel();
        self.current = Some(original);
        self.filters = FilterParams::default();
        self.snapshot()?;
        self.touch();
        Ok(())
    }

    /// Live slider updates: re-render but no history entry.
    pub fn set_filters(&mut self, params: FilterParams) {
        if self.current.is_some() && self.filters != params {
            self.filters = params;
            self.touch();
        }
    }

    /// Presets replace the whole slider set and are a snapshot point.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), EditorError> {
        if self.current.is_none() {
            return Ok(());
        }
        self.filters = preset.params();
        self.snapshot()?;
        self.touch();
        Ok(())
    }

    /// Enter crop mode with the default centered selection.
    pub fn enter_crop(&mut self) {
        if let Some((w, h)) = self.dimensions() {
            self.crop.begin(w, h);
            self.touch();
        }
    }

    /// Confirm the selection: rasterize the sub-region of the composited
    /// surface into the new working image. The filters are baked into those
    /// pixels, so the sliders go back to identity.
    pub fn confirm_crop(&mut self) -> Result<(), EditorError> {
        let Some(composited) = self.composited() else {
            self.crop.cancel();
            return Ok(());
        };
        let Some((x, y, w, h)) = self.crop.commit() else {
            return Ok(());
        };
        log::info!("crop commit: {w}x{h} at ({x}, {y})");
        self.current = Some(composited.crop_imm(x, y, w, h));
        self.filters = FilterParams::default();
        self.snapshot()?;
        self.touch();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        let Some(entry) = self.history.undo() else {
            return Ok(());
        };
        let image = io::decode_png(&entry.png)?;
        let filters = entry.filters;
        self.restore(image, filters);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        let Some(entry) = self.history.redo() else {
            return Ok(());
        };
        let image = io::decode_png(&entry.png)?;
        let filters = entry.filters;
        self.restore(image, filters);
        Ok(())
    }

    /// Every restore is a full replacement of surface and filter set.
    fn restore(&mut self, image: DynamicImage, filters: FilterParams) {
        self.crop.cancel();
        self.current = Some(image);
        self.filters = filters;
        self.touch();
    }

    /// Snapshot the working image (pre-filter) together with the live filter
    /// params; the pair fully reproduces the displayed state.
    fn snapshot(&mut self) -> Result<(), EditorError> {
        let Some(img) = self.current.as_ref() else {
            return Ok(());
        };
        let png = io::encode_png(img)?;
        self.history.push(HistoryEntry::new(png, self.filters));
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
