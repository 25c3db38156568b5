use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::EditorError;

/// A freshly decoded image plus the details shown in the info line.
#[derive(Debug)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub source_label: String,
    pub byte_size: Option<u64>,
}

pub fn load_from_path(path: &Path) -> Result<LoadedImage, EditorError> {
    let image = image::open(path)
        .map_err(|e| EditorError::InvalidInput(format!("{}: {e}", path.display())))?;
    let byte_size = std::fs::metadata(path).ok().map(|m| m.len());
    let source_label = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_uppercase())
        .unwrap_or_else(|| "IMAGE".into());
    Ok(LoadedImage {
        image,
        source_label,
        byte_size,
    })
}

/// Decode an in-memory payload (a dropped file with no path on disk).
pub fn load_from_bytes(bytes: &[u8], name: &str) -> Result<LoadedImage, EditorError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| EditorError::InvalidInput(format!("{name}: {e}")))?;
    let source_label = name
        .rsplit('.')
        .next()
        .map(|e| e.to_uppercase())
        .unwrap_or_else(|| "IMAGE".into());
    Ok(LoadedImage {
        image,
        source_label,
        byte_size: Some(bytes.len() as u64),
    })
}

/// Pull an image off the system clipboard. arboard hands back raw RGBA.
pub fn load_from_clipboard() -> Result<LoadedImage, EditorError> {
    let mut clip =
        arboard::Clipboard::new().map_err(|e| EditorError::ClipboardUnavailable(e.to_string()))?;
    let data = clip.get_image().map_err(|e| match e {
        arboard::Error::ContentNotAvailable => {
            EditorError::InvalidInput("no image on the clipboard".into())
        }
        other => EditorError::ClipboardUnavailable(other.to_string()),
    })?;
    let (w, h) = (data.width as u32, data.height as u32);
    let image = RgbaImage::from_raw(w, h, data.bytes.into_owned())
        .ok_or_else(|| EditorError::InvalidInput("malformed clipboard image".into()))?;
    Ok(LoadedImage {
        image: DynamicImage::ImageRgba8(image),
        source_label: "CLIPBOARD".into(),
        byte_size: None,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP];

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::WebP => "WebP",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("edited_image.{}", self.extension())
    }
}

/// Write the composited surface to disk. Quality only applies to JPEG; the
/// `image` crate's WebP encoder is lossless.
pub fn export(
    surface: &DynamicImage,
    path: &Path,
    format: ExportFormat,
    quality: u8,
) -> Result<(), EditorError> {
    let wrap = |source| EditorError::Export {
        path: path.to_path_buf(),
        source,
    };
    match format {
        ExportFormat::Png => surface.save_with_format(path, ImageFormat::Png).map_err(wrap),
        ExportFormat::WebP => surface
            .save_with_format(path, ImageFormat::WebP)
            .map_err(wrap),
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = surface.to_rgb8();
            let file = std::fs::File::create(path).map_err(|e| EditorError::Export {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?;
            let mut writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder).map_err(wrap)
        }
    }
}

/// Suggest an export path via the native save dialog.
pub fn pick_export_path(format: ExportFormat) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(format.label(), &[format.extension()])
        .set_file_name(format.default_file_name())
        .save_file()
}

/// Native open dialog filtered to the formats we can decode.
pub fn pick_open_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg", "webp", "bmp", "gif"])
        .pick_file()
}

/// PNG round-trip used for history snapshots: lossless, so repeated
/// undo/redo cycles never drift.
pub fn encode_png(surface: &DynamicImage) -> Result<Vec<u8>, EditorError> {
    let mut bytes = Vec::new();
    surface
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(EditorError::Encode)?;
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> Result<DynamicImage, EditorError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| EditorError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_snapshot_round_trip_is_lossless() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 4, |x, y| {
            Rgba([x as u8 * 40, y as u8 * 60, 255 - x as u8, 255])
        }));
        let bytes = encode_png(&img).unwrap();
        let back = decode_png(&bytes).unwrap();
        assert_eq!(img.to_rgba8().as_raw(), back.to_rgba8().as_raw());
    }

    #[test]
    fn garbage_bytes_are_rejected_as_invalid_input() {
        let err = load_from_bytes(b"definitely not an image", "note.txt").unwrap_err();
        assert!(matches!(err, EditorError::InvalidInput(_)));
    }
}
