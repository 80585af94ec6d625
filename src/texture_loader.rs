use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use raylib::prelude::*;
use exif::{In, Reader, Tag};
use tracing::debug;

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::ViewerError;

// --- Helper: Load and Sort Image Paths ---
/// Lists supported images directly inside `dir`, sorted by full path bytes.
pub fn load_sorted_image_paths(dir: &Path) -> Result<Vec<PathBuf>, ViewerError> {
    if !dir.is_dir() {
        return Err(ViewerError::InvalidDirectory(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(ViewerError::NoImagesFound(dir.to_path_buf()));
    }
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(paths)
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

fn lowercase_extension(path: &Path) -> String {
    path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase()
}

// raylib decodes these itself; everything else goes through the `image` crate.
fn decoded_by_raylib(extension: &str) -> bool {
    matches!(extension, "png" | "bmp")
}

fn carries_exif(extension: &str) -> bool {
    matches!(extension, "jpg" | "jpeg" | "tif" | "tiff")
}

/// Re-encode any format the `image` crate reads into PNG bytes raylib accepts.
pub fn transcode_to_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = image::DynamicImage::ImageRgba8(decoded.to_rgba8());
    let mut png = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

pub fn read_orientation(bytes: &[u8]) -> Option<u16> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("no EXIF data: {}", e);
            return None;
        }
    };
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0).map(|v| v as u16)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImageOp {
    RotateCw,
    RotateCcw,
    FlipHorizontal,
    FlipVertical,
}

/// Operations that bring an image stored with EXIF `orientation` upright.
pub fn orientation_ops(orientation: u16) -> &'static [ImageOp] {
    use ImageOp::*;
    match orientation {
        2 => &[FlipHorizontal],
        3 => &[RotateCw, RotateCw],
        4 => &[FlipVertical],
        5 => &[RotateCw, FlipHorizontal],
        6 => &[RotateCw],
        7 => &[RotateCcw, FlipHorizontal],
        8 => &[RotateCcw],
        _ => &[],
    }
}

fn apply_ops(image: &mut Image, ops: &[ImageOp]) {
    for op in ops {
        match op {
            ImageOp::RotateCw => image.rotate_cw(),
            ImageOp::RotateCcw => image.rotate_ccw(),
            ImageOp::FlipHorizontal => image.flip_horizontal(),
            ImageOp::FlipVertical => image.flip_vertical(),
        }
    }
}

// --- Load Image, Apply EXIF Rotation ---
fn decode_image(image_path: &Path) -> Result<Image, ViewerError> {
    let file_bytes = fs::read(image_path).map_err(|e| ViewerError::decode(image_path, e))?;
    let extension = lowercase_extension(image_path);

    let mut image = if decoded_by_raylib(&extension) {
        Image::load_image_from_mem(&(".".to_string() + &extension), &file_bytes)
            .map_err(|e| ViewerError::decode(image_path, e))?
    } else {
        let png = transcode_to_png(&file_bytes).map_err(|e| ViewerError::decode(image_path, e))?;
        Image::load_image_from_mem(".png", &png).map_err(|e| ViewerError::decode(image_path, e))?
    };

    if carries_exif(&extension) {
        let orientation = read_orientation(&file_bytes).unwrap_or(1);
        if orientation != 1 {
            debug!("EXIF orientation {} for {}", orientation, image_path.display());
        }
        apply_ops(&mut image, orientation_ops(orientation));
    }

    Ok(image)
}

/// Decode `image_path` and upload it as a GPU texture.
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    image_path: &Path,
) -> Result<Texture2D, ViewerError> {
    let image = decode_image(image_path)?;
    // The CPU-side image is released when `image` drops after upload.
    rl.load_texture_from_image(thread, &image)
        .map_err(|e| ViewerError::decode(image_path, e))
}
