use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageReader, RgbaImage, imageops};
use tracing::debug;

use crate::asset::ImageAsset;
use crate::error::Error;

/// Decodes image bytes to RGBA8 and applies EXIF orientation if present.
///
/// The format is sniffed from content; `source` only labels the asset.
///
/// # Errors
/// [`Error::Decode`] for malformed or unsupported bytes, [`Error::EmptyImage`]
/// for images without pixels.
pub fn decode_image(bytes: &[u8], source: impl Into<String>) -> Result<ImageAsset, Error> {
    let source = source.into();
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    let orientation = read_orientation(bytes).unwrap_or(1);
    if orientation != 1 {
        debug!(orientation, source = %source, "applying exif orientation");
    }
    let rgba = apply_orientation(img.to_rgba8(), orientation);
    let asset = ImageAsset::new(source, rgba)?;
    debug!(
        width = asset.width(),
        height = asset.height(),
        source = asset.source(),
        "decoded image"
    );
    Ok(asset)
}

/// [`decode_image`] on a blocking worker so the caller's thread stays free.
pub async fn decode_image_async(bytes: Vec<u8>, source: String) -> Result<ImageAsset, Error> {
    tokio::task::spawn_blocking(move || decode_image(&bytes, source)).await?
}

/// Reads and decodes a file on a blocking worker.
pub async fn load_file(path: PathBuf) -> Result<ImageAsset, Error> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)?;
        decode_image(&bytes, path.display().to_string())
    })
    .await?
}

fn read_orientation(bytes: &[u8]) -> Option<u16> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).map(|v| v as u16)
}

fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        // transpose: rotate90 + flip_horizontal
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        // transverse: rotate270 + flip_horizontal
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}
