//! # Uploads
//!
//! Raffle images live in the uploads directory as `raffle_<id>.<ext>`, thumbnails in
//! `uploads/thumbnails` as `raffle_<id>_thumb.jpg`.
//!
//! Thumbnails are opaque RGB: transparent and palette images are flattened onto white, scaled down
//! to fit [`THUMBNAIL_BOUNDS`] and written as JPEG at [`THUMBNAIL_QUALITY`].
use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind},
    path::{Path, PathBuf},
};

use image::{
    DynamicImage, ImageReader, Rgb, RgbImage, codecs::jpeg::JpegEncoder, imageops::FilterType,
};
use tracing::{error, info, warn};

use crate::error::LedgerError;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

pub const THUMBNAIL_BOUNDS: (u32, u32) = (300, 300);

pub const THUMBNAIL_QUALITY: u8 = 85;

/// Lower-cased extension of `file_name` if it is one we accept.
pub fn accepted_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_lowercase();

    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

pub fn image_name(raffle_id: &str, extension: &str) -> String {
    format!("raffle_{raffle_id}.{extension}")
}

pub fn thumbnail_name(raffle_id: &str) -> String {
    format!("raffle_{raffle_id}_thumb.jpg")
}

#[derive(Clone, Debug)]
pub struct Uploads {
    root: PathBuf,
    thumbnails: PathBuf,
}

impl Uploads {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let thumbnails = root.join("thumbnails");

        Self { root, thumbnails }
    }

    pub fn ensure_dirs(&self) -> Result<(), LedgerError> {
        fs::create_dir_all(&self.thumbnails).map_err(|e| LedgerError::io(&self.thumbnails, e))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn thumbnail_path(&self, name: &str) -> PathBuf {
        self.thumbnails.join(name)
    }

    /// Writes the original upload and returns its stored file name.
    pub fn save_image(
        &self,
        raffle_id: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, LedgerError> {
        self.ensure_dirs()?;

        let name = image_name(raffle_id, extension);
        let path = self.image_path(&name);
        fs::write(&path, bytes).map_err(|e| LedgerError::io(&path, e))?;

        info!("Image saved: {name}");
        Ok(name)
    }

    /// Builds the thumbnail for a stored image. Failures are logged and yield `None`.
    pub fn create_thumbnail(&self, raffle_id: &str, image: &str) -> Option<String> {
        let name = thumbnail_name(raffle_id);

        if let Err(e) = self
            .ensure_dirs()
            .and_then(|_| render_thumbnail(&self.image_path(image), &self.thumbnail_path(&name)))
        {
            error!("Error creating thumbnail for {image}: {e}");
            return None;
        }

        info!("Thumbnail created: {name}");
        Some(name)
    }

    pub fn remove_image(&self, name: &str) {
        remove_quietly(&self.image_path(name));
    }

    pub fn remove_thumbnail(&self, name: &str) {
        remove_quietly(&self.thumbnail_path(name));
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("Deleted {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete {}: {e}", path.display()),
    }
}

pub fn render_thumbnail(source: &Path, target: &Path) -> Result<(), LedgerError> {
    let decoded = ImageReader::open(source)
        .map_err(|e| LedgerError::io(source, e))?
        .with_guessed_format()
        .map_err(|e| LedgerError::io(source, e))?
        .decode()?;

    let thumbnail = shrink_to_fit(flatten_on_white(decoded), THUMBNAIL_BOUNDS);

    let file = File::create(target).map_err(|e| LedgerError::io(target, e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, THUMBNAIL_QUALITY).encode_image(&thumbnail)?;

    Ok(())
}

fn flatten_on_white(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let blend = |channel: u8| {
            let alpha = u16::from(a);
            ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };

        flat.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    flat
}

fn shrink_to_fit(image: RgbImage, (max_width, max_height): (u32, u32)) -> RgbImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }

    DynamicImage::ImageRgb8(image)
        .resize(max_width, max_height, FilterType::Lanczos3)
        .to_rgb8()
}
