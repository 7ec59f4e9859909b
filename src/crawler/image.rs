//! Image materialization
//!
//! Downloads a card portrait, checks that the server actually sent an image and
//! writes it as `<images_dir>/<basename><ext>`.

use crate::crawler::fetcher::Fetcher;
use crate::{is_storage_full, ScrapeError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions an image may be saved under
pub const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".webp"];

/// Why an image was not saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Network or HTTP failure after retries
    FetchFailed,
    /// Content-Type did not mention "image"
    NotImage,
    /// The file could not be written
    WriteFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FetchFailed => "fetch_failed",
            Self::NotImage => "not_image",
            Self::WriteFailed => "write_failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one materialization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    Saved(PathBuf),
    Skipped(SkipReason),
}

/// Maps a declared Content-Type onto a file extension
///
/// Returns None when the type is not an image at all.
///
/// # Examples
///
/// ```
/// use polk_scraper::crawler::infer_extension;
///
/// assert_eq!(infer_extension("image/png"), Some(".png"));
/// assert_eq!(infer_extension("image/pjpeg"), Some(".jpg"));
/// assert_eq!(infer_extension("image/gif"), Some(".jpg"));
/// assert_eq!(infer_extension("text/html; charset=utf-8"), None);
/// ```
pub fn infer_extension(content_type: &str) -> Option<&'static str> {
    let content_type = content_type.to_lowercase();
    if !content_type.contains("image") {
        return None;
    }

    if content_type.contains("png") {
        Some(".png")
    } else if content_type.contains("webp") {
        Some(".webp")
    } else {
        // jpeg, jpg and every unrecognized image type
        Some(".jpg")
    }
}

/// Returns the path of an image already saved under `basename`, if any
pub fn existing_image(images_dir: &Path, basename: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(format!("{basename}{ext}")))
        .find(|path| path.is_file())
}

/// Writes portraits into one directory
#[derive(Debug, Clone)]
pub struct ImageMaterializer {
    images_dir: PathBuf,
}

impl ImageMaterializer {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Fetches, validates and writes one image
    ///
    /// Every per-image failure is reported as [`Materialized::Skipped`]. Only a
    /// full disk is returned as an error, since no later image could be saved either.
    pub async fn materialize(
        &self,
        fetcher: &Fetcher,
        image_url: &str,
        basename: &str,
    ) -> Result<Materialized, ScrapeError> {
        tracing::debug!("Downloading image: {}", image_url);

        let response = match fetcher.fetch(image_url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch image {}: {}", image_url, e);
                return Ok(Materialized::Skipped(SkipReason::FetchFailed));
            }
        };

        let content_type = response.content_type();
        let Some(ext) = infer_extension(&content_type) else {
            tracing::warn!("Non-image content-type '{}' for {}", content_type, image_url);
            return Ok(Materialized::Skipped(SkipReason::NotImage));
        };

        let out_path = self.images_dir.join(format!("{basename}{ext}"));
        match tokio::fs::write(&out_path, &response.body).await {
            Ok(()) => {
                tracing::info!("Saved image -> {}", out_path.display());
                Ok(Materialized::Saved(out_path))
            }
            Err(e) if is_storage_full(&e) => Err(ScrapeError::StorageFull {
                path: out_path,
                source: e,
            }),
            Err(e) => {
                tracing::error!(
                    "Failed to save image {} to {}: {}",
                    image_url,
                    out_path.display(),
                    e
                );
                Ok(Materialized::Skipped(SkipReason::WriteFailed))
            }
        }
    }
}
