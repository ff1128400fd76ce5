use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use walkdir::WalkDir;

use crate::config::{ImagesConfig, PngCompression};
use crate::util::dir_exists;

#[derive(Debug)]
pub enum OptimizeError {
    Io(std::io::Error),
    Codec(image::ImageError),
}

impl From<std::io::Error> for OptimizeError {
    fn from(err: std::io::Error) -> Self {
        OptimizeError::Io(err)
    }
}

impl From<image::ImageError> for OptimizeError {
    fn from(err: image::ImageError) -> Self {
        OptimizeError::Codec(err)
    }
}

impl std::fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizeError::Io(e) => write!(f, "IO error: {}", e),
            OptimizeError::Codec(e) => write!(f, "Image codec error: {}", e),
        }
    }
}

impl std::error::Error for OptimizeError {}

/// Re-encode every JPEG and PNG under `dir` with the configured quality
/// settings, overwriting a file only when the re-encoded version is
/// smaller. Other formats pass through untouched. Returns the number of
/// files processed.
pub fn optimize_dir(dir: &Path, config: &ImagesConfig) -> Result<usize, OptimizeError> {
    if !config.optimize || !dir_exists(dir) {
        return Ok(0);
    }

    let mut processed = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => {
                reencode_jpeg(path, config.jpeg_quality)?;
                processed += 1;
            }
            Some("png") => {
                reencode_png(path, config.png_compression)?;
                processed += 1;
            }
            _ => {}
        }
    }

    Ok(processed)
}

fn reencode_jpeg(path: &Path, quality: u8) -> Result<(), OptimizeError> {
    let img = image::open(path)?;
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)?;
    write_if_smaller(path, &buf)
}

fn reencode_png(path: &Path, compression: PngCompression) -> Result<(), OptimizeError> {
    let compression = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let img = image::open(path)?;
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    write_if_smaller(path, &buf)
}

fn write_if_smaller(path: &Path, encoded: &[u8]) -> Result<(), OptimizeError> {
    let current = std::fs::metadata(path)?.len();
    if (encoded.len() as u64) < current {
        std::fs::write(path, encoded)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        }))
    }

    #[test]
    fn disabled_config_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        sample_image().save(dir.path().join("a.png")).unwrap();

        let config = ImagesConfig {
            optimize: false,
            ..ImagesConfig::default()
        };
        assert_eq!(optimize_dir(dir.path(), &config).unwrap(), 0);
    }

    #[test]
    fn missing_directory_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let config = ImagesConfig::default();
        assert_eq!(optimize_dir(&dir.path().join("nope"), &config).unwrap(), 0);
    }

    #[test]
    fn reencoded_files_stay_decodable() {
        let dir = tempfile::tempdir().unwrap();
        sample_image().save(dir.path().join("photo.jpg")).unwrap();
        sample_image().save(dir.path().join("chart.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let processed = optimize_dir(dir.path(), &ImagesConfig::default()).unwrap();
        assert_eq!(processed, 2);
        assert!(image::open(dir.path().join("photo.jpg")).is_ok());
        assert!(image::open(dir.path().join("chart.png")).is_ok());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "skip me"
        );
    }
}
