use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

/// Pipeline settings, usually read from `flint.toml`. Every section is
/// optional in the file and falls back to its defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub images: ImagesConfig,
    pub svg: SvgConfig,
    pub styles: StylesConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

/// Raster image re-encoding settings for the production build.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ImagesConfig {
    pub optimize: bool,
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            jpeg_quality: 80,
            png_compression: PngCompression::Best,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

/// SVG sprite assembly settings. Paths are relative to the source and
/// output directories respectively.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SvgConfig {
    pub dir: String,
    pub symbol_id: String,
    pub output: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            dir: "assets/svg".to_string(),
            symbol_id: "icon-[dir]-[name]".to_string(),
            output: "assets/icons.svg".to_string(),
        }
    }
}

/// Stylesheet compilation settings. Paths are relative to the source
/// and output directories respectively.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct StylesConfig {
    pub entry: String,
    pub include: String,
    pub output: String,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entry: "styles/app.scss".to_string(),
            include: "styles".to_string(),
            output: "styles/app.css".to_string(),
        }
    }
}
