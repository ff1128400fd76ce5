use std::path::Path;

use crate::config::StylesConfig;

#[derive(Debug)]
pub enum StyleError {
    Io(std::io::Error),
    Compile(String),
}

impl From<std::io::Error> for StyleError {
    fn from(err: std::io::Error) -> Self {
        StyleError::Io(err)
    }
}

impl std::fmt::Display for StyleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleError::Io(e) => write!(f, "IO error: {}", e),
            StyleError::Compile(e) => write!(f, "SCSS compile error: {}", e),
        }
    }
}

impl std::error::Error for StyleError {}

/// Compile the SCSS entry into the configured CSS output. Projects
/// without an entry file skip this stage; returns whether a stylesheet
/// was produced.
pub fn compile(
    source_dir: &Path,
    output_dir: &Path,
    config: &StylesConfig,
) -> Result<bool, StyleError> {
    let entry = source_dir.join(&config.entry);
    if !entry.is_file() {
        return Ok(false);
    }

    let load_path = source_dir.join(&config.include);
    let options = grass::Options::default().load_path(&load_path);
    let css = grass::from_path(&entry, &options)
        .map_err(|e| StyleError::Compile(e.to_string()))?;

    let out_path = output_dir.join(&config.output);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out_path, css)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_skips_the_stage() {
        let source = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let produced = compile(source.path(), out.path(), &StylesConfig::default()).unwrap();
        assert!(!produced);
    }

    #[test]
    fn compiles_scss_with_include_path() {
        let source = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source.path().join("styles")).unwrap();
        std::fs::write(
            source.path().join("styles/_colors.scss"),
            "$accent: #1a2b3c;",
        )
        .unwrap();
        std::fs::write(
            source.path().join("styles/app.scss"),
            "@import \"colors\";\nbody { color: $accent; }",
        )
        .unwrap();

        let produced = compile(source.path(), out.path(), &StylesConfig::default()).unwrap();
        assert!(produced);

        let css = std::fs::read_to_string(out.path().join("styles/app.css")).unwrap();
        assert!(css.contains("color: #1a2b3c"));
    }

    #[test]
    fn syntax_error_propagates() {
        let source = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source.path().join("styles")).unwrap();
        std::fs::write(source.path().join("styles/app.scss"), "body { broken").unwrap();

        let result = compile(source.path(), out.path(), &StylesConfig::default());
        assert!(matches!(result, Err(StyleError::Compile(_))));
    }
}
