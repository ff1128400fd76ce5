use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::template::{TemplateError, TemplateRenderer};

/// Extension of page template sources.
pub const TEMPLATE_EXT: &str = "tera";

/// Whether a path names a page template.
pub fn is_template(path: &Path) -> bool {
    path.extension().map(|ext| ext == TEMPLATE_EXT).unwrap_or(false)
}

#[derive(Debug)]
pub enum PageError {
    Io(std::io::Error),
    Template(TemplateError),
}

impl From<std::io::Error> for PageError {
    fn from(err: std::io::Error) -> Self {
        PageError::Io(err)
    }
}

impl From<TemplateError> for PageError {
    fn from(err: TemplateError) -> Self {
        PageError::Template(err)
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Io(e) => write!(f, "IO error: {}", e),
            PageError::Template(e) => write!(f, "Template error: {}", e),
        }
    }
}

impl std::error::Error for PageError {}

/// Renders every page template under `<source>/templates/pages` to a
/// sibling HTML file at the source root.
pub struct PageGenerator {
    source_dir: PathBuf,
    renderer: TemplateRenderer,
}

impl PageGenerator {
    pub fn new<P: AsRef<Path>>(source_dir: P) -> Result<Self, TemplateError> {
        let source_dir = source_dir.as_ref().to_path_buf();
        let renderer = TemplateRenderer::new(source_dir.join("templates"))?;

        Ok(Self { source_dir, renderer })
    }

    /// Render all pages and return the entry mapping, keyed by page
    /// name (extension stripped), valued by the generated HTML path.
    ///
    /// Output files are overwritten unconditionally. Non-template files
    /// in the pages directory are ignored. The first render or write
    /// failure aborts the whole scan.
    pub fn generate(&self) -> Result<BTreeMap<String, PathBuf>, PageError> {
        let pages_dir = self.source_dir.join("templates").join("pages");
        let mut entries = BTreeMap::new();

        for entry in std::fs::read_dir(&pages_dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_template(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let html = self.renderer.render(&format!("pages/{}", file_name))?;
            let out_path = self.source_dir.join(format!("{}.html", name));
            std::fs::write(&out_path, html)?;
            entries.insert(name, out_path);
        }

        log::debug!("generated {} pages", entries.len());

        Ok(entries)
    }
}
