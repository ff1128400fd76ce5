use std::path::Path;

use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    Tera(tera::Error),
    Io(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::Tera(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Tera(e) => write!(f, "Template error: {}", e),
            TemplateError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Renders page templates. Every template under the base directory is
/// loaded up front so `include` and `extends` resolve against it.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, TemplateError> {
        let glob = format!("{}/**/*.tera", base_dir.as_ref().display());
        let tera = Tera::new(&glob)?;

        Ok(Self { tera })
    }

    /// Render one template by its name relative to the base directory.
    /// Fails on a missing template or a syntax error; nothing is
    /// recovered locally.
    pub fn render(&self, name: &str) -> Result<String, TemplateError> {
        Ok(self.tera.render(name, &Context::new())?)
    }
}
