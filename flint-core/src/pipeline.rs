use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::images::OptimizeError;
use crate::pages::{PageError, PageGenerator};
use crate::styles::StyleError;
use crate::template::TemplateError;
use crate::util::dir_exists;
use crate::{assets, html, images, sprite, styles};

#[derive(Debug)]
pub enum BuildError {
    Template(TemplateError),
    Page(PageError),
    Style(StyleError),
    Optimize(OptimizeError),
    Io(io::Error),
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Template(err)
    }
}

impl From<PageError> for BuildError {
    fn from(err: PageError) -> Self {
        BuildError::Page(err)
    }
}

impl From<StyleError> for BuildError {
    fn from(err: StyleError) -> Self {
        BuildError::Style(err)
    }
}

impl From<OptimizeError> for BuildError {
    fn from(err: OptimizeError) -> Self {
        BuildError::Optimize(err)
    }
}

impl From<io::Error> for BuildError {
    fn from(err: io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Template(e) => write!(f, "Template error: {}", e),
            BuildError::Page(e) => write!(f, "Page error: {}", e),
            BuildError::Style(e) => write!(f, "Style error: {}", e),
            BuildError::Optimize(e) => write!(f, "Image error: {}", e),
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

/// Drives a whole site build: page generation, script relocation,
/// stylesheet compilation, asset copying, sprite assembly and image
/// optimization.
#[derive(Clone)]
pub struct Pipeline {
    source_dir: PathBuf,
    output_dir: PathBuf,
    config: Config,
    inject: Option<String>,
}

impl Pipeline {
    pub fn new(
        source_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        config: Config,
    ) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            config,
            inject: None,
        }
    }

    /// Extra markup added to every emitted page just before the closing
    /// body tag. The dev server passes its reload client through here.
    pub fn inject_html(mut self, snippet: impl Into<String>) -> Self {
        self.inject = Some(snippet.into());
        self
    }

    /// Clear the output directory. Stale output from a previous build
    /// is dropped wholesale rather than diffed.
    pub fn prepare_output(&self) -> io::Result<()> {
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir)?;
        }
        std::fs::create_dir_all(&self.output_dir)
    }

    /// Full production build into a clean output directory.
    pub fn build(&self) -> Result<(), BuildError> {
        self.prepare_output()?;
        self.refresh()?;

        let images_dir = self.output_dir.join("assets").join("images");
        let processed = images::optimize_dir(&images_dir, &self.config.images)?;
        if processed > 0 {
            log::info!("optimized {} images", processed);
        }

        Ok(())
    }

    /// Run every stage except image optimization into the existing
    /// output directory. This is the rebuild path used while serving.
    pub fn refresh(&self) -> Result<(), BuildError> {
        self.refresh_pages()?;

        styles::compile(&self.source_dir, &self.output_dir, &self.config.styles)?;

        let targets = assets::copy_targets(&self.source_dir.join("assets"));
        assets::copy_all(&targets, &self.output_dir)?;

        let svg_dir = self.source_dir.join(&self.config.svg.dir);
        if dir_exists(&svg_dir) {
            let sprite = sprite::build_sprite(&svg_dir, &self.config.svg.symbol_id)?;
            let out_path = self.output_dir.join(&self.config.svg.output);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out_path, sprite)?;
        }

        Ok(())
    }

    /// Re-render every page template and emit the transformed documents
    /// into the output directory. Any template change regenerates all
    /// pages; templates share includes and no dependency graph is
    /// tracked.
    pub fn refresh_pages(&self) -> Result<(), BuildError> {
        let generator = PageGenerator::new(&self.source_dir)?;
        let entries = generator.generate()?;

        for (name, path) in &entries {
            let page = std::fs::read_to_string(path)?;
            let page = html::relocate_module_scripts(&page);
            let page = match &self.inject {
                Some(snippet) => html::inject_before_body(&page, snippet),
                None => page,
            };
            std::fs::write(self.output_dir.join(format!("{}.html", name)), page)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_source() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("templates/pages")).unwrap();
        std::fs::write(
            dir.path().join("templates/pages/home.tera"),
            "<html><head><script src=\"app.js\" type=\"module\"></script></head>\
             <body><h1>Home</h1></body></html>",
        )
        .unwrap();
        dir
    }

    #[test]
    fn build_emits_pages_with_relocated_scripts() {
        let source = setup_source();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        let pipeline = Pipeline::new(source.path(), &out_dir, Config::default());
        pipeline.build().unwrap();

        let page = std::fs::read_to_string(out_dir.join("home.html")).unwrap();
        assert!(page.contains(
            "<body><h1>Home</h1><script src=\"app.js\" type=\"module\"></script></body>"
        ));
        // The intermediate file at the source root keeps its original shape.
        let intermediate = std::fs::read_to_string(source.path().join("home.html")).unwrap();
        assert!(intermediate.contains("<head><script"));
    }

    #[test]
    fn build_assembles_optional_asset_stages() {
        let source = setup_source();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        std::fs::create_dir_all(source.path().join("assets/images")).unwrap();
        std::fs::write(source.path().join("assets/images/pixel.gif"), "gif").unwrap();
        std::fs::create_dir_all(source.path().join("assets/svg")).unwrap();
        std::fs::write(
            source.path().join("assets/svg/dot.svg"),
            "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>",
        )
        .unwrap();
        std::fs::create_dir_all(source.path().join("styles")).unwrap();
        std::fs::write(source.path().join("styles/app.scss"), "body { margin: 0; }").unwrap();

        let pipeline = Pipeline::new(source.path(), &out_dir, Config::default());
        pipeline.build().unwrap();

        assert!(out_dir.join("assets/images/pixel.gif").is_file());
        let sprite = std::fs::read_to_string(out_dir.join("assets/icons.svg")).unwrap();
        assert!(sprite.contains("id=\"icon-dot\""));
        let css = std::fs::read_to_string(out_dir.join("styles/app.css")).unwrap();
        assert!(css.contains("margin: 0"));
    }

    #[test]
    fn build_clears_stale_output() {
        let source = setup_source();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");
        std::fs::create_dir_all(&out_dir).unwrap();
        std::fs::write(out_dir.join("stale.html"), "old").unwrap();

        let pipeline = Pipeline::new(source.path(), &out_dir, Config::default());
        pipeline.build().unwrap();

        assert!(!out_dir.join("stale.html").exists());
        assert!(out_dir.join("home.html").is_file());
    }

    #[test]
    fn refresh_keeps_existing_output() {
        let source = setup_source();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        let pipeline = Pipeline::new(source.path(), &out_dir, Config::default());
        pipeline.prepare_output().unwrap();
        std::fs::write(out_dir.join("kept.txt"), "still here").unwrap();
        pipeline.refresh().unwrap();

        assert!(out_dir.join("kept.txt").is_file());
        assert!(out_dir.join("home.html").is_file());
    }

    #[test]
    fn injected_snippet_lands_before_closing_body() {
        let source = setup_source();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        let pipeline = Pipeline::new(source.path(), &out_dir, Config::default())
            .inject_html("<script>reload()</script>");
        pipeline.build().unwrap();

        let page = std::fs::read_to_string(out_dir.join("home.html")).unwrap();
        assert!(page.contains("<script>reload()</script></body>"));
    }
}
