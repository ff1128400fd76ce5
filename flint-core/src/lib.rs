pub mod assets;
pub mod config;
pub mod html;
pub mod images;
pub mod pages;
pub mod pipeline;
pub mod sprite;
pub mod styles;
pub mod template;
pub mod util;

// Re-export main types
pub use assets::{CopyTarget, copy_targets};
pub use pages::{PageGenerator, TEMPLATE_EXT, is_template};
pub use pipeline::{BuildError, Pipeline};
pub use template::{TemplateError, TemplateRenderer};
