use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Merged settings for one invocation. Precedence, lowest to highest:
/// built-in defaults, `flint.toml`, `FLINT_*` environment variables
/// (`__` separates nested keys), CLI arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlintConfig {
    /// Build and dev-server settings
    pub build: BuildConfig,
    /// Pipeline settings (from flint-core)
    #[serde(flatten)]
    pub pipeline: flint_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Source directory containing templates, styles and assets
    pub source: String,
    /// Output directory for the assembled site
    pub output: String,
    /// Configuration file path
    pub config: String,
    /// Host for dev server
    pub host: String,
    /// Port for dev server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
    /// Allow cross-origin requests from the dev server
    pub cors: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./src".to_string(),
            output: "./dist".to_string(),
            config: "./flint.toml".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: true,
            cors: true,
        }
    }
}

impl Default for FlintConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            pipeline: flint_core::config::Config::default(),
        }
    }
}

impl FlintConfig {
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file =
            string_arg(args, "config").unwrap_or_else(|| "./flint.toml".to_string());

        let mut builder = ConfigBuilder::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(config_file.trim_end_matches(".toml")));
        }

        builder = builder.add_source(
            Environment::with_prefix("FLINT")
                .prefix_separator("_")
                .separator("__"),
        );

        let overrides = cli_overrides(args);
        if !overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&overrides)?);
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

/// Collect `build.*` overrides from whatever arguments the invoked
/// subcommand actually defines.
fn cli_overrides(args: &ArgMatches) -> HashMap<String, String> {
    let mut overrides = HashMap::new();

    for key in ["source", "output", "config", "host"] {
        if let Some(value) = string_arg(args, key) {
            overrides.insert(format!("build.{}", key), value);
        }
    }
    if let Some(port) = string_arg(args, "port") {
        if let Ok(port) = port.parse::<u16>() {
            overrides.insert("build.port".to_string(), port.to_string());
        }
    }
    if flag_arg(args, "open") {
        overrides.insert("build.open".to_string(), "true".to_string());
    }

    overrides
}

// `try_get_one` so a subcommand without the argument reads as "not
// given" instead of panicking on an unknown id.
fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).unwrap_or(None).cloned()
}

fn flag_arg(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id).unwrap_or(None) == Some(&true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    #[test]
    fn defaults() {
        let config = FlintConfig::default();
        assert_eq!(config.build.source, "./src");
        assert_eq!(config.build.output, "./dist");
        assert_eq!(config.build.port, 3000);
        assert!(config.build.open);
        assert!(config.build.cors);
        assert_eq!(config.pipeline.images.jpeg_quality, 80);
    }

    #[test]
    fn cli_args_override_defaults() {
        let app = Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"));

        let matches = app
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/source",
                "--output",
                "/custom/output",
            ])
            .unwrap();

        let config = FlintConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "/custom/source");
        assert_eq!(config.build.output, "/custom/output");
        assert_eq!(config.build.host, "127.0.0.1");
        assert_eq!(config.build.port, 3000);
    }

    #[test]
    fn arguments_the_command_does_not_define_are_ignored() {
        let matches = Command::new("test").try_get_matches_from(vec!["test"]).unwrap();
        assert!(cli_overrides(&matches).is_empty());
    }
}
