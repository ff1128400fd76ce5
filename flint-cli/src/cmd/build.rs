use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use flint_core::Pipeline;
use std::path::Path;

use crate::config::FlintConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing templates, styles and assets [default: ./src]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the assembled site [default: ./dist]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./flint.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Render pages and assemble the production bundle")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let flint_config = FlintConfig::load(args)?;
    let build_config = flint_config.build_config();

    let source_dir = Path::new(&build_config.source);
    let output_dir = Path::new(&build_config.output);

    let pipeline = Pipeline::new(source_dir, output_dir, flint_config.pipeline.clone());
    pipeline.build()?;

    println!("Site built successfully in {}", output_dir.display());

    Ok(())
}
