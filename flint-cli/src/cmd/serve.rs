use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use flint_core::{Pipeline, pages};
use flint_dev_server::{LiveServer, LiveServerConfig, ReloadHandle, livereload_script};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{path::PathBuf, time::Duration};

use crate::cmd::build::add_build_args;
use crate::config::FlintConfig;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Start development server with live reload")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = FlintConfig::load(args)?;
    let build_config = config.build_config();

    let source_dir = PathBuf::from(&build_config.source);
    let output_dir = PathBuf::from(&build_config.output);
    let config_file = PathBuf::from(&build_config.config);

    let server_config = LiveServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        root: output_dir.clone(),
        open: build_config.open,
        cors: build_config.cors,
    };
    let server = LiveServer::new(server_config);
    let reload = server.reload_handle();

    let pipeline = Pipeline::new(&source_dir, &output_dir, config.pipeline.clone())
        .inject_html(livereload_script(&build_config.host, build_config.port));

    // Initial build so the server has something to serve.
    pipeline.prepare_output()?;
    pipeline.refresh()?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            eprintln!("Dev server error: {}", e);
        }
    });

    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_sources(pipeline, source_dir, config_file, reload).await {
            eprintln!("Source watcher error: {}", e);
        }
    });

    // Wait for both tasks
    let _ = tokio::try_join!(server_handle, watcher_handle)?;

    Ok(())
}

async fn watch_sources(
    pipeline: Pipeline,
    source_dir: PathBuf,
    config_file: PathBuf,
    reload: ReloadHandle,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&source_dir, notify::RecursiveMode::Recursive)?;
    println!("Watching source directory: {}", source_dir.display());

    if config_file.exists() {
        debouncer
            .watcher()
            .watch(&config_file, notify::RecursiveMode::NonRecursive)?;
        println!("Watching config file: {}", config_file.display());
    }

    let abs_source_dir = source_dir.canonicalize().unwrap_or(source_dir.clone());

    while let Some(path) = rx.recv().await {
        let abs_path = path.canonicalize().unwrap_or(path.clone());

        // Pages rendered into the source root come back as change
        // events of their own. Reloading is enough; rebuilding here
        // would echo forever.
        let generated_page = abs_path.extension().map(|ext| ext == "html").unwrap_or(false)
            && abs_path.parent() == Some(abs_source_dir.as_path());
        if generated_page {
            log::debug!("generated page changed: {}", path.display());
            reload.request_full_reload();
            continue;
        }

        let result = if pages::is_template(&abs_path) {
            // A template change re-renders every page. Templates share
            // includes and no dependency graph is tracked.
            pipeline.refresh_pages()
        } else {
            pipeline.refresh()
        };

        match result {
            Ok(()) => {
                println!("Rebuilt after change: {}", path.display());
                reload.request_full_reload();
            }
            Err(e) => {
                eprintln!("Build error: {}", e);
            }
        }
    }

    Ok(())
}
