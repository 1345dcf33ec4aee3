//! Logging initialization

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Initialize logging.
///
/// Without `debug`, logs go to stderr filtered at `level` (RUST_LOG wins).
/// With `debug`, everything at debug level goes to a temp log file instead,
/// whose path is returned.
pub fn init_logging(debug: bool, level: &str) -> Option<PathBuf> {
    if debug {
        // Named temp file that outlives the handle; the OS cleans it up
        let temp_file = tempfile::Builder::new()
            .prefix("kubegraph-")
            .suffix(".log")
            .tempfile()
            .map(|f| {
                let path = f.path().to_path_buf();
                std::mem::forget(f);
                path
            })
            .unwrap_or_else(|_| {
                let temp_dir = std::env::temp_dir();
                temp_dir.join(format!("kubegraph-{}.log", std::process::id()))
            });

        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_file);

        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_writer(file)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new("debug")),
                    )
                    .with_ansi(false) // No ANSI codes in log file
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .init();
                return Some(temp_file);
            }
            Err(e) => {
                eprintln!(
                    "Could not open log file {}: {}, logging to stderr",
                    temp_file.display(),
                    e
                );
            }
        }
    }

    let default_level = if debug { "debug" } else { level };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    None
}
