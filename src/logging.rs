use std::{
    fs::{File, OpenOptions},
    path::Path,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to a file; the terminal belongs to the renderer.
pub(crate) fn init_tracing(log_path: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut open_error = None;
    if let Some(path) = log_path {
        match open_log_file(path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .init();
                tracing::info!(path = %path.display(), "logging initialized");
                return;
            }
            Err(err) => open_error = Some(err),
        }
    }

    // no file: keep the filter but never write over the frame
    tracing_subscriber::registry().with(env_filter).init();
    if let Some(err) = open_error {
        tracing::warn!(%err, "could not open log file");
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
