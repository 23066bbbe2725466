//! Logging setup shared by the binaries.
//!
//! `RUST_LOG` wins when set; otherwise the crate logs at `info`
//! (`debug` with `--verbose`). The terminal dashboard owns the screen,
//! so in that mode logs are appended to a file instead of stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "serene_manager=debug,serene=debug,serene_server=debug,tower_http=debug"
    } else {
        "serene_manager=info,serene=info,serene_server=info,warn"
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Log to stderr.
pub fn init(verbose: bool) {
    // A second init (tests, embedding) is not an error worth failing on
    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Log to `path` (appending), for full-screen modes.
pub fn init_to_file(verbose: bool, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_directive(verbose)).is_ok());
        }
    }

    #[test]
    fn test_init_to_file_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("serene.log");

        init_to_file(false, &path).unwrap();

        assert!(path.exists());
    }
}
