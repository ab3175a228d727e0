// SPDX-License-Identifier: MIT
//
// k-edit: a small terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   k-term   → raw mode, key decoding, append buffer, event loop
//   k-editor → rows, document, cursor and viewport, search, rendering
//
// The Editor implements k-term's App trait. Each keypress flows through:
//
//   stdin → poll/read → decode_key → Editor::process_key → pane/document
//   paint → render::render → OutputBuffer → one write to stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text rows                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar / prompt         │  ← 1 row
//   └──────────────────────────────┘
//
// Logging never touches stdout, which belongs to the screen. With
// `--log-file` the tracing subscriber writes there through a non-blocking
// appender; without it, events are dropped.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use k_editor::{Config, Document, Editor};
use k_term::event_loop::EventLoop;

// ─── Arguments ──────────────────────────────────────────────────────────────

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "k-edit", version, about = "A small terminal text editor")]
struct Args {
    /// File to edit. Created on first save if it does not exist.
    file: Option<PathBuf>,

    /// Columns per tab stop.
    #[arg(long, default_value_t = k_editor::config::DEFAULT_TAB_STOP)]
    tab_stop: usize,

    /// Extra Ctrl-Q presses needed to quit with unsaved changes.
    #[arg(long, default_value_t = k_editor::config::DEFAULT_QUIT_TIMES)]
    quit_times: usize,

    /// Seconds a status message stays visible.
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    message_timeout: u64,

    /// Write logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax.
    #[arg(long, env = "KEDIT_LOG", default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Config {
        Config::new()
            .with_tab_stop(self.tab_stop)
            .with_quit_times(self.quit_times)
            .with_message_timeout(Duration::from_secs(self.message_timeout))
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file subscriber. The returned guard flushes on drop.
fn init_logging(path: &Path, level: &str) -> Option<WorkerGuard> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(args: &Args) -> k_editor::Result<()> {
    let config = args.config();
    let mut editor = match &args.file {
        Some(path) => Editor::open(path, config)?,
        None => Editor::new(Document::new(config.tab_stop), config),
    };

    tracing::info!(
        file = ?args.file,
        tab_stop = config.tab_stop,
        quit_times = config.quit_times,
        "startup"
    );

    EventLoop::new().run(&mut editor)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    let log_guard = args
        .log_file
        .as_deref()
        .and_then(|path| init_logging(path, &args.log_level));

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "fatal");
        drop(log_guard);
        eprintln!("k-edit: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("k-edit").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.file, None);
        assert_eq!(args.config(), Config::default());
        assert_eq!(args.log_file, None);
    }

    #[test]
    fn file_and_flags() {
        let args = parse(&[
            "notes.txt",
            "--tab-stop",
            "4",
            "--quit-times",
            "1",
            "--message-timeout",
            "10",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        let config = args.config();
        assert_eq!(config.tab_stop, 4);
        assert_eq!(config.quit_times, 1);
        assert_eq!(config.message_timeout, Duration::from_secs(10));
    }

    #[test]
    fn zero_tab_stop_is_clamped() {
        assert_eq!(parse(&["--tab-stop", "0"]).config().tab_stop, 1);
    }

    #[test]
    fn log_flags() {
        let args = parse(&["--log-file", "/tmp/k.log", "--log-level", "debug"]);
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/k.log")));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn rejects_bad_numbers() {
        let argv = ["k-edit", "--tab-stop", "wide"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn rejects_two_files() {
        assert!(Args::try_parse_from(["k-edit", "a", "b"]).is_err());
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
