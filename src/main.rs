use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, error};
use tracing_subscriber::{EnvFilter, fmt};

mod constants;
mod engine;
mod error;
mod layout;
mod pacing;
mod playlist;
mod state;
mod texture_loader;

use crate::constants::DEFAULT_FPS;
use crate::engine::{SlideshowEngine, ViewerOptions};

/// Play a directory of images as a timelapse.
#[derive(Debug, Parser)]
#[command(name = "timelapse-viewer", about = "High-speed timelapse image viewer")]
struct Cli {
    /// Directory containing image files
    #[arg(short, long, value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Directory containing image files, when --directory is not given
    #[arg(value_name = "DIR")]
    positional: Option<PathBuf>,

    /// Run in fullscreen mode
    #[arg(short, long)]
    fullscreen: bool,

    /// Target framerate
    #[arg(long, value_name = "N", default_value_t = DEFAULT_FPS,
          value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn directory(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(|| self.positional.clone())
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("timelapse_viewer={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn prompt_for_directory<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PathBuf> {
    write!(output, "Enter path to directory containing images: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("reading directory from stdin")?;
    Ok(PathBuf::from(line.trim_end_matches(['\r', '\n'])))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to set up logging: {:#}", e);
    }

    let directory = match cli.directory() {
        Some(dir) => dir,
        None => match prompt_for_directory(io::stdin().lock(), io::stdout()) {
            Ok(dir) => dir,
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let options = ViewerOptions {
        directory,
        fullscreen: cli.fullscreen,
        target_fps: cli.fps,
    };

    let mut engine = match SlideshowEngine::initialize(&options) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to initialize viewer. Exiting.");
            return ExitCode::FAILURE;
        }
    };

    engine.run();
    engine.shutdown();
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["timelapse-viewer"]).unwrap();
        assert_eq!(cli.fps, 240);
        assert!(!cli.fullscreen);
        assert_eq!(cli.directory(), None);
    }

    #[test]
    fn flags_and_directory() {
        let cli = Cli::try_parse_from(["timelapse-viewer", "-d", "/tmp/frames", "-f", "--fps", "30"])
            .unwrap();
        assert_eq!(cli.directory(), Some(PathBuf::from("/tmp/frames")));
        assert!(cli.fullscreen);
        assert_eq!(cli.fps, 30);
    }

    #[test]
    fn positional_directory_is_accepted() {
        let cli = Cli::try_parse_from(["timelapse-viewer", "--fullscreen", "shots"]).unwrap();
        assert_eq!(cli.directory(), Some(PathBuf::from("shots")));
    }

    #[test]
    fn explicit_flag_wins_over_positional() {
        let cli = Cli::try_parse_from(["timelapse-viewer", "shots", "--directory", "frames"]).unwrap();
        assert_eq!(cli.directory(), Some(PathBuf::from("frames")));
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Cli::try_parse_from(["timelapse-viewer", "--fps", "0"]).is_err());
        assert!(Cli::try_parse_from(["timelapse-viewer", "--fps", "fast"]).is_err());
    }

    #[test]
    fn help_is_a_clean_exit() {
        let err = Cli::try_parse_from(["timelapse-viewer", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut out = Vec::new();
        let dir = prompt_for_directory(&b"/data/run 1\r\nignored\n"[..], &mut out).unwrap();
        assert_eq!(dir, PathBuf::from("/data/run 1"));
        assert!(String::from_utf8(out).unwrap().starts_with("Enter path"));
    }

    #[test]
    fn prompt_on_closed_stdin_gives_empty_path() {
        let dir = prompt_for_directory(&b""[..], io::sink()).unwrap();
        assert_eq!(dir, PathBuf::new());
    }
}
