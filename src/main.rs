// SPDX-License-Identifier: MIT
//
// starfield — a scrolling star field drawn with cell-term.
//
// Each frame runs the same sequence:
//
//   poll input → follow resize → step scene → redraw desired grid → flush → sleep
//
// Every frame redraws the whole scene into a cleared grid; the diff in the
// render session keeps the terminal output down to the cells that actually
// changed. The terminal is restored when the `Screen` drops, before `main`
// prints any error.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ star field                   │  ← rows - 4 rows inside the frame
//   └──────────────────────────────┘
//     help text                        ← row rows - 2
//     info bar                         ← row rows - 1

mod config;
mod scene;

use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cell_term::{Screen, Size};
use log::{debug, info};
use thiserror::Error;

use crate::config::{Command, Config, USAGE};
use crate::scene::{Action, MIN_SIZE, Scene};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Term(#[from] cell_term::Error),

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("terminal has to be at least of size {min}, but is {size}")]
    TooSmall { size: Size, min: Size },
}

// ─── Setup ───────────────────────────────────────────────────────────────────

/// Install `env_logger` writing to `path`. Never logs to the terminal we draw on.
fn init_logging(path: &Path) -> Result<(), AppError> {
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;

    env_logger::Builder::from_env(env_logger::Env::new().filter_or("STARFIELD_LOG", "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .write_style(env_logger::WriteStyle::Never)
        .init();
    Ok(())
}

fn seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos());
    nanos ^ process::id()
}

fn check_size(size: Size) -> Result<Size, AppError> {
    if size.fits(MIN_SIZE) {
        Ok(size)
    } else {
        Err(AppError::TooSmall {
            size,
            min: MIN_SIZE,
        })
    }
}

// ─── Main Loop ───────────────────────────────────────────────────────────────

fn run(config: &Config) -> Result<(), AppError> {
    if let Some(path) = &config.log_file {
        init_logging(path)?;
    }

    let mut screen = Screen::init()?;
    let size = check_size(screen.size()?)?;
    info!("starting: {size}, {} ms per frame", config.frame_ms);

    let mut scene = Scene::new(size, seed());
    let frame_time = Duration::from_millis(config.frame_ms);

    loop {
        while screen.input_available() {
            let key = match screen.read_byte() {
                Ok(key) => key,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("stdin closed");
                    return Ok(screen.shutdown()?);
                }
                Err(e) => return Err(cell_term::Error::from(e).into()),
            };
            debug!("key 0x{key:02x}");

            match scene.handle_key(key) {
                Action::Quit => {
                    info!("quit after {} frames", scene.frame());
                    return Ok(screen.shutdown()?);
                }
                Action::Redraw => screen.force_redraw(),
                Action::Continue => {}
            }
        }

        scene.resize(check_size(screen.size()?)?);
        scene.tick();

        screen.clear_default();
        scene.draw(&mut screen);
        screen.flush()?;

        thread::sleep(frame_time);
    }
}

fn main() {
    let config = match config::parse(env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("starfield: {e}\n\n{USAGE}");
            process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("starfield: {e}");
        process::exit(1);
    }
}
