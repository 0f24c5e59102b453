#![forbid(unsafe_code)]

//! Plays a scripted wizard session against a headless sheet.
//!
//! ```text
//! RUST_LOG=sheetkit_core=debug cargo run -p sheetkit-demo -- [--realtime] [--tuning FILE]
//! ```
//!
//! Without `--realtime` the clock advances a fixed 16ms per frame and the run
//! finishes instantly; with it, frames are paced and measured by a
//! [`FrameClock`].

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sheetkit::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const FIXED_FRAME: Duration = Duration::from_millis(16);
const SCREEN: f64 = 800.0;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,sheetkit_core=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();
}

/// Scripted sheetkit session.
#[derive(Parser, Debug)]
#[command(name = "sheetkit-demo")]
#[command(about = "Plays a scripted wizard session against a headless sheet")]
#[command(version)]
struct Cli {
    /// Pace frames against the wall clock instead of a fixed 16ms step
    #[arg(long)]
    realtime: bool,

    /// Load tuning from a TOML or JSON file
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,
}

/// Drives frames either on a fixed step or paced against the wall clock.
struct Clock {
    realtime: Option<FrameClock>,
}

impl Clock {
    fn next_delta(&mut self) -> Duration {
        match self.realtime.as_mut() {
            Some(clock) => {
                std::thread::sleep(FIXED_FRAME);
                clock.frame_now()
            }
            None => FIXED_FRAME,
        }
    }
}

struct Session {
    sheet: SheetController,
    clock: Clock,
    touch_time: Duration,
}

impl Session {
    fn frame(&mut self) {
        let dt = self.clock.next_delta();
        self.touch_time += dt;
        self.sheet.tick(dt);
        let f = self.sheet.frame();
        tracing::trace!(
            state = %f.state,
            offset = f.vertical_offset,
            opacity = f.overlay_opacity,
            lift = f.keyboard_shift,
            "frame"
        );
    }

    fn settle(&mut self, label: &str) {
        let mut frames = 0u32;
        while !self.sheet.is_settled() && frames < 1_000 {
            self.frame();
            frames += 1;
        }
        let f = self.sheet.frame();
        tracing::info!(
            label,
            frames,
            state = %f.state,
            offset = f.vertical_offset,
            translate_y = f.container_translate_y,
            step = ?f.displayed_step,
            "settled"
        );
    }

    fn drag(&mut self, distance: f64) {
        let at = |y: f64, t: Duration| PointerSample::new(200.0, y, t);
        self.sheet.pointer(PointerEvent::Down(at(100.0, self.touch_time)));
        for i in 1..=5 {
            self.frame();
            let y = 100.0 + distance * f64::from(i) / 5.0;
            self.sheet.pointer(PointerEvent::Move(at(y, self.touch_time)));
        }
        let y = 100.0 + distance;
        self.sheet.pointer(PointerEvent::Up(at(y, self.touch_time)));
    }
}

fn load_tuning(path: Option<&Path>) -> Result<SheetTuning, String> {
    match path {
        Some(path) => SheetTuning::load(path).map_err(|e| e.to_string()),
        None => Ok(SheetTuning::default()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    let tuning = match load_tuning(cli.tuning.as_deref()) {
        Ok(tuning) => tuning,
        Err(err) => {
            tracing::error!(%err, "failed to load tuning");
            return ExitCode::FAILURE;
        }
    };

    let height = match "60%".parse::<SheetHeight>() {
        Ok(height) => height,
        Err(err) => {
            tracing::error!(%err, "bad height");
            return ExitCode::FAILURE;
        }
    };
    let config = |step| SheetConfig::new().height(height).step(step, 3);

    let sheet = SheetController::new(config(1), tuning, Viewport::new(SCREEN))
        .on_close(|| tracing::info!("host notified: sheet closed"));
    let mut session = Session {
        sheet,
        clock: Clock {
            realtime: cli.realtime.then(FrameClock::new),
        },
        touch_time: Duration::ZERO,
    };

    session.sheet.set_visible(true);
    session.settle("open");

    let h = session.sheet.panel_height();
    session.drag(h * 0.15);
    session.settle("short drag");

    session.sheet.update_config(config(2));
    session.settle("step 2");

    session.sheet.keyboard(KeyboardEvent::show(300.0));
    session.settle("keyboard shown");
    session.sheet.keyboard(KeyboardEvent::hide());
    session.settle("keyboard hidden");

    let handle = session.sheet.handle();
    let first = handle.close_with_animation();
    let second = handle.close_with_animation();
    tracing::info!(?first, ?second, "close requested twice");
    session.settle("closed by handle");

    session.sheet.set_visible(false);
    session.sheet.set_visible(true);
    session.settle("reopened");
    session.drag(h * 0.3);
    session.settle("dismissed by drag");

    tracing::info!(
        notifications = session.sheet.close_count(),
        transitions = session.sheet.transitions().count(),
        "session complete"
    );
    ExitCode::SUCCESS
}
