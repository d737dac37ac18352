// What you SEE:
// • Top: the screen around your cursor, zoomed 4x, with a green box marking the grab.
// • Middle: recorded grabs playing back in a loop.
// • Bottom: status line (IDLE / WAITING / RECORDING, frame count, fps, locks).
//
// Keys (window focused):
// • SPACE starts recording after the configured delay, SPACE again stops.
// • Hold SHIFT to record only while held.
// • E exports to the configured folder, C clears recorded frames.
// • UP/DOWN change fps. [ and ] set the playback loop, BACKSPACE resets it.
// • CTRL+ALT+S toggles pixel snap, CTRL+ALT+X / CTRL+ALT+Y lock the cursor axis. ESC quits.

mod config;
mod cursor;
mod draw;
mod engine;
mod error;
mod export;
mod frames;
mod lookahead;
mod recording;
mod sampler;
mod session;
mod ticker;
mod types;

use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use config::{ConfigProvider, FileConfig, MAX_FPS};
use cursor::{CursorSource, DeviceCursor};
use draw::{Command, Drawer, compose};
use engine::PREVIEW_ZOOM;
use error::Error;
use sampler::XcapSampler;
use session::Session;
use ticker::Ticker;

const IDLE_POLL: Duration = Duration::from_millis(4);

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = FileConfig::open(FileConfig::default_path())?;
    info!("settings: {}", config.path().display());
    let settings = config.snapshot();

    let width = (settings.viewport_width as usize * PREVIEW_ZOOM).max(480);
    let height = (settings.viewport_height + settings.grab_height) as usize * PREVIEW_ZOOM + 64;
    let mut drawer = Drawer::new("SpriteGrab", width, height)?;

    let mut sampler = XcapSampler::new();
    let cursor = DeviceCursor::new();
    let mut session = Session::new();
    let mut ticker = Ticker::new(settings.fps, Instant::now());
    let mut message = String::from("SPACE: RECORD | SHIFT: HOLD | E: EXPORT | C: CLEAR");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        // 1) Inputs from the last window update.
        for command in drawer.commands() {
            if let Some(text) = handle(command, &mut session, &mut config, &mut ticker, &cursor) {
                message = text;
            }
        }

        // 2) Not time yet: keep the window responsive and wait.
        let now = Instant::now();
        if !ticker.due(now) {
            std::thread::sleep(ticker.wait(now).min(IDLE_POLL));
            drawer.pump();
            continue;
        }

        // 3) One tick against a snapshot of the settings.
        let settings = config.snapshot();
        ticker.set_fps(settings.fps, now);
        let view = session.tick(now, &settings, cursor.position(), &mut sampler);

        // 4) Draw.
        let lock = session.lock();
        let flag = |on: bool| if on { "ON" } else { "OFF" };
        let shown = view.scrub.as_ref().map_or(String::new(), |(idx, _)| format!(" | SHOWING: {idx}"));
        let looped = session.store().range().map_or(String::new(), |(a, b)| format!(" | LOOP: {a}-{b}"));
        let hud = [
            format!(
                "{} | FRAMES: {}{}{} | FPS: {} | BUFFER: {}/{}",
                session.status(),
                view.frame_count,
                shown,
                looped,
                settings.fps,
                session.buffered(),
                settings.lookahead
            ),
            format!(
                "SNAP: {} | LOCK X: {} | LOCK Y: {}",
                flag(lock.pixel_snap),
                flag(lock.lock_x.is_some()),
                flag(lock.lock_y.is_some())
            ),
            message.clone(),
        ];
        let canvas = compose(view.preview.as_ref(), view.scrub.as_ref().map(|(_, f)| f), &hud);
        drawer.present(&canvas)?;
    }

    Ok(())
}

/// Apply one key command; returns a new HUD message when there is something to report.
fn handle(
    command: Command,
    session: &mut Session,
    config: &mut FileConfig,
    ticker: &mut Ticker,
    cursor: &DeviceCursor,
) -> Option<String> {
    match command {
        Command::ToggleRecord => session.toggle_record(Instant::now(), &config.snapshot()),
        Command::RecordKey(held) => session.set_record_key(held),
        Command::ClearFrames => {
            session.clear_frames();
            return Some("FRAMES CLEARED".into());
        }
        Command::Export => {
            let settings = config.snapshot();
            let outcome = session.export(&settings, || ask_overwrite(&settings.export_path));
            return Some(match outcome {
                Ok(summary) => format!("EXPORTED {} FRAMES TO {}", summary.written, summary.dir.display()),
                Err(Error::ExportCancelled(_)) => "EXPORT CANCELLED".into(),
                Err(e) => {
                    error!("{e}");
                    "EXPORT FAILED - SEE LOG".into()
                }
            });
        }
        Command::FpsUp | Command::FpsDown => {
            let mut settings = config.snapshot();
            settings.fps = match command {
                Command::FpsUp => (settings.fps + 1).min(MAX_FPS),
                _ => settings.fps.saturating_sub(1).max(1),
            };
            ticker.set_fps(settings.fps, Instant::now());
            info!("fps {} ({}ms per tick)", settings.fps, ticker.interval().as_millis());
            if let Err(e) = config.store(settings) {
                warn!("fps not saved: {e}");
            }
        }
        Command::ToggleSnap => session.toggle_snap(),
        Command::ToggleLockX => session.toggle_lock_x(cursor.position()),
        Command::ToggleLockY => session.toggle_lock_y(cursor.position()),
        Command::LoopStart => session.mark_loop_start(),
        Command::LoopEnd => session.mark_loop_end(),
        Command::LoopReset => session.reset_loop(),
    }
    None
}

fn ask_overwrite(dir: &Path) -> bool {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("Overwrite?")
        .set_description(format!(
            "{} already holds an export, do you want to overwrite it?",
            dir.display()
        ))
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        == rfd::MessageDialogResult::Yes
}
