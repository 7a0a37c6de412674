mod shared;
mod tui;
mod audio_api;
mod audio;
mod loader;
mod config;
mod cli;
mod session;

use std::fs::File;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::{AudioHandle, EngineSettings};
use audio_api::AudioCommand;
use session::{Session, SessionSettings};
use shared::{InputEvent, Panel};

fn main() {
    let args = cli::Args::parse();
    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {}", e);
    }
    if let Err(e) = run(args) {
        log::error!("fatal: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// the tui owns stdout, so logs go to a file; set RUST_LOG=debug for verbose output
fn init_logging() -> anyhow::Result<()> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("beatcircle");
    std::fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("beatcircle.log"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("beatcircle starting up");
    Ok(())
}

fn run(args: cli::Args) -> anyhow::Result<()> {
    let mut config = config::load_config(&args.config_path());
    args.apply_overrides(&mut config);

    // open the device before touching the terminal so failures print cleanly
    let audio = audio::start_audio(EngineSettings {
        reverb_room_size: config.reverb_room_size,
        reverb_wet: config.initial_reverb_wet,
        loop_gain: config.loop_gain,
        capture_reserve_secs: config.countdown_secs.saturating_add(1),
    })?;
    let (bank, register) = loader::sample_loader::load_bank(&config, audio.sample_rate());
    send_all(&audio, register);
    let mut session = Session::new(SessionSettings::from(&config), bank);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    // Key release reporting needs the kitty protocol; without it held
    // arrows fall back to the auto-repeat timeout.
    let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        let _ = crossterm::execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );
    }
    let _ = crossterm::execute!(std::io::stdout(), EnableMouseCapture);
    log::info!("key release events: {}", if release_events { "on" } else { "off" });

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    event_loop(&mut term, audio, &mut session, release_events)
}

fn event_loop(
    term: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut audio: AudioHandle,
    session: &mut Session,
    release_events: bool,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let blink_start = Instant::now();
    let mut tui_state = tui::mode::TuiState::new(release_events);
    let mut last_phase = session.phase().label();
    let mut dropped_seen = 0;

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 500) % 2 == 0;
        let mut ds = session.display_state();
        if ds.panel == Panel::Recording {
            ds.spectrum = audio.spectrum();
        }
        tui_state.panel = ds.panel;

        let mut hits = tui::mode::HitAreas::default();
        term.draw(|frame| {
            hits = tui::view::render(frame, frame.area(), &ds, blink_on);
        })?;
        tui_state.hits = hits;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                log::info!("quit requested");
                return Ok(());
            }
            send_all(&audio, session.handle_input(event));
        }

        while let Some(event) = audio.poll_event() {
            send_all(&audio, session.handle_engine_event(event));
        }
        let dropped = audio.dropped_events();
        if dropped != dropped_seen {
            log::warn!(
                "{} engine event(s) lost to a full queue; playback may stall",
                dropped - dropped_seen
            );
            dropped_seen = dropped;
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        send_all(&audio, session.tick(elapsed));

        let phase = session.phase().label();
        if phase != last_phase {
            log::debug!(
                "phase {} -> {} (student {:?}, {} in roster)",
                last_phase,
                phase,
                session.current_student_number(),
                session.roster().len()
            );
            last_phase = phase;
        }
    }
}

fn send_all(audio: &AudioHandle, cmds: Vec<AudioCommand>) {
    for cmd in cmds {
        audio.send(cmd);
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture
        );
        let _ = terminal::disable_raw_mode();
    }
}
