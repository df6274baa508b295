//! Sprite Motion entry point
//!
//! Runs a headless session: a software vsync source drives the motion core,
//! which publishes into an in-memory sprite register file.
//!
//! Usage: `sprite-motion [pair|swarm|<settings.json>]`

use std::error::Error;

use sprite_motion::vsync::{self, TickLoop, Ticker};
use sprite_motion::{MotionState, Preset, Settings, SpriteRegisterFile};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn settings_from_args() -> Result<Settings, Box<dyn Error>> {
    let Some(arg) = std::env::args().nth(1) else {
        return Ok(Settings::default());
    };
    if let Some(preset) = Preset::from_str(&arg) {
        return Ok(Settings::from_preset(preset));
    }
    Ok(Settings::load(&arg)?)
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = settings_from_args()?;
    settings.validate()?;
    log::info!(
        "Sprite Motion starting ({}, {} sprites, {} frames @ {} Hz / {})",
        settings.preset.as_str(),
        settings.motion.count,
        settings.frames,
        settings.vsync.refresh_hz,
        settings.vsync.cycle
    );

    let state = MotionState::initialize(settings.motion.clone())?;
    let registers = SpriteRegisterFile::new(settings.motion.capacity);
    let mut tick_loop = TickLoop::new(state, registers, settings.vsync.cycle)?;

    let (source, queue) = vsync::channel();
    let ticker = Ticker::spawn(source, settings.vsync.refresh_hz)?;
    let summary = tick_loop.run_for(&queue, settings.frames);
    let stats = ticker.stop();

    log::info!(
        "Session ended ({:?}): {} ticks from {} vsyncs, {} coalesced",
        summary.reason,
        summary.ticks,
        summary.vsyncs,
        stats.coalesced
    );

    let (state, _registers) = tick_loop.into_parts();
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
