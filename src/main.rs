//! HAFight Sync Test
//!
//! Runs a two-fighter match through the rollback sync test with generated
//! inputs and reports the resulting checksums.
//!
//! Usage: `hafight-synctest [host-config.json]`

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use hafight::{
    DeterministicRng, FRAME_RATE, VERSION,
    game::input::{DisconnectMask, FighterInput},
    session::{GameHost, HostConfig, SyncTest},
};

/// Fighters in the demo match.
const NUM_FIGHTERS: usize = 2;

/// Frames to simulate (20 seconds @ 60Hz).
const DEMO_FRAMES: u32 = 1200;

/// Frames rewound on every sync test check.
const CHECK_DISTANCE: usize = 8;

/// Input generator seed.
const INPUT_SEED: u64 = 2024;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("HAFight Sync Test v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            HostConfig::from_json(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => HostConfig::default(),
    };
    info!(
        "Frame Rate: {} Hz, checksum every {} frames",
        FRAME_RATE, config.checksum_interval
    );

    run_synctest(config)
}

/// Drive the sync test with random input words.
fn run_synctest(config: HostConfig) -> Result<()> {
    info!("=== Starting Sync Test ===");

    let log_states = config.log_states_on_desync;
    let host = GameHost::new(NUM_FIGHTERS, config).context("creating game host")?;
    let mut test = SyncTest::new(host, "hafight", CHECK_DISTANCE)?;
    if log_states {
        test = test.with_log_dir(std::env::temp_dir());
    }

    let mut rng = DeterministicRng::new(INPUT_SEED);
    let mut inputs = [FighterInput::NONE; NUM_FIGHTERS];

    for frame in 0..DEMO_FRAMES {
        for input in inputs.iter_mut() {
            *input = FighterInput::from_bits(rng.next_u32());
        }

        // Fighter 1 drops out for one second mid-match
        let disconnected = if (600..600 + FRAME_RATE).contains(&frame) {
            DisconnectMask::NONE.with(1)
        } else {
            DisconnectMask::NONE
        };

        test.step(&inputs, disconnected)
            .with_context(|| format!("sync test failed at frame {frame}"))?;

        let diagnostics = test.callbacks().diagnostics();
        if diagnostics.now == diagnostics.periodic {
            info!(
                "Frame {}: checksum {}",
                diagnostics.periodic.frame,
                hex::encode(diagnostics.periodic.checksum.to_be_bytes())
            );
        }
    }

    info!("=== Sync Test Results ===");
    info!("Frames verified: {}", test.frames_checked());

    let host = test.finish();
    for line in host.describe().lines() {
        info!("{}", line);
    }
    info!(
        "Final checksum: {}",
        hex::encode(host.state().checksum().to_be_bytes())
    );
    info!("Checkpoints recorded: {}", host.checksum_log().len());

    Ok(())
}
