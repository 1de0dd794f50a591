use color_eyre::{eyre::eyre, Result};
use padstream::{classify_device, config, GilrsSource, PadstreamConfig, PollerHandle};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let app_config = config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        PadstreamConfig::default()
    });
    setup_logging(&app_config);

    info!(
        "Starting padstream at {} Hz (deadzone {})",
        app_config.poller.poll_rate_hz, app_config.poller.deadzone
    );

    let source = GilrsSource::new().map_err(|e| eyre!("Failed to open input source: {e}"))?;
    let handle = PollerHandle::spawn(app_config.poller, source);
    let mut frames = handle.subscribe();

    let mut was_connected = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    warn!("Poller task ended unexpectedly");
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if frame.state.connected != was_connected {
                    was_connected = frame.state.connected;
                    if was_connected {
                        info!(
                            "Device connected: {} ({})",
                            frame.state.device_id,
                            classify_device(&frame.state.device_id)
                        );
                    } else {
                        info!("Device disconnected, command reset to neutral");
                    }
                }
                debug!(
                    "roll={:.3} pitch={:.3} yaw={:.3} throttle={:.3}",
                    frame.command.roll, frame.command.pitch,
                    frame.command.yaw, frame.command.throttle
                );
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn setup_logging(app_config: &PadstreamConfig) {
    let level = app_config
        .log_filter
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
