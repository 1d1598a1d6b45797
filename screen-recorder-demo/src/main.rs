mod notifier;
mod test_pattern;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use parking_lot::Mutex;

use screen_recorder_core::{CaptureTicker, DeviceProfile, RecorderConfiguration, RecordingController};
use screen_recorder_h264::H264Mp4Encoder;

use notifier::LogNotifier;
use test_pattern::TestPatternSource;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    Tici,
    Eon,
}

impl From<Profile> for DeviceProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Tici => DeviceProfile::Tici,
            Profile::Eon => DeviceProfile::Eon,
        }
    }
}

/// Record a synthetic test pattern through the screen recording pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How long to record, in seconds
    #[arg(short, long, default_value_t = 5)]
    seconds: u64,

    /// Directory for the recorded segments (defaults to the profile's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Device profile (detected from the filesystem when omitted)
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Rotate segments after this many seconds
    #[arg(long)]
    segment_secs: Option<u64>,

    /// Write a metadata sidecar next to every segment
    #[arg(long)]
    metadata: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let profile = args.profile.map(DeviceProfile::from).unwrap_or_else(DeviceProfile::detect);

    let mut config = RecorderConfiguration::for_profile(profile);
    if let Some(dir) = args.output_dir {
        config.output_directory = dir;
    }
    if let Some(secs) = args.segment_secs {
        config.max_segment_duration = Duration::from_secs(secs);
    }
    config.write_metadata = args.metadata;

    log::info!(
        "Recording {}s of test pattern ({:?}, {}x{}) to {}",
        args.seconds,
        profile,
        config.source_width,
        config.source_height,
        config.output_directory.display()
    );

    let source = TestPatternSource::new(config.source_width, config.source_height);
    let interval = config.tick_interval();
    let mut controller = RecordingController::new(config, source, H264Mp4Encoder::new())?;
    controller.set_notifier(Arc::new(LogNotifier));
    let controller = Arc::new(Mutex::new(controller));

    let mut ticker = CaptureTicker::spawn(Arc::clone(&controller), interval)?;
    controller.lock().toggle()?;

    thread::sleep(Duration::from_secs(args.seconds));

    controller.lock().toggle()?;
    ticker.stop();

    let diagnostics = controller.lock().diagnostics();
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}
