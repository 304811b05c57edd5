//! finger_counter: interactive entry point.

use std::time::Duration;

use clap::Parser;
use finger_counter::app::{run, AppConfig};
use finger_counter::check;
use finger_counter::detector::DetectorConfig;
use finger_counter::speech::SpeechConfig;
use log::error;

#[derive(Parser, Debug)]
#[command(name = "finger_counter", version, about = "Count raised fingers on a live webcam and say the count")]
struct Cli {
    /// Webcam device index
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Requested capture width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Hand detector command and arguments (default: python3 hand_detect.py)
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    detector: Vec<String>,

    /// Drop detected hands below this confidence
    #[arg(long, default_value_t = 0.5)]
    min_confidence: f32,

    /// Keep at most this many hands per frame
    #[arg(long, default_value_t = 2)]
    max_hands: usize,

    /// Minimum time between two spoken counts, in milliseconds
    #[arg(long, default_value_t = 1500)]
    cooldown_ms: u64,

    /// Speech rate in words per minute
    #[arg(long, default_value_t = 150)]
    speech_rate: u32,

    /// Speech volume, 0.0 to 1.0
    #[arg(long, default_value_t = 0.9)]
    volume: f32,

    /// Don't speak
    #[arg(long)]
    mute: bool,

    /// Keyboard-driven hands instead of camera + detector
    #[arg(long)]
    simulate: bool,

    /// Verify the setup and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn config(&self) -> AppConfig {
        let defaults = DetectorConfig::default();
        AppConfig {
            camera_index: self.camera,
            width:        self.width,
            height:       self.height,
            simulate:     self.simulate,
            detector: DetectorConfig {
                command:        if self.detector.is_empty() { defaults.command } else { self.detector.clone() },
                min_confidence: self.min_confidence.clamp(0.0, 1.0),
                max_hands:      self.max_hands,
            },
            speech: SpeechConfig {
                rate:   self.speech_rate,
                volume: self.volume.clamp(0.0, 1.0),
                mute:   self.mute,
            },
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = cli.config();

    if cli.check {
        let code = check::report(&check::run_checks(&cfg));
        std::process::exit(code);
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Finger Counter — live count with voice              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    if cfg.simulated() {
        println!("  Mode: Keyboard simulation  (use --features camera for a webcam)");
        println!("  Keys: 0-5 count, R rock on, T thumb, H second hand, N hide, Q quit");
    } else {
        println!("  Mode: Webcam {}  ({}x{})", cfg.camera_index, cfg.width, cfg.height);
        println!("  Detector: {}", cfg.detector.command.join(" "));
        println!("  Press Q in the window to quit");
    }
    println!();

    if let Err(e) = run(cfg) {
        error!("{:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_app_defaults() {
        let cli = Cli::parse_from(["finger_counter"]);
        let cfg = cli.config();
        let def = AppConfig::default();
        assert_eq!(cfg.camera_index, def.camera_index);
        assert_eq!((cfg.width, cfg.height), (def.width, def.height));
        assert_eq!(cfg.cooldown, def.cooldown);
        assert_eq!(cfg.speech, def.speech);
        assert_eq!(cfg.detector.command, def.detector.command);
    }

    #[test]
    fn detector_command_takes_trailing_args() {
        let cli = Cli::parse_from(["finger_counter", "--mute", "--detector", "python3", "-u", "detect.py"]);
        let cfg = cli.config();
        assert_eq!(cfg.detector.command, vec!["python3", "-u", "detect.py"]);
        assert!(cfg.speech.mute);
    }

    #[test]
    fn volume_is_clamped() {
        let cli = Cli::parse_from(["finger_counter", "--volume", "3.5", "--cooldown-ms", "200"]);
        let cfg = cli.config();
        assert_eq!(cfg.speech.volume, 1.0);
        assert_eq!(cfg.cooldown, Duration::from_millis(200));
    }
}
