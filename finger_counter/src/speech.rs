//! Spoken announcements.
//!
//! Speech is delegated to an external program found on `PATH`
//! (`espeak-ng`, `espeak`, or macOS `say`).  [`Speaker`] runs each utterance
//! on a short-lived worker thread and refuses a new one while the previous
//! is still talking, so the frame loop never blocks on audio.

use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to run {program}: {source}")]
    Io { program: String, source: std::io::Error },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: std::process::ExitStatus },

    #[error("no voices reported by {0}")]
    NoVoices(String),
}

/// Substrings that mark a voice as English.
pub const ENGLISH_HINTS: [&str; 6] = ["en", "english", "us", "uk", "american", "british"];

// ════════════════════════════════════════════════════════════════════════════
// Voices
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceDescriptor {
    /// What the program accepts after `-v`.
    pub id:   String,
    pub name: String,
    /// Language tag as listed (`en-us`, `en_US`); empty when unknown.
    pub lang: String,
}

impl VoiceDescriptor {
    fn new(id: &str, name: &str, lang: &str) -> Self {
        VoiceDescriptor { id: id.to_string(), name: name.to_string(), lang: lang.to_string() }
    }

    /// `true` when the primary subtag of [`lang`](Self::lang) is `en`.
    pub fn is_english(&self) -> bool {
        self.lang
            .split(['-', '_'])
            .next()
            .is_some_and(|primary| primary.eq_ignore_ascii_case("en"))
    }

    fn mentions_english(&self) -> bool {
        let haystack = format!("{} {}", self.name, self.id).to_lowercase();
        ENGLISH_HINTS.iter().any(|hint| haystack.contains(hint))
    }
}

/// Pick a voice, in order of preference:
///
/// 1. the first voice whose language tag is English,
/// 2. the first voice whose `"{name} {id}"` mentions an English hint,
/// 3. the first voice.
///
/// Display names are only a fallback: "Belarusian" contains `us` and
/// "Bengali" contains `en`.  `None` only for an empty list.
pub fn select_voice(voices: &[VoiceDescriptor]) -> Option<&VoiceDescriptor> {
    voices
        .iter()
        .find(|v| v.is_english())
        .or_else(|| voices.iter().find(|v| v.mentions_english()))
        .or_else(|| voices.first())
}

/// Parse `espeak --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
pub fn parse_espeak_voices(listing: &str) -> Vec<VoiceDescriptor> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            match cols.as_slice() {
                [_pty, lang, _age, name, ..] => Some(VoiceDescriptor::new(lang, name, lang)),
                _ => None,
            }
        })
        .collect()
}

/// Parse `say -v '?'`:
///
/// ```text
/// Alex                en_US    # Most people recognize me by my voice.
/// Bad News            en_US    # The light you see at the end of the tunnel...
/// ```
pub fn parse_say_voices(listing: &str) -> Vec<VoiceDescriptor> {
    listing
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim();
            let (name, locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() { return None; }
            Some(VoiceDescriptor::new(name, &format!("{} {}", name, locale), locale))
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// SpeechEngine: external program or null
// ════════════════════════════════════════════════════════════════════════════

pub trait SpeechEngine: Send {
    /// Speak `text` and return once it has been said.
    fn say(&mut self, text: &str) -> Result<(), SpeechError>;

    fn describe(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechProgram {
    EspeakNg,
    Espeak,
    Say,
}

impl SpeechProgram {
    /// Search order on `PATH`.
    pub const ALL: [SpeechProgram; 3] = [SpeechProgram::EspeakNg, SpeechProgram::Espeak, SpeechProgram::Say];

    pub fn binary(self) -> &'static str {
        match self {
            SpeechProgram::EspeakNg => "espeak-ng",
            SpeechProgram::Espeak   => "espeak",
            SpeechProgram::Say      => "say",
        }
    }

    fn list_voices_args(self) -> &'static [&'static str] {
        match self {
            SpeechProgram::Say => &["-v", "?"],
            _                  => &["--voices"],
        }
    }

    fn parse_voices(self, listing: &str) -> Vec<VoiceDescriptor> {
        match self {
            SpeechProgram::Say => parse_say_voices(listing),
            _                  => parse_espeak_voices(listing),
        }
    }
}

/// Locate an executable on `PATH`.
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// First available speech program.
pub fn find_speech_program() -> Option<(SpeechProgram, PathBuf)> {
    SpeechProgram::ALL
        .iter()
        .find_map(|p| find_on_path(p.binary()).map(|path| (*p, path)))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeechConfig {
    /// Words per minute.
    pub rate:   u32,
    /// 0.0 – 1.0 of full scale.
    pub volume: f32,
    pub mute:   bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig { rate: 150, volume: 0.9, mute: false }
    }
}

/// Speech through an external program.
pub struct CommandSpeech {
    program: SpeechProgram,
    path:    PathBuf,
    voice:   Option<String>,
    config:  SpeechConfig,
}

impl CommandSpeech {
    pub fn new(program: SpeechProgram, path: PathBuf, config: SpeechConfig) -> Self {
        CommandSpeech { program, path, voice: None, config }
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    /// Ask the program for its voices and pick one.
    pub fn configure_voice(&mut self) -> Result<(), SpeechError> {
        let program = self.program.binary().to_string();
        let output = Command::new(&self.path)
            .args(self.program.list_voices_args())
            .output()
            .map_err(|source| SpeechError::Io { program: program.clone(), source })?;

        let voices = self.program.parse_voices(&String::from_utf8_lossy(&output.stdout));
        let voice = select_voice(&voices).ok_or(SpeechError::NoVoices(program))?;
        info!("Using voice {} ({})", voice.name, voice.id);
        self.voice = Some(voice.id.clone());
        Ok(())
    }

    /// Arguments for one utterance.
    pub fn args_for(&self, text: &str) -> Vec<String> {
        let mut args = Vec::new();
        match self.program {
            SpeechProgram::Say => {
                args.push("-r".to_string());
                args.push(self.config.rate.to_string());
                if let Some(v) = &self.voice {
                    args.push("-v".to_string());
                    args.push(v.clone());
                }
                args.push(format!("[[volm {:.2}]] {}", self.config.volume.clamp(0.0, 1.0), text));
            }
            SpeechProgram::EspeakNg | SpeechProgram::Espeak => {
                // amplitude 0..200, 100 is normal
                let amplitude = (self.config.volume.clamp(0.0, 2.0) * 100.0).round() as u32;
                args.push("-s".to_string());
                args.push(self.config.rate.to_string());
                args.push("-a".to_string());
                args.push(amplitude.to_string());
                if let Some(v) = &self.voice {
                    args.push("-v".to_string());
                    args.push(v.clone());
                }
                args.push(text.to_string());
            }
        }
        args
    }
}

impl SpeechEngine for CommandSpeech {
    fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        let program = self.program.binary().to_string();
        let status = Command::new(&self.path)
            .args(self.args_for(text))
            .status()
            .map_err(|source| SpeechError::Io { program: program.clone(), source })?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed { program, status })
        }
    }

    fn describe(&self) -> String {
        match &self.voice {
            Some(v) => format!("{} (voice {}, {} wpm)", self.program.binary(), v, self.config.rate),
            None    => format!("{} ({} wpm)", self.program.binary(), self.config.rate),
        }
    }
}

/// Silent engine: utterances only reach the log.
pub struct NullSpeech;

impl SpeechEngine for NullSpeech {
    fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        debug!("(muted) {}", text);
        Ok(())
    }

    fn describe(&self) -> String {
        "muted".to_string()
    }
}

/// Pick the best engine available, falling back to [`NullSpeech`].
pub fn open_speech_engine(config: SpeechConfig) -> Box<dyn SpeechEngine> {
    if config.mute {
        info!("Speech muted");
        return Box::new(NullSpeech);
    }

    let Some((program, path)) = find_speech_program() else {
        warn!("No speech program found (tried espeak-ng, espeak, say); announcements are muted");
        return Box::new(NullSpeech);
    };

    let mut engine = CommandSpeech::new(program, path, config);
    if let Err(e) = engine.configure_voice() {
        warn!("Could not configure voice: {}; using the default voice", e);
    }
    info!("Speech engine: {}", engine.describe());
    Box::new(engine)
}

// ════════════════════════════════════════════════════════════════════════════
// Speaker: at most one utterance in flight
// ════════════════════════════════════════════════════════════════════════════

pub struct Speaker {
    engine:    Arc<Mutex<Box<dyn SpeechEngine>>>,
    in_flight: Option<JoinHandle<()>>,
}

impl Speaker {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Speaker { engine: Arc::new(Mutex::new(engine)), in_flight: None }
    }

    /// An utterance is still being spoken.
    pub fn is_busy(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start speaking `text` in the background.  Returns `false` (and drops
    /// the text) if the previous utterance hasn't finished.
    pub fn dispatch(&mut self, text: String) -> bool {
        if self.is_busy() {
            return false;
        }
        self.reap();

        let engine = Arc::clone(&self.engine);
        self.in_flight = Some(thread::spawn(move || {
            let mut engine = match engine.lock() {
                Ok(guard)     => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(e) = engine.say(&text) {
                error!("Speech failed for {:?}: {}", text, e);
            }
        }));
        true
    }

    /// Block until the current utterance (if any) is done.
    pub fn wait(&mut self) {
        self.reap();
    }

    fn reap(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if handle.join().is_err() {
                error!("Speech worker panicked");
            }
        }
    }

    pub fn describe(&self) -> String {
        match self.engine.lock() {
            Ok(engine) => engine.describe(),
            Err(_)     => "unavailable".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
