//! Voice commands: a background transcriber feeding direction keys.
//!
//! Transcription runs on its own thread, one request at a time. The game loop
//! polls once per frame, collects a finished transcript, splits it into keys
//! and starts the next request. The command queue is only touched from the
//! game loop.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("no audio capture device available")]
    NoCaptureDevice,
    #[error("speech model failed to load: {0}")]
    Model(String),
    #[error("model expects {model} Hz but capture is configured for {configured} Hz")]
    SampleRateMismatch { model: u32, configured: u32 },
    #[error("a transcription is already running")]
    Busy,
    #[error("transcriber thread went away")]
    Disconnected,
    #[error("transcription exceeded {0:?}")]
    TimedOut(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Words the transcriber is listened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoiceKey {
    Up,
    Down,
    Left,
    Right,
}

impl VoiceKey {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Keys named in a transcript, in spoken order. Other words are skipped.
pub fn parse_tokens(text: &str) -> Vec<VoiceKey> {
    text.split_whitespace().filter_map(VoiceKey::from_token).collect()
}

/// Speech model and capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub model_path: PathBuf,
    pub scorer_path: PathBuf,
    /// Capture rate; must equal the model's rate.
    pub sample_rate: u32,
    /// Length of each recording window.
    pub record_window_ms: u64,
    pub hot_words: Vec<String>,
    pub hot_word_boost: f32,
    /// Words the model tends to hear instead of the hot words.
    pub cold_words: Vec<String>,
    pub cold_word_boost: f32,
    /// Abandon a transcription running longer than this and disable voice input.
    pub timeout_ms: Option<u64>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        let words = |w: &[&str]| -> Vec<String> { w.iter().map(|s| s.to_string()).collect() };
        Self {
            model_path: PathBuf::from("../dep/deepspeech-models/deepspeech-0.9.3-models.pbmm"),
            scorer_path: PathBuf::from("../dep/deepspeech-models/deepspeech-0.9.3-models.scorer"),
            sample_rate: 16000,
            record_window_ms: 1000,
            hot_words: words(&["up", "down", "left", "right"]),
            hot_word_boost: 9.0,
            cold_words: words(&["but", "at", "he", "ah", "the", "put", "bu"]),
            cold_word_boost: -75.0,
            timeout_ms: None,
        }
    }
}

impl VoiceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VoiceError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn record_window(&self) -> Duration {
        Duration::from_millis(self.record_window_ms)
    }

    /// Capture and model must agree on the sample rate.
    pub fn check_model_sample_rate(&self, model: u32) -> Result<(), VoiceError> {
        if model == self.sample_rate {
            Ok(())
        } else {
            Err(VoiceError::SampleRateMismatch {
                model,
                configured: self.sample_rate,
            })
        }
    }
}

/// Records one window of audio and decodes it to text. Blocking; runs on the
/// voice thread.
pub trait Transcriber: Send {
    fn transcribe(&mut self) -> Result<String, VoiceError>;
}

/// Replays fixed transcripts in order, then yields empty ones.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTranscriber {
    lines: VecDeque<String>,
    delay: Duration,
}

impl ScriptedTranscriber {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
        }
    }

    /// Read one transcript per line of a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VoiceError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(text.lines()))
    }

    /// Sleep this long per transcript, standing in for the recording window.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&mut self) -> Result<String, VoiceError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}

type TaskResult = (Box<dyn Transcriber>, Result<String, VoiceError>);

/// Single-slot background task. The transcriber travels to the worker thread
/// and comes back with the result, so at most one transcription runs at a time.
pub struct VoiceTask {
    transcriber: Option<Box<dyn Transcriber>>,
    running: Option<(Receiver<TaskResult>, Instant)>,
}

impl VoiceTask {
    pub fn new(transcriber: Box<dyn Transcriber>) -> Self {
        Self {
            transcriber: Some(transcriber),
            running: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.running.is_none()
    }

    /// Time since the running transcription started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.running.as_ref().map(|(_, started)| started.elapsed())
    }

    pub fn start(&mut self) -> Result<(), VoiceError> {
        if self.running.is_some() {
            return Err(VoiceError::Busy);
        }
        let mut transcriber = self.transcriber.take().ok_or(VoiceError::Disconnected)?;
        let (sender, receiver) = bounded(1);
        thread::Builder::new()
            .name("voice".into())
            .spawn(move || {
                let result = transcriber.transcribe();
                // The receiver is gone if the task was abandoned.
                let _ = sender.send((transcriber, result));
            })?;
        self.running = Some((receiver, Instant::now()));
        Ok(())
    }

    /// Collect the result of the running transcription if it is done.
    pub fn poll(&mut self) -> Option<Result<String, VoiceError>> {
        let (receiver, _) = self.running.as_ref()?;
        match receiver.try_recv() {
            Ok((transcriber, result)) => {
                self.transcriber = Some(transcriber);
                self.running = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.running = None;
                Some(Err(VoiceError::Disconnected))
            }
        }
    }
}

/// Voice channel as seen by the game loop. Failures never stop the game: the
/// channel switches itself off and keyboard input carries on.
pub struct VoiceInput {
    task: Option<VoiceTask>,
    keys: VecDeque<VoiceKey>,
    timeout: Option<Duration>,
}

impl VoiceInput {
    pub fn new(transcriber: Box<dyn Transcriber>, config: &VoiceConfig) -> Self {
        Self {
            task: Some(VoiceTask::new(transcriber)),
            keys: VecDeque::new(),
            timeout: config.timeout(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            task: None,
            keys: VecDeque::new(),
            timeout: None,
        }
    }

    /// Build from the outcome of opening the capture device and model.
    pub fn from_capture(
        capture: Result<Box<dyn Transcriber>, VoiceError>,
        config: &VoiceConfig,
    ) -> Self {
        match capture {
            Ok(transcriber) => Self::new(transcriber, config),
            Err(e) => {
                tracing::warn!(error = %e, "voice input unavailable, continuing without it");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    /// Once per frame: collect a finished transcript, then start the next one.
    pub fn poll(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };

        match task.poll() {
            Some(Ok(text)) => {
                let keys = parse_tokens(&text);
                tracing::debug!(%text, keys = keys.len(), "voice transcript");
                self.keys.extend(keys);
            }
            Some(Err(e)) => {
                self.disable(&e);
                return;
            }
            None => {}
        }

        if let (Some(timeout), Some(elapsed)) = (self.timeout, task.elapsed()) {
            if elapsed > timeout {
                self.disable(&VoiceError::TimedOut(timeout));
                return;
            }
        }

        if task.is_finished() {
            if let Err(e) = task.start() {
                self.disable(&e);
            }
        }
    }

    /// Oldest key heard and not yet consumed.
    pub fn pop_key(&mut self) -> Option<VoiceKey> {
        self.keys.pop_front()
    }

    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    fn disable(&mut self, error: &VoiceError) {
        tracing::warn!(%error, "disabling voice input");
        self.task = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Transcriber for Failing {
        fn transcribe(&mut self) -> Result<String, VoiceError> {
            Err(VoiceError::NoCaptureDevice)
        }
    }

    /// Poll until `done` holds or about two seconds pass.
    fn poll_until(voice: &mut VoiceInput, done: impl Fn(&VoiceInput) -> bool) {
        for _ in 0..2000 {
            voice.poll();
            if done(voice) {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn tokens_are_parsed_in_order() {
        assert_eq!(
            parse_tokens("go up the hill then LEFT right"),
            vec![VoiceKey::Up, VoiceKey::Left, VoiceKey::Right]
        );
        assert!(parse_tokens("").is_empty());
        assert!(parse_tokens("upward bound").is_empty());
    }

    #[test]
    fn default_config_matches_model() {
        let config = VoiceConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert!(config.check_model_sample_rate(16000).is_ok());
        assert!(matches!(
            config.check_model_sample_rate(44100),
            Err(VoiceError::SampleRateMismatch { model: 44100, configured: 16000 })
        ));
        assert_eq!(config.timeout(), None);
        assert_eq!(config.hot_words.len(), 4);
    }

    #[test]
    fn config_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");
        std::fs::write(&path, r#"{ "timeout_ms": 250, "sample_rate": 8000 }"#).unwrap();
        let config = VoiceConfig::load(&path).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.sample_rate, 8000);
        assert_eq!(config.record_window(), Duration::from_secs(1));
    }

    #[test]
    fn task_is_single_slot() {
        let slow = ScriptedTranscriber::new(["up"]).with_delay(Duration::from_millis(50));
        let mut task = VoiceTask::new(Box::new(slow));
        assert!(task.is_finished());
        task.start().unwrap();
        assert!(!task.is_finished());
        assert!(matches!(task.start(), Err(VoiceError::Busy)));

        let mut result = None;
        for _ in 0..2000 {
            result = task.poll();
            if result.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(result.unwrap().unwrap(), "up");
        assert!(task.is_finished());
        assert!(task.start().is_ok());
    }

    #[test]
    fn transcripts_become_keys() {
        let script = ScriptedTranscriber::new(["up left", "nothing here", "down"]);
        let mut voice = VoiceInput::new(Box::new(script), &VoiceConfig::default());
        poll_until(&mut voice, |v| v.pending_keys() >= 3);

        assert!(voice.is_enabled());
        assert_eq!(voice.pop_key(), Some(VoiceKey::Up));
        assert_eq!(voice.pop_key(), Some(VoiceKey::Left));
        assert_eq!(voice.pop_key(), Some(VoiceKey::Down));
    }

    #[test]
    fn capture_failure_disables_voice() {
        let voice = VoiceInput::from_capture(Err(VoiceError::NoCaptureDevice), &VoiceConfig::default());
        assert!(!voice.is_enabled());

        let mut voice = VoiceInput::disabled();
        voice.poll();
        assert_eq!(voice.pop_key(), None);
    }

    #[test]
    fn transcriber_error_disables_voice() {
        let mut voice = VoiceInput::new(Box::new(Failing), &VoiceConfig::default());
        poll_until(&mut voice, |v| !v.is_enabled());
        assert!(!voice.is_enabled());
    }

    #[test]
    fn slow_transcription_times_out() {
        let config = VoiceConfig {
            timeout_ms: Some(5),
            ..VoiceConfig::default()
        };
        let slow = ScriptedTranscriber::new(["up"]).with_delay(Duration::from_millis(500));
        let mut voice = VoiceInput::new(Box::new(slow), &config);
        voice.poll();
        assert!(voice.is_enabled());
        thread::sleep(Duration::from_millis(20));
        voice.poll();
        assert!(!voice.is_enabled());
        assert_eq!(voice.pop_key(), None);
    }
}
