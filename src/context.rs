//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiEditor;
use crate::adapters::recording::image_editor::RecordingImageEditor;
use crate::adapters::replaying::image_editor::ReplayingImageEditor;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::{Config, KEY_ENV_VARS};
use crate::error::EditError;
use crate::ports::ImageEditor;

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Image editor port.
    pub editor: Box<dyn ImageEditor>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write cassette files to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context talking to Gemini.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(config: &Config) -> Result<Self, EditError> {
        let key = config
            .gemini_key()
            .ok_or_else(|| EditError::MissingApiKey { env_var: KEY_ENV_VARS[0].into() })?;
        let editor = Box::new(GeminiEditor::with_base(key, config.api_base()));
        Ok(Self { editor })
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), EditError> {
        let live_ctx = Self::live(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".photostudio/cassettes").join(&timestamp);

        let commit = get_commit_hash();
        let path = output_dir.join("image_editor.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_editor"),
            &commit,
        )));

        let recording = RecordingImageEditor::new(live_ctx.editor, Arc::clone(&recorder));

        let ctx = Self { editor: Box::new(recording) };
        let session = RecordingSession { recorder };

        Ok((ctx, session))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, EditError> {
        let replayer = CassetteReplayer::from_file(path)
            .map_err(|e| EditError::Config(format!("Failed to load cassette: {e}")))?;
        let editor = Box::new(ReplayingImageEditor::new(Arc::new(Mutex::new(replayer))));
        Ok(Self { editor })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
