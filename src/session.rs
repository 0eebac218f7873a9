//! Caller-side edit state: the loaded image, the busy flag, and the last result.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::EditError;
use crate::ports::{EditRequest, EditResult, ImageEditor};
use crate::reader::{read_image, EncodedImage};

#[derive(Debug, Default)]
struct SessionState {
    image: Option<EncodedImage>,
    last_result: Option<EditResult>,
    /// Bumped whenever the image is replaced or the session is reset, so a
    /// result that arrives afterwards is not stored.
    generation: u64,
}

/// One user's editing session. At most one edit is in flight at a time.
#[derive(Debug, Default)]
pub struct EditSession {
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

/// Clears the busy flag when the submission ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EditSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a new source image, replacing any previous one and clearing
    /// the last result. On failure the session is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputKind` or `ReadFailure` from the reader.
    pub fn load(&self, path: &Path) -> Result<EncodedImage, EditError> {
        let image = read_image(path)?;
        let mut state = self.state();
        state.image = Some(image.clone());
        state.last_result = None;
        state.generation += 1;
        Ok(image)
    }

    /// The currently loaded image, if any.
    #[must_use]
    pub fn image(&self) -> Option<EncodedImage> {
        self.state().image.clone()
    }

    /// The result of the last successful edit since the image was loaded.
    #[must_use]
    pub fn last_result(&self) -> Option<EditResult> {
        self.state().last_result.clone()
    }

    /// True while an edit is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Submit the loaded image with an instruction.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another edit is outstanding, `InvalidInputKind` if
    /// no image is loaded or the instruction is blank, and whatever the
    /// editor reports otherwise.
    pub async fn submit(
        &self,
        editor: &dyn ImageEditor,
        model: &str,
        instruction: &str,
    ) -> Result<EditResult, EditError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(EditError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let (image, generation) = {
            let mut state = self.state();
            let image = state.image.clone().ok_or_else(|| {
                EditError::InvalidInputKind(
                    "Please upload an image and provide an editing prompt.".to_string(),
                )
            })?;
            state.last_result = None;
            (image, state.generation)
        };

        let request =
            EditRequest { model: model.to_string(), image, instruction: instruction.to_string() };
        let result = editor.edit(&request).await?;

        let mut state = self.state();
        if state.generation == generation {
            state.last_result = Some(result.clone());
        } else {
            tracing::debug!("session changed while the edit was running; result not kept");
        }
        Ok(result)
    }

    /// Drop the loaded image and any result.
    pub fn reset(&self) {
        let mut state = self.state();
        state.image = None;
        state.last_result = None;
        state.generation += 1;
    }
}

/// Turn an error into the message shown to the user.
#[must_use]
pub fn user_message(err: &EditError) -> String {
    match err {
        EditError::InvalidInputKind(msg) => msg.clone(),
        EditError::ReadFailure { path, source } => {
            format!("Failed to read the image file {}: {source}", path.display())
        }
        EditError::Adapter(_) => format!("An error occurred: {}", with_causes(err)),
        EditError::EmptyResponse { reason } => {
            let base = "The AI did not return an image or text. Please try a different prompt.";
            match reason {
                Some(r) => format!("{base} (reason: {r})"),
                None => base.to_string(),
            }
        }
        EditError::Busy => "An edit is already in progress. Please wait for it to finish.".into(),
        EditError::MissingApiKey { .. }
        | EditError::Config(_)
        | EditError::Io(_)
        | EditError::ImageConversion(_) => err.to_string(),
    }
}

/// Display an error followed by any causes its own message leaves out.
fn with_causes(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
