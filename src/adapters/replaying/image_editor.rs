//! Replaying adapter for the `ImageEditor` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::EditError;
use crate::ports::image_editor::{EditFuture, EditRequest, EditResult, ImageEditor};

/// Serves recorded edit results from a cassette.
pub struct ReplayingImageEditor {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageEditor {
    /// Create a replaying editor backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageEditor for ReplayingImageEditor {
    fn edit(&self, request: &EditRequest) -> EditFuture<'_> {
        let output =
            request.validate().and_then(|()| next_output(&self.replayer, "image_editor", "edit"));
        Box::pin(async move {
            let result = replay_result::<EditResult>(output?)?;
            if result.is_empty() {
                return Err(EditError::EmptyResponse { reason: None });
            }
            Ok::<_, EditError>(result)
        })
    }
}
