//! Recording adapter for the `ImageEditor` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_editor::{EditFuture, EditRequest, ImageEditor};

/// Records edit interactions while delegating to an inner implementation.
pub struct RecordingImageEditor {
    inner: Box<dyn ImageEditor>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageEditor {
    /// Creates a new recording editor wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageEditor>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageEditor for RecordingImageEditor {
    fn edit(&self, request: &EditRequest) -> EditFuture<'_> {
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.edit(&request).await;
            record_result(&recorder, "image_editor", "edit", &request, &result);
            result
        })
    }
}
