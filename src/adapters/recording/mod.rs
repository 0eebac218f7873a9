//! Recording adapters that capture interactions to cassettes.

pub mod image_editor;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::EditError;

/// Record one port call. Failures to record are logged and never change
/// the outcome handed back to the caller.
pub(crate) fn record_result<T, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, EditError>,
) where
    T: Serialize,
    I: Serialize,
{
    let input_json = match serde_json::to_value(input) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("not recording {port}::{method}: input not serializable: {e}");
            return;
        }
    };

    let Ok(mut guard) = recorder.lock() else {
        tracing::warn!("not recording {port}::{method}: recorder lock poisoned");
        return;
    };
    if let Err(e) = guard.record_outcome(port, method, input_json, result) {
        tracing::warn!("not recording {port}::{method}: output not serializable: {e}");
    }
}
