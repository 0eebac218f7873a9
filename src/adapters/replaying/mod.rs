//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_editor;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::{AdapterError, EditError, RecordedError};

/// Retrieve the next recorded output for a given port and method.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, EditError> {
    let mut guard = replayer
        .lock()
        .map_err(|e| AdapterError::Replayed(format!("replayer lock poisoned: {e}")))?;
    let interaction = guard.next_interaction(port, method).map_err(AdapterError::Replayed)?;
    Ok(interaction.output.clone())
}

/// Deserialize a replayed output as `Result<T, EditError>`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, EditError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let recorded = match err_val {
            serde_json::Value::String(msg) => {
                RecordedError { kind: "adapter".into(), message: msg.clone() }
            }
            other => serde_json::from_value(other.clone()).map_err(|e| {
                AdapterError::Replayed(format!("unreadable recorded error: {e}"))
            })?,
        };
        return Err(recorded.into());
    }
    let ok_val = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(ok_val)
        .map_err(|e| AdapterError::Replayed(format!("unreadable recorded output: {e}")).into())
}
