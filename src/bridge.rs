//! Scripting-layer entry point.
//!
//! Callers hand over a loose options object and receive a single
//! [`SnapshotResponse`], either through a one-shot callback or by awaiting
//! [`SnapshotBridge::snapshot`].

use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::SnapshotError;
use crate::request::SnapshotRequest;
use crate::service::{SnapshotOutput, SnapshotService};

/// Result payload delivered to the caller. Serializes as
/// `{"success": true, "path": ..}` or `{"success": false, "message": ..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotResponse {
    Success { path: String },
    Failure { message: String },
}

#[derive(Serialize)]
struct WireResponse<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Serialize for SnapshotResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireResponse {
            success: self.is_success(),
            path: self.path(),
            message: self.message(),
        }
        .serialize(serializer)
    }
}

impl SnapshotResponse {
    pub fn success(path: impl Into<String>) -> Self {
        SnapshotResponse::Success { path: path.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        SnapshotResponse::Failure { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SnapshotResponse::Success { .. })
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            SnapshotResponse::Success { path } => Some(path),
            SnapshotResponse::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SnapshotResponse::Success { .. } => None,
            SnapshotResponse::Failure { message } => Some(message),
        }
    }

    pub fn to_json(&self) -> Value {
        // Both variants are plain string/bool maps
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Result<SnapshotOutput, SnapshotError>> for SnapshotResponse {
    fn from(result: Result<SnapshotOutput, SnapshotError>) -> Self {
        match result {
            Ok(output) => SnapshotResponse::success(output.path.to_string_lossy()),
            Err(e) => SnapshotResponse::failure(e.to_string()),
        }
    }
}

/// Bridge between an options map and the snapshot service
#[derive(Clone)]
pub struct SnapshotBridge {
    service: SnapshotService,
}

impl SnapshotBridge {
    pub fn new(service: SnapshotService) -> Self {
        Self { service }
    }

    /// Validate `options`, run the pipeline, and return the response.
    pub async fn snapshot(&self, options: &Value) -> SnapshotResponse {
        let request = match SnapshotRequest::from_options(options) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected snapshot options {}: {}", options, e);
                return SnapshotResponse::failure(e.to_string());
            }
        };
        self.service.snapshot(request).await.into()
    }

    /// Start a snapshot on the current tokio runtime. `callback` runs exactly
    /// once with the response. Must be called from within a runtime.
    pub fn request_snapshot<F>(&self, options: Value, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(SnapshotResponse) + Send + 'static,
    {
        let bridge = self.clone();
        tokio::spawn(async move {
            let response = bridge.snapshot(&options).await;
            callback(response);
        })
    }
}
