//! Remote execution of block content.
//!
//! Requests go to an external execution service through the
//! [`ExecutionTransport`] seam; [`HttpTransport`] is the production
//! implementation. The [`ExecutionCoordinator`] builds requests from the
//! store, and applies responses back to it once they arrive, in whatever
//! order that is.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::model::{BlockId, BlockOutput, Language};

pub mod coordinator;
pub mod http;

pub use coordinator::{
    BatchToken, Completion, Dispatch, ExecutionCoordinator, Reconciliation, send,
};
pub use http::HttpTransport;

/// Path of the single-block endpoint.
pub const EXECUTE_PATH: &str = "/api/execute/";
/// Path of the batch endpoint.
pub const EXECUTE_ALL_PATH: &str = "/api/execute_all/";

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Body of a single-execute request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    pub language: Language,
    pub block_id: BlockId,
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub block_id: BlockId,
    pub code: String,
    pub language: Language,
}

/// Body of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub code_blocks: Vec<BatchEntry>,
}

/// Successful single-execute response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<BlockOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Base64 PNG without a data-URI prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
}

impl ExecuteResponse {
    /// Execution-level error. Empty strings count as no error.
    pub fn execution_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    pub fn plot_payload(&self) -> Option<&str> {
        self.plot.as_deref().filter(|p| !p.is_empty())
    }
}

/// Per-block entry of a batch response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<BlockOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlockResult {
    /// What the block's output becomes: the error if there is one, else the output.
    pub fn into_output(self) -> BlockOutput {
        match self.error.filter(|e| !e.is_empty()) {
            Some(error) => BlockOutput::Text(error),
            None => self.output.unwrap_or_default(),
        }
    }
}

/// Batch response: block id (as a string key) to per-block result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResponse(pub BTreeMap<String, BlockResult>);

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// Connection to the execution service.
///
/// Each call is exactly one attempt. Timeouts, if any, are the
/// implementation's business and surface as [`TransportError::Network`].
#[async_trait]
pub trait ExecutionTransport: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError>;

    async fn execute_all(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError>;
}
