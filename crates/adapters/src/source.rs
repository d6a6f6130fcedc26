// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Source traits consumed by the progress engine.

use async_trait::async_trait;
use thiserror::Error;
use tow_core::{JobId, JobKind, JobSummary, WorkflowNode};

/// Errors from remote source operations.
///
/// Every remote outcome is an explicit `Result`; the engine routes these
/// per node instead of unwinding across a concurrent fan-out.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned HTTP {code}")]
    Status { code: u16, url: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Read access to job status on the controller.
#[async_trait]
pub trait JobSource: Send + Sync + 'static {
    /// Fetch point-in-time summaries for a list of job ids in one batched
    /// request.
    ///
    /// The result may omit ids the controller no longer knows; callers keep
    /// their prior state for those. The batch size bound is the caller's
    /// responsibility.
    async fn job_summaries(&self, ids: &[JobId]) -> Result<Vec<JobSummary>, SourceError>;

    /// List the nodes of a workflow job that have an associated job,
    /// ordered by node id.
    ///
    /// `exclude_jobs` is an advisory server-side filter: child job ids the
    /// caller already knows are complete and does not need re-listed.
    async fn workflow_nodes(
        &self,
        workflow: JobId,
        exclude_jobs: &[JobId],
    ) -> Result<Vec<WorkflowNode>, SourceError>;
}

/// A chunk of captured stdout plus the offset to resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSlice {
    pub content: String,
    /// Exclusive end of the returned range; pass as the next `start_line`.
    pub end: u64,
}

/// Read access to captured job output.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Full captured stdout in one call. System jobs expose no ranged
    /// stdout API, so their output is always fetched whole.
    async fn stdout(&self, id: JobId) -> Result<String, SourceError>;

    /// Stdout starting at `start_line`. The slice carries the exclusive
    /// end offset to resume from on the next call.
    ///
    /// `kind` selects the controller collection the job lives in.
    async fn stdout_range(
        &self,
        id: JobId,
        kind: JobKind,
        start_line: u64,
    ) -> Result<LogSlice, SourceError>;
}
