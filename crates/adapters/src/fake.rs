// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Scripted in-memory controller for tests.
//!
//! Summaries are queued per job: each batched fetch pops the next queued
//! summary, and the last one keeps repeating — so a test scripts a status
//! history once and polls as often as it likes. Every call is recorded for
//! assertions about batching and exclusion filters.

use crate::source::{JobSource, LogSlice, LogSource, SourceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tow_core::{JobId, JobKind, JobSummary, WorkflowNode};

/// One recorded call against the fake controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    JobSummaries { ids: Vec<JobId> },
    WorkflowNodes { workflow: JobId, exclude_jobs: Vec<JobId> },
    Stdout { id: JobId },
    StdoutRange { id: JobId, start_line: u64 },
}

#[derive(Default)]
struct Inner {
    summaries: Mutex<HashMap<JobId, VecDeque<JobSummary>>>,
    nodes: Mutex<HashMap<JobId, Vec<WorkflowNode>>>,
    blobs: Mutex<HashMap<JobId, String>>,
    slices: Mutex<HashMap<JobId, VecDeque<LogSlice>>>,
    log_failures: Mutex<HashSet<JobId>>,
    refresh_failures: Mutex<u32>,
    calls: Mutex<Vec<SourceCall>>,
}

/// Scripted implementation of [`JobSource`] and [`LogSource`].
///
/// Clones share state, so a test can keep a handle for scripting and
/// assertions after handing one to the engine.
#[derive(Clone, Default)]
pub struct FakeController {
    inner: Arc<Inner>,
}

impl FakeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next summary returned for `summary.id`.
    pub fn push_summary(&self, summary: JobSummary) {
        self.inner.summaries.lock().entry(summary.id).or_default().push_back(summary);
    }

    /// Replace the workflow-node listing for `workflow`.
    pub fn set_nodes(&self, workflow: JobId, nodes: Vec<WorkflowNode>) {
        self.inner.nodes.lock().insert(workflow, nodes);
    }

    /// Set the full captured stdout for a system job.
    pub fn set_stdout(&self, id: JobId, text: impl Into<String>) {
        self.inner.blobs.lock().insert(id, text.into());
    }

    /// Queue the next ranged-stdout slice returned for `id`.
    pub fn push_slice(&self, id: JobId, content: impl Into<String>, end: u64) {
        self.inner
            .slices
            .lock()
            .entry(id)
            .or_default()
            .push_back(LogSlice { content: content.into(), end });
    }

    /// Make every log fetch for `id` fail.
    pub fn fail_logs(&self, id: JobId) {
        self.inner.log_failures.lock().insert(id);
    }

    /// Make the next `n` batched summary fetches fail.
    pub fn fail_refreshes(&self, n: u32) {
        *self.inner.refresh_failures.lock() += n;
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.inner.calls.lock().clone()
    }

    fn record(&self, call: SourceCall) {
        self.inner.calls.lock().push(call);
    }

    fn check_log_failure(&self, id: JobId) -> Result<(), SourceError> {
        if self.inner.log_failures.lock().contains(&id) {
            return Err(SourceError::Unavailable(format!("scripted log failure for job {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl JobSource for FakeController {
    async fn job_summaries(&self, ids: &[JobId]) -> Result<Vec<JobSummary>, SourceError> {
        self.record(SourceCall::JobSummaries { ids: ids.to_vec() });

        {
            let mut failures = self.inner.refresh_failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(SourceError::Unavailable("scripted refresh failure".to_string()));
            }
        }

        let mut summaries = self.inner.summaries.lock();
        let mut results = Vec::new();
        for id in ids {
            if let Some(queue) = summaries.get_mut(id) {
                // Pop the history forward, but keep repeating the last entry.
                let summary = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
                results.extend(summary);
            }
        }
        Ok(results)
    }

    async fn workflow_nodes(
        &self,
        workflow: JobId,
        exclude_jobs: &[JobId],
    ) -> Result<Vec<WorkflowNode>, SourceError> {
        self.record(SourceCall::WorkflowNodes {
            workflow,
            exclude_jobs: exclude_jobs.to_vec(),
        });

        let nodes = self.inner.nodes.lock().get(&workflow).cloned().unwrap_or_default();
        // Emulate the server-side exclusion filter.
        Ok(nodes
            .into_iter()
            .filter(|node| match &node.job {
                Some(job) => !exclude_jobs.contains(&job.id),
                None => true,
            })
            .collect())
    }
}

#[async_trait]
impl LogSource for FakeController {
    async fn stdout(&self, id: JobId) -> Result<String, SourceError> {
        self.record(SourceCall::Stdout { id });
        self.check_log_failure(id)?;
        self.inner
            .blobs
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::Unavailable(format!("no scripted stdout for job {id}")))
    }

    async fn stdout_range(
        &self,
        id: JobId,
        _kind: JobKind,
        start_line: u64,
    ) -> Result<LogSlice, SourceError> {
        self.record(SourceCall::StdoutRange { id, start_line });
        self.check_log_failure(id)?;
        let slice = self.inner.slices.lock().get_mut(&id).and_then(VecDeque::pop_front);
        // An exhausted script means no new output since the cursor.
        Ok(slice.unwrap_or_else(|| LogSlice { content: String::new(), end: start_line }))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
