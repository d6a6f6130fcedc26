// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! REST client for the automation controller.
//!
//! Paths and query strings are built by pure helpers so the wire surface is
//! testable without a live controller. Listings follow the controller's
//! `next` links, so callers see effectively unpaginated result sets.

use crate::source::{JobSource, LogSlice, LogSource, SourceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tow_core::{JobId, JobKind, JobSummary, WorkflowNode};

pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Connection settings for a controller instance.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub base_url: String,
    pub token: String,
    pub page_size: usize,
}

impl ControllerConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, token: token.into(), page_size: DEFAULT_PAGE_SIZE }
    }

    tow_core::setters! {
        set {
            page_size: usize,
        }
    }
}

/// REST implementation of [`JobSource`] and [`LogSource`].
#[derive(Clone)]
pub struct ControllerClient {
    http: Client,
    config: ControllerConfig,
}

impl ControllerClient {
    pub fn new(config: ControllerConfig) -> Self {
        Self { http: Client::new(), config }
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.config.base_url, path_and_query);
        tracing::debug!(%url, "controller GET");
        let response = self.http.get(&url).bearer_auth(&self.config.token).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status { code: response.status().as_u16(), url });
        }
        response.json::<T>().await.map_err(|e| SourceError::Malformed(e.to_string()))
    }

    async fn get_text(&self, path_and_query: &str) -> Result<String, SourceError> {
        let url = format!("{}{}", self.config.base_url, path_and_query);
        tracing::debug!(%url, "controller GET");
        let response = self.http.get(&url).bearer_auth(&self.config.token).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status { code: response.status().as_u16(), url });
        }
        Ok(response.text().await?)
    }

    /// Collect every page of a listing by following `next` links.
    async fn get_all<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>, SourceError> {
        let mut results = Vec::new();
        let mut next = Some(first);
        while let Some(path) = next {
            let page: Page<T> = self.get_json(&path).await?;
            results.extend(page.results);
            next = page.next;
        }
        Ok(results)
    }
}

#[async_trait]
impl JobSource for ControllerClient {
    async fn job_summaries(&self, ids: &[JobId]) -> Result<Vec<JobSummary>, SourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_all(unified_jobs_path(ids, self.config.page_size)).await
    }

    async fn workflow_nodes(
        &self,
        workflow: JobId,
        exclude_jobs: &[JobId],
    ) -> Result<Vec<WorkflowNode>, SourceError> {
        let records: Vec<NodeRecord> = self
            .get_all(workflow_nodes_path(workflow, exclude_jobs, self.config.page_size))
            .await?;
        Ok(records.into_iter().map(WorkflowNode::from).collect())
    }
}

#[async_trait]
impl LogSource for ControllerClient {
    async fn stdout(&self, id: JobId) -> Result<String, SourceError> {
        self.get_text(&stdout_text_path(id)).await
    }

    async fn stdout_range(
        &self,
        id: JobId,
        kind: JobKind,
        start_line: u64,
    ) -> Result<LogSlice, SourceError> {
        let page: StdoutPage = self.get_json(&stdout_range_path(id, kind, start_line)).await?;
        Ok(LogSlice { content: page.content, end: page.range.end })
    }
}

// --- Wire DTOs ---

/// One page of a controller listing.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default)]
    next: Option<String>,
    results: Vec<T>,
}

/// A workflow-node record with its embedded job summary, when a job has
/// been created for the node.
#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: tow_core::NodeId,
    #[serde(default)]
    summary_fields: NodeSummaryFields,
}

#[derive(Debug, Default, Deserialize)]
struct NodeSummaryFields {
    #[serde(default)]
    job: Option<JobSummary>,
}

impl From<NodeRecord> for WorkflowNode {
    fn from(record: NodeRecord) -> Self {
        WorkflowNode { id: record.id, job: record.summary_fields.job }
    }
}

/// Ranged stdout response: content plus the line range it covers.
#[derive(Debug, Deserialize)]
struct StdoutPage {
    range: StdoutRange,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StdoutRange {
    end: u64,
}

// --- Path builders ---

/// Controller collection a job kind lives in.
fn collection(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Job => "jobs",
        JobKind::ProjectUpdate => "project_updates",
        JobKind::InventoryUpdate => "inventory_updates",
        JobKind::SystemJob => "system_jobs",
        JobKind::AdHocCommand => "ad_hoc_commands",
        JobKind::WorkflowJob => "workflow_jobs",
        JobKind::WorkflowApproval => "workflow_approvals",
    }
}

fn join_ids(ids: &[JobId]) -> String {
    let list = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
    urlencoding::encode(&list).into_owned()
}

fn unified_jobs_path(ids: &[JobId], page_size: usize) -> String {
    format!("/api/v2/unified_jobs/?id__in={}&page_size={}", join_ids(ids), page_size)
}

fn workflow_nodes_path(workflow: JobId, exclude_jobs: &[JobId], page_size: usize) -> String {
    let mut path = format!(
        "/api/v2/workflow_jobs/{}/workflow_nodes/?job__isnull=false&order_by=id&page_size={}",
        workflow, page_size
    );
    if !exclude_jobs.is_empty() {
        path.push_str("&not__job__in=");
        path.push_str(&join_ids(exclude_jobs));
    }
    path
}

fn stdout_range_path(id: JobId, kind: JobKind, start_line: u64) -> String {
    format!("/api/v2/{}/{}/stdout/?format=json&start_line={}", collection(kind), id, start_line)
}

fn stdout_text_path(id: JobId) -> String {
    format!("/api/v2/system_jobs/{}/stdout/?format=txt", id)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
