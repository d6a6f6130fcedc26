// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Unified-job kinds, statuses, and point-in-time snapshots.

use crate::id::{JobId, NodeId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Resource kind of a unified job on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Job,
    ProjectUpdate,
    InventoryUpdate,
    SystemJob,
    AdHocCommand,
    WorkflowJob,
    WorkflowApproval,
}

impl JobKind {
    /// Workflow jobs are the only kind whose execution is a graph of child jobs.
    pub fn is_workflow(&self) -> bool {
        matches!(self, JobKind::WorkflowJob)
    }

    /// Workflow-structural kinds capture no stdout of their own.
    pub fn has_stdout(&self) -> bool {
        !matches!(self, JobKind::WorkflowJob | JobKind::WorkflowApproval)
    }
}

crate::simple_display! {
    JobKind {
        Job => "job",
        ProjectUpdate => "project_update",
        InventoryUpdate => "inventory_update",
        SystemJob => "system_job",
        AdHocCommand => "ad_hoc_command",
        WorkflowJob => "workflow_job",
        WorkflowApproval => "workflow_approval",
    }
}

/// Error parsing a [`JobKind`] from its wire name.
#[derive(Debug, Error)]
#[error("unknown job kind: {0}")]
pub struct ParseKindError(String);

impl FromStr for JobKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job" => Ok(JobKind::Job),
            "project_update" => Ok(JobKind::ProjectUpdate),
            "inventory_update" => Ok(JobKind::InventoryUpdate),
            "system_job" => Ok(JobKind::SystemJob),
            "ad_hoc_command" => Ok(JobKind::AdHocCommand),
            "workflow_job" => Ok(JobKind::WorkflowJob),
            "workflow_approval" => Ok(JobKind::WorkflowApproval),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

/// Lifecycle status reported by the controller for a unified job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Pending,
    Waiting,
    Running,
    Successful,
    Failed,
    Error,
    Canceled,
}

impl JobStatus {
    /// Terminal statuses never change again on the controller.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Successful | JobStatus::Failed | JobStatus::Error | JobStatus::Canceled
        )
    }

    /// Fixed progress mapping: pre-run 0, running 50, terminal 100.
    pub fn percent(&self) -> u8 {
        if self.is_terminal() {
            100
        } else if *self == JobStatus::Running {
            50
        } else {
            0
        }
    }
}

crate::simple_display! {
    JobStatus {
        New => "new",
        Pending => "pending",
        Waiting => "waiting",
        Running => "running",
        Successful => "successful",
        Failed => "failed",
        Error => "error",
        Canceled => "canceled",
    }
}

/// Point-in-time snapshot of a unified job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub name: String,
    pub status: JobStatus,
    /// Wall-clock runtime in seconds, as reported by the controller.
    #[serde(default)]
    pub elapsed: f64,
    #[serde(default)]
    pub failed: bool,
}

/// One node of a workflow job's graph.
///
/// `job` stays empty until the controller materializes a job for the node
/// (nodes on never-taken branches stay empty forever).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    pub job: Option<JobSummary>,
}

crate::builder! {
    pub struct JobSummaryBuilder => JobSummary {
        into {
            name: String = "demo-job",
        }
        set {
            id: JobId = JobId::new(1),
            kind: JobKind = JobKind::Job,
            status: JobStatus = JobStatus::Pending,
            elapsed: f64 = 0.0,
            failed: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
