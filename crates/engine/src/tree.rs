// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! The root collection of supervised jobs.

use crate::node::ProgressNode;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tow_adapters::{JobSource, LogSource, SourceError};
use tow_core::{Clock, JobId, JobKind, JobStatus, JobSummary, SystemClock};

/// One planned log fetch: which job, which collection, where to resume.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LogTarget {
    pub id: JobId,
    pub kind: JobKind,
    pub cursor: u64,
}

/// Text retrieved for one node by [`ProgressTree::fetch_logs`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogChunk {
    pub text: String,
    /// New cursor position for ranged fetches; `None` for whole-blob kinds.
    pub cursor: Option<u64>,
}

/// Per-node outcome of one log fan-out. Failures are carried alongside
/// successes instead of aborting the batch.
#[derive(Debug)]
pub struct LogFetch {
    pub id: JobId,
    pub result: Result<LogChunk, SourceError>,
}

/// Aggregate display state for the whole tree. Purely informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootIndicator {
    pub label: String,
    pub elapsed_secs: u64,
    /// How far through the current polling interval the tree is, 0–100.
    pub interval_percent: u8,
}

/// Flattened display data for one node; `depth` gives tree indentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub id: JobId,
    pub depth: usize,
    pub name: String,
    pub status: Option<JobStatus>,
    pub percent: u8,
    pub elapsed_secs: u64,
    pub failed: bool,
}

/// The root collection: a forest of [`ProgressNode`]s keyed by job id,
/// refreshed with one batched snapshot call per poll.
///
/// The tree spawns nothing and locks nothing: the caller's poll loop is the
/// only driver, so every mutation happens on the calling task in sequence.
pub struct ProgressTree<S, L, C = SystemClock> {
    source: S,
    logs: L,
    clock: C,
    label: String,
    interval: Duration,
    started_at: Instant,
    last_refresh: Option<Instant>,
    nodes: BTreeMap<JobId, ProgressNode>,
}

impl<S: JobSource, L: LogSource, C: Clock> ProgressTree<S, L, C> {
    pub fn new(source: S, logs: L, clock: C) -> Self {
        let started_at = clock.now();
        Self {
            source,
            logs,
            clock,
            label: "Watching jobs".to_string(),
            interval: Duration::from_secs(5),
            started_at,
            last_refresh: None,
            nodes: BTreeMap::new(),
        }
    }

    tow_core::setters! {
        into {
            label: String,
        }
        set {
            interval: Duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: JobId) -> Option<&ProgressNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ProgressNode> {
        self.nodes.values()
    }

    /// Start tracking a job by bare id. Idempotent; a duplicate id leaves
    /// the existing node untouched.
    pub fn register(&mut self, id: JobId, kind: JobKind) {
        self.nodes.entry(id).or_insert_with(|| ProgressNode::new(id, kind));
    }

    /// Start tracking a job from a snapshot already in hand. Idempotent.
    pub fn register_job(&mut self, summary: JobSummary) {
        match self.nodes.entry(summary.id) {
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                let mut node = ProgressNode::new(summary.id, summary.kind);
                node.observe(summary);
                entry.insert(node);
            }
        }
    }

    /// Refresh every tracked job with a single batched snapshot call.
    ///
    /// A failed batch propagates with no node mutated. Returned snapshots
    /// route by id; ids the response omits keep their prior state, ids the
    /// tree no longer tracks are dropped. Workflow jobs that took a
    /// snapshot then sync their children incrementally.
    pub async fn refresh_all(&mut self) -> Result<(), SourceError> {
        if self.nodes.is_empty() {
            self.last_refresh = Some(self.clock.now());
            return Ok(());
        }
        let ids: Vec<JobId> = self.nodes.keys().copied().collect();
        let summaries = self.source.job_summaries(&ids).await?;

        let source = &self.source;
        for summary in summaries {
            let Some(node) = self.nodes.get_mut(&summary.id) else {
                tracing::debug!(job_id = %summary.id, "snapshot for untracked job ignored");
                continue;
            };
            node.observe(summary);
            if node.kind().is_workflow() && !node.completed() {
                node.sync_children(source).await?;
            }
        }
        self.last_refresh = Some(self.clock.now());
        Ok(())
    }

    /// Fetch pending log output for every incomplete job in the forest.
    ///
    /// Fetches run concurrently and are joined as a batch of per-node
    /// results: one node's failure never blocks the others, and a failed
    /// node keeps its cursor and chunk unchanged for the next attempt.
    pub async fn fetch_logs(&mut self) -> Vec<LogFetch> {
        let mut plan: Vec<LogTarget> = Vec::new();
        for node in self.nodes.values() {
            node.collect_log_targets(&mut plan);
        }

        let logs = &self.logs;
        let fetches = plan.into_iter().map(|target| async move {
            let result = match target.kind {
                JobKind::SystemJob => {
                    logs.stdout(target.id).await.map(|text| LogChunk { text, cursor: None })
                }
                kind => logs
                    .stdout_range(target.id, kind, target.cursor)
                    .await
                    .map(|slice| LogChunk { text: slice.content, cursor: Some(slice.end) }),
            };
            LogFetch { id: target.id, result }
        });
        let results = join_all(fetches).await;

        for fetch in &results {
            match &fetch.result {
                Ok(chunk) => {
                    if let Some(node) = self.find_node_mut(fetch.id) {
                        node.apply_log(chunk);
                    }
                }
                Err(error) => {
                    tracing::warn!(job_id = %fetch.id, error = %error, "log fetch failed");
                }
            }
        }
        results
    }

    /// Detach and return every fully completed top-level job; prune the
    /// completed subtrees of the jobs that remain.
    pub fn reap(&mut self) -> Vec<ProgressNode> {
        let done: Vec<JobId> = self
            .nodes
            .values_mut()
            .filter_map(|node| if node.set_complete() { Some(node.id()) } else { None })
            .collect();

        let mut reaped = Vec::with_capacity(done.len());
        for id in done {
            if let Some(node) = self.nodes.remove(&id) {
                tracing::info!(job_id = %id, "job complete, detaching from tree");
                reaped.push(node);
            }
        }
        for node in self.nodes.values_mut() {
            node.prune_completed_children();
        }
        reaped
    }

    /// Aggregate display state (label, elapsed, interval progress).
    pub fn indicator(&self) -> RootIndicator {
        let now = self.clock.now();
        let elapsed_secs = now.duration_since(self.started_at).as_secs();
        let interval_percent = match self.last_refresh {
            Some(at) if !self.interval.is_zero() => {
                let through =
                    now.duration_since(at).as_secs_f64() / self.interval.as_secs_f64();
                (through * 100.0).min(100.0) as u8
            }
            _ => 0,
        };
        RootIndicator { label: self.label.clone(), elapsed_secs, interval_percent }
    }

    /// Flatten the forest into display rows, depth-first.
    pub fn rows(&self) -> Vec<DisplayRow> {
        let mut rows = Vec::new();
        for node in self.nodes.values() {
            push_rows(node, 0, &mut rows);
        }
        rows
    }

    fn find_node_mut(&mut self, id: JobId) -> Option<&mut ProgressNode> {
        self.nodes.values_mut().find_map(|node| node.find_mut(id))
    }
}

fn push_rows(node: &ProgressNode, depth: usize, rows: &mut Vec<DisplayRow>) {
    rows.push(DisplayRow {
        id: node.id(),
        depth,
        name: node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("job {}", node.id())),
        status: node.status(),
        percent: node.percent(),
        elapsed_secs: node.elapsed_secs(),
        failed: node.failed(),
    });
    for child in node.children() {
        push_rows(child, depth + 1, rows);
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
