// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! One tree node mirroring a remote job's last known state.

use crate::tree::{LogChunk, LogTarget};
use futures_util::future::BoxFuture;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tow_adapters::{JobSource, SourceError};
use tow_core::{JobId, JobKind, JobStatus, JobSummary};

/// Mirror of one remote job.
///
/// Owned strictly downward: the tree owns registered nodes, a workflow node
/// owns its children. The parent link is a plain id used for display
/// nesting only, never for traversal.
///
/// Completion is debounced: a terminal status must be observed twice before
/// [`set_complete`](Self::set_complete) will trust it, because a workflow
/// job can report terminal before all of its children exist on the
/// controller. `finished` and `completed` only ever go false → true.
#[derive(Debug, Clone)]
pub struct ProgressNode {
    id: JobId,
    kind: JobKind,
    parent: Option<JobId>,
    summary: Option<JobSummary>,
    percent: u8,
    finished: bool,
    confirmed: bool,
    completed: bool,
    children: BTreeMap<JobId, ProgressNode>,
    log_cursor: u64,
    log_chunk: String,
}

impl ProgressNode {
    /// Create an untracked node; state arrives with the first [`observe`](Self::observe).
    pub fn new(id: JobId, kind: JobKind) -> Self {
        Self::with_parent(id, kind, None)
    }

    fn with_parent(id: JobId, kind: JobKind, parent: Option<JobId>) -> Self {
        Self {
            id,
            kind,
            parent,
            summary: None,
            percent: 0,
            finished: false,
            confirmed: false,
            completed: false,
            children: BTreeMap::new(),
            log_cursor: 0,
            log_chunk: String::new(),
        }
    }

    /// Create a workflow child from its first observed summary.
    pub(crate) fn child_of(parent: JobId, summary: JobSummary) -> Self {
        let mut node = Self::with_parent(summary.id, summary.kind, Some(parent));
        node.observe(summary);
        node
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Id of the owning node, for display nesting. `None` for registered
    /// top-level jobs.
    pub fn parent(&self) -> Option<JobId> {
        self.parent
    }

    /// Name from the last snapshot, once one has been observed.
    pub fn name(&self) -> Option<&str> {
        self.summary.as_ref().map(|s| s.name.as_str())
    }

    /// Status from the last snapshot, once one has been observed.
    pub fn status(&self) -> Option<JobStatus> {
        self.summary.as_ref().map(|s| s.status)
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Runtime in whole seconds, as last reported by the controller.
    pub fn elapsed_secs(&self) -> u64 {
        self.summary.as_ref().map(|s| s.elapsed as u64).unwrap_or(0)
    }

    pub fn failed(&self) -> bool {
        self.summary.as_ref().is_some_and(|s| s.failed)
    }

    /// True once a terminal status has been observed at least once.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// True once the debounce and every descendant have resolved.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Next unread line offset for ranged log fetches.
    pub fn log_cursor(&self) -> u64 {
        self.log_cursor
    }

    /// Most recently fetched log text. Replaced per fetch, never
    /// accumulated — accumulation is the caller's business.
    pub fn log_chunk(&self) -> &str {
        &self.log_chunk
    }

    pub fn children(&self) -> impl Iterator<Item = &ProgressNode> {
        self.children.values()
    }

    /// Fold a fresh snapshot into this node.
    ///
    /// The first terminal observation latches `finished`; a terminal
    /// observation while `finished` is already set latches the debounce
    /// confirmation. A non-terminal observation in between changes the
    /// displayed status but resets neither flag — the node confirms on the
    /// next terminal observation, whenever it comes.
    pub fn observe(&mut self, summary: JobSummary) {
        if self.completed {
            return;
        }
        if summary.status.is_terminal() {
            if self.finished {
                self.confirmed = true;
            } else {
                tracing::debug!(
                    job_id = %self.id,
                    status = %summary.status,
                    "terminal status observed, awaiting confirmation"
                );
                self.finished = true;
            }
        }
        self.percent = summary.status.percent();
        self.summary = Some(summary);
    }

    /// Try to settle this subtree, bottom-up.
    ///
    /// Returns true — and caches the answer permanently — once this node's
    /// debounce has confirmed and every child reports complete. Until then
    /// each call re-walks the children so deeper subtrees cache their own
    /// completion as it happens.
    pub fn set_complete(&mut self) -> bool {
        if self.completed {
            return true;
        }
        if !(self.finished && self.confirmed) {
            return false;
        }
        // Full pass, no short-circuit.
        let mut all_done = true;
        for child in self.children.values_mut() {
            if !child.set_complete() {
                all_done = false;
            }
        }
        if all_done {
            self.completed = true;
        }
        self.completed
    }

    /// Drop child state that is no longer needed.
    ///
    /// A completed node clears its whole child map; an incomplete node
    /// keeps its children and recurses into them.
    pub fn prune_completed_children(&mut self) {
        if self.children.is_empty() {
            return;
        }
        if self.completed {
            tracing::debug!(
                job_id = %self.id,
                children = self.children.len(),
                "pruning completed subtree"
            );
            self.children.clear();
            return;
        }
        for child in self.children.values_mut() {
            child.prune_completed_children();
        }
    }

    /// Incrementally sync this workflow job's children from the source.
    ///
    /// Children already known complete are excluded from the listing
    /// server-side (an advisory optimization — a mis-skip is corrected on
    /// the next poll). Listed nodes route to the existing child's `observe`
    /// or insert a new child; nodes without a job are not represented at
    /// all. Children that are themselves workflow jobs sync recursively,
    /// hence the boxed future.
    pub(crate) fn sync_children<'a, S: JobSource>(
        &'a mut self,
        source: &'a S,
    ) -> BoxFuture<'a, Result<(), SourceError>> {
        Box::pin(async move {
            let known_complete: Vec<JobId> =
                self.children.values().filter(|c| c.completed).map(|c| c.id).collect();
            let listing = source.workflow_nodes(self.id, &known_complete).await?;
            for wf_node in listing {
                let Some(summary) = wf_node.job else {
                    continue;
                };
                let child_id = summary.id;
                match self.children.entry(child_id) {
                    Entry::Occupied(mut entry) => entry.get_mut().observe(summary),
                    Entry::Vacant(entry) => {
                        tracing::debug!(
                            workflow = %self.id,
                            job_id = %child_id,
                            "discovered workflow child"
                        );
                        entry.insert(ProgressNode::child_of(self.id, summary));
                    }
                }
                if let Some(child) = self.children.get_mut(&child_id) {
                    if child.kind.is_workflow() && !child.completed {
                        child.sync_children(source).await?;
                    }
                }
            }
            Ok(())
        })
    }

    /// Collect the log fetches this subtree needs right now.
    ///
    /// A node qualifies once it has a known job, is not yet completed, and
    /// is of a kind that captures stdout.
    pub(crate) fn collect_log_targets(&self, plan: &mut Vec<LogTarget>) {
        if self.summary.is_some() && !self.completed && self.kind.has_stdout() {
            plan.push(LogTarget { id: self.id, kind: self.kind, cursor: self.log_cursor });
        }
        for child in self.children.values() {
            child.collect_log_targets(plan);
        }
    }

    /// Find a node anywhere in this subtree by job id.
    pub(crate) fn find_mut(&mut self, id: JobId) -> Option<&mut ProgressNode> {
        if self.id == id {
            return Some(self);
        }
        if self.children.contains_key(&id) {
            return self.children.get_mut(&id);
        }
        self.children.values_mut().find_map(|child| child.find_mut(id))
    }

    /// Apply a successfully fetched log chunk.
    pub(crate) fn apply_log(&mut self, chunk: &LogChunk) {
        if let Some(cursor) = chunk.cursor {
            // A replayed older range must not rewind the cursor.
            self.log_cursor = self.log_cursor.max(cursor);
        }
        self.log_chunk = chunk.text.clone();
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
