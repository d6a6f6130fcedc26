// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

use tow_adapters::{FakeController, SourceCall};
use tow_core::{FakeClock, JobId, JobKind, JobStatus, JobSummary, NodeId, WorkflowNode};
use tow_engine::ProgressTree;

fn summary(id: u64, kind: JobKind, status: JobStatus) -> JobSummary {
    JobSummary::builder().id(JobId::new(id)).kind(kind).status(status).build()
}

fn tree(fake: &FakeController) -> ProgressTree<FakeController, FakeController, FakeClock> {
    ProgressTree::new(fake.clone(), fake.clone(), FakeClock::new())
}

/// A leaf job turning terminal is trusted only on the second observation.
#[tokio::test]
async fn leaf_job_success_is_debounced() {
    let fake = FakeController::new();
    let mut tree = tree(&fake);
    tree.register(JobId::new(1), JobKind::Job);

    fake.push_summary(summary(1, JobKind::Job, JobStatus::Running));
    fake.push_summary(summary(1, JobKind::Job, JobStatus::Successful));

    tree.refresh_all().await.unwrap();
    assert_eq!(tree.get(JobId::new(1)).unwrap().percent(), 50);

    // First terminal observation: finished, not completed.
    tree.refresh_all().await.unwrap();
    let node = tree.get(JobId::new(1)).unwrap();
    assert_eq!(node.percent(), 100);
    assert!(node.finished());
    assert!(!node.completed());
    assert!(tree.reap().is_empty());

    // Second terminal observation: eligible for completion.
    tree.refresh_all().await.unwrap();
    let reaped = tree.reap();
    assert_eq!(reaped.len(), 1);
    assert_eq!(reaped[0].id(), JobId::new(1));
    assert!(tree.is_empty());
}

/// A workflow job with no children completes on its own debounce.
#[tokio::test]
async fn childless_workflow_is_reaped_after_confirmation() {
    let fake = FakeController::new();
    let mut tree = tree(&fake);
    let id = JobId::new(2);
    tree.register(id, JobKind::WorkflowJob);
    fake.push_summary(summary(2, JobKind::WorkflowJob, JobStatus::Successful));

    tree.refresh_all().await.unwrap();
    assert!(tree.reap().is_empty());

    tree.refresh_all().await.unwrap();
    let reaped = tree.reap();
    assert_eq!(reaped.len(), 1);
    assert_eq!(reaped[0].id(), id);
    assert!(tree.is_empty());
}

/// Parent completion waits for every child to confirm, bottom-up.
#[tokio::test]
async fn workflow_waits_for_both_children() {
    let fake = FakeController::new();
    let mut tree = tree(&fake);
    let workflow = JobId::new(10);
    tree.register(workflow, JobKind::WorkflowJob);

    fake.push_summary(summary(10, JobKind::WorkflowJob, JobStatus::Running));
    fake.push_summary(summary(10, JobKind::WorkflowJob, JobStatus::Successful));
    fake.set_nodes(
        workflow,
        vec![
            WorkflowNode { id: NodeId::new(1), job: Some(summary(11, JobKind::Job, JobStatus::Running)) },
            WorkflowNode { id: NodeId::new(2), job: Some(summary(12, JobKind::Job, JobStatus::Running)) },
        ],
    );

    // Children discovered while the workflow runs.
    tree.refresh_all().await.unwrap();
    assert_eq!(tree.rows().len(), 3);

    // Workflow reports terminal before its children do.
    fake.set_nodes(
        workflow,
        vec![
            WorkflowNode { id: NodeId::new(1), job: Some(summary(11, JobKind::Job, JobStatus::Successful)) },
            WorkflowNode { id: NodeId::new(2), job: Some(summary(12, JobKind::Job, JobStatus::Running)) },
        ],
    );
    tree.refresh_all().await.unwrap();
    assert!(tree.reap().is_empty());

    // Workflow confirmed, first child confirmed, second still running.
    fake.set_nodes(
        workflow,
        vec![
            WorkflowNode { id: NodeId::new(1), job: Some(summary(11, JobKind::Job, JobStatus::Successful)) },
            WorkflowNode { id: NodeId::new(2), job: Some(summary(12, JobKind::Job, JobStatus::Successful)) },
        ],
    );
    tree.refresh_all().await.unwrap();
    assert!(tree.reap().is_empty());

    // Second child confirms; the whole subtree settles.
    tree.refresh_all().await.unwrap();
    let reaped = tree.reap();
    assert_eq!(reaped.len(), 1);
    assert_eq!(reaped[0].id(), workflow);
    assert!(tree.is_empty());
}

/// One failing log fetch neither blocks nor corrupts the others.
#[tokio::test]
async fn log_fan_out_isolates_failures() {
    let fake = FakeController::new();
    let mut tree = tree(&fake);
    for id in 1..=3u64 {
        tree.register(JobId::new(id), JobKind::Job);
        fake.push_summary(summary(id, JobKind::Job, JobStatus::Running));
    }
    tree.refresh_all().await.unwrap();

    fake.push_slice(JobId::new(1), "alpha\n", 11);
    fake.fail_logs(JobId::new(2));
    fake.push_slice(JobId::new(3), "gamma\n", 33);

    let results = tree.fetch_logs().await;
    let failures: Vec<JobId> =
        results.iter().filter(|f| f.result.is_err()).map(|f| f.id).collect();
    assert_eq!(failures, vec![JobId::new(2)]);

    assert_eq!(tree.get(JobId::new(1)).unwrap().log_chunk(), "alpha\n");
    assert_eq!(tree.get(JobId::new(1)).unwrap().log_cursor(), 11);
    assert_eq!(tree.get(JobId::new(2)).unwrap().log_chunk(), "");
    assert_eq!(tree.get(JobId::new(2)).unwrap().log_cursor(), 0);
    assert_eq!(tree.get(JobId::new(3)).unwrap().log_cursor(), 33);
}

/// The log cursor advances 0 → 120 → 245 and each fetch resumes from it.
#[tokio::test]
async fn cursor_advances_across_fetches() {
    let fake = FakeController::new();
    let mut tree = tree(&fake);
    let id = JobId::new(5);
    tree.register(id, JobKind::Job);
    fake.push_summary(summary(5, JobKind::Job, JobStatus::Running));
    tree.refresh_all().await.unwrap();

    fake.push_slice(id, "first chunk\n", 120);
    tree.fetch_logs().await;
    assert_eq!(tree.get(id).unwrap().log_cursor(), 120);

    fake.push_slice(id, "second chunk\n", 245);
    tree.fetch_logs().await;
    assert_eq!(tree.get(id).unwrap().log_cursor(), 245);
    assert_eq!(tree.get(id).unwrap().log_chunk(), "second chunk\n");

    let starts: Vec<u64> = fake
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SourceCall::StdoutRange { start_line, .. } => Some(start_line),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![0, 120]);
}
