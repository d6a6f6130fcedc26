// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tow-engine: progress supervision for remote controller jobs.
//!
//! A [`ProgressTree`] mirrors the server-side state of a set of unified
//! jobs — including workflow jobs, whose execution is a tree of child jobs
//! discovered incrementally — and exposes plain display data for a host to
//! render between polls. The engine runs no background tasks: the caller
//! drives it (poll → sleep → poll) and every mutation happens on the
//! calling task.

pub mod node;
pub mod tree;

pub use node::ProgressNode;
pub use tree::{DisplayRow, LogChunk, LogFetch, ProgressTree, RootIndicator};
