// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tow-adapters: collaborator seams for the remote controller.
//!
//! The engine talks to the controller through two narrow traits —
//! [`JobSource`] for job status and workflow-node listings, [`LogSource`]
//! for captured stdout. [`ControllerClient`] is the REST implementation of
//! both; [`FakeController`] is a scripted in-memory implementation for
//! tests.

pub mod http;
pub mod source;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeController, SourceCall};

pub use http::{ControllerClient, ControllerConfig, DEFAULT_PAGE_SIZE};
pub use source::{JobSource, LogSlice, LogSource, SourceError};
