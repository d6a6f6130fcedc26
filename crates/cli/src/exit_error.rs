// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, so `main()` owns process termination. The watch command
//! distinguishes jobs that ran and failed (code 1) from polls it could not
//! complete (code 2).

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    /// Watched jobs finished but some reported failure.
    pub fn jobs_failed(names: &[String]) -> Self {
        Self {
            code: 1,
            message: format!("{} job(s) failed: {}", names.len(), names.join(", ")),
        }
    }

    /// A poll cycle could not complete; the error is retryable by rerunning.
    pub fn refresh_failed(error: impl fmt::Display) -> Self {
        Self { code: 2, message: format!("refresh failed: {error}") }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
