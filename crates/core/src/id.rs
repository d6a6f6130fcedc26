// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Identifier newtypes for controller resources.

/// Define a newtype ID wrapper around the controller's integer primary keys.
///
/// Generates `new()`, `as_u64()`, `Display`, `From<u64>` (and back),
/// ordering, hashing, and transparent serde, so ids read naturally in
/// query strings, log fields, and map keys.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

crate::define_id! {
    /// Unique identifier of a unified job on the controller.
    ///
    /// Workflow children share the same id space as top-level jobs.
    pub struct JobId;
}

crate::define_id! {
    /// Unique identifier of a workflow graph node.
    ///
    /// Distinct from the id of the job a node may eventually run.
    pub struct NodeId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
