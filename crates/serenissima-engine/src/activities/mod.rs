//! The activity lifecycle: creation and processing.
//!
//! A creator validates preconditions, computes a time window, and inserts
//! exactly one record in `created` status. A processor, invoked after the
//! window elapses, applies the type's effects exactly once behind a status
//! guard and advances the record to a terminal status. The scheduling
//! between the two lives outside this workspace.
//!
//! # Submodules
//!
//! - [`creators`] -- One method per activity type, shared window policy.
//! - [`processors`] -- The guarded effect application pass.

pub mod creators;
pub mod processors;
