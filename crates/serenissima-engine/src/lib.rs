//! Activity and stratagem lifecycle logic for La Serenissima.
//!
//! This crate holds the behavior that earlier tooling spread across
//! hundreds of near-identical scripts: creating activities (validate,
//! compute a time window, insert exactly one `created` record), processing
//! them (apply effects exactly once behind a status guard, advance to a
//! terminal state), and running stratagems (long-lived plans aggregating
//! many activities through normalized participant rows).
//!
//! ```text
//! caller -> creators  (one insert, status = created)
//!             |            [scheduling lives outside this workspace]
//!             v
//!          processors (status guard -> effects -> terminal status)
//!             |
//!             +-- effects: ducat transfers, stack relocation, trust deltas
//!             +-- stratagems: participant rows, rewards, conclusion
//! ```
//!
//! Everything takes a [`RecordStore`] and a [`ToolingConfig`] explicitly;
//! nothing reads ambient environment state.
//!
//! # Modules
//!
//! - [`config`] -- One configuration object, loaded once at startup
//! - [`timing`] -- The uniform activity time-window policy
//! - [`activities`] -- Creators and processors
//! - [`stratagems`] -- Collective delivery lifecycle
//! - [`effects`] -- Audited mutations of citizen/resource/relationship rows
//! - [`social`] -- Canonical relationship classification
//! - [`contracts`] -- Contract cancellation rules
//! - [`error`] -- Error types
//!
//! [`RecordStore`]: serenissima_store::RecordStore
//! [`ToolingConfig`]: config::ToolingConfig

pub mod activities;
pub mod config;
pub mod contracts;
pub mod effects;
pub mod error;
pub mod social;
pub mod stratagems;
pub mod timing;

pub use activities::creators;
pub use activities::processors::{self, ProcessOutcome, ProcessReport};
pub use config::{ConfigError, ToolingConfig};
pub use error::EngineError;
pub use timing::{RouteWindow, WindowRequest};
