//! Client for the Simulation HTTP API.
//!
//! The REST surface (`/api/citizens`, `/api/activities`, `/api/resources`,
//! `/api/contracts`, `/api/problems`, `/api/activities/try-create`) is
//! consumed read-mostly by the analysis reports, plus one write path for
//! delegated activity creation.
//!
//! Upstream handlers answer inconsistently: some return a bare JSON list,
//! others wrap it as `{"citizens": [...]}`. [`envelope`] normalizes both
//! shapes at the boundary so nothing downstream type-checks responses
//! defensively.
//!
//! # Modules
//!
//! - [`envelope`] -- Response shape normalization
//! - [`client`] -- The [`ApiClient`]
//! - [`error`] -- Error types

pub mod client;
pub mod envelope;
pub mod error;

pub use client::{ApiClient, TryCreateActivity};
pub use envelope::Envelope;
pub use error::ApiError;
