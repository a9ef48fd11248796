//! Record Store client for the La Serenissima tooling.
//!
//! The Record Store is the external hosted tabular database acting as the
//! system of record for all entities: citizens, activities, stratagems,
//! contracts, resources, relationships. It is reached over HTTPS with an
//! API key; queries are expressed in its formula DSL.
//!
//! This crate provides one typed client with two interchangeable backends:
//!
//! ```text
//! RecordStore
//!     |
//!     +-- Backend::Http ----> hosted store (reqwest, API key, timeouts)
//!     +-- Backend::Memory --> in-process tables (tests, --dry-run)
//! ```
//!
//! Both backends consume the same [`Filter`] AST: the HTTP backend renders
//! it to a formula string, the memory backend evaluates it directly, so a
//! query tested against memory behaves identically against the wire.
//!
//! # Modules
//!
//! - [`filter`] -- Query AST, formula rendering, and in-memory evaluation
//! - [`record`] -- Record envelope types (`RecordId`, typed `Record<T>`)
//! - [`http`] -- HTTPS backend
//! - [`memory`] -- In-memory backend
//! - [`store`] -- The [`RecordStore`] facade and backend dispatch
//! - [`error`] -- Shared error types

pub mod error;
pub mod filter;
pub mod http;
pub mod memory;
pub mod record;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use filter::Filter;
pub use http::{HttpBackend, StoreHttpConfig};
pub use memory::MemoryBackend;
pub use record::{RawRecord, Record, RecordId};
pub use store::{Backend, RecordStore};
