//! Rebuilds the inventory graph from the source of truth: fetches raw
//! records, resolves the references between them, imports every asset kind
//! in dependency order and reconciles node network configuration with the
//! cabling of their servers.

pub mod asset;
mod bespoke;
pub mod errors;
pub mod generic;
pub mod orchestrator;
pub mod reference;
pub mod relationship;
pub mod source;
pub mod summary;
pub mod topology;

pub use errors::{ImportError, QueryError};
pub use orchestrator::{ImportOptions, Importer};
pub use relationship::CollisionPolicy;
pub use source::{FixtureSource, QuerySource, RetryingSource, SshMetalClient};
pub use summary::{ImportSummary, ImportWarning};
