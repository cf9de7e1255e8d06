//! Ecdar Core - Project model, document schema, and id allocation.
//!
//! This crate holds the in-memory model of an Ecdar project (components,
//! systems, queries, declarations), the schema that raw JSON documents are
//! checked against, and the adapter that loads and saves project directories
//! through a [`FileSystem`]. It does no I/O of its own.

pub mod document;
pub mod engine;
pub mod error;
pub mod fs;
pub mod id;
pub mod model;
pub mod point;
pub mod project;
pub mod raw;
pub mod schema;

// Re-exports for convenience
pub use document::DocumentAdapter;
pub use engine::{EngineClient, EngineError, EngineRequest, QueryOutcome};
pub use error::{CoreError, FsError, IdError, InvariantError, SchemaError, SyntaxError};
pub use fs::FileSystem;
pub use id::{IdNamespace, ProjectId, ProjectIds};
pub use model::component::Component;
pub use model::declaration::Declaration;
pub use model::edge::{Edge, EdgeId, EdgeStatus, Nail, PropertyType};
pub use model::location::{Location, LocationId, LocationType, Urgency};
pub use model::query::Query;
pub use model::system::{ComponentInstance, Operator, OperatorType, System, SystemEdge};
pub use model::HasRaw;
pub use point::{Dimensions, Point};
pub use project::{InitialLocationPolicy, Project, ProjectContext, ProjectPolicy};
pub use raw::{EntityKind, RawEntity, RawProject, RawRecord};

#[cfg(any(test, feature = "test-utils"))]
pub use fs::memory::InMemoryFileSystem;
