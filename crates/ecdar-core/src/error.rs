use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed JSON: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    #[error("Id allocation error: {0}")]
    Allocation(#[from] IdError),

    #[error("File system error: {0}")]
    FileSystem(#[from] FsError),

    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Attach the file a failure was read from.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        CoreError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through `InFile` wrappers.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self.root() {
            CoreError::Schema(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_invariant(&self) -> Option<&InvariantError> {
        match self.root() {
            CoreError::Invariant(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self.root(), CoreError::Syntax(_))
    }
}

/// Input was not well-formed JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for SyntaxError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Well-formed JSON that does not match the declared shape of an entity.
///
/// Every variant carries the dotted path of the offending field, e.g.
/// `components[0].locations[1].type`. The empty path is the document root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required field `{path}`")]
    MissingField { path: String },

    #[error("field `{path}` must be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{path}` has value {value:?}, expected one of {allowed:?}")]
    InvalidEnumValue {
        path: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("unknown field `{path}`")]
    UnknownField { path: String },

    #[error("field `{path}` could not be converted: {message}")]
    Conversion { path: String, message: String },
}

impl SchemaError {
    pub fn path(&self) -> &str {
        match self {
            SchemaError::MissingField { path }
            | SchemaError::WrongType { path, .. }
            | SchemaError::InvalidEnumValue { path, .. }
            | SchemaError::UnknownField { path }
            | SchemaError::Conversion { path, .. } => path,
        }
    }
}

/// A structurally valid entity that breaks a rule spanning several entities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantError {
    #[error("Coordinate {axis} must be finite, got {value}")]
    NonFiniteCoordinate { axis: &'static str, value: f64 },

    #[error("Component name already in use: {0}")]
    DuplicateComponentName(String),

    /// Component and system names become file names in a project directory.
    #[error("{entity} name {name:?} cannot be used as a file name")]
    InvalidName { entity: &'static str, name: String },

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Component {component} has two locations with id {id}")]
    DuplicateLocationId { component: String, id: String },

    #[error("Component {component} has two edges with id {id}")]
    DuplicateEdgeId { component: String, id: String },

    #[error("Component {component} has no location {id}")]
    LocationNotFound { component: String, id: String },

    #[error("Edge {edge} in component {component} references missing location {location}")]
    DanglingEdgeEndpoint {
        component: String,
        edge: String,
        location: String,
    },

    #[error("Location {location} in component {component} is still used by edge {edge}")]
    LocationInUse {
        component: String,
        location: String,
        edge: String,
    },

    #[error("Component {component} has no edge {id}")]
    EdgeNotFound { component: String, id: String },

    #[error("Component {component} has {count} initial locations (expected exactly 1)")]
    InitialLocationCount { component: String, count: usize },

    #[error("System name already in use: {0}")]
    DuplicateSystemName(String),

    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("System {system} has two nodes with id {id}")]
    DuplicateSystemNodeId { system: String, id: u32 },

    #[error("System {system} has no node {id}")]
    SystemNodeNotFound { system: String, id: u32 },

    #[error("Edge {parent} -> {child} in system {system} references a missing node")]
    DanglingSystemEdge {
        system: String,
        parent: u32,
        child: u32,
    },

    #[error("System {0} contains a cycle")]
    SystemCycle(String),

    #[error("Query index {index} out of range (have {len})")]
    QueryNotFound { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("namespace `{0}` has no ids left")]
    Exhausted(&'static str),

    #[error("id {id} already issued in namespace `{namespace}`")]
    Taken { namespace: &'static str, id: u32 },
}

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}
