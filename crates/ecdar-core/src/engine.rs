//! What the core hands to a verification engine.
//!
//! Engines run out of process; this module only assembles the raw document
//! they check and defines the client seam.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, InvariantError};
use crate::model::HasRaw;
use crate::project::Project;
use crate::raw::{RawComponent, RawDeclaration, RawQuery, RawSystem};

/// Everything an engine needs to answer one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequest {
    pub global_declarations: RawDeclaration,
    pub components: Vec<RawComponent>,
    pub systems: Vec<RawSystem>,
    pub query: RawQuery,
}

impl EngineRequest {
    /// Bundle the query at `index` with the project it refers to.
    pub fn for_query(project: &Project, index: usize) -> Result<Self, CoreError> {
        let query = project
            .query(index)
            .ok_or(InvariantError::QueryNotFound {
                index,
                len: project.queries().len(),
            })?;

        Ok(Self {
            global_declarations: project.global_declarations().to_raw(),
            components: project.components().iter().map(|c| c.to_raw()).collect(),
            systems: project.systems().iter().map(|s| s.to_raw()).collect(),
            query: query.to_raw(),
        })
    }

    /// The engine the query asked for.
    pub fn backend(&self) -> u32 {
        self.query.backend
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::Serialize(e.to_string()))
    }
}

/// Answer from an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Satisfied,
    Violated { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No engine is registered for the backend id.
    UnknownBackend(u32),
    /// The engine could not be reached or failed to answer.
    Unavailable(String),
    /// The engine rejected the request.
    Rejected(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownBackend(id) => write!(f, "no engine for backend {id}"),
            EngineError::Unavailable(msg) => write!(f, "engine unavailable: {msg}"),
            EngineError::Rejected(msg) => write!(f, "engine rejected request: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Client for an external verification engine.
pub trait EngineClient {
    fn verify(&self, request: &EngineRequest) -> Result<QueryOutcome, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ProjectId;
    use crate::model::component::tests::raw_component;
    use crate::model::query::Query;
    use crate::project::ProjectPolicy;

    /// Engine that satisfies every query it can parse back.
    struct EchoEngine;

    impl EngineClient for EchoEngine {
        fn verify(&self, request: &EngineRequest) -> Result<QueryOutcome, EngineError> {
            if request.backend() != 0 {
                return Err(EngineError::UnknownBackend(request.backend()));
            }
            let json = request
                .to_json()
                .map_err(|e| EngineError::Rejected(e.to_string()))?;
            let decoded: EngineRequest =
                serde_json::from_str(&json).map_err(|e| EngineError::Rejected(e.to_string()))?;
            if decoded.components.is_empty() {
                return Ok(QueryOutcome::Violated {
                    reason: "no components".to_string(),
                });
            }
            Ok(QueryOutcome::Satisfied)
        }
    }

    fn project() -> Project {
        let mut project = Project::new(ProjectId(0), "University", ProjectPolicy::default());
        project.import_component(raw_component("Admin")).unwrap();
        project.add_query(Query::new("consistency: Admin", 0));
        project.add_query(Query::new("consistency: Admin", 3));
        project
    }

    #[test]
    fn test_request_carries_query_and_components() {
        let project = project();
        let request = EngineRequest::for_query(&project, 0).unwrap();
        assert_eq!(request.query.query, "consistency: Admin");
        assert_eq!(request.components.len(), 1);

        let value: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(value["globalDeclarations"]["name"], "Global Declarations");
        assert_eq!(value["components"][0]["locations"][0]["type"], "INITIAL");
    }

    #[test]
    fn test_missing_query() {
        let err = EngineRequest::for_query(&project(), 5).unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::QueryNotFound { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_client_seam() {
        let project = project();
        let engine = EchoEngine;
        let ok = EngineRequest::for_query(&project, 0).unwrap();
        assert_eq!(engine.verify(&ok), Ok(QueryOutcome::Satisfied));

        let unknown = EngineRequest::for_query(&project, 1).unwrap();
        assert_eq!(engine.verify(&unknown), Err(EngineError::UnknownBackend(3)));
    }
}
