//! Raw (persisted) forms of every entity.
//!
//! Field names and enum strings are the on-disk format of saved projects and
//! the format the verification engines read; they must not change.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::edge::{EdgeStatus, PropertyType};
use crate::model::location::{LocationType, Urgency};
use crate::model::system::OperatorType;

// Largest magnitude below which every whole f64 is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Write whole-valued coordinates as integers (`140`, not `140.0`), the way
/// saved projects store them.
fn coordinate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    /// Serialized as `name`; the location's identifier within its component.
    #[serde(rename = "name")]
    pub id: String,
    pub nickname: String,
    pub invariant: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub urgency: Urgency,
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
    pub color: String,
    #[serde(serialize_with = "coordinate")]
    pub nickname_x: f64,
    #[serde(serialize_with = "coordinate")]
    pub nickname_y: f64,
    #[serde(serialize_with = "coordinate")]
    pub invariant_x: f64,
    #[serde(serialize_with = "coordinate")]
    pub invariant_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNail {
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
    pub property_type: PropertyType,
    #[serde(serialize_with = "coordinate")]
    pub property_x: f64,
    #[serde(serialize_with = "coordinate")]
    pub property_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub id: String,
    pub group: String,
    pub source_location: String,
    pub target_location: String,
    pub status: EdgeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    pub guard: String,
    pub update: String,
    pub sync: String,
    pub is_locked: bool,
    pub nails: Vec<RawNail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponent {
    pub name: String,
    pub declarations: String,
    pub locations: Vec<RawLocation>,
    pub edges: Vec<RawEdge>,
    pub description: String,
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
    #[serde(serialize_with = "coordinate")]
    pub width: f64,
    #[serde(serialize_with = "coordinate")]
    pub height: f64,
    pub color: String,
    pub include_in_periodic_check: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponentInstance {
    pub id: u32,
    pub component_name: String,
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOperator {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: OperatorType,
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSystemEdge {
    pub parent: u32,
    pub child: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSystem {
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
    #[serde(serialize_with = "coordinate")]
    pub width: f64,
    #[serde(serialize_with = "coordinate")]
    pub height: f64,
    pub color: String,
    pub component_instances: Vec<RawComponentInstance>,
    pub operators: Vec<RawOperator>,
    pub edges: Vec<RawSystemEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuery {
    pub query: String,
    pub comment: String,
    pub is_periodic: bool,
    pub ignored_inputs: BTreeMap<String, bool>,
    pub ignored_outputs: BTreeMap<String, bool>,
    pub backend: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub name: String,
    pub declarations: String,
}

/// A whole project as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    pub name: String,
    pub global_declarations: RawDeclaration,
    pub components: Vec<RawComponent>,
    pub systems: Vec<RawSystem>,
    pub queries: Vec<RawQuery>,
}

/// Tag naming each kind of raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Component,
    Location,
    Edge,
    Nail,
    System,
    ComponentInstance,
    Operator,
    SystemEdge,
    Query,
    Declaration,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Project,
        EntityKind::Component,
        EntityKind::Location,
        EntityKind::Edge,
        EntityKind::Nail,
        EntityKind::System,
        EntityKind::ComponentInstance,
        EntityKind::Operator,
        EntityKind::SystemEdge,
        EntityKind::Query,
        EntityKind::Declaration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Component => "component",
            EntityKind::Location => "location",
            EntityKind::Edge => "edge",
            EntityKind::Nail => "nail",
            EntityKind::System => "system",
            EntityKind::ComponentInstance => "component_instance",
            EntityKind::Operator => "operator",
            EntityKind::SystemEdge => "system_edge",
            EntityKind::Query => "query",
            EntityKind::Declaration => "declaration",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated raw record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Project(RawProject),
    Component(RawComponent),
    Location(RawLocation),
    Edge(RawEdge),
    Nail(RawNail),
    System(RawSystem),
    ComponentInstance(RawComponentInstance),
    Operator(RawOperator),
    SystemEdge(RawSystemEdge),
    Query(RawQuery),
    Declaration(RawDeclaration),
}

impl RawRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            RawRecord::Project(_) => EntityKind::Project,
            RawRecord::Component(_) => EntityKind::Component,
            RawRecord::Location(_) => EntityKind::Location,
            RawRecord::Edge(_) => EntityKind::Edge,
            RawRecord::Nail(_) => EntityKind::Nail,
            RawRecord::System(_) => EntityKind::System,
            RawRecord::ComponentInstance(_) => EntityKind::ComponentInstance,
            RawRecord::Operator(_) => EntityKind::Operator,
            RawRecord::SystemEdge(_) => EntityKind::SystemEdge,
            RawRecord::Query(_) => EntityKind::Query,
            RawRecord::Declaration(_) => EntityKind::Declaration,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            RawRecord::Project(raw) => serde_json::to_value(raw),
            RawRecord::Component(raw) => serde_json::to_value(raw),
            RawRecord::Location(raw) => serde_json::to_value(raw),
            RawRecord::Edge(raw) => serde_json::to_value(raw),
            RawRecord::Nail(raw) => serde_json::to_value(raw),
            RawRecord::System(raw) => serde_json::to_value(raw),
            RawRecord::ComponentInstance(raw) => serde_json::to_value(raw),
            RawRecord::Operator(raw) => serde_json::to_value(raw),
            RawRecord::SystemEdge(raw) => serde_json::to_value(raw),
            RawRecord::Query(raw) => serde_json::to_value(raw),
            RawRecord::Declaration(raw) => serde_json::to_value(raw),
        }
    }
}

/// A serde-backed raw record with a fixed kind tag.
pub trait RawEntity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn into_record(self) -> RawRecord;
}

macro_rules! raw_entity {
    ($ty:ty, $variant:ident) => {
        impl RawEntity for $ty {
            const KIND: EntityKind = EntityKind::$variant;

            fn into_record(self) -> RawRecord {
                RawRecord::$variant(self)
            }
        }
    };
}

raw_entity!(RawProject, Project);
raw_entity!(RawComponent, Component);
raw_entity!(RawLocation, Location);
raw_entity!(RawEdge, Edge);
raw_entity!(RawNail, Nail);
raw_entity!(RawSystem, System);
raw_entity!(RawComponentInstance, ComponentInstance);
raw_entity!(RawOperator, Operator);
raw_entity!(RawSystemEdge, SystemEdge);
raw_entity!(RawQuery, Query);
raw_entity!(RawDeclaration, Declaration);
