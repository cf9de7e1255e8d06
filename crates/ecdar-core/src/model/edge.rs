use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::IdNamespace;
use crate::model::location::LocationId;
use crate::model::HasRaw;
use crate::point::Point;
use crate::raw::{RawEdge, RawNail};

/// Direction of the synchronisation on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeStatus {
    Input,
    Output,
}

impl EdgeStatus {
    pub const NAMES: &'static [&'static str] = &["INPUT", "OUTPUT"];
}

/// Which edge label, if any, is anchored to a nail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    None,
    Selection,
    Guard,
    Synchronization,
    Update,
}

impl PropertyType {
    pub const NAMES: &'static [&'static str] =
        &["NONE", "SELECTION", "GUARD", "SYNCHRONIZATION", "UPDATE"];
}

/// Identifier of an edge, e.g. `E12`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A bend point on an edge, optionally carrying one of the edge labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Nail {
    pub position: Point,
    pub property_type: PropertyType,
    pub property_position: Point,
}

impl HasRaw for Nail {
    type Raw = RawNail;
    type Context<'a> = ();

    fn from_raw(raw: RawNail, _: ()) -> Result<Self, CoreError> {
        Ok(Self {
            position: Point::new(raw.x, raw.y)?,
            property_type: raw.property_type,
            property_position: Point::new(raw.property_x, raw.property_y)?,
        })
    }

    fn to_raw(&self) -> RawNail {
        RawNail {
            x: self.position.x(),
            y: self.position.y(),
            property_type: self.property_type,
            property_x: self.property_position.x(),
            property_y: self.property_position.y(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    pub group: String,
    source: LocationId,
    target: LocationId,
    pub status: EdgeStatus,
    pub select: Option<String>,
    pub guard: String,
    pub update: String,
    pub sync: String,
    pub is_locked: bool,
    pub nails: Vec<Nail>,
}

impl Edge {
    pub fn new(id: EdgeId, source: LocationId, target: LocationId, status: EdgeStatus) -> Self {
        Self {
            id,
            group: String::new(),
            source,
            target,
            status,
            select: None,
            guard: String::new(),
            update: String::new(),
            sync: String::new(),
            is_locked: false,
            nails: Vec::new(),
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &LocationId {
        &self.source
    }

    pub fn target(&self) -> &LocationId {
        &self.target
    }

    pub fn touches(&self, location: &LocationId) -> bool {
        &self.source == location || &self.target == location
    }
}

impl HasRaw for Edge {
    type Raw = RawEdge;
    type Context<'a> = &'a mut IdNamespace;

    fn from_raw(raw: RawEdge, ids: &mut IdNamespace) -> Result<Self, CoreError> {
        let nails = raw
            .nails
            .into_iter()
            .map(|nail| Nail::from_raw(nail, ()))
            .collect::<Result<Vec<_>, _>>()?;

        let edge = Self {
            id: EdgeId(raw.id),
            group: raw.group,
            source: LocationId(raw.source_location),
            target: LocationId(raw.target_location),
            status: raw.status,
            select: raw.select,
            guard: raw.guard,
            update: raw.update,
            sync: raw.sync,
            is_locked: raw.is_locked,
            nails,
        };
        ids.reserve_suffix(edge.id.as_str());
        Ok(edge)
    }

    fn to_raw(&self) -> RawEdge {
        RawEdge {
            id: self.id.0.clone(),
            group: self.group.clone(),
            source_location: self.source.0.clone(),
            target_location: self.target.0.clone(),
            status: self.status,
            select: self.select.clone(),
            guard: self.guard.clone(),
            update: self.update.clone(),
            sync: self.sync.clone(),
            is_locked: self.is_locked,
            nails: self.nails.iter().map(Nail::to_raw).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_edge() -> RawEdge {
        RawEdge {
            id: "E25".to_string(),
            group: "".to_string(),
            source_location: "L5".to_string(),
            target_location: "L6".to_string(),
            status: EdgeStatus::Input,
            select: Some("i : int[0,3]".to_string()),
            guard: "z > 2".to_string(),
            update: "z = 0".to_string(),
            sync: "grant".to_string(),
            is_locked: false,
            nails: vec![
                RawNail {
                    x: 180.0,
                    y: 120.0,
                    property_type: PropertyType::Synchronization,
                    property_x: 10.0,
                    property_y: -10.0,
                },
                RawNail {
                    x: 220.0,
                    y: 120.0,
                    property_type: PropertyType::None,
                    property_x: 0.0,
                    property_y: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_round_trip_keeps_nail_order() {
        let mut ids = IdNamespace::new("edges");
        let raw = raw_edge();
        let edge = Edge::from_raw(raw.clone(), &mut ids).unwrap();

        assert_eq!(edge.id().as_str(), "E25");
        assert_eq!(edge.nails[0].property_type, PropertyType::Synchronization);
        assert_eq!(edge.to_raw(), raw);
        assert!(ids.contains(25));
    }

    #[test]
    fn test_touches() {
        let edge = Edge::new("E1".into(), "L1".into(), "L2".into(), EdgeStatus::Output);
        assert!(edge.touches(&"L1".into()));
        assert!(edge.touches(&"L2".into()));
        assert!(!edge.touches(&"L3".into()));
    }

    #[test]
    fn test_bad_nail_fails_whole_edge() {
        let mut ids = IdNamespace::new("edges");
        let mut raw = raw_edge();
        raw.nails[1].property_x = f64::INFINITY;
        assert!(Edge::from_raw(raw, &mut ids).is_err());
        assert!(!ids.contains(25));
    }
}
