use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::IdNamespace;
use crate::model::HasRaw;
use crate::point::Point;
use crate::raw::RawLocation;

/// Role of a location in its automaton.
///
/// Only `Initial` and `Normal` have settled meaning; the others are carried
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Initial,
    Normal,
    Universal,
    Inconsistent,
    Any,
}

impl LocationType {
    pub const NAMES: &'static [&'static str] =
        &["INITIAL", "NORMAL", "UNIVERSAL", "INCONSISTENT", "ANY"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Normal,
    Prohibited,
    Urgent,
    Committed,
}

impl Urgency {
    pub const NAMES: &'static [&'static str] = &["NORMAL", "PROHIBITED", "URGENT", "COMMITTED"];
}

/// Identifier of a location, e.g. `L5`. Unique within its component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    id: LocationId,
    pub nickname: String,
    pub invariant: String,
    pub kind: LocationType,
    pub urgency: Urgency,
    pub position: Point,
    pub color: String,
    pub nickname_position: Point,
    pub invariant_position: Point,
}

impl Location {
    /// A blank location of the given type. Labels sit at the location origin.
    pub fn new(id: LocationId, kind: LocationType, position: Point) -> Self {
        Self {
            id,
            nickname: String::new(),
            invariant: String::new(),
            kind,
            urgency: Urgency::Normal,
            position,
            color: "0".to_string(),
            nickname_position: Point::origin(),
            invariant_position: Point::origin(),
        }
    }

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    pub fn is_initial(&self) -> bool {
        self.kind == LocationType::Initial
    }
}

impl HasRaw for Location {
    type Raw = RawLocation;
    /// Project-wide location namespace; the numeric suffix of the id is reserved in it.
    type Context<'a> = &'a mut IdNamespace;

    fn from_raw(raw: RawLocation, ids: &mut IdNamespace) -> Result<Self, CoreError> {
        let location = Self {
            position: Point::new(raw.x, raw.y)?,
            nickname_position: Point::new(raw.nickname_x, raw.nickname_y)?,
            invariant_position: Point::new(raw.invariant_x, raw.invariant_y)?,
            id: LocationId(raw.id),
            nickname: raw.nickname,
            invariant: raw.invariant,
            kind: raw.kind,
            urgency: raw.urgency,
            color: raw.color,
        };
        ids.reserve_suffix(location.id.as_str());
        Ok(location)
    }

    fn to_raw(&self) -> RawLocation {
        RawLocation {
            id: self.id.0.clone(),
            nickname: self.nickname.clone(),
            invariant: self.invariant.clone(),
            kind: self.kind,
            urgency: self.urgency,
            x: self.position.x(),
            y: self.position.y(),
            color: self.color.clone(),
            nickname_x: self.nickname_position.x(),
            nickname_y: self.nickname_position.y(),
            invariant_x: self.invariant_position.x(),
            invariant_y: self.invariant_position.y(),
        }
    }
}
