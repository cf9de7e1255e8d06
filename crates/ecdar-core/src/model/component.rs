use std::collections::HashSet;

use crate::error::{CoreError, InvariantError};
use crate::id::ProjectIds;
use crate::model::edge::{Edge, EdgeId};
use crate::model::location::{Location, LocationId};
use crate::model::HasRaw;
use crate::point::{Dimensions, Point};
use crate::raw::RawComponent;

/// One timed automaton: locations connected by edges.
///
/// Location ids and edge ids are unique within the component, and every edge
/// starts and ends at a location of this component.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    pub declarations: String,
    pub description: String,
    locations: Vec<Location>,
    edges: Vec<Edge>,
    pub position: Point,
    pub dimensions: Dimensions,
    pub color: String,
    pub include_in_periodic_check: bool,
}

impl Component {
    pub fn new(name: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            declarations: String::new(),
            description: String::new(),
            locations: Vec::new(),
            edges: Vec::new(),
            position: Point::origin(),
            dimensions,
            color: "0".to_string(),
            include_in_periodic_check: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn set_declarations(&mut self, declarations: impl Into<String>) {
        self.declarations = declarations.into();
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id() == id)
    }

    pub fn location_mut(&mut self, id: &LocationId) -> Option<&mut Location> {
        self.locations.iter_mut().find(|l| l.id() == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    pub fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id() == id)
    }

    pub fn initial_locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| l.is_initial())
    }

    pub fn add_location(&mut self, location: Location) -> Result<(), InvariantError> {
        if self.location(location.id()).is_some() {
            return Err(InvariantError::DuplicateLocationId {
                component: self.name.clone(),
                id: location.id().to_string(),
            });
        }
        self.locations.push(location);
        Ok(())
    }

    /// Remove a location. Refused while any edge still starts or ends there.
    pub fn remove_location(&mut self, id: &LocationId) -> Result<Location, InvariantError> {
        if let Some(edge) = self.edges.iter().find(|e| e.touches(id)) {
            return Err(InvariantError::LocationInUse {
                component: self.name.clone(),
                location: id.to_string(),
                edge: edge.id().to_string(),
            });
        }
        let index = self
            .locations
            .iter()
            .position(|l| l.id() == id)
            .ok_or_else(|| InvariantError::LocationNotFound {
                component: self.name.clone(),
                id: id.to_string(),
            })?;
        Ok(self.locations.remove(index))
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), InvariantError> {
        if self.edge(edge.id()).is_some() {
            return Err(InvariantError::DuplicateEdgeId {
                component: self.name.clone(),
                id: edge.id().to_string(),
            });
        }
        self.check_endpoints(&edge)?;
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge, InvariantError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| InvariantError::EdgeNotFound {
                component: self.name.clone(),
                id: id.to_string(),
            })?;
        Ok(self.edges.remove(index))
    }

    /// Require exactly one `INITIAL` location.
    pub fn check_initial_location(&self) -> Result<(), InvariantError> {
        let count = self.initial_locations().count();
        if count != 1 {
            return Err(InvariantError::InitialLocationCount {
                component: self.name.clone(),
                count,
            });
        }
        Ok(())
    }

    /// Check id uniqueness and edge endpoints across the whole component.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut location_ids = HashSet::new();
        for location in &self.locations {
            if !location_ids.insert(location.id()) {
                return Err(InvariantError::DuplicateLocationId {
                    component: self.name.clone(),
                    id: location.id().to_string(),
                });
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id()) {
                return Err(InvariantError::DuplicateEdgeId {
                    component: self.name.clone(),
                    id: edge.id().to_string(),
                });
            }
            self.check_endpoints(edge)?;
        }
        Ok(())
    }

    fn check_endpoints(&self, edge: &Edge) -> Result<(), InvariantError> {
        for endpoint in [edge.source(), edge.target()] {
            if self.location(endpoint).is_none() {
                return Err(InvariantError::DanglingEdgeEndpoint {
                    component: self.name.clone(),
                    edge: edge.id().to_string(),
                    location: endpoint.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl HasRaw for Component {
    type Raw = RawComponent;
    /// Reservations made before a failure stay in `ids`; callers needing
    /// atomicity pass a scratch copy.
    type Context<'a> = &'a mut ProjectIds;

    fn from_raw(raw: RawComponent, ids: &mut ProjectIds) -> Result<Self, CoreError> {
        let locations = raw
            .locations
            .into_iter()
            .map(|location| Location::from_raw(location, &mut ids.locations))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = raw
            .edges
            .into_iter()
            .map(|edge| Edge::from_raw(edge, &mut ids.edges))
            .collect::<Result<Vec<_>, _>>()?;

        let component = Self {
            name: raw.name,
            declarations: raw.declarations,
            description: raw.description,
            locations,
            edges,
            position: Point::new(raw.x, raw.y)?,
            dimensions: Dimensions::new(raw.width, raw.height)?,
            color: raw.color,
            include_in_periodic_check: raw.include_in_periodic_check,
        };
        component.validate()?;
        Ok(component)
    }

    fn to_raw(&self) -> RawComponent {
        RawComponent {
            name: self.name.clone(),
            declarations: self.declarations.clone(),
            locations: self.locations.iter().map(Location::to_raw).collect(),
            edges: self.edges.iter().map(Edge::to_raw).collect(),
            description: self.description.clone(),
            x: self.position.x(),
            y: self.position.y(),
            width: self.dimensions.width(),
            height: self.dimensions.height(),
            color: self.color.clone(),
            include_in_periodic_check: self.include_in_periodic_check,
        }
    }
}
