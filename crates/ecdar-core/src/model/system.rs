use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, IdError, InvariantError};
use crate::id::IdNamespace;
use crate::model::HasRaw;
use crate::point::{Dimensions, Point};
use crate::raw::{RawComponentInstance, RawOperator, RawSystem, RawSystemEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorType {
    Composition,
    Conjunction,
    Refinement,
    Quotient,
    Simple,
}

impl OperatorType {
    pub const NAMES: &'static [&'static str] = &[
        "COMPOSITION",
        "CONJUNCTION",
        "REFINEMENT",
        "QUOTIENT",
        "SIMPLE",
    ];
}

/// Use of a component inside a system, by component name.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    id: u32,
    pub component_name: String,
    pub position: Point,
}

impl ComponentInstance {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl HasRaw for ComponentInstance {
    type Raw = RawComponentInstance;
    type Context<'a> = &'a mut IdNamespace;

    fn from_raw(raw: RawComponentInstance, ids: &mut IdNamespace) -> Result<Self, CoreError> {
        let position = Point::new(raw.x, raw.y)?;
        ids.reserve(raw.id)?;
        Ok(Self {
            id: raw.id,
            component_name: raw.component_name,
            position,
        })
    }

    fn to_raw(&self) -> RawComponentInstance {
        RawComponentInstance {
            id: self.id,
            component_name: self.component_name.clone(),
            x: self.position.x(),
            y: self.position.y(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    id: u32,
    pub kind: OperatorType,
    pub position: Point,
}

impl Operator {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl HasRaw for Operator {
    type Raw = RawOperator;
    type Context<'a> = &'a mut IdNamespace;

    fn from_raw(raw: RawOperator, ids: &mut IdNamespace) -> Result<Self, CoreError> {
        let position = Point::new(raw.x, raw.y)?;
        ids.reserve(raw.id)?;
        Ok(Self {
            id: raw.id,
            kind: raw.kind,
            position,
        })
    }

    fn to_raw(&self) -> RawOperator {
        RawOperator {
            id: self.id,
            kind: self.kind,
            x: self.position.x(),
            y: self.position.y(),
        }
    }
}

/// Directed link from an operator to one of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemEdge {
    pub parent: u32,
    pub child: u32,
}

impl HasRaw for SystemEdge {
    type Raw = RawSystemEdge;
    type Context<'a> = ();

    fn from_raw(raw: RawSystemEdge, _: ()) -> Result<Self, CoreError> {
        Ok(Self {
            parent: raw.parent,
            child: raw.child,
        })
    }

    fn to_raw(&self) -> RawSystemEdge {
        RawSystemEdge {
            parent: self.parent,
            child: self.child,
        }
    }
}

/// A composition graph over component instances and operators.
///
/// Instances and operators share one id namespace, so an edge endpoint
/// names exactly one node.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    name: String,
    pub description: String,
    pub position: Point,
    pub dimensions: Dimensions,
    pub color: String,
    instances: Vec<ComponentInstance>,
    operators: Vec<Operator>,
    edges: Vec<SystemEdge>,
    ids: IdNamespace,
}

impl System {
    pub fn new(name: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            position: Point::origin(),
            dimensions,
            color: "0".to_string(),
            instances: Vec::new(),
            operators: Vec::new(),
            edges: Vec::new(),
            ids: IdNamespace::new("system nodes"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_instances(&self) -> &[ComponentInstance] {
        &self.instances
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn edges(&self) -> &[SystemEdge] {
        &self.edges
    }

    pub fn contains_node(&self, id: u32) -> bool {
        self.instances.iter().any(|i| i.id == id) || self.operators.iter().any(|o| o.id == id)
    }

    pub(crate) fn rename_instances(&mut self, old: &str, new: &str) {
        for instance in self.instances.iter_mut().filter(|i| i.component_name == old) {
            instance.component_name = new.to_string();
        }
    }

    pub fn add_component_instance(
        &mut self,
        component_name: impl Into<String>,
        position: Point,
    ) -> Result<u32, IdError> {
        let id = self.ids.get_new_ordered_id()?;
        self.instances.push(ComponentInstance {
            id,
            component_name: component_name.into(),
            position,
        });
        Ok(id)
    }

    pub fn add_operator(&mut self, kind: OperatorType, position: Point) -> Result<u32, IdError> {
        let id = self.ids.get_new_ordered_id()?;
        self.operators.push(Operator { id, kind, position });
        Ok(id)
    }

    /// Add an edge between two existing nodes.
    ///
    /// With `require_acyclic` set, an edge that would close a cycle is refused.
    pub fn connect(
        &mut self,
        parent: u32,
        child: u32,
        require_acyclic: bool,
    ) -> Result<(), InvariantError> {
        let edge = SystemEdge { parent, child };
        self.check_edge(&edge)?;
        self.edges.push(edge);
        if require_acyclic && self.has_cycle() {
            self.edges.pop();
            return Err(InvariantError::SystemCycle(self.name.clone()));
        }
        Ok(())
    }

    pub fn disconnect(&mut self, parent: u32, child: u32) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.parent == parent && e.child == child));
        self.edges.len() != before
    }

    /// Remove an instance or operator together with every edge touching it.
    pub fn remove_node(&mut self, id: u32) -> Result<(), InvariantError> {
        if !self.contains_node(id) {
            return Err(InvariantError::SystemNodeNotFound {
                system: self.name.clone(),
                id,
            });
        }
        self.instances.retain(|i| i.id != id);
        self.operators.retain(|o| o.id != id);
        self.edges.retain(|e| e.parent != id && e.child != id);
        Ok(())
    }

    /// Whether the edges contain a directed cycle.
    ///
    /// Iterative depth-first walk; depth is bounded by the heap, not the stack.
    pub fn has_cycle(&self) -> bool {
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for edge in &self.edges {
            children.entry(edge.parent).or_default().push(edge.child);
        }

        let mut done = HashSet::new();
        let mut on_path = HashSet::new();
        for edge in &self.edges {
            if done.contains(&edge.parent) {
                continue;
            }
            // (node, index of the next child to visit)
            let mut stack = vec![(edge.parent, 0usize)];
            on_path.insert(edge.parent);
            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                let child = children.get(&node).and_then(|c| c.get(*next)).copied();
                *next += 1;
                match child {
                    Some(child) if on_path.contains(&child) => return true,
                    Some(child) if !done.contains(&child) => {
                        on_path.insert(child);
                        stack.push((child, 0));
                    }
                    Some(_) => {}
                    None => {
                        stack.pop();
                        on_path.remove(&node);
                        done.insert(node);
                    }
                }
            }
        }
        false
    }

    /// Check node id uniqueness and edge endpoints.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut seen = HashSet::new();
        let node_ids = self
            .instances
            .iter()
            .map(|i| i.id)
            .chain(self.operators.iter().map(|o| o.id));
        for id in node_ids {
            if !seen.insert(id) {
                return Err(InvariantError::DuplicateSystemNodeId {
                    system: self.name.clone(),
                    id,
                });
            }
        }
        self.edges.iter().try_for_each(|edge| self.check_edge(edge))
    }

    fn check_edge(&self, edge: &SystemEdge) -> Result<(), InvariantError> {
        if self.contains_node(edge.parent) && self.contains_node(edge.child) {
            Ok(())
        } else {
            Err(InvariantError::DanglingSystemEdge {
                system: self.name.clone(),
                parent: edge.parent,
                child: edge.child,
            })
        }
    }
}

impl HasRaw for System {
    type Raw = RawSystem;
    type Context<'a> = ();

    fn from_raw(raw: RawSystem, _: ()) -> Result<Self, CoreError> {
        let mut ids = IdNamespace::new("system nodes");
        let mut instances = Vec::with_capacity(raw.component_instances.len());
        for instance in raw.component_instances {
            let id = instance.id;
            let instance = ComponentInstance::from_raw(instance, &mut ids)
                .map_err(|e| duplicate_node(e, &raw.name, id))?;
            instances.push(instance);
        }
        let mut operators = Vec::with_capacity(raw.operators.len());
        for operator in raw.operators {
            let id = operator.id;
            let operator = Operator::from_raw(operator, &mut ids)
                .map_err(|e| duplicate_node(e, &raw.name, id))?;
            operators.push(operator);
        }
        let edges = raw
            .edges
            .into_iter()
            .map(|edge| SystemEdge::from_raw(edge, ()))
            .collect::<Result<Vec<_>, _>>()?;

        let system = Self {
            name: raw.name,
            description: raw.description,
            position: Point::new(raw.x, raw.y)?,
            dimensions: Dimensions::new(raw.width, raw.height)?,
            color: raw.color,
            instances,
            operators,
            edges,
            ids,
        };
        system.validate()?;
        Ok(system)
    }

    fn to_raw(&self) -> RawSystem {
        RawSystem {
            name: self.name.clone(),
            description: self.description.clone(),
            x: self.position.x(),
            y: self.position.y(),
            width: self.dimensions.width(),
            height: self.dimensions.height(),
            color: self.color.clone(),
            component_instances: self
                .instances
                .iter()
                .map(ComponentInstance::to_raw)
                .collect(),
            operators: self.operators.iter().map(Operator::to_raw).collect(),
            edges: self.edges.iter().map(SystemEdge::to_raw).collect(),
        }
    }
}

fn duplicate_node(err: CoreError, system: &str, id: u32) -> CoreError {
    match err {
        CoreError::Allocation(IdError::Taken { .. }) => InvariantError::DuplicateSystemNodeId {
            system: system.to_string(),
            id,
        }
        .into(),
        other => other,
    }
}
