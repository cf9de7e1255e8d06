//! The project aggregate: the unit of import, export and editing.
//!
//! # Invariants
//! - Component names are unique; system names are unique.
//! - Every component and system passes its own `validate()`.
//! - A mutator that returns an error leaves the project exactly as it was,
//!   id namespaces included.

use std::str::FromStr;

use crate::error::{CoreError, InvariantError};
use crate::id::{ProjectId, ProjectIds};
use crate::model::component::Component;
use crate::model::declaration::Declaration;
use crate::model::edge::EdgeId;
use crate::model::location::LocationId;
use crate::model::query::Query;
use crate::model::system::System;
use crate::model::HasRaw;
use crate::raw::{RawComponent, RawProject, RawSystem};

/// What to do with a component that does not have exactly one initial location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialLocationPolicy {
    Ignore,
    /// Log a warning and accept the component.
    #[default]
    Warn,
    /// Reject the component with an invariant error.
    Enforce,
}

impl FromStr for InitialLocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "enforce" => Ok(Self::Enforce),
            other => Err(format!(
                "unsupported initial location policy `{other}`; expected ignore|warn|enforce"
            )),
        }
    }
}

/// Invariants whose enforcement is left to the adopting application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectPolicy {
    pub initial_location: InitialLocationPolicy,
    pub require_acyclic_systems: bool,
}

/// Data `Project::from_raw` needs that the raw document does not carry.
#[derive(Debug, Clone, Copy)]
pub struct ProjectContext {
    pub id: ProjectId,
    pub policy: ProjectPolicy,
}

#[derive(Debug, Clone)]
pub struct Project {
    id: ProjectId,
    name: String,
    global_declarations: Declaration,
    components: Vec<Component>,
    systems: Vec<System>,
    queries: Vec<Query>,
    ids: ProjectIds,
    policy: ProjectPolicy,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>, policy: ProjectPolicy) -> Self {
        Self {
            id,
            name: name.into(),
            global_declarations: Declaration::global(""),
            components: Vec::new(),
            systems: Vec::new(),
            queries: Vec::new(),
            ids: ProjectIds::new(),
            policy,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn policy(&self) -> ProjectPolicy {
        self.policy
    }

    pub fn global_declarations(&self) -> &Declaration {
        &self.global_declarations
    }

    pub fn set_global_declarations(&mut self, declarations: Declaration) {
        self.global_declarations = declarations;
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.name() == name)
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    pub fn system(&self, name: &str) -> Option<&System> {
        self.systems.iter().find(|s| s.name() == name)
    }

    pub fn system_mut(&mut self, name: &str) -> Option<&mut System> {
        self.systems.iter_mut().find(|s| s.name() == name)
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn query(&self, index: usize) -> Option<&Query> {
        self.queries.get(index)
    }

    /// Mint a location id (`L<n>`) that no location in the project uses.
    pub fn new_location_id(&mut self) -> Result<LocationId, CoreError> {
        let n = self.ids.locations.get_new_ordered_id()?;
        Ok(LocationId(format!("L{n}")))
    }

    /// Mint an edge id (`E<n>`) that no edge in the project uses.
    pub fn new_edge_id(&mut self) -> Result<EdgeId, CoreError> {
        let n = self.ids.edges.get_new_ordered_id()?;
        Ok(EdgeId(format!("E{n}")))
    }

    pub fn add_component(&mut self, component: Component) -> Result<(), CoreError> {
        self.check_component(&component)?;
        for location in component.locations() {
            self.ids.locations.reserve_suffix(location.id().as_str());
        }
        for edge in component.edges() {
            self.ids.edges.reserve_suffix(edge.id().as_str());
        }
        tracing::debug!("Added component {} to {}", component.name(), self.id);
        self.components.push(component);
        Ok(())
    }

    /// Build a component from its raw form and add it.
    pub fn import_component(&mut self, raw: RawComponent) -> Result<(), CoreError> {
        let mut ids = self.ids.clone();
        let component = Component::from_raw(raw, &mut ids)?;
        self.check_component(&component)?;
        self.ids = ids;
        self.components.push(component);
        Ok(())
    }

    pub fn remove_component(&mut self, name: &str) -> Result<Component, InvariantError> {
        let index = self
            .components
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| InvariantError::ComponentNotFound(name.to_string()))?;
        Ok(self.components.remove(index))
    }

    /// Rename a component and every system instance that refers to it.
    pub fn rename_component(&mut self, old: &str, new: &str) -> Result<(), InvariantError> {
        check_file_name("Component", new)?;
        if old != new && self.component(new).is_some() {
            return Err(InvariantError::DuplicateComponentName(new.to_string()));
        }
        let component = self
            .component_mut(old)
            .ok_or_else(|| InvariantError::ComponentNotFound(old.to_string()))?;
        component.set_name(new.to_string());

        for system in &mut self.systems {
            system.rename_instances(old, new);
        }
        Ok(())
    }

    pub fn add_system(&mut self, system: System) -> Result<(), CoreError> {
        self.check_system(&system)?;
        tracing::debug!("Added system {} to {}", system.name(), self.id);
        self.systems.push(system);
        Ok(())
    }

    /// Build a system from its raw form and add it.
    pub fn import_system(&mut self, raw: RawSystem) -> Result<(), CoreError> {
        let system = System::from_raw(raw, ())?;
        self.add_system(system)
    }

    pub fn remove_system(&mut self, name: &str) -> Result<System, InvariantError> {
        let index = self
            .systems
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| InvariantError::SystemNotFound(name.to_string()))?;
        Ok(self.systems.remove(index))
    }

    /// Connect two nodes of a system, honouring the acyclicity policy.
    pub fn connect_system_nodes(
        &mut self,
        system: &str,
        parent: u32,
        child: u32,
    ) -> Result<(), InvariantError> {
        let require_acyclic = self.policy.require_acyclic_systems;
        self.system_mut(system)
            .ok_or_else(|| InvariantError::SystemNotFound(system.to_string()))?
            .connect(parent, child, require_acyclic)
    }

    pub fn add_query(&mut self, query: Query) {
        self.queries.push(query);
    }

    pub fn remove_query(&mut self, index: usize) -> Result<Query, InvariantError> {
        if index >= self.queries.len() {
            return Err(InvariantError::QueryNotFound {
                index,
                len: self.queries.len(),
            });
        }
        Ok(self.queries.remove(index))
    }

    /// Re-check every invariant over the whole project.
    ///
    /// Useful after editing through `component_mut`/`system_mut`.
    pub fn validate(&self) -> Result<(), InvariantError> {
        for (index, component) in self.components.iter().enumerate() {
            check_file_name("Component", component.name())?;
            component.validate()?;
            if self.components[..index]
                .iter()
                .any(|c| c.name() == component.name())
            {
                return Err(InvariantError::DuplicateComponentName(
                    component.name().to_string(),
                ));
            }
            self.apply_initial_location_policy(component)?;
        }
        for (index, system) in self.systems.iter().enumerate() {
            check_file_name("System", system.name())?;
            system.validate()?;
            if self.systems[..index]
                .iter()
                .any(|s| s.name() == system.name())
            {
                return Err(InvariantError::DuplicateSystemName(system.name().to_string()));
            }
            if self.policy.require_acyclic_systems && system.has_cycle() {
                return Err(InvariantError::SystemCycle(system.name().to_string()));
            }
        }
        Ok(())
    }

    fn check_component(&self, component: &Component) -> Result<(), InvariantError> {
        check_file_name("Component", component.name())?;
        component.validate()?;
        if self.component(component.name()).is_some() {
            return Err(InvariantError::DuplicateComponentName(
                component.name().to_string(),
            ));
        }
        self.apply_initial_location_policy(component)
    }

    fn check_system(&self, system: &System) -> Result<(), InvariantError> {
        check_file_name("System", system.name())?;
        system.validate()?;
        if self.system(system.name()).is_some() {
            return Err(InvariantError::DuplicateSystemName(system.name().to_string()));
        }
        if self.policy.require_acyclic_systems && system.has_cycle() {
            return Err(InvariantError::SystemCycle(system.name().to_string()));
        }
        Ok(())
    }

    fn apply_initial_location_policy(&self, component: &Component) -> Result<(), InvariantError> {
        match self.policy.initial_location {
            InitialLocationPolicy::Ignore => Ok(()),
            InitialLocationPolicy::Warn => {
                if let Err(e) = component.check_initial_location() {
                    tracing::warn!("{}", e);
                }
                Ok(())
            }
            InitialLocationPolicy::Enforce => component.check_initial_location(),
        }
    }
}

/// Names are saved as `<name>.json`, so they must be a single plain path segment.
fn check_file_name(entity: &'static str, name: &str) -> Result<(), InvariantError> {
    let usable = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if usable {
        Ok(())
    } else {
        Err(InvariantError::InvalidName {
            entity,
            name: name.to_string(),
        })
    }
}

impl HasRaw for Project {
    type Raw = RawProject;
    type Context<'a> = ProjectContext;

    fn from_raw(raw: RawProject, ctx: ProjectContext) -> Result<Self, CoreError> {
        let mut project = Project::new(ctx.id, raw.name, ctx.policy);
        project.global_declarations = Declaration::from_raw(raw.global_declarations, ())?;
        for component in raw.components {
            project.import_component(component)?;
        }
        for system in raw.systems {
            project.import_system(system)?;
        }
        for query in raw.queries {
            project.add_query(Query::from_raw(query, ())?);
        }
        Ok(project)
    }

    fn to_raw(&self) -> RawProject {
        RawProject {
            name: self.name.clone(),
            global_declarations: self.global_declarations.to_raw(),
            components: self.components.iter().map(Component::to_raw).collect(),
            systems: self.systems.iter().map(System::to_raw).collect(),
            queries: self.queries.iter().map(Query::to_raw).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::tests::{raw_component, raw_edge};
    use crate::model::location::{Location, LocationType};
    use crate::model::system::tests::raw_system;
    use crate::point::{Dimensions, Point};

    fn project(policy: ProjectPolicy) -> Project {
        Project::new(ProjectId(0), "University", policy)
    }

    #[test]
    fn test_duplicate_component_name_rejected() {
        let mut project = project(ProjectPolicy::default());
        project.import_component(raw_component("Admin")).unwrap();

        let err = project.import_component(raw_component("Admin")).unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::DuplicateComponentName("Admin".to_string()))
        );
        assert_eq!(project.components().len(), 1);
    }

    fn admin_with(location: &str) -> Component {
        let mut component = Component::new("Admin", Dimensions::new(450.0, 600.0).unwrap());
        component
            .add_location(Location::new(
                location.into(),
                LocationType::Initial,
                Point::origin(),
            ))
            .unwrap();
        component
    }

    #[test]
    fn test_add_component_twice_keeps_one() {
        let mut project = project(ProjectPolicy::default());
        project.add_component(admin_with("L9")).unwrap();

        let err = project.add_component(admin_with("L20")).unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::DuplicateComponentName("Admin".to_string()))
        );
        assert_eq!(project.components().len(), 1);
        assert_eq!(
            project.component("Admin").unwrap().locations()[0].id(),
            &LocationId::from("L9")
        );
        // L20 was never reserved
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L10"));
    }

    #[test]
    fn test_add_system_twice_keeps_one() {
        let mut project = project(ProjectPolicy::default());
        let dimensions = Dimensions::new(600.0, 400.0).unwrap();
        project.add_system(System::new("Spec", dimensions)).unwrap();

        let err = project
            .add_system(System::new("Spec", dimensions))
            .unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::DuplicateSystemName("Spec".to_string()))
        );
        assert_eq!(project.systems().len(), 1);
    }

    #[test]
    fn test_names_must_be_plain_file_names() {
        let mut project = project(ProjectPolicy::default());
        for name in ["a/b", "../../x", "", ".", "..", "a\\b"] {
            let err = project.import_component(raw_component(name)).unwrap_err();
            assert_eq!(
                err.as_invariant(),
                Some(&InvariantError::InvalidName {
                    entity: "Component",
                    name: name.to_string(),
                })
            );
            assert!(project.import_system(raw_system(name, "Admin")).is_err());
        }
        assert!(project.components().is_empty());
        assert!(project.systems().is_empty());
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L0"));

        project.import_component(raw_component("Admin (v2).old")).unwrap();
        assert_eq!(
            project.rename_component("Admin (v2).old", "x/y"),
            Err(InvariantError::InvalidName {
                entity: "Component",
                name: "x/y".to_string(),
            })
        );
        assert!(project.component("Admin (v2).old").is_some());
    }

    #[test]
    fn test_failed_import_leaves_namespaces_untouched() {
        let mut project = project(ProjectPolicy::default());
        let mut raw = raw_component("Admin");
        raw.locations[1].id = "L40".to_string();
        raw.edges.push(raw_edge("E30", "L40", "L99"));

        assert!(project.import_component(raw).is_err());
        assert!(project.components().is_empty());
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L0"));
        assert_eq!(project.new_edge_id().unwrap(), EdgeId::from("E0"));
    }

    #[test]
    fn test_minted_ids_skip_loaded_ones() {
        let mut project = project(ProjectPolicy::default());
        project.import_component(raw_component("Admin")).unwrap();
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L2"));
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L3"));
        assert_eq!(project.new_edge_id().unwrap(), EdgeId::from("E2"));
    }

    #[test]
    fn test_added_component_reserves_its_ids() {
        let mut project = project(ProjectPolicy::default());
        let mut component = Component::new("Machine", Dimensions::new(450.0, 600.0).unwrap());
        component
            .add_location(Location::new(
                "L9".into(),
                LocationType::Initial,
                Point::origin(),
            ))
            .unwrap();
        project.add_component(component).unwrap();
        assert_eq!(project.new_location_id().unwrap(), LocationId::from("L10"));
    }

    #[test]
    fn test_initial_location_policy() {
        let mut raw = raw_component("Machine");
        raw.locations[0].kind = LocationType::Normal;

        let mut lenient = project(ProjectPolicy::default());
        lenient.import_component(raw.clone()).unwrap();
        assert!(lenient.validate().is_ok());

        let mut strict = project(ProjectPolicy {
            initial_location: InitialLocationPolicy::Enforce,
            ..ProjectPolicy::default()
        });
        let err = strict.import_component(raw).unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::InitialLocationCount {
                component: "Machine".to_string(),
                count: 0
            })
        );
        assert!(strict.components().is_empty());
    }

    #[test]
    fn test_system_policy_and_names() {
        let mut raw = raw_system("Spec", "Admin");
        raw.edges.push(crate::raw::RawSystemEdge {
            parent: 1,
            child: 3,
        });

        let mut lenient = project(ProjectPolicy::default());
        lenient.import_system(raw.clone()).unwrap();
        assert!(lenient.import_system(raw.clone()).is_err());
        assert_eq!(lenient.systems().len(), 1);

        let mut strict = project(ProjectPolicy {
            require_acyclic_systems: true,
            ..ProjectPolicy::default()
        });
        let err = strict.import_system(raw).unwrap_err();
        assert_eq!(
            err.as_invariant(),
            Some(&InvariantError::SystemCycle("Spec".to_string()))
        );

        strict.import_system(raw_system("Spec", "Admin")).unwrap();
        assert!(strict.connect_system_nodes("Spec", 2, 3).is_err());
        assert!(strict.connect_system_nodes("Nope", 3, 1).is_err());
    }

    #[test]
    fn test_rename_component_updates_instances() {
        let mut project = project(ProjectPolicy::default());
        project.import_component(raw_component("Admin")).unwrap();
        project.import_component(raw_component("Machine")).unwrap();
        project.import_system(raw_system("Spec", "Admin")).unwrap();

        assert_eq!(
            project.rename_component("Admin", "Machine"),
            Err(InvariantError::DuplicateComponentName("Machine".to_string()))
        );

        project.rename_component("Admin", "Administration").unwrap();
        assert!(project.component("Admin").is_none());
        assert!(project
            .system("Spec")
            .unwrap()
            .component_instances()
            .iter()
            .all(|i| i.component_name == "Administration"));
    }

    #[test]
    fn test_remove_and_queries() {
        let mut project = project(ProjectPolicy::default());
        project.import_component(raw_component("Admin")).unwrap();
        assert!(project.remove_component("Nope").is_err());
        project.remove_component("Admin").unwrap();
        assert!(project.components().is_empty());

        project.add_query(Query::new("consistency: Admin", 0));
        assert_eq!(
            project.remove_query(3),
            Err(InvariantError::QueryNotFound { index: 3, len: 1 })
        );
        assert_eq!(project.remove_query(0).unwrap().query_string, "consistency: Admin");
    }

    #[test]
    fn test_round_trip() {
        let raw = RawProject {
            name: "University".to_string(),
            global_declarations: Declaration::global("broadcast chan grant;").to_raw(),
            components: vec![raw_component("Admin"), raw_component("Machine")],
            systems: vec![raw_system("Spec", "Admin")],
            queries: vec![Query::new("refinement: Admin <= Spec", 0).to_raw()],
        };
        let ctx = ProjectContext {
            id: ProjectId(7),
            policy: ProjectPolicy::default(),
        };
        let project = Project::from_raw(raw.clone(), ctx).unwrap();
        assert_eq!(project.id(), ProjectId(7));
        assert_eq!(project.to_raw(), raw);
    }
}
