use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::IdError;

static NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("numeric suffix pattern is valid"));

/// Extract the trailing decimal run of a raw name, e.g. `L12` -> `12`.
///
/// Returns `None` when the name has no numeric suffix or the suffix does not
/// fit in a `u32`.
pub fn parse_numeric_suffix(raw_name: &str) -> Option<u32> {
    NUMERIC_SUFFIX
        .captures(raw_name.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Monotonic id allocator for one namespace.
///
/// Ids are never handed out twice, even after the entity that held them is
/// removed. The high-water mark only moves up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdNamespace {
    name: &'static str,
    issued: BTreeSet<u32>,
    high_water: Option<u32>,
}

impl IdNamespace {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            issued: BTreeSet::new(),
            high_water: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Largest id issued so far.
    pub fn high_water(&self) -> Option<u32> {
        self.high_water
    }

    pub fn contains(&self, id: u32) -> bool {
        self.issued.contains(&id)
    }

    /// Issue the next id above everything issued so far (0 when empty).
    pub fn get_new_ordered_id(&mut self) -> Result<u32, IdError> {
        let next = match self.high_water {
            None => 0,
            Some(high) => high.checked_add(1).ok_or(IdError::Exhausted(self.name))?,
        };
        self.mark(next);
        Ok(next)
    }

    /// Reuse the numeric suffix of `raw_name` as the id when it is free,
    /// otherwise fall back to an ordered id.
    pub fn get_new_id_from_raw(&mut self, raw_name: &str) -> Result<u32, IdError> {
        match parse_numeric_suffix(raw_name) {
            Some(id) if !self.contains(id) => {
                self.mark(id);
                Ok(id)
            }
            Some(id) => {
                tracing::debug!(
                    "Id {} from {:?} already issued in namespace {}, allocating ordered id",
                    id,
                    raw_name,
                    self.name
                );
                self.get_new_ordered_id()
            }
            None => self.get_new_ordered_id(),
        }
    }

    /// Reserve an explicit id read from a document.
    pub fn reserve(&mut self, id: u32) -> Result<(), IdError> {
        if self.contains(id) {
            return Err(IdError::Taken {
                namespace: self.name,
                id,
            });
        }
        self.mark(id);
        Ok(())
    }

    /// Reserve the numeric suffix of a string id if it has one and it is free.
    ///
    /// String ids are kept verbatim; this only keeps freshly minted ids clear
    /// of them.
    pub fn reserve_suffix(&mut self, raw_name: &str) {
        if let Some(id) = parse_numeric_suffix(raw_name) {
            if !self.contains(id) {
                self.mark(id);
            }
        }
    }

    fn mark(&mut self, id: u32) {
        self.issued.insert(id);
        if self.high_water.is_none_or(|high| id > high) {
            self.high_water = Some(id);
        }
    }
}

/// Identifier of a project within one document adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub u32);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "project-{}", self.0)
    }
}

/// Project-wide namespaces for location and edge ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIds {
    pub locations: IdNamespace,
    pub edges: IdNamespace,
}

impl ProjectIds {
    pub fn new() -> Self {
        Self {
            locations: IdNamespace::new("locations"),
            edges: IdNamespace::new("edges"),
        }
    }
}

impl Default for ProjectIds {
    fn default() -> Self {
        Self::new()
    }
}
