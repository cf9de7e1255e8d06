use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::model::HasRaw;
use crate::raw::RawQuery;

/// A verification query and the engine it is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query_string: String,
    pub comment: String,
    pub is_periodic: bool,
    /// Input signals the engine should ignore, keyed by signal name.
    pub ignored_inputs: BTreeMap<String, bool>,
    pub ignored_outputs: BTreeMap<String, bool>,
    pub backend_id: u32,
}

impl Query {
    pub fn new(query_string: impl Into<String>, backend_id: u32) -> Self {
        Self {
            query_string: query_string.into(),
            comment: String::new(),
            is_periodic: false,
            ignored_inputs: BTreeMap::new(),
            ignored_outputs: BTreeMap::new(),
            backend_id,
        }
    }
}

impl HasRaw for Query {
    type Raw = RawQuery;
    type Context<'a> = ();

    fn from_raw(raw: RawQuery, _: ()) -> Result<Self, CoreError> {
        Ok(Self {
            query_string: raw.query,
            comment: raw.comment,
            is_periodic: raw.is_periodic,
            ignored_inputs: raw.ignored_inputs,
            ignored_outputs: raw.ignored_outputs,
            backend_id: raw.backend,
        })
    }

    fn to_raw(&self) -> RawQuery {
        RawQuery {
            query: self.query_string.clone(),
            comment: self.comment.clone(),
            is_periodic: self.is_periodic,
            ignored_inputs: self.ignored_inputs.clone(),
            ignored_outputs: self.ignored_outputs.clone(),
            backend: self.backend_id,
        }
    }
}
