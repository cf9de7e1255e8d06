use crate::error::CoreError;
use crate::model::HasRaw;
use crate::raw::RawDeclaration;

pub const GLOBAL_DECLARATIONS_NAME: &str = "Global Declarations";

/// Named block of declarations text, e.g. the project's global channels and clocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub declarations: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>, declarations: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: declarations.into(),
        }
    }

    pub fn global(declarations: impl Into<String>) -> Self {
        Self::new(GLOBAL_DECLARATIONS_NAME, declarations)
    }
}

impl HasRaw for Declaration {
    type Raw = RawDeclaration;
    type Context<'a> = ();

    fn from_raw(raw: RawDeclaration, _: ()) -> Result<Self, CoreError> {
        Ok(Self {
            name: raw.name,
            declarations: raw.declarations,
        })
    }

    fn to_raw(&self) -> RawDeclaration {
        RawDeclaration {
            name: self.name.clone(),
            declarations: self.declarations.clone(),
        }
    }
}
