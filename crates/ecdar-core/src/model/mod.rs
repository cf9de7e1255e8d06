//! Typed in-memory entities and their conversion to and from raw records.

pub mod component;
pub mod declaration;
pub mod edge;
pub mod location;
pub mod query;
pub mod system;

use crate::error::CoreError;
use crate::raw::RawEntity;

/// An entity with a raw (persisted) counterpart.
///
/// `E::from_raw(r, ctx)?.to_raw() == r` holds for every record accepted by the
/// schema layer. `Context` carries what the raw form does not, such as the id
/// namespace new ids are drawn from. Conversion either yields a complete
/// entity or an error; nothing partially built escapes.
pub trait HasRaw: Sized {
    type Raw: RawEntity;
    type Context<'a>;

    fn from_raw(raw: Self::Raw, ctx: Self::Context<'_>) -> Result<Self, CoreError>;

    fn to_raw(&self) -> Self::Raw;
}
