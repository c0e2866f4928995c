//! Core data model types for minigit

mod hash;
mod kind;

pub use hash::{IntoObjectId, ObjectId, HEX_LEN};
pub use kind::{ObjectKind, TypeTag};
