pub mod entity;
pub mod mutation;
pub mod snapshot;

pub use entity::{Attributes, Entity, EntityKind};
pub use snapshot::{order_key, Snapshot, ROOT_KEY};
