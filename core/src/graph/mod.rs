//! Curriculum graph: wire payloads and the validated, indexed model.

pub mod model;
pub mod payload;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::model::{Edge, GraphModel, Node, NodeKind};
pub use self::payload::{EdgeData, EdgeEnvelope, GraphPayload, NodeData, NodeEnvelope, ProgressPayload};
