pub mod diagram;
pub mod error;
pub mod graph;
pub mod id;
pub mod model;
pub mod snapshot;
pub mod viewport;

pub use diagram::Diagram;
pub use error::SnapshotError;
pub use graph::GraphModel;
pub use id::{EntityId, IdentityColor};
pub use model::*;
pub use snapshot::{SNAPSHOT_VERSION, SnapshotDocument};
pub use viewport::{MAX_SCALE, MIN_SCALE, ViewportTransform};

// Re-export kurbo point types so hosts don't need a direct dependency
pub use kurbo::{Point, Vec2};
