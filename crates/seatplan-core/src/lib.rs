//! # Seatplan Core
//!
//! Venue scene model: polygonal areas holding seat grids, text and decor,
//! plus loose icon markers. Provides the geometry kernel (centroids, bounding
//! boxes, affine composition), seat numbering, and an R-tree over areas for
//! hit-testing.
//!
//! Scenes are immutable snapshots; every mutation returns a new [`Scene`].

pub mod geometry;
pub mod transform;
pub mod layout;
pub mod entities;
pub mod indexer;
pub mod scene;
pub mod spatial;
pub mod error;

pub use entities::{
    Area, AreaId, Category, DecorShape, Grid, GridId, GridSize, IconId, IconKind, IconMarker,
    SeatHit, ShapeId, ShapeSize, TextAnnotation, TextId,
};
pub use error::{GeometryError, SceneError};
pub use geometry::{BBox, Point};
pub use scene::{EntityRef, Scene, TextStyle};
pub use spatial::AreaIndex;
pub use transform::{compose_transform, Affine, Placement, Positioned, TransformPatch};
