pub mod aabb;
pub mod point;

pub use glam::{dvec2, dvec3, DVec2, DVec3};
pub use aabb::{bounding_box, bounding_box_coords, Aabb};
pub use point::{points_from_coords, ControlPoint, PointSet};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
