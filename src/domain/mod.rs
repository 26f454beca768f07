pub mod point;

pub use point::{Coordinates, PointRecord, UNNAMED};
