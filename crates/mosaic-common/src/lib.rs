//! Common types shared across the geomosaic workspace: geographic bounding
//! boxes, tile-grid planning and time-slot planning.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{MosaicError, MosaicResult};
pub use grid::TileGrid;
pub use time::{split_interval, TimeSlot};
