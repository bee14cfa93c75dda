//! Shared test utilities for the geomosaic workspace: deterministic
//! synthetic rasters and in-process stand-ins for the external
//! collaborators (tile source, merge tool, cloud classifier).

pub mod generators;
pub mod stubs;

pub use generators::tile_with_mask;
pub use stubs::{ConstantCloudClassifier, ScriptedTileSource, SlotScript, StitchMerge};
