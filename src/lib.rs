//! splitdb - strict validation and index building for yearly stock-split files
//!
//! Year files (`data/YYYY.json`) are the source of truth. `index.json` is
//! derived from them and rebuilt from scratch on every build.

pub mod cli;
pub mod dataset;
pub mod index;
pub mod integrity;
pub mod model;
pub mod observability;
pub mod schema;
