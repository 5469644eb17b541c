//! Location subsystem.
//!
//! Loads the geographic reference dataset (built-in, CSV file, or remote CSV
//! with a local snapshot) and resolves region/locality pairs to coordinates.

pub mod cache;
pub mod index;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::SnapshotCache;
pub use index::{DuplicatePolicy, ReferenceIndex};
pub use providers::{BuiltinSource, CsvFileSource, HttpSource, ReferenceSource};
pub use resolver::LocationResolver;
pub use types::{format_coords, normalize_region, Coordinate, LocationSource, ReferenceRow, RegionLocalityKey};
