//! This module is responsible for reading network exports and building
//! the multimodal planning graph from repository records.

mod builder;
pub mod csv;

pub use builder::{BuildReport, build_planning_graph};
pub use self::csv::{CsvRepository, load_csv_repository};
