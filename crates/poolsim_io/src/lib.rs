//! # Poolsim IO
//!
//! Everything that touches the file system:
//! - Loading run configurations (legacy spec files and TOML)
//! - Heatmap rendering to PPM images
//! - Run reports and particle snapshots as JSON

/// Error types and result aliases for I/O operations
pub mod error;
/// Occupancy canvas and PPM writer
pub mod heatmap;
/// End-of-run timing report
pub mod report;
/// JSON helpers
pub mod serialization;
/// Spec-file and TOML configuration loader
pub mod spec_file;

pub use error::{IoError, Result};
pub use heatmap::{encode_ppm, write_frame, write_ppm, Canvas};
pub use report::RunReport;
pub use serialization::{from_json, read_json_file, to_json_pretty, write_json_file};
pub use spec_file::{load_config, parse_spec};
