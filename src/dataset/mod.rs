//! Dashboard input data
//!
//! This module reads the two static inputs the dashboard is built from:
//!
//! - **types**: Raw entities (`CaseRecord`, `CountryFeature`)
//! - **csv_loader**: Delimited case table reader
//! - **topology**: TopoJSON world map decoder
//! - **loader**: Concurrent load of both inputs with a single join point
//! - **error**: Error types
//!
//! # Load Path
//!
//! ```text
//!   cases.csv  ──► CaseLoader ──┐
//!                               ├──► join ──► DashboardData (read-only)
//!   world.json ──► Topology  ───┘
//! ```

pub mod csv_loader;
pub mod error;
pub mod loader;
pub mod topology;
pub mod types;

// Re-export commonly used types
pub use csv_loader::{CaseLoader, LoadedCases};
pub use error::{DatasetError, DatasetResult};
pub use loader::{load_dashboard_data, DashboardData};
pub use topology::{GeometryObject, Topology, Transform};
pub use types::{parse_metric_value, CaseRecord, CountryFeature};
