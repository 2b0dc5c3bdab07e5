pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use data::aggregate::DashboardViews;
pub use data::filter::{apply, FilterCriteria, FilteredDataset};
pub use data::loader::{load_file, LoadOptions, LoadReport};
pub use data::model::{Geography, SalesRecord, SalesTable};
pub use error::{ExportError, FilterWarning, LoadError};
pub use state::Session;
