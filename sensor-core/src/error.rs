/// Error types for the sensor trend viewer
use thiserror::Error;

/// A dataset could not be loaded. The dataset is replaced by an empty table
/// and the error is surfaced to the operator.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source path does not exist
    #[error("File not found: {source_name}. Please check the file path.")]
    NotFound { source_name: String },

    /// The source has no header or no content at all
    #[error("{source_name} is empty")]
    Empty { source_name: String },

    /// A required column is missing from the header
    #[error("Column '{column}' not found in {source_name}. Please ensure the CSV has this column.")]
    MissingColumn { source_name: String, column: String },

    /// A field could not be converted to the expected type
    #[error("Malformed value in {source_name} at row {row}, column '{column}': {value:?}")]
    Malformed {
        source_name: String,
        row: usize,
        column: String,
        value: String,
    },

    /// Reading the source failed
    #[error("Failed to read {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// The CSV reader rejected a record
    #[error("Failed to parse CSV from {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },
}

/// A manually entered timestamp did not match the expected format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time {input:?}, please use YYYY-MM-DD HH:MM:SS")]
pub struct ParseError {
    pub input: String,
}

/// Moving the window by one step would leave the supported date range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move the window {window} by {step_minutes} minutes: out of range")]
pub struct NavigationError {
    pub window: String,
    pub step_minutes: u32,
}

/// The filter predicate could not be evaluated for a row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Row {row} of {source_name} has an unparsed timestamp {raw:?}")]
    UnparsedTimestamp {
        source_name: String,
        row: usize,
        raw: String,
    },
}

/// The anomaly dataset does not line up row-for-row with the primary dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{secondary_name} has {secondary_rows} rows but {primary_name} has {primary_rows}; \
     anomaly rows are matched by position and must have the same count"
)]
pub struct AlignmentError {
    pub primary_name: String,
    pub primary_rows: usize,
    pub secondary_name: String,
    pub secondary_rows: usize,
}

/// Any failure that aborts or degrades a render pass.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Writing the export file failed
    #[error("Failed to write export: {0}")]
    Export(#[from] csv::Error),
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
