use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: expected {expected} tab-separated fields, found {found}")]
    FieldCount {
        path: String,
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("{path}:{line}: invalid value for column '{column}': {value:?}")]
    InvalidField {
        path: String,
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("No records found in {path}")]
    EmptyInput { path: String },
    #[error("{0}")]
    InvalidArgument(String),
}
