use thiserror::Error;
use verdict_opath::PathError;

/// Structured failures raised while compiling a rule document into an
/// expression tree. Evaluation itself never raises: runtime problems fold
/// into a failing result instead.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Expected a map at '{path}', found {found}")]
    NotAMap { path: String, found: &'static str },

    #[error("No operator or condition keyword found at '{path}'")]
    MissingKeyword { path: String },

    #[error("Operator '{keyword}' at '{path}' expects an object or an array of objects")]
    MalformedOperator { keyword: String, path: String },

    #[error("The subselector at '{path}' must be an object")]
    MalformedSubselector { path: String },

    #[error("Invalid field path at '{path}': {source}")]
    FieldPath {
        path: String,
        #[source]
        source: PathError,
    },

    #[error("The function at '{path}' does not name a known function")]
    UnknownFunction { path: String },

    #[error("The function argument at '{path}' is not a supported shape")]
    MalformedFunction { path: String },
}
