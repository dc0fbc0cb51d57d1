use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PathError {
    #[error("Path parse error in '{0}': {1}")]
    Parse(String, String),

    #[error("Empty path expression")]
    Empty,
}
