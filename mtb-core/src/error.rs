use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("badge catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("badge catalog must be an array or an object with a `badges` array")]
    Shape,
}
