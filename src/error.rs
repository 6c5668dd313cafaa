use crate::components::ShapeCategory;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported {category} type: {key:?}")]
    UnsupportedType { category: ShapeCategory, key: String },
    #[error("edge {edge:?} references a missing node: {node:?}")]
    MissingEndpoint { edge: String, node: String },
}

impl RenderError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
