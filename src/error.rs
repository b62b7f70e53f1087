pub type SpectroResult<T> = Result<T, SpectroError>;

#[derive(thiserror::Error, Debug)]
pub enum SpectroError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("probe error: {0}")]
    Probe(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpectroError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }
}
