use thiserror::Error;

pub type HdskResult<T> = Result<T, HdskError>;

#[derive(Debug, Error)]
pub enum HdskError {
    #[error("config error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
