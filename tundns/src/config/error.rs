use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File error: {0}")]
    File(#[from] FileError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Internal error: {0}")]
    Internal(&'static str),
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("{0} io error: {1}")]
    Io(String, std::io::Error),
    #[error("{0} deserialization error: {1}")]
    Serde(String, serde_yaml::Error),
}
