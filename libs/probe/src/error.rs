use probe_api::{StoreError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
