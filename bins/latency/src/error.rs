#[derive(Debug, thiserror::Error)]
pub enum LatencyError {
    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Probe(#[from] probe::ProbeError),

    #[error("{0}")]
    Transport(#[from] probe_api::TransportError),
}
