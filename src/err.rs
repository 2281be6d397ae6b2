#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Args(String),

    #[error("failed to resolve host {host}: {source}")]
    HostResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} has no resolvable address")]
    HostNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
