use thiserror::Error as ThisError;

/// Failure taxonomy for the harness.
///
/// Initialization and start failures are fatal to the session: they are
/// surfaced on screen and the orchestration loop never runs. Pairing
/// outcomes (skipped, timed out) are not errors and never appear here.
#[derive(ThisError, Debug)]
pub enum HarnessError {
    #[error("Failed to initialize accessory engine: {0}")]
    EngineInit(String),

    #[error("Failed to register service '{0}'")]
    ServiceRegistration(&'static str),

    #[error("Failed to start accessory engine: {0}")]
    EngineStart(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
