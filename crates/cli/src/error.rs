use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Ledger(#[from] ledger::LedgerError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not logged in, run `thing-ledger login` first")]
    NotLoggedIn,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
}
