use crate::storage::rid::Rid;
use thiserror::Error;

/// Single result-kind convention for the whole stack: storage, catalog,
/// planner, lock manager, and session all surface the same error enum
/// instead of mixing exceptions and in-band variants.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum MiniDbError {
    #[error("not enough free space on page")]
    NotEnoughFreeSpace,

    #[error("no free frame available in buffer pool")]
    NoFreeFrame,

    #[error("page {0} not found in buffer pool")]
    PageNotFound(u32),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("lock conflict on {0:?}")]
    LockConflict(Rid),

    #[error("transaction not active")]
    TransactionNotActive,

    #[error("transaction not found")]
    TransactionNotFound,

    #[error("transaction already exists")]
    TransactionAlreadyExist,

    #[error("transaction does not exist")]
    TransactionNotExist,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type MiniDbResult<T> = Result<T, MiniDbError>;

impl From<std::io::Error> for MiniDbError {
    fn from(e: std::io::Error) -> Self {
        MiniDbError::Io(e.to_string())
    }
}
