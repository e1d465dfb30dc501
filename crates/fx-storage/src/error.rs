use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("corrupt assignments record: {0}")]
    CorruptRecord(String),
}
