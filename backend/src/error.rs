use thiserror::Error;

/// A rejected submission. Each variant is one rule, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Semua field wajib diisi!")]
    MissingFields,

    #[error("Telegram User ID harus berupa angka!")]
    ChatUserIdNotNumeric,

    #[error("Transaction Hash harus diawali dengan '0x'")]
    TxHashMissingPrefix,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to write blob: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("empty upload")]
    Empty,
}

/// Raised when a closed set (package, network, status) is parsed from free text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to upload image: {0}")]
    Upload(#[from] UploadError),

    #[error("failed to access record store: {0}")]
    Store(#[from] StoreError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
