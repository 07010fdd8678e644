use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{field} is too long: {len} > {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("creator shares must add up to 100, got {0}")]
    CreatorShares(u32),
    #[error("account is not a metadata account (key {0})")]
    NotMetadata(u8),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
