use stockask_core::{
    ChartError, CoreError, FavouritesError, NluError, ValidationError, WarehouseError,
};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("nlu service failed: {0}")]
    Nlu(#[from] NluError),

    #[error(transparent)]
    Favourites(#[from] FavouritesError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("background worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Chart(_) => 2,
            Self::Favourites(FavouritesError::OutOfRange { .. } | FavouritesError::EmptyText) => 2,
            Self::Serialization(_) => 4,
            Self::Config(CoreError::Config(_)) | Self::Nlu(_) => 6,
            Self::Favourites(_) | Self::Warehouse(_) | Self::Io(_) | Self::Worker(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        assert_eq!(CliError::Validation(ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(
            CliError::Favourites(FavouritesError::OutOfRange { index: 4, len: 1 }).exit_code(),
            2
        );
        assert_eq!(
            CliError::Config(CoreError::Config(String::from("STOCKASK_NLU_URL must be set")))
                .exit_code(),
            6
        );
        assert_eq!(CliError::Nlu(NluError::unavailable("down")).exit_code(), 6);
        assert_eq!(
            CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).exit_code(),
            10
        );
    }
}
