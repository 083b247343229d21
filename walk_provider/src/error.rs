use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("provider link disconnected")]
    Disconnected,
    #[error("trace row {index}: t_s = {t_s} is out of range for the clock")]
    TimestampOutOfRange { index: usize, t_s: f64 },
}

pub type Result<T> = std::result::Result<T, ProviderError>;
