use crate::{config, fsutil, persistence, source};

/// Errors aborting a discovery or check run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error(transparent)]
    Persistence(#[from] persistence::Error),
    #[error(transparent)]
    Source(#[from] source::Error),
    #[error(transparent)]
    Input(#[from] fsutil::JsonFileError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("system clock is before the unix epoch: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_log() {
        let ok: std::result::Result<u8, config::Error> = Ok(3);
        assert_eq!(ok.ok_log(), Some(3));
        let err: std::result::Result<u8, config::Error> = Err(config::Error::EmptyGroupName);
        assert_eq!(err.ok_log(), None);
    }

    #[test]
    fn test_config_errors_are_wrapped() {
        let err = Error::from(config::Error::EmptyGroupName);
        assert_eq!(err.to_string(), "invalid configuration: group name must not be empty");
    }
}
