//! Error type shared by the library and the command line driver.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Invalid value `{value}` for `{name}`")]
    InvalidArgument { name: String, value: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical domain error: {0}")]
    NumericalDomain(String),

    #[error("Integrator is in state {found:?}, expected {expected:?}")]
    State {
        expected: crate::integrator::IntegratorState,
        found: crate::integrator::IntegratorState,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Could not read the run card: {0}")]
    RunCard(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_argument() {
        let err = Error::InvalidArgument {
            name: "mass".to_owned(),
            value: "abc".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value `abc` for `mass`"
        );
    }

    #[test]
    fn io_error_converts() {
        fn open() -> Result<std::fs::File> {
            Ok(std::fs::File::open("/nonexistent/run_card.yaml")?)
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
