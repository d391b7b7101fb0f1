use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl FxError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        FxError::InvalidParameter { name, value, reason }
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
