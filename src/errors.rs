use crate::options::AccessMode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GdalError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GdalError {
    /// Malformed, missing or out-of-range input. Always detected before any
    /// driver or library call is made.
    #[error("Bad argument: {0}")]
    BadArgument(String),
    /// Every driver probe declined to open `path`.
    #[error("Error opening dataset '{path}' ({access})")]
    OpenFailed { path: String, access: AccessMode },
    #[error("Unable to read config file '{path}': {msg}")]
    ConfigFile { path: String, msg: String },
    #[error("FFI NUL error: {0}")]
    FfiNulError(#[from] std::ffi::NulError),
    #[error("GDAL method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
}
