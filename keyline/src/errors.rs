use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Invalid keyframe time: {time} (a finite number of milliseconds is required).
    InvalidTime { time: f64 },
    /// Shape mismatch on '{key}': expected {expected}, found {found}.
    ShapeMismatch {
        key: String,
        expected: String,
        found: String,
    },
    /// Unknown track '{name}': no target was supplied for it.
    UnknownTrack { name: String },
    /// Invalid value: {info}.
    InvalidValue { info: String },
    /// Serialization error: {info}.
    Serialization { info: String },
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        log::error!("serde_json error {:?}", error);
        SerializationSnafu {
            info: error.to_string(),
        }
        .build()
    }
}
