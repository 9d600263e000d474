pub mod hd44780;
pub mod port;

use crate::GpioError;
use thiserror::Error;

/// Errors reported by the LCD protocol layers.
///
/// The controller protocol itself only knows one failure: the busy flag never cleared.
/// Anything else comes from the port backend.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    /// The busy flag was still set after `reads` samples.
    #[error("controller still busy after {reads} busy flag reads")]
    Timeout { reads: u32 },
    #[error("port error: {0}")]
    Gpio(#[from] GpioError),
}

impl LcdError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LcdError::Timeout { .. })
    }
}

pub type LcdResult<T> = Result<T, LcdError>;
