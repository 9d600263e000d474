//! Character LCD support for HD44780-compatible controllers wired over a parallel bus.
//!
//! The crate is layered the same way the bus is:
//! - [lcd::port]: line-level access to RS, RW, E and the data lines.
//! - [lcd::hd44780::intf]: the controller's bus protocol for both 8-bit and 4-bit wiring.
//! - [lcd::hd44780::display]: character grid helpers on top of the protocol.
//!
//! [gpiod] provides a port on top of Linux GPIO character devices.
pub mod delay;
pub mod gpiod;
pub mod lcd;

use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            // EBUSY from a line request
            std::io::ErrorKind::ResourceBusy => GpioError::AlreadyInUse,
            std::io::ErrorKind::Unsupported => GpioError::NotSupported,
            kind => GpioError::Io(kind),
        }
    }
}

pub type GpioResult<T> = Result<T, GpioError>;
