//! Errors returned by [`Lcd`](crate::lcd::Lcd) operations

use core::fmt;

/// Errors that can occur when driving the LCD
///
/// `E` is the error type of the underlying [`SendCommand`](crate::sender::SendCommand),
/// which is the I2C bus error for [`I2cSender`](crate::sender::I2cSender).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus could not be acquired, or a byte was not acknowledged.
    /// Never retried by the driver.
    TransportFailure(E),
    /// An argument is outside its documented range, nothing was sent
    InvalidArgument(InvalidArgument),
}

/// Which argument was rejected, and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidArgument {
    /// Row should be 0 ~ 3
    RowOutOfRange(u8),
    /// Column goes past the DDRAM line of this row
    ColumnOutOfRange {
        #[allow(missing_docs)]
        row: u8,
        #[allow(missing_docs)]
        col: u8,
    },
    /// A glyph is exactly 8 rows, this is the length we got
    GlyphRowCount(usize),
    /// DDRAM address should fit in 7 bits
    DdramAddressOutOfRange(u8),
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(value: InvalidArgument) -> Self {
        Error::InvalidArgument(value)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgument::RowOutOfRange(row) => {
                write!(f, "row {row} out of range, should be 0 ~ 3")
            }
            InvalidArgument::ColumnOutOfRange { row, col } => {
                write!(f, "column {col} out of range for row {row}")
            }
            InvalidArgument::GlyphRowCount(len) => {
                write!(f, "glyph needs exactly 8 rows, got {len}")
            }
            InvalidArgument::DdramAddressOutOfRange(addr) => {
                write!(f, "DDRAM address {addr:#04x} out of range")
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportFailure(e) => write!(f, "bus transport failure: {e:?}"),
            Error::InvalidArgument(arg) => write!(f, "invalid argument: {arg}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::TransportFailure(_e) => defmt::write!(fmt, "bus transport failure"),
            Error::InvalidArgument(arg) => defmt::write!(fmt, "invalid argument: {}", arg),
        }
    }
}
