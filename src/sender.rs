//! Built-in sender
//! If you want to drive the LCD over some other adapter, you will need to implement [`SendCommand`] trait

use embedded_hal::delay::DelayNs;

use crate::{
    command::{Command, CommandSet, State},
    utils::{BitOps, BitState},
};

mod i2c_sender;

pub use i2c_sender::I2cSender;

/// [`SendCommand`] is the trait a sender should implement to communicate with the hardware
///
/// All methods block until the whole bus sequence, including the mandatory delays, is done.
pub trait SendCommand<Delayer: DelayNs> {
    /// Error raised by the underlying bus
    type Error;

    /// Send a write [`Command`] as 2 nibbles, high nibble first
    fn send(&mut self, command: Command, delayer: &mut Delayer) -> Result<(), Self::Error>;

    /// Run a read cycle of a read [`Command`], fill every byte of `buf`
    ///
    /// `buf` should not be empty
    fn receive(
        &mut self,
        command: Command,
        buf: &mut [u8],
        delayer: &mut Delayer,
    ) -> Result<(), Self::Error>;

    /// Check LCD busy state
    fn check_busy(&mut self, delayer: &mut Delayer) -> Result<bool, Self::Error> {
        let mut buf = [0u8];
        self.receive(CommandSet::ReadBusyFlagAndAddress.into(), &mut buf, delayer)?;
        Ok(buf[0].check_bit(7) == BitState::Set)
    }

    /// Wait in a busy loop, until LCD is idle
    ///
    /// Note:
    /// There is no timeout, this call blocks until the controller reports "not busy".
    /// If RW is not wired on the adapter, the busy flag reads back high forever.
    fn wait_for_idle(
        &mut self,
        delayer: &mut Delayer,
        poll_interval_us: u32,
    ) -> Result<(), Self::Error> {
        while self.check_busy(delayer)? {
            delayer.delay_us(poll_interval_us);
        }
        Ok(())
    }

    /// Get the backlight state which goes with every byte sent
    fn get_backlight(&self) -> State;

    /// Only record the backlight state, it takes effect on the next transfer
    fn stage_backlight(&mut self, backlight: State);

    /// Record the backlight state and apply it right now
    ///
    /// Note:
    /// On failure the old backlight state is kept
    fn set_backlight(
        &mut self,
        backlight: State,
        delayer: &mut Delayer,
    ) -> Result<(), Self::Error>;
}
