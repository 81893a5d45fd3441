//! The [`Lcd`] handle, one for each physical display

use core::fmt;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::{
    command::{
        Command, CommandSet, MoveDirection, ReadWriteOp, RegisterSelection, ShiftType, State,
    },
    error::{Error, InvalidArgument},
    sender::{I2cSender, SendCommand},
    state::LcdState,
};

mod init;

pub use init::Config;

/// DDRAM address where each row starts, for 16x2 / 20x4 layout
const LINE_BASE: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
/// how many columns fit from [`LINE_BASE`] to the end of its DDRAM line
const LINE_LEN: [u8; 4] = [40, 40, 20, 20];

const CGRAM_SLOTS: u8 = 8;
const GLYPH_ROWS: usize = 8;

/// A HD44780 display
///
/// Every method blocks until the whole bus sequence is done.
/// The driver doesn't lock anything, if several [`Lcd`] share a bus,
/// the bus implementation has to serialize them.
pub struct Lcd<Sender: SendCommand<Delayer>, Delayer: DelayNs> {
    sender: Sender,
    delayer: Delayer,
    state: LcdState,
    poll_interval_us: u32,
}

impl<Sender, Delayer> Lcd<Sender, Delayer>
where
    Sender: SendCommand<Delayer>,
    Delayer: DelayNs,
{
    fn send(&mut self, command: CommandSet) -> Result<(), Error<Sender::Error>> {
        self.sender
            .send(command.into(), &mut self.delayer)
            .map_err(Error::TransportFailure)
    }

    /// Write a raw instruction byte (RS = 0)
    pub fn write_command(&mut self, byte: u8) -> Result<(), Error<Sender::Error>> {
        self.sender
            .send(
                Command::new(RegisterSelection::Command, ReadWriteOp::Write, Some(byte)),
                &mut self.delayer,
            )
            .map_err(Error::TransportFailure)
    }

    /// Write a byte to DDRAM or CGRAM, at current address counter (RS = 1)
    pub fn write_u8_to_cur(&mut self, byte: u8) -> Result<(), Error<Sender::Error>> {
        self.send(CommandSet::WriteDataToRAM(byte))
    }

    /// Write bytes at current cursor, until the first `0` byte or the end of `bytes`
    pub fn write_bytes_to_cur(&mut self, bytes: &[u8]) -> Result<(), Error<Sender::Error>> {
        bytes
            .iter()
            .take_while(|&&byte| byte != 0)
            .try_for_each(|&byte| self.write_u8_to_cur(byte))
    }

    /// Write a string at current cursor, byte by byte
    ///
    /// Note:
    /// Characters are sent as UTF-8 bytes, non-ASCII characters show whatever the CGROM has there.
    /// Like [`Lcd::write_bytes_to_cur()`], a `'\0'` ends the string, nothing after it is sent.
    pub fn write_str_to_cur(&mut self, str: &str) -> Result<(), Error<Sender::Error>> {
        self.write_bytes_to_cur(str.as_bytes())
    }

    /// Show the custom graph stored at CGRAM `index` at current cursor
    ///
    /// `index` is taken modulo 8, so 9 is the same graph as 1
    pub fn write_graph_to_cur(&mut self, index: u8) -> Result<(), Error<Sender::Error>> {
        self.write_u8_to_cur(index % CGRAM_SLOTS)
    }

    /// Store a custom graph into CGRAM `index` (taken modulo 8)
    ///
    /// `graph_data` should be exactly 8 rows, lower 5 bits of each row are the pixels.
    ///
    /// Note:
    /// Address counter points into CGRAM afterwards,
    /// call [`Lcd::set_cursor_pos()`] before writing text again.
    pub fn write_graph_to_cgram(
        &mut self,
        index: u8,
        graph_data: &[u8],
    ) -> Result<(), Error<Sender::Error>> {
        if graph_data.len() != GLYPH_ROWS {
            return Err(InvalidArgument::GlyphRowCount(graph_data.len()).into());
        }

        let cgram_data_addr_start = (index % CGRAM_SLOTS) * GLYPH_ROWS as u8;

        self.send(CommandSet::SetCGRAM(cgram_data_addr_start))?;
        graph_data
            .iter()
            .try_for_each(|&line_data| self.write_u8_to_cur(line_data))
    }

    /// Clear the display, and move cursor to (0, 0)
    pub fn clean_display(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send(CommandSet::ClearDisplay)
    }

    /// Move cursor to (0, 0), and undo display shift, DDRAM is kept
    pub fn return_home(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send(CommandSet::ReturnHome)
    }

    /// Move cursor to `row` (0 ~ 3) and `col`
    ///
    /// `col` should stay inside the DDRAM line of the row,
    /// that is below 40 for row 0 and 1, and below 20 for row 2 and 3.
    pub fn set_cursor_pos(&mut self, row: u8, col: u8) -> Result<(), Error<Sender::Error>> {
        let (Some(&base), Some(&len)) = (
            LINE_BASE.get(row as usize),
            LINE_LEN.get(row as usize),
        ) else {
            return Err(InvalidArgument::RowOutOfRange(row).into());
        };

        if col >= len {
            return Err(InvalidArgument::ColumnOutOfRange { row, col }.into());
        }

        self.send(CommandSet::SetDDRAM(base + col))
    }

    /// Move the cursor, or the whole display, one step toward `dir`
    ///
    /// DDRAM content is kept, [`Lcd::return_home()`] undoes display shift.
    pub fn shift_cursor_or_display(
        &mut self,
        shift_type: ShiftType,
        dir: MoveDirection,
    ) -> Result<(), Error<Sender::Error>> {
        self.send(CommandSet::CursorOrDisplayShift(shift_type, dir))
    }

    /// Read `buf.len()` bytes of DDRAM from `addr`
    ///
    /// `direction` is how the address counter moves after each read,
    /// the cursor is left wherever the reading ends.
    /// An empty `buf` sends nothing.
    pub fn read_ddram(
        &mut self,
        addr: u8,
        direction: MoveDirection,
        buf: &mut [u8],
    ) -> Result<(), Error<Sender::Error>> {
        if addr >= 0x80 {
            return Err(InvalidArgument::DdramAddressOutOfRange(addr).into());
        }

        if buf.is_empty() {
            return Ok(());
        }

        self.send(CommandSet::CursorOrDisplayShift(
            ShiftType::CursorOnly,
            direction,
        ))?;
        self.send(CommandSet::SetDDRAM(addr))?;

        self.sender
            .receive(
                CommandSet::ReadDataFromRAM.into(),
                buf,
                &mut self.delayer,
            )
            .map_err(Error::TransportFailure)
    }

    /// Check LCD busy state
    pub fn check_busy(&mut self) -> Result<bool, Error<Sender::Error>> {
        self.sender
            .check_busy(&mut self.delayer)
            .map_err(Error::TransportFailure)
    }

    /// Poll busy flag until LCD is idle
    ///
    /// Note:
    /// This blocks until the controller answers "not busy", see [`SendCommand::wait_for_idle()`]
    pub fn wait_for_idle(&mut self) -> Result<(), Error<Sender::Error>> {
        self.sender
            .wait_for_idle(&mut self.delayer, self.poll_interval_us)
            .map_err(Error::TransportFailure)
    }

    /// Turn display (with cursor and blink) off, DDRAM is kept
    ///
    /// `backlight` is recorded and goes with this and every later transfer.
    pub fn turn_off(&mut self, backlight: State) -> Result<(), Error<Sender::Error>> {
        let previous = self.sender.get_backlight();
        self.sender.stage_backlight(backlight);

        let mut state = self.state;
        state.set_display_state(State::Off);
        state.set_cursor_state(State::Off);
        state.set_cursor_blink(State::Off);

        if let Err(e) = self.send(state.display_control()) {
            self.sender.stage_backlight(previous);
            return Err(e);
        }

        self.state = state;
        Ok(())
    }

    /// Change backlight right now, display content is not touched
    pub fn set_backlight(&mut self, backlight: State) -> Result<(), Error<Sender::Error>> {
        self.sender
            .set_backlight(backlight, &mut self.delayer)
            .map_err(Error::TransportFailure)
    }

    #[allow(missing_docs)]
    pub fn get_backlight(&self) -> State {
        self.sender.get_backlight()
    }

    #[allow(missing_docs)]
    pub fn set_display_state(&mut self, display: State) -> Result<(), Error<Sender::Error>> {
        let mut state = self.state;
        state.set_display_state(display);
        self.apply_display_control(state)
    }

    #[allow(missing_docs)]
    pub fn get_display_state(&self) -> State {
        self.state.get_display_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_state(&mut self, cursor: State) -> Result<(), Error<Sender::Error>> {
        let mut state = self.state;
        state.set_cursor_state(cursor);
        self.apply_display_control(state)
    }

    #[allow(missing_docs)]
    pub fn get_cursor_state(&self) -> State {
        self.state.get_cursor_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_blink_state(&mut self, blink: State) -> Result<(), Error<Sender::Error>> {
        let mut state = self.state;
        state.set_cursor_blink(blink);
        self.apply_display_control(state)
    }

    #[allow(missing_docs)]
    pub fn get_cursor_blink_state(&self) -> State {
        self.state.get_cursor_blink()
    }

    fn apply_display_control(&mut self, state: LcdState) -> Result<(), Error<Sender::Error>> {
        self.send(state.display_control())?;
        self.state = state;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn set_poll_interval(&mut self, interval_us: u32) {
        self.poll_interval_us = interval_us;
    }

    #[allow(missing_docs)]
    pub fn get_poll_interval_us(&self) -> u32 {
        self.poll_interval_us
    }

    /// Wait with the delayer held by [`Lcd`]
    pub fn delay_ms(&mut self, ms: u32) {
        self.delayer.delay_ms(ms);
    }

    /// Give back sender and delayer
    pub fn release(self) -> (Sender, Delayer) {
        (self.sender, self.delayer)
    }
}

impl<I2cLcd, Delayer> Lcd<I2cSender<I2cLcd>, Delayer>
where
    I2cLcd: I2c,
    Delayer: DelayNs,
{
    /// I2C address of the PCF8574 behind this display
    pub fn get_address(&self) -> u8 {
        self.sender.get_address()
    }
}

/// Formatted text goes to [`Lcd::write_str_to_cur()`]
///
/// Note:
/// Each formatted piece stops at its first `'\0'`, the rest of that piece is dropped
/// and the write still succeeds, e.g. `write!(lcd, "a\0b{}", 5)` shows `a5`.
impl<Sender, Delayer> fmt::Write for Lcd<Sender, Delayer>
where
    Sender: SendCommand<Delayer>,
    Delayer: DelayNs,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str_to_cur(s).map_err(|_| fmt::Error)
    }
}
