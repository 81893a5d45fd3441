//! HD44780 instructions, and how they map to register select / read write / data bits

use crate::utils::{BitOps, BitState};

#[derive(Clone, Copy)]
pub(crate) enum CommandSet {
    ClearDisplay,
    ReturnHome,
    DisplayOnOff {
        display: State,
        cursor: State,
        cursor_blink: State,
    },
    CursorOrDisplayShift(ShiftType, MoveDirection),
    // 4 bit data width, 2 lines, 5x8 font
    // the PCF8574 adapter only wires DB4~DB7, so data width is always 4 bit
    FunctionSet,
    SetCGRAM(u8),
    SetDDRAM(u8),
    ReadBusyFlagAndAddress,
    WriteDataToRAM(u8),
    ReadDataFromRAM,
}

/// Direction the address counter moves after a RAM access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveDirection {
    /// Address counter decreases
    RightToLeft,
    /// Address counter increases
    #[default]
    LeftToRight,
}

/// What a cursor / display shift instruction moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftType {
    /// Only the cursor (address counter) moves, the display stays
    #[default]
    CursorOnly,
    /// The whole display shifts along with the cursor
    CursorAndDisplay,
}

/// On / Off state of a display feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    #[allow(missing_docs)]
    Off,
    #[allow(missing_docs)]
    #[default]
    On,
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

impl From<State> for BitState {
    fn from(value: State) -> Self {
        match value {
            State::Off => BitState::Clear,
            State::On => BitState::Set,
        }
    }
}

/// One transfer unit for a [`SendCommand`](crate::sender::SendCommand) implementor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    rs: RegisterSelection,
    rw: ReadWriteOp,
    data: Option<u8>, // if it's a read command, then data should be filled by reading process
}

/// Which register of HD44780 to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSelection {
    /// Instruction register (RS = 0)
    Command,
    /// Data register (RS = 1)
    Data,
}

/// Direction of the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWriteOp {
    /// RW = 0
    Write,
    /// RW = 1
    Read,
}

impl Command {
    pub(crate) fn new(rs: RegisterSelection, rw: ReadWriteOp, data: Option<u8>) -> Self {
        Self { rs, rw, data }
    }

    /// Register this command targets
    pub fn get_register_selection(&self) -> RegisterSelection {
        self.rs
    }

    /// Transfer direction of this command
    pub fn get_read_write_op(&self) -> ReadWriteOp {
        self.rw
    }

    /// The byte to write, [`None`] for read commands
    pub fn get_data(&self) -> Option<u8> {
        self.data
    }
}

impl From<CommandSet> for Command {
    fn from(command: CommandSet) -> Self {
        match command {
            CommandSet::ClearDisplay => {
                let raw_bits: u8 = 0b0000_0001;
                Self::new(
                    RegisterSelection::Command,
                    ReadWriteOp::Write,
                    Some(raw_bits),
                )
            }

            CommandSet::ReturnHome => {
                let raw_bits: u8 = 0b0000_0010;
                Self::new(
                    RegisterSelection::Command,
                    ReadWriteOp::Write,
                    Some(raw_bits),
                )
            }

            CommandSet::DisplayOnOff {
                display,
                cursor,
                cursor_blink,
            } => {
                let mut raw_bits: u8 = 0b0000_1000;

                raw_bits.put_bit(2, display.into());
                raw_bits.put_bit(1, cursor.into());
                raw_bits.put_bit(0, cursor_blink.into());

                Self::new(
                    RegisterSelection::Command,
                    ReadWriteOp::Write,
                    Some(raw_bits),
                )
            }

            CommandSet::CursorOrDisplayShift(st, dir) => {
                let mut raw_bits: u8 = 0b0001_0000;

                match st {
                    ShiftType::CursorOnly => raw_bits.clear_bit(3),
                    ShiftType::CursorAndDisplay => raw_bits.set_bit(3),
                };
                match dir {
                    MoveDirection::RightToLeft => raw_bits.clear_bit(2),
                    MoveDirection::LeftToRight => raw_bits.set_bit(2),
                };

                Self::new(
                    RegisterSelection::Command,
                    ReadWriteOp::Write,
                    Some(raw_bits),
                )
            }

            CommandSet::FunctionSet => {
                let mut raw_bits: u8 = 0b0010_0000;
                raw_bits.set_bit(3); // N: 2 lines

                Self::new(
                    RegisterSelection::Command,
                    ReadWriteOp::Write,
                    Some(raw_bits),
                )
            }

            // callers validate the address, the mask only keeps the instruction bits intact
            CommandSet::SetCGRAM(addr) => Self::new(
                RegisterSelection::Command,
                ReadWriteOp::Write,
                Some(0b0100_0000 | (addr & 0b0011_1111)),
            ),

            CommandSet::SetDDRAM(addr) => Self::new(
                RegisterSelection::Command,
                ReadWriteOp::Write,
                Some(0b1000_0000 | (addr & 0b0111_1111)),
            ),

            CommandSet::ReadBusyFlagAndAddress => {
                Self::new(RegisterSelection::Command, ReadWriteOp::Read, None)
            }

            CommandSet::WriteDataToRAM(data) => {
                Self::new(RegisterSelection::Data, ReadWriteOp::Write, Some(data))
            }

            CommandSet::ReadDataFromRAM => {
                Self::new(RegisterSelection::Data, ReadWriteOp::Read, None)
            }
        }
    }
}
