/*!
# PCF8574 LCD Driver

Drive a HD44780 character LCD through a PCF8574 I2C I/O expander, in 4 bit mode.

Basic Usage:

1. Initialize a "sender" <br/>
    This crate include a driver for the common PCF8574 adapter board [`sender::I2cSender`]

    You can use any driver implemented [`sender::SendCommand`] as well.
<br/>
<br/>
2. Use [`lcd::Lcd::new()`] with a [`lcd::Config`] to create a [`lcd::Lcd`], and initialize LCD hardware
<br/>
<br/>
3. use any methods provide by [`lcd::Lcd`] to control the LCD

```no_run
# use embedded_hal::{delay::DelayNs, i2c::I2c};
# fn demo<I: I2c, D: DelayNs>(i2c: I, delayer: D) -> Result<(), pcf8574_lcd::error::Error<I::Error>> {
use pcf8574_lcd::{
    command::State,
    lcd::{Config, Lcd},
    sender::I2cSender,
};

let sender = I2cSender::new(i2c, 0x27);
let config = Config::default().set_cursor_state(State::On);
let mut lcd = Lcd::new(sender, delayer, config, 10)?;

lcd.clean_display()?;
lcd.set_cursor_pos(1, 3)?;
lcd.write_str_to_cur("hello")?;
# Ok(())
# }
```

Several displays can share one bus, wrap the bus in a shared bus device
(e.g. `embedded_hal_bus::i2c::RefCellDevice`) and give each [`sender::I2cSender`] its own.
*/

#![no_std]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod command;
pub mod error;
pub mod lcd;
pub mod sender;
mod state;
pub mod utils;
