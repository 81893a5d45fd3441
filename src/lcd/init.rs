use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, State},
    error::Error,
    lcd::Lcd,
    sender::SendCommand,
    state::LcdState,
};

/// HD44780 needs at least 40 ms after Vcc rises before the first instruction
const POWER_ON_DELAY_MS: u32 = 40;

/// [`Config`] is the init config of a [`Lcd`]
///
/// Cursor and blink are fixed here, before the hardware is initialized,
/// use [`Lcd::set_cursor_state()`] and friends to change them later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    state: LcdState,
    backlight: State,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state: LcdState::default(),
            backlight: State::On,
        }
    }
}

#[allow(missing_docs)]
impl Config {
    pub fn get_backlight(&self) -> State {
        self.backlight
    }

    pub fn set_backlight(mut self, backlight: State) -> Self {
        self.backlight = backlight;
        self
    }

    pub fn get_display_state(&self) -> State {
        self.state.get_display_state()
    }

    pub fn set_display_state(mut self, display: State) -> Self {
        self.state.set_display_state(display);
        self
    }

    pub fn get_cursor_state(&self) -> State {
        self.state.get_cursor_state()
    }

    pub fn set_cursor_state(mut self, cursor: State) -> Self {
        self.state.set_cursor_state(cursor);
        self
    }

    pub fn get_cursor_blink(&self) -> State {
        self.state.get_cursor_blink()
    }

    pub fn set_cursor_blink(mut self, blink: State) -> Self {
        self.state.set_cursor_blink(blink);
        self
    }
}

impl<Sender, Delayer> Lcd<Sender, Delayer>
where
    Sender: SendCommand<Delayer>,
    Delayer: DelayNs,
{
    /// Create a [`Lcd`] driver, and init LCD hardware
    ///
    /// The init sequence is `0x02` (enter 4 bit mode), `0x28` (4 bit, 2 lines, 5x8 font),
    /// then display control with display / cursor / blink taken from `config`.
    ///
    /// `poll_interval_us` is used by [`Lcd::wait_for_idle()`] between 2 busy flag polls.
    pub fn new(
        mut sender: Sender,
        mut delayer: Delayer,
        config: Config,
        poll_interval_us: u32,
    ) -> Result<Self, Error<Sender::Error>> {
        let state = config.state;

        // backlight goes into every byte of the sequence below
        sender.stage_backlight(config.backlight);

        debug!("init lcd, backlight {}", config.backlight);

        delayer.delay_ms(POWER_ON_DELAY_MS);

        let mut lcd = Lcd {
            sender,
            delayer,
            state,
            poll_interval_us,
        };

        // the controller may still be in 8 bit mode after power on,
        // then high nibble 0000 is ignored, and low nibble 0010 latches as "Function Set: 4 bit"
        // if it's already in 4 bit mode, 0x02 is just Return Home
        lcd.send(CommandSet::ReturnHome)?;
        lcd.send(CommandSet::FunctionSet)?;
        lcd.send(state.display_control())?;

        Ok(lcd)
    }
}
