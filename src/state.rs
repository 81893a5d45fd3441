use crate::command::{CommandSet, State};

/// What the display control register should hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LcdState {
    display_on: State,
    cursor_on: State,
    cursor_blink: State,
}

impl Default for LcdState {
    fn default() -> Self {
        Self {
            display_on: State::On,
            cursor_on: State::Off,
            cursor_blink: State::Off,
        }
    }
}

impl LcdState {
    pub(crate) fn get_display_state(&self) -> State {
        self.display_on
    }

    pub(crate) fn set_display_state(&mut self, display: State) {
        self.display_on = display;
    }

    pub(crate) fn get_cursor_state(&self) -> State {
        self.cursor_on
    }

    pub(crate) fn set_cursor_state(&mut self, cursor: State) {
        self.cursor_on = cursor;
    }

    pub(crate) fn get_cursor_blink(&self) -> State {
        self.cursor_blink
    }

    pub(crate) fn set_cursor_blink(&mut self, blink: State) {
        self.cursor_blink = blink;
    }

    pub(crate) fn display_control(&self) -> CommandSet {
        CommandSet::DisplayOnOff {
            display: self.display_on,
            cursor: self.cursor_on,
            cursor_blink: self.cursor_blink,
        }
    }
}
