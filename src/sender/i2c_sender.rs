use embedded_hal::{
    delay::DelayNs,
    i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource},
};

use crate::{
    command::{Command, ReadWriteOp, RegisterSelection, State},
    sender::SendCommand,
    utils::BitOps,
};

// I2C to parallel:
// P7 -> P0
// DB7/DB6/DB5/DB4/BL/EN/RW/RS
const RS_BIT: u8 = 0;
const RW_BIT: u8 = 1;
const EN_BIT: u8 = 2;
const BL_BIT: u8 = 3;

/// minimum EN high pulse width
const ENABLE_PULSE_US: u32 = 1;
/// every nibble needs this long before HD44780 accepts the next one
const NIBBLE_SETTLE_MS: u32 = 2;
const ACK_POLL_INTERVAL_US: u32 = 100;
const DEFAULT_ACK_RETRIES: u8 = 10;

/// Sender for a HD44780 behind a PCF8574 I/O expander, in 4 bit mode
///
/// `i2c` can be an owned bus, a `&mut` of it, or a shared bus device
/// (e.g. from `embedded-hal-bus`) when several displays sit on one bus.
pub struct I2cSender<I2cLcd: I2c> {
    i2c: I2cLcd,
    addr: u8,
    backlight: State,
    ack_retries: u8,
}

impl<I2cLcd: I2c> I2cSender<I2cLcd> {
    /// `addr` is the 7 bit address of the PCF8574, it won't be checked here
    pub fn new(i2c: I2cLcd, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            backlight: State::default(),
            ack_retries: DEFAULT_ACK_RETRIES,
        }
    }

    /// When the expander doesn't acknowledge its address, poll it this many more times
    /// before giving up. `0` fails at the first NAK.
    ///
    /// Only address NAK is retried, NAK on a data byte or any other bus error fails at once.
    pub fn with_ack_retries(mut self, retries: u8) -> Self {
        self.ack_retries = retries;
        self
    }

    #[allow(missing_docs)]
    pub fn get_address(&self) -> u8 {
        self.addr
    }

    /// Give back the bus
    pub fn release(self) -> I2cLcd {
        self.i2c
    }

    // expander byte with EN low
    fn expander_byte(&self, rs: RegisterSelection, rw: ReadWriteOp, nibble: u8) -> u8 {
        let mut byte = nibble << 4;

        if rs == RegisterSelection::Data {
            byte.set_bit(RS_BIT);
        }
        if rw == ReadWriteOp::Read {
            byte.set_bit(RW_BIT);
        }
        byte.put_bit(BL_BIT, self.backlight.into());

        byte
    }

    fn idle_byte(&self) -> u8 {
        self.expander_byte(RegisterSelection::Command, ReadWriteOp::Write, 0)
    }

    /// run a bus operation, start over while the expander NAKs its address
    fn acked<D: DelayNs>(
        &mut self,
        delayer: &mut D,
        mut op: impl FnMut(&mut I2cLcd, u8) -> Result<(), I2cLcd::Error>,
    ) -> Result<(), I2cLcd::Error> {
        let mut attempt = 0;
        loop {
            match op(&mut self.i2c, self.addr) {
                Err(e)
                    if attempt < self.ack_retries
                        && e.kind() == ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) =>
                {
                    attempt += 1;
                    debug!(
                        "expander {=u8:#x} didn't ack address, retry {=u8}",
                        self.addr,
                        attempt
                    );
                    delayer.delay_us(ACK_POLL_INTERVAL_US);
                }
                result => return result,
            }
        }
    }

    fn send_nibble<D: DelayNs>(
        &mut self,
        rs: RegisterSelection,
        nibble: u8,
        delayer: &mut D,
    ) -> Result<(), I2cLcd::Error> {
        let disabled = self.expander_byte(rs, ReadWriteOp::Write, nibble);
        let mut enabled = disabled;
        enabled.set_bit(EN_BIT);

        // EN stays high across the stop between these 2 writes,
        // HD44780 latches on the falling edge, which is in the second write
        self.acked(delayer, |i2c, addr| i2c.write(addr, &[disabled, enabled]))?;
        delayer.delay_us(ENABLE_PULSE_US);
        self.acked(delayer, |i2c, addr| i2c.write(addr, &[disabled]))?;
        delayer.delay_ms(NIBBLE_SETTLE_MS);

        Ok(())
    }
}

impl<I2cLcd: I2c, Delayer: DelayNs> SendCommand<Delayer> for I2cSender<I2cLcd> {
    type Error = I2cLcd::Error;

    fn send(&mut self, command: Command, delayer: &mut Delayer) -> Result<(), Self::Error> {
        debug_assert!(
            command.get_read_write_op() == ReadWriteOp::Write,
            "read command should go through receive()"
        );

        let rs = command.get_register_selection();
        let data = command.get_data().unwrap_or_default();

        trace!("send rs={=bool} byte={=u8:#x}", rs == RegisterSelection::Data, data);

        self.send_nibble(rs, data >> 4, delayer)?;
        self.send_nibble(rs, data & 0b0000_1111, delayer)
    }

    fn receive(
        &mut self,
        command: Command,
        buf: &mut [u8],
        delayer: &mut Delayer,
    ) -> Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        let rs = command.get_register_selection();

        // keep DB4~DB7 high, so PCF8574 only weakly pulls them up, and LCD can drive them
        let disabled = self.expander_byte(rs, ReadWriteOp::Read, 0b1111);
        let mut enabled = disabled;
        enabled.set_bit(EN_BIT);

        // write_read uses a repeated start, and NAKs only the last byte read
        self.acked(delayer, |i2c, addr| {
            i2c.write_read(addr, &[disabled, enabled], &mut *buf)
        })?;

        // drop EN and go back to write mode before anyone else use the bus
        let idle = self.idle_byte();
        self.acked(delayer, |i2c, addr| i2c.write(addr, &[idle]))?;

        trace!(
            "received {=usize} byte(s), first {=u8:#x}",
            buf.len(),
            buf[0]
        );

        Ok(())
    }

    fn get_backlight(&self) -> State {
        self.backlight
    }

    fn stage_backlight(&mut self, backlight: State) {
        self.backlight = backlight;
    }

    fn set_backlight(
        &mut self,
        backlight: State,
        delayer: &mut Delayer,
    ) -> Result<(), Self::Error> {
        let previous = self.backlight;
        self.backlight = backlight;

        let idle = self.idle_byte();
        let result = self.acked(delayer, |i2c, addr| i2c.write(addr, &[idle]));

        if result.is_err() {
            self.backlight = previous;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::command::CommandSet;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };
    use std::vec;

    const ADDR: u8 = 0x27;

    #[derive(Default)]
    struct RecordingDelay(std::vec::Vec<u32>);

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.push(ns);
        }

        fn delay_us(&mut self, us: u32) {
            self.0.push(us * 1_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.push(ms * 1_000_000);
        }
    }

    #[test]
    fn command_is_sent_high_nibble_first() {
        let expectations = [
            // high nibble 0x0, rs=0, rw=0, backlight on
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]),
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
            // low nibble 0x1
            I2cTransaction::write(ADDR, vec![0b0001_1000, 0b0001_1100]),
            I2cTransaction::write(ADDR, vec![0b0001_1000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);

        sender
            .send(CommandSet::ClearDisplay.into(), &mut NoopDelay::new())
            .unwrap();

        i2c.done();
    }

    #[test]
    fn data_sets_register_select_on_both_nibbles() {
        let expectations = [
            // 'A' = 0x41, backlight off
            I2cTransaction::write(ADDR, vec![0b0100_0001, 0b0100_0101]),
            I2cTransaction::write(ADDR, vec![0b0100_0001]),
            I2cTransaction::write(ADDR, vec![0b0001_0001, 0b0001_0101]),
            I2cTransaction::write(ADDR, vec![0b0001_0001]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);
        SendCommand::<NoopDelay>::stage_backlight(&mut sender, State::Off);

        sender
            .send(CommandSet::WriteDataToRAM(b'A').into(), &mut NoopDelay::new())
            .unwrap();

        i2c.done();
    }

    #[test]
    fn nibbles_wait_enable_pulse_and_settle_time() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0b0010_1000, 0b0010_1100]),
            I2cTransaction::write(ADDR, vec![0b0010_1000]),
            I2cTransaction::write(ADDR, vec![0b1000_1000, 0b1000_1100]),
            I2cTransaction::write(ADDR, vec![0b1000_1000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);
        let mut delay = RecordingDelay::default();

        sender
            .send(CommandSet::FunctionSet.into(), &mut delay)
            .unwrap();

        assert_eq!(delay.0, vec![1_000, 2_000_000, 1_000, 2_000_000]);
        i2c.done();
    }

    #[test]
    fn busy_flag_is_bit_7() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0b1000_0000]),
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0b0111_1111]),
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);
        let mut delay = NoopDelay::new();

        assert!(sender.check_busy(&mut delay).unwrap());
        assert!(!sender.check_busy(&mut delay).unwrap());

        i2c.done();
    }

    #[test]
    fn empty_receive_touches_nothing() {
        let mut i2c = I2cMock::new(&[]);
        let mut sender = I2cSender::new(&mut i2c, ADDR);

        sender
            .receive(
                CommandSet::ReadDataFromRAM.into(),
                &mut [0u8; 0],
                &mut NoopDelay::new(),
            )
            .unwrap();

        i2c.done();
    }

    #[test]
    fn address_nak_is_polled_until_ack() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let expectations = [
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]).with_error(nak),
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]).with_error(nak),
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]),
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
            I2cTransaction::write(ADDR, vec![0b0001_1000, 0b0001_1100]),
            I2cTransaction::write(ADDR, vec![0b0001_1000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);

        sender
            .send(CommandSet::ClearDisplay.into(), &mut NoopDelay::new())
            .unwrap();

        i2c.done();
    }

    #[test]
    fn address_nak_gives_up_after_retries() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let expectations = [
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]).with_error(nak),
            I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]).with_error(nak),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR).with_ack_retries(1);

        let result = sender.send(CommandSet::ClearDisplay.into(), &mut NoopDelay::new());
        assert_eq!(result, Err(nak));

        i2c.done();
    }

    #[test]
    fn busy_read_address_nak_is_polled_until_ack() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0x00])
                .with_error(nak),
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0x80]),
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);
        let mut delay = RecordingDelay::default();

        assert!(sender.check_busy(&mut delay).unwrap());
        // one ack poll interval before the second try
        assert_eq!(delay.0, vec![100_000]);

        i2c.done();
    }

    #[test]
    fn busy_read_gives_up_after_retries() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0x00])
                .with_error(nak),
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0x00])
                .with_error(nak),
            I2cTransaction::write_read(ADDR, vec![0b1111_1010, 0b1111_1110], vec![0x00])
                .with_error(nak),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR).with_ack_retries(2);

        let result = SendCommand::<NoopDelay>::check_busy(&mut sender, &mut NoopDelay::new());
        assert_eq!(result, Err(nak));

        i2c.done();
    }

    #[test]
    fn failed_idle_write_after_read_is_reported() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0b1111_1011, 0b1111_1111], vec![b'x']),
            I2cTransaction::write(ADDR, vec![0b0000_1000]).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);
        let mut buf = [0u8; 1];

        let result = sender.receive(
            CommandSet::ReadDataFromRAM.into(),
            &mut buf,
            &mut NoopDelay::new(),
        );
        assert_eq!(result, Err(ErrorKind::Other));

        i2c.done();
    }

    #[test]
    fn data_nak_is_not_retried() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data);
        let expectations =
            [I2cTransaction::write(ADDR, vec![0b0000_1000, 0b0000_1100]).with_error(nak)];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR);

        let result = sender.send(CommandSet::ClearDisplay.into(), &mut NoopDelay::new());
        assert_eq!(result, Err(nak));

        i2c.done();
    }

    #[test]
    fn failed_backlight_change_keeps_old_state() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0b0000_0000]).with_error(ErrorKind::Other),
            I2cTransaction::write(ADDR, vec![0b0000_0000]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sender = I2cSender::new(&mut i2c, ADDR).with_ack_retries(0);
        let mut delay = NoopDelay::new();

        assert!(sender.set_backlight(State::Off, &mut delay).is_err());
        assert_eq!(SendCommand::<NoopDelay>::get_backlight(&sender), State::On);

        sender.set_backlight(State::Off, &mut delay).unwrap();
        assert_eq!(SendCommand::<NoopDelay>::get_backlight(&sender), State::Off);

        i2c.done();
    }
}
