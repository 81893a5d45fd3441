//! Drive two HD44780 LCDs with a STM32F411RET6, each behind a PCF8574 adapter, on one I2C bus
//!
//! this demo use most of the driver functions intentionally, to test functions works just fine.

//! Wiring diagram
//!
//! PCF8574 adapter <-> STM32F411RET6
//!             GND <-> GND
//!             VCC <-> 5V (It is best to use an external source for the 5V pin, such as the 5V output from a DAPLink device or USB.)
//!             SCL <-> PB6
//!             SDA <-> PB7
//!
//! the first adapter keeps its default address 0x27,
//! the second one has A0 pulled low, so it answers at 0x26

#![no_std]
#![no_main]

use core::{cell::RefCell, fmt::Write};

use embedded_hal_bus::i2c::RefCellDevice;
use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal::{
    i2c::{self, I2c},
    pac,
    prelude::*,
};

use pcf8574_lcd::{
    command::{MoveDirection, State},
    lcd::{Config, Lcd},
    sender::I2cSender,
};

const FIRST_ADDR: u8 = 0x27;
const SECOND_ADDR: u8 = 0x26;

// a heart shape
const HEART: [u8; 8] = [
    0b00000, 0b00000, 0b01010, 0b11111, 0b01110, 0b00100, 0b00000, 0b00000,
];

// a diamond shape
const DIAMOND: [u8; 8] = [
    0b00000, 0b00100, 0b01110, 0b11111, 0b01110, 0b00100, 0b00000, 0b00000,
];

#[cortex_m_rt::entry]
fn main() -> ! {
    rtt_init_print!();

    let dp = pac::Peripherals::take().expect("Cannot take device peripherals");
    let cp = pac::CorePeripherals::take().expect("Cannot take core peripherals");

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(12.MHz()).freeze();

    // every LCD owns a delayer
    let first_delayer = cp.SYST.delay(&clocks);
    let second_delayer = dp.TIM5.delay_us(&clocks);

    let gpiob = dp.GPIOB.split();

    let i2c = I2c::new(
        dp.I2C1,
        (gpiob.pb6, gpiob.pb7),
        i2c::Mode::standard(100.kHz()), // The PCF8574T max I2C speed
        &clocks,
    );
    let bus = RefCell::new(i2c);

    let mut first = Lcd::new(
        I2cSender::new(RefCellDevice::new(&bus), FIRST_ADDR),
        first_delayer,
        Config::default()
            .set_cursor_state(State::On)
            .set_cursor_blink(State::On),
        10,
    )
    .expect("first LCD init failed");

    let mut second = Lcd::new(
        I2cSender::new(RefCellDevice::new(&bus), SECOND_ADDR).with_ack_retries(3),
        second_delayer,
        Config::default().set_backlight(State::Off),
        10,
    )
    .expect("second LCD init failed");

    rprintln!(
        "LCDs at {:#x} and {:#x} are ready",
        first.get_address(),
        second.get_address()
    );

    // store 2 graphs, then go back to DDRAM
    first.write_graph_to_cgram(1, &HEART).unwrap();
    first.write_graph_to_cgram(2, &DIAMOND).unwrap();
    first.clean_display().unwrap();

    first.write_str_to_cur("hello, world!").unwrap();
    first.set_cursor_pos(1, 0).unwrap();
    // 9 wraps to CGRAM slot 1
    first.write_graph_to_cur(9).unwrap();
    first.write_graph_to_cur(2).unwrap();

    second.clean_display().unwrap();
    second.set_cursor_pos(0, 2).unwrap();
    write!(second, "count: {}", 42).unwrap();

    // read back what first line holds, and copy it to the second display
    let mut buf = [0u8; 5];
    first
        .read_ddram(0x00, MoveDirection::LeftToRight, &mut buf)
        .unwrap();
    rprintln!("first line starts with {:?}", buf);
    second.set_cursor_pos(1, 0).unwrap();
    second.write_bytes_to_cur(&buf).unwrap();

    // rows beyond the 4th are rejected, nothing goes to the bus
    if let Err(e) = second.set_cursor_pos(4, 0) {
        rprintln!("{}", e);
    }

    first.wait_for_idle().unwrap();
    first.set_cursor_blink_state(State::Off).unwrap();

    second.delay_ms(1_000);
    second.set_backlight(State::On).unwrap();

    first.delay_ms(2_000);
    first.turn_off(State::Off).unwrap();

    #[allow(clippy::empty_loop)]
    loop {}
}
