use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::time::Hertz;
use embassy_time::Delay;

use crate::hw::{BenchInputs, EmbassyClock, ShutdownRelay};
use crate::lcd::Lcd2004;

mod sequence_task;

/// Bus speed of the LCD backpack.
const LCD_I2C_FREQUENCY: Hertz = Hertz(100_000);

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA6,
        PA7,
        PB2,
        PB3,
        PB8,
        PB9,
        I2C1,
        ..
    } = hal::init(config);

    let relay = ShutdownRelay::new(Output::new(PB3, Level::Low, Speed::Low));

    let inputs = BenchInputs::new(
        Input::new(PA0, Pull::Up),
        Input::new(PA1, Pull::Up),
        Input::new(PA6, Pull::Up),
        Input::new(PA7, Pull::Up),
        Input::new(PB2, Pull::Up),
    );

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = LCD_I2C_FREQUENCY;
    let mut lcd = Lcd2004::new(I2c::new_blocking(I2C1, PB8, PB9, i2c_config), Delay);
    if lcd.init().is_err() {
        defmt::warn!("lcd: init failed; continuing without display");
    }

    defmt::info!("interlock tester ready");

    spawner
        .spawn(sequence_task::run(lcd, inputs, relay, EmbassyClock))
        .expect("failed to spawn sequence task");

    core::future::pending::<()>().await;
}
