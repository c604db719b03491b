use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_time::Delay;
use interlock_core::controller::SequenceController;

use crate::hw::{BenchInputs, EmbassyClock, ShutdownRelay};
use crate::lcd::Lcd2004;
use crate::telemetry::TelemetryLog;

pub type BenchLcd = Lcd2004<I2c<'static, Blocking>, Delay>;

#[embassy_executor::task]
pub async fn run(
    lcd: BenchLcd,
    inputs: BenchInputs<'static>,
    relay: ShutdownRelay<'static>,
    clock: EmbassyClock,
) -> ! {
    let mut controller = SequenceController::new(lcd, inputs, relay, clock);
    let mut log = TelemetryLog::new();

    controller.begin();
    loop {
        controller.poll().await;
        log.drain(controller.telemetry());
    }
}
