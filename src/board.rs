//! Board adapters for the game core: the TIMG1 watchdog, the IMU bus and the
//! panel backlight.

use esp_hal::{
    Blocking,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    i2c::master::{
        Config as I2cConfig,
        I2c,
    },
    peripherals::TIMG1,
    time::Rate,
    timer::timg::{
        MwdtStage,
        TimerGroup,
        Wdt,
    },
};

use crate::{
    BacklightResources,
    ImuResources,
    WatchdogResources,
    sensor::Icm20948,
    watchdog::Watchdog,
};

/// Bring-up failures. Each one leaves the peripheral unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum BoardError {
    Display,
    I2c,
}

/// Panel backlight, lit for as long as this value is alive.
pub struct Backlight {
    _pin: Output<'static>,
}

impl From<BacklightResources<'static>> for Backlight {
    fn from(res: BacklightResources<'static>) -> Self {
        Self {
            _pin: Output::new(res.led, Level::High, OutputConfig::default()),
        }
    }
}

/// The ICM-20948 on the badge's I2C header.
pub type Imu = Icm20948<I2c<'static, Blocking>>;

const IMU_BUS_KHZ: u32 = 400;

impl TryFrom<ImuResources<'static>> for Imu {
    type Error = BoardError;

    fn try_from(res: ImuResources<'static>) -> Result<Self, Self::Error> {
        let i2c = I2c::new(res.i2c, I2cConfig::default().with_frequency(Rate::from_khz(IMU_BUS_KHZ)))
            .map_err(|_| BoardError::I2c)?
            .with_sda(res.sda)
            .with_scl(res.scl);
        Ok(Icm20948::new(i2c))
    }
}

/// Main watchdog of timer group 1, stage 0 resets the chip.
pub struct BoardWatchdog {
    wdt: Wdt<TIMG1<'static>>,
}

impl From<WatchdogResources<'static>> for BoardWatchdog {
    fn from(res: WatchdogResources<'static>) -> Self {
        Self {
            wdt: TimerGroup::new(res.timg).wdt,
        }
    }
}

impl Watchdog for BoardWatchdog {
    fn enable(&mut self, timeout: embassy_time::Duration) {
        self.wdt.set_timeout(
            MwdtStage::Stage0,
            esp_hal::time::Duration::from_millis(timeout.as_millis()),
        );
        self.wdt.enable();
        info!("watchdog armed: {} ms", timeout.as_millis());
    }

    fn kick(&mut self) {
        self.wdt.feed();
    }

    fn request_fatal_reset(&mut self) {
        // No more feeds; stage 0 fires within one timeout.
        error!("fatal reset requested, waiting for the watchdog");
    }
}
