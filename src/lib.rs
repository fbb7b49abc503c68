//! # tiltpong
//!
//! Tilt-controlled Pong for the Disobey 2026 badge, with a tic-tac-toe board
//! as the second game.
//!
//! The game core is portable and runs anywhere `embassy-time` has a driver:
//! - **Scheduler**: fixed-period task table run one task at a time
//! - **Pong**: shared game state, ball/paddle physics, dirty-tracked repaint
//! - **Watchdog guard**: crash-only restart after a missed ball
//! - **Tic-tac-toe**: grid rules, tilt cursor and board painting
//! - **Motion sensor**: ICM-20948 accelerometer over `embedded-hal` I2C
//!
//! Board bring-up lives behind the `hardware` feature.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = tiltpong::init();
//! let resources = tiltpong::split_resources!(peripherals);
//!
//! let display = tiltpong::Display::try_from(resources.display)?;
//! let imu = tiltpong::Imu::try_from(resources.imu)?;
//! let watchdog: tiltpong::BoardWatchdog = resources.watchdog.into();
//! let _backlight: tiltpong::Backlight = resources.backlight.into();
//!
//! let mut pong = tiltpong::Pong::new(display, imu, watchdog, tiltpong::Timing::default());
//! pong.run().await
//! ```

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod board_view;
pub mod config;
pub mod grid;
pub mod input;
pub mod physics;
pub mod pong;
pub mod render;
pub mod scheduler;
pub mod sensor;
pub mod state;
pub mod tictactoe;
pub mod watchdog;

#[cfg(test)]
mod mocks;

#[cfg(feature = "hardware")]
mod board;
#[cfg(feature = "hardware")]
mod buttons;
#[cfg(feature = "hardware")]
mod display;

pub use config::Timing;
pub use grid::{
    GridState,
    Move,
    Outcome,
    Player,
};
pub use input::{
    PressSource,
    TiltSampler,
};
pub use pong::Pong;
pub use scheduler::{
    ScheduleError,
    Scheduler,
    TaskControl,
};
pub use sensor::{
    Accel,
    Icm20948,
    MotionSensor,
};
pub use state::{
    GameState,
    Playfield,
};
pub use tictactoe::TicTacToe;
pub use watchdog::Watchdog;

#[cfg(feature = "hardware")]
pub use board::{
    Backlight,
    BoardError,
    BoardWatchdog,
    Imu,
};
#[cfg(feature = "hardware")]
pub use buttons::PlayButton;
#[cfg(feature = "hardware")]
pub use display::Display;
#[cfg(feature = "hardware")]
use esp_hal::{
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    rom,
};

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "hardware")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

// ── Pin / peripheral assignments ────────────────────────────────────────────

#[cfg(feature = "hardware")]
assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        button: ButtonResources<'d> {
            a: GPIO13,
        },
        imu: ImuResources<'d> {
            sda: GPIO9,
            scl: GPIO10,
            i2c: I2C0,
        },
        watchdog: WatchdogResources<'d> {
            timg: TIMG1,
        }
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Minimal CPU clock switcher for ESP32-S3.
///
/// Steps through an intermediate frequency before reaching the target,
/// which is required by the hardware.
#[cfg(feature = "hardware")]
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                _ => 2,
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Initialise the badge hardware and return the raw peripheral set.
///
/// Call this once at the top of `main`, then use [`split_resources!`] to
/// break the peripherals into typed resource groups.
#[cfg(feature = "hardware")]
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

#[cfg(feature = "hardware")]
impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
    fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
        split_resources!(peripherals)
    }
}
