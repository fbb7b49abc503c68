//! Tilt Pong for the Disobey 2026 badge.
//!
//! - Tilt the badge along its long edge to move your paddle
//! - The AI paddle tracks the ball
//! - Miss the ball and the screen goes red; the watchdog restarts the badge

#![no_std]
#![no_main]

use defmt::info;
#[allow(clippy::wildcard_imports)]
use tiltpong::*;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use tiltpong::sensor::{
    self,
    SensorKind,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

type Game = Pong<Display<'static>, Imu, BoardWatchdog>;

#[embassy_executor::task]
async fn game_task(game: &'static mut Game) -> ! {
    game.run().await
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = tiltpong::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let Ok(display) = Display::try_from(resources.display) else {
        defmt::panic!("display bring-up failed");
    };
    let _backlight: Backlight = resources.backlight.into();

    let Ok(mut imu) = Imu::try_from(resources.imu) else {
        defmt::panic!("I2C bring-up failed");
    };
    // A wrong or missing part still lets the game run, with a still paddle.
    sensor::bring_up(&mut imu, SensorKind::Icm20948);

    let watchdog: BoardWatchdog = resources.watchdog.into();
    let game = mk_static!(Game, Pong::new(display, imu, watchdog, Timing::default()));

    info!("pong: spawning game task");
    spawner.must_spawn(game_task(game));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
