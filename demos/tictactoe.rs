//! Tic-tac-toe against a very polite AI.
//!
//! - Tilt the badge to move the cursor, one cell per tilt
//! - Press A to place your mark; the AI answers straight away
//! - Press A after a round ends to start a new one

#![no_std]
#![no_main]

use defmt::info;
#[allow(clippy::wildcard_imports)]
use tiltpong::*;
use embassy_executor::Spawner;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
};
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use tiltpong::{
    config::{
        INPUT_QUEUE_DEPTH,
        TILT_SAMPLE_MS,
    },
    input,
    sensor::{
        self,
        SensorKind,
    },
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

/// Tilt sampler to board: one producer, one consumer.
static MOVES: Channel<CriticalSectionRawMutex, Move, INPUT_QUEUE_DEPTH> = Channel::new();

#[embassy_executor::task]
async fn tilt_task(imu: &'static mut Imu) -> ! {
    input::sample_tilt(imu, MOVES.sender(), Duration::from_millis(TILT_SAMPLE_MS)).await
}

#[embassy_executor::task]
async fn board_task(game: &'static mut TicTacToe<Display<'static>>, button: &'static mut PlayButton) -> ! {
    game.run(button, MOVES.receiver()).await
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

    let Ok(imu) = Imu::try_from(resources.imu) else {
        defmt::panic!("I2C bring-up failed");
    };
    let imu = mk_static!(Imu, imu);
    sensor::bring_up(imu, SensorKind::Icm20948);

    let button = mk_static!(PlayButton, resources.button.into());
    let game = mk_static!(TicTacToe<Display<'static>>, TicTacToe::new(display));

    info!("tictactoe: spawning tilt and board tasks");
    spawner.must_spawn(tilt_task(imu));
    spawner.must_spawn(board_task(game, button));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
