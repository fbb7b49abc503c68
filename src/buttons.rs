//! The A button, used to place a mark and to start a new round.

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    input::PressSource,
};

const DEBOUNCE_MS: u64 = 20;

/// Active-low push button with async debouncing.
///
/// Debouncing looks at the pin level, not only at edges, so a wait that is
/// dropped halfway picks up where it left off on the next call.
pub struct PlayButton {
    pin: Input<'static>,
    /// A press has been reported and the release not yet seen.
    held: bool,
}

impl From<ButtonResources<'static>> for PlayButton {
    fn from(res: ButtonResources<'static>) -> Self {
        Self {
            pin: Input::new(res.a, InputConfig::default().with_pull(Pull::Up)),
            held: false,
        }
    }
}

impl PlayButton {
    /// Wait until the button is down and stays down for the debounce time.
    pub async fn debounce_press(&mut self) {
        loop {
            if self.pin.is_high() {
                self.pin.wait_for_falling_edge().await;
            }
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if self.pin.is_low() {
                return;
            }
        }
    }

    /// Wait until the button is up and stays up for the debounce time.
    pub async fn debounce_release(&mut self) {
        loop {
            if self.pin.is_low() {
                self.pin.wait_for_rising_edge().await;
            }
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if self.pin.is_high() {
                return;
            }
        }
    }
}

impl PressSource for PlayButton {
    /// Resolves on the press itself. Holding the button plays once: the
    /// release is awaited before the next press can be reported.
    async fn wait_for_press(&mut self) {
        if self.held {
            self.debounce_release().await;
            self.held = false;
        }
        self.debounce_press().await;
        self.held = true;
    }
}
