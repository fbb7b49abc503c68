//! Test doubles for the hardware adapters.

use std::{
    collections::VecDeque,
    vec,
    vec::Vec,
};

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Receiver,
};
use embassy_time::Duration;
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};
use embedded_hal::i2c::{
    ErrorKind,
    ErrorType,
    I2c,
    Operation,
};

use crate::{
    input::PressSource,
    sensor::{
        Accel,
        MotionSensor,
        SensorKind,
    },
    watchdog::Watchdog,
};

/// Framebuffer display that also records full-screen clears.
pub struct RecordingDisplay {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
    clears: Vec<Rgb565>,
    pub fail: bool,
}

impl RecordingDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; (width * height) as usize],
            clears: Vec::new(),
            fail: false,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn clears(&self) -> &[Rgb565] {
        &self.clears
    }

    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFault;

impl DrawTarget for RecordingDisplay {
    type Color = Rgb565;
    type Error = DisplayFault;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        if self.fail {
            return Err(DisplayFault);
        }
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < self.width && y < self.height {
                self.pixels[(y * self.width + x) as usize] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if self.fail {
            return Err(DisplayFault);
        }
        self.clears.push(color);
        self.pixels.fill(color);
        Ok(())
    }
}

impl OriginDimensions for RecordingDisplay {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Sensor that replays a script, then repeats its last reading.
pub struct ScriptedSensor {
    pub kind: SensorKind,
    readings: VecDeque<Accel>,
    last: Accel,
    pub reads: usize,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = Accel>) -> Self {
        Self {
            kind: SensorKind::Icm20948,
            readings: readings.into_iter().collect(),
            last: Accel::default(),
            reads: 0,
        }
    }

    pub fn level() -> Self {
        Self::new([])
    }
}

impl MotionSensor for ScriptedSensor {
    type Error = ErrorKind;

    fn init(&mut self) -> Result<SensorKind, Self::Error> {
        Ok(self.kind)
    }

    fn read_accel(&mut self) -> Result<Accel, Self::Error> {
        self.reads += 1;
        if let Some(next) = self.readings.pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

/// Button whose presses are queued by the test.
pub struct QueuedPresses<'a> {
    presses: Receiver<'a, CriticalSectionRawMutex, (), 4>,
    pub reported: usize,
}

impl<'a> QueuedPresses<'a> {
    pub fn new(presses: Receiver<'a, CriticalSectionRawMutex, (), 4>) -> Self {
        Self {
            presses,
            reported: 0,
        }
    }
}

impl PressSource for QueuedPresses<'_> {
    async fn wait_for_press(&mut self) {
        self.presses.receive().await;
        self.reported += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingWatchdog {
    pub timeout: Option<Duration>,
    pub kicks: usize,
    pub fatal_reset: bool,
}

impl Watchdog for RecordingWatchdog {
    fn enable(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    fn kick(&mut self) {
        self.kicks += 1;
    }

    fn request_fatal_reset(&mut self) {
        self.fatal_reset = true;
    }
}

/// Register-file I2C device: single-byte writes set the register pointer,
/// longer writes store bytes from the pointer on, reads auto-increment.
pub struct FakeI2c {
    registers: [u8; 256],
    writes: Vec<Vec<u8>>,
    failing: bool,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            writes: Vec::new(),
            failing: false,
        }
    }

    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.registers[usize::from(reg)] = value;
    }

    pub fn set_block(&mut self, start: u8, values: &[u8]) {
        for (offset, value) in values.iter().enumerate() {
            self.registers[usize::from(start) + offset] = *value;
        }
    }

    pub fn fail_all(&mut self) {
        self.failing = true;
    }

    pub fn wrote(&self, bytes: &[u8]) -> bool {
        self.writes.iter().any(|w| w.as_slice() == bytes)
    }

    pub fn last_write(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.failing {
            return Err(ErrorKind::Bus);
        }
        let mut pointer = 0_usize;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push(bytes.to_vec());
                    if let Some((&reg, data)) = bytes.split_first() {
                        pointer = usize::from(reg);
                        for (offset, value) in data.iter().enumerate() {
                            self.registers[(pointer + offset) % 256] = *value;
                        }
                    }
                }
                Operation::Read(buf) => {
                    for (offset, slot) in buf.iter_mut().enumerate() {
                        *slot = self.registers[(pointer + offset) % 256];
                    }
                }
            }
        }
        Ok(())
    }
}
