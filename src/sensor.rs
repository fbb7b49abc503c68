//! Motion sensor adapter and ICM-20948 accelerometer driver.
//!
//! Only the accelerometer is used. The driver talks plain `embedded-hal` 1.0
//! I2C so it works on any bus the board hands it.

use core::fmt;

use embedded_hal::i2c::I2c;

/// Default I2C address (AD0 low).
pub const ICM20948_ADDRESS: u8 = 0x68;

const REG_BANK_SEL: u8 = 0x7F;
const BANK_0: u8 = 0x00;
const BANK_2: u8 = 0x20;

// Bank 0
const WHO_AM_I: u8 = 0x00;
const PWR_MGMT_1: u8 = 0x06;
const PWR_MGMT_2: u8 = 0x07;
const ACCEL_XOUT_H: u8 = 0x2D;

// Bank 2
const ACCEL_CONFIG: u8 = 0x14;

const ICM20948_ID: u8 = 0xEA;
/// Auto-select the best clock, out of sleep.
const CLKSEL_AUTO: u8 = 0x01;
/// ±2 g full scale, low-pass filter enabled.
const ACCEL_FS_2G_DLPF: u8 = 0x01;
const LSB_PER_G: f32 = 16384.0;

/// Instantaneous acceleration in g.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Accel {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Accel {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// What answered on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Icm20948,
    /// Some other part; carries its ID register.
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    Bus(E),
}

impl<E> From<E> for SensorError<E> {
    fn from(err: E) -> Self {
        Self::Bus(err)
    }
}

impl<E: fmt::Debug> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "motion sensor bus error: {err:?}"),
        }
    }
}

/// A tri-axis accelerometer.
pub trait MotionSensor {
    type Error;

    /// Bring the part up and report what it is.
    fn init(&mut self) -> Result<SensorKind, Self::Error>;

    fn read_accel(&mut self) -> Result<Accel, Self::Error>;
}

/// Initialise `sensor` and check it is the `expected` part.
///
/// Never fails: a mismatch or bus error is logged and the caller carries on
/// with whatever readings the sensor produces (possibly none).
pub fn bring_up<S: MotionSensor>(sensor: &mut S, expected: SensorKind) -> Option<SensorKind> {
    match sensor.init() {
        Ok(kind) if kind == expected => {
            info!("motion sensor initialised: {}", kind);
            Some(kind)
        }
        Ok(kind) => {
            error!("motion sensor mismatch: expected {}, found {}", expected, kind);
            Some(kind)
        }
        Err(_) => {
            error!("failed to initialise motion sensor");
            None
        }
    }
}

/// ICM-20948 9-axis IMU, accelerometer only.
pub struct Icm20948<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Icm20948<I2C> {
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, ICM20948_ADDRESS)
    }

    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn select_bank(&mut self, bank: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[REG_BANK_SEL, bank])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg, value])
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0_u8];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }
}

impl<I2C: I2c> MotionSensor for Icm20948<I2C> {
    type Error = SensorError<I2C::Error>;

    fn init(&mut self) -> Result<SensorKind, Self::Error> {
        self.select_bank(BANK_0)?;
        let id = self.read_reg(WHO_AM_I)?;
        if id != ICM20948_ID {
            return Ok(SensorKind::Unknown(id));
        }

        self.write_reg(PWR_MGMT_1, CLKSEL_AUTO)?;
        self.write_reg(PWR_MGMT_2, 0x00)?;

        self.select_bank(BANK_2)?;
        self.write_reg(ACCEL_CONFIG, ACCEL_FS_2G_DLPF)?;
        self.select_bank(BANK_0)?;

        Ok(SensorKind::Icm20948)
    }

    fn read_accel(&mut self) -> Result<Accel, Self::Error> {
        let mut raw = [0_u8; 6];
        self.i2c.write_read(self.address, &[ACCEL_XOUT_H], &mut raw)?;

        let axis = |hi: u8, lo: u8| f32::from(i16::from_be_bytes([hi, lo])) / LSB_PER_G;
        Ok(Accel {
            x: axis(raw[0], raw[1]),
            y: axis(raw[2], raw[3]),
            z: axis(raw[4], raw[5]),
        })
    }
}
