//! ST7789 panel in portrait: 170 wide, 320 tall, over SPI with DMA.
//!
//! The games run with the long side as the Pong table's length, so the
//! panel keeps its native orientation.

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::Spi,
    time::Rate,
};

use crate::{
    DisplayResources,
    board::BoardError,
};

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<esp_hal::spi::master::SpiDmaBus<'a, Async>, Output<'a>, esp_hal::delay::Delay>,
    Output<'a>,
>;

/// The badge's ST7789 display, ready to draw on with `embedded-graphics`.
pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ST7789, Output<'a>>;

const PANEL_WIDTH: u16 = 170;
const PANEL_HEIGHT: u16 = 320;
const BUFFER_LEN: usize = 32000;

impl<'a> TryFrom<DisplayResources<'a>> for Display<'a> {
    type Error = BoardError;

    fn try_from(res: DisplayResources<'a>) -> Result<Self, Self::Error> {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(BUFFER_LEN);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).map_err(|_| BoardError::Display)?;
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).map_err(|_| BoardError::Display)?;

        let mut delay = esp_hal::delay::Delay::new();

        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(
            res.spi,
            esp_hal::spi::master::Config::default().with_frequency(Rate::from_mhz(80)),
        )
        .map_err(|_| BoardError::Display)?
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_miso(res.miso)
        .with_dma(res.dma)
        .with_buffers(dma_rx_buf, dma_tx_buf)
        .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device = ExclusiveDevice::new(spi, cs, delay).map_err(|_| BoardError::Display)?;

        let buffer = crate::mk_static!([u8; BUFFER_LEN], [0_u8; BUFFER_LEN]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        let display = mipidsi::Builder::new(mipidsi::models::ST7789, di)
            .reset_pin(rst)
            .display_size(PANEL_WIDTH, PANEL_HEIGHT)
            .invert_colors(mipidsi::options::ColorInversion::Inverted)
            .orientation(
                mipidsi::options::Orientation::new().rotate(mipidsi::options::Rotation::Deg0),
            )
            .display_offset(35, 0)
            .init(&mut delay)
            .map_err(|_| BoardError::Display)?;

        info!("display up: {}x{}", PANEL_WIDTH, PANEL_HEIGHT);
        Ok(display)
    }
}
