//! Logical display routing
//!
//! [`DisplayRouter`] is the public face of the driver: it owns the bus,
//! runs the power-on sequence, and turns `write(display, text)` into an
//! encoded frame, a controller-specific message and one bus transaction.

use embedded_hal::delay::DelayNs;
use segline_core::{encode, DeviceFamily, DisplayId, DriverConfig, Route, SegmentFrame};
use segline_hal::I2cMaster;

use crate::controller::{pcf85134, pcf85176, Message, MODE_SET_SEQUENCE};
use crate::error::Error;
use crate::transactor::{BusTransactor, TransactorConfig};

impl From<&DriverConfig> for TransactorConfig {
    fn from(config: &DriverConfig) -> Self {
        Self {
            poll: config.poll,
            recovery_delay_ms: config.recovery_delay_ms,
        }
    }
}

/// Segment LCD driver for the five displays on the board
pub struct DisplayRouter<B, D> {
    transactor: BusTransactor<B, D>,
    config: DriverConfig,
}

impl<B, D> DisplayRouter<B, D>
where
    B: I2cMaster,
    D: DelayNs,
{
    /// Create a driver; call [`initialize`](Self::initialize) before writing
    pub fn new(bus: B, delay: D, config: DriverConfig) -> Self {
        Self {
            transactor: BusTransactor::new(bus, delay, TransactorConfig::from(&config)),
            config,
        }
    }

    /// Bring up the bus and controllers, then run the segment self-test
    ///
    /// The controllers power up in 1:4 multiplex with the display
    /// disabled. This switches every controller to static drive with the
    /// display enabled, lights all segments for a moment, then blanks them.
    ///
    /// Mode-set failures are returned immediately. The self-test visits
    /// every display even if some fail and returns the first failure.
    pub fn initialize(&mut self, peripheral_clock_hz: u32) -> Result<(), Error> {
        // Controllers need >1 ms after power-on before talking I2C
        self.transactor
            .delay_mut()
            .delay_ms(self.config.power_on_delay_ms);

        let bus = self.transactor.bus_mut();
        bus.configure(peripheral_clock_hz);
        let _actual_hz = bus.set_frequency(self.config.i2c.frequency);
        #[cfg(feature = "defmt")]
        defmt::info!(
            "i2c bus at {=u32} Hz (requested {=u32} Hz)",
            _actual_hz,
            self.config.i2c.frequency
        );
        bus.enable(true);
        self.transactor
            .delay_mut()
            .delay_ms(self.config.enable_delay_ms);

        for family in [DeviceFamily::Small, DeviceFamily::Large] {
            self.transactor
                .write(family.bus_address(), &MODE_SET_SEQUENCE)?;
            self.transactor
                .delay_mut()
                .delay_ms(self.config.mode_set_delay_ms);
        }

        self.self_test()
    }

    fn self_test(&mut self) -> Result<(), Error> {
        let mut first_error = None;
        let steps = [
            (0xFF, self.config.self_test_on_ms),
            (0x00, self.config.self_test_off_ms),
        ];

        for (fill, hold_ms) in steps {
            for display in DisplayId::ALL {
                let frame = SegmentFrame::filled(display.family(), fill);
                if let Err(e) = self.write_frame(display, &frame) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("self-test write to {} failed: {}", display, e);
                    first_error.get_or_insert(e);
                }
            }
            self.transactor.delay_mut().delay_ms(hold_ms);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Show `text` on a display
    ///
    /// Text is right-aligned. Digits, space, `-` and the letters the
    /// glyph table supports are drawn; `.` and `,` light the punctuation
    /// segments; anything else is skipped.
    pub fn write(&mut self, display: DisplayId, text: &str) -> Result<(), Error> {
        let frame = encode(text, display.family());
        self.write_frame(display, &frame)
    }

    /// [`write`](Self::write) addressed by board number (1 = L1 ... 5 = S3)
    pub fn write_raw(&mut self, display: u8, text: &str) -> Result<(), Error> {
        let display = DisplayId::try_from(display).map_err(|_| Error::InvalidArgument)?;
        self.write(display, text)
    }

    /// Send a pre-built segment frame to a display
    pub fn write_frame(&mut self, display: DisplayId, frame: &SegmentFrame) -> Result<(), Error> {
        let message = Self::frame_for(display.route(), frame)?;
        self.transactor.write(message.address, &message.bytes)
    }

    fn frame_for(route: Route, frame: &SegmentFrame) -> Result<Message, Error> {
        match route {
            Route::Small { device } => pcf85176::frame(device, frame),
            Route::Large { line } => pcf85134::frame(line, frame),
        }
    }

    /// Driver configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Borrow the underlying transactor
    pub fn transactor(&self) -> &BusTransactor<B, D> {
        &self.transactor
    }

    /// Mutably borrow the underlying transactor
    pub fn transactor_mut(&mut self) -> &mut BusTransactor<B, D> {
        &mut self.transactor
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (B, D) {
        self.transactor.release()
    }
}
