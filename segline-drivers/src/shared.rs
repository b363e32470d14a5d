//! Shared access to the display router
//!
//! Several tasks (or a task and an interrupt handler) may update displays.
//! Each call holds the lock for the whole bus transaction, so writes from
//! different callers never interleave on the wire.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use segline_core::{DisplayId, SegmentFrame};
use segline_hal::I2cMaster;

use crate::error::Error;
use crate::router::DisplayRouter;

/// A [`DisplayRouter`] behind a blocking mutex
///
/// Use `CriticalSectionRawMutex` when callers run in interrupt context,
/// `NoopRawMutex` when everything runs in one executor.
pub struct SharedDisplays<R: RawMutex, B, D> {
    inner: Mutex<R, RefCell<DisplayRouter<B, D>>>,
}

impl<R, B, D> SharedDisplays<R, B, D>
where
    R: RawMutex,
    B: I2cMaster,
    D: DelayNs,
{
    /// Wrap a router for shared use
    pub const fn new(router: DisplayRouter<B, D>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(router)),
        }
    }

    /// [`DisplayRouter::initialize`] under the lock
    pub fn initialize(&self, peripheral_clock_hz: u32) -> Result<(), Error> {
        self.with(|router| router.initialize(peripheral_clock_hz))
    }

    /// [`DisplayRouter::write`] under the lock
    pub fn write(&self, display: DisplayId, text: &str) -> Result<(), Error> {
        self.with(|router| router.write(display, text))
    }

    /// [`DisplayRouter::write_raw`] under the lock
    pub fn write_raw(&self, display: u8, text: &str) -> Result<(), Error> {
        self.with(|router| router.write_raw(display, text))
    }

    /// [`DisplayRouter::write_frame`] under the lock
    pub fn write_frame(&self, display: DisplayId, frame: &SegmentFrame) -> Result<(), Error> {
        self.with(|router| router.write_frame(display, frame))
    }

    /// Run `f` with exclusive access to the router
    ///
    /// Must not be re-entered from inside `f`.
    pub fn with<U>(&self, f: impl FnOnce(&mut DisplayRouter<B, D>) -> U) -> U {
        self.inner.lock(|router| f(&mut router.borrow_mut()))
    }

    /// Unwrap the router
    pub fn into_inner(self) -> DisplayRouter<B, D> {
        self.inner.into_inner().into_inner()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
    use segline_core::{encode, DeviceFamily, DriverConfig};
    use segline_hal_sim::{BusEvent, SimBus, SimDelay};

    fn router() -> DisplayRouter<SimBus, SimDelay> {
        DisplayRouter::new(SimBus::new(), SimDelay::new(), DriverConfig::default())
    }

    #[test]
    fn test_shared_write() {
        let displays: SharedDisplays<NoopRawMutex, _, _> = SharedDisplays::new(router());
        displays.write(DisplayId::S2, "12").unwrap();
        assert_eq!(displays.write_raw(9, "12"), Err(Error::InvalidArgument));

        let ram = displays.with(|r| *r.transactor().bus().small().ram(1).unwrap());
        assert_eq!(&ram[..], encode("12", DeviceFamily::Small).as_bytes());
    }

    #[test]
    fn test_into_inner_keeps_state() {
        let displays: SharedDisplays<NoopRawMutex, _, _> = SharedDisplays::new(router());
        displays.initialize(48_000_000).unwrap();

        let (bus, delay) = displays.into_inner().release();
        assert!(bus.is_enabled());
        assert_eq!(delay.elapsed_ms(), 966);
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let displays: SharedDisplays<CriticalSectionRawMutex, _, _> =
            SharedDisplays::new(router());

        std::thread::scope(|s| {
            for display in DisplayId::ALL {
                let displays = &displays;
                s.spawn(move || {
                    for n in 0..10u32 {
                        displays.write(display, &std::format!("{n}")).unwrap();
                    }
                });
            }
        });

        let bus = displays.into_inner().release().0;
        assert_eq!(bus.dropped_events(), 0);
        assert_eq!(bus.count(BusEvent::Start), 50);

        // Every start is closed by a stop before the next one begins
        let mut open = false;
        for event in bus.events() {
            match event {
                BusEvent::Start => {
                    assert!(!open);
                    open = true;
                }
                BusEvent::Stop => open = false,
                _ => {}
            }
        }
        assert!(!open);

        for device in 0..3 {
            assert_eq!(
                bus.small().ram(device).map(|r| &r[..]),
                Some(encode("9", DeviceFamily::Small).as_bytes())
            );
        }
    }
}
