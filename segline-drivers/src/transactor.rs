//! Master-write transaction over a phase-level I2C bus
//!
//! One call to [`BusTransactor::write`] walks the bus through:
//!
//! ```text
//! Idle ──busy──▶ Recovering ──(stop, delay, re-check)──┐
//!   │                 ▲                                 │
//!   │ idle            └─────────────busy────────────────┤
//!   ▼                                                   │ idle
//! Starting ◀────────────────────────────────────────────┘
//!   ▼
//! StartIssued
//!   ▼
//! Address ──▶ Data(0) ──▶ … ──▶ Data(n-1) ──▶ Stopping ──▶ Done
//! ```
//!
//! Any phase can abort. Once a start condition has been issued, an abort
//! releases the bus with a stop before the error is returned. A rejected
//! start or lost arbitration leaves the bus to its other master.

use embedded_hal::delay::DelayNs;
use segline_core::PollMode;
use segline_hal::{BusAddress, BusFault, I2cMaster};

use crate::error::{Error, WaitPoint};

/// Position of a transaction in the write sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Nothing done yet
    Idle,
    /// Forcing stops until the bus reports idle; holds attempts made so far
    Recovering(u32),
    /// Issuing the start condition
    Starting,
    /// Start condition on the wire, waiting for it to complete
    StartIssued,
    /// Sending the slave address
    Address,
    /// Sending the data byte at this index
    Data(usize),
    /// Issuing the stop condition
    Stopping,
    /// Transaction acknowledged end to end
    Done,
}

impl Phase {
    /// True once we own the bus and must release it on abort
    fn holds_bus(self) -> bool {
        matches!(self, Phase::StartIssued | Phase::Address | Phase::Data(_))
    }
}

/// Transaction timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransactorConfig {
    /// Status polling behavior
    pub poll: PollMode,
    /// Pause after each forced stop while recovering
    pub recovery_delay_ms: u32,
}

impl Default for TransactorConfig {
    fn default() -> Self {
        Self {
            poll: PollMode::Blocking,
            recovery_delay_ms: 2,
        }
    }
}

/// Runs addressed write transactions on an exclusively owned bus
pub struct BusTransactor<B, D> {
    bus: B,
    delay: D,
    config: TransactorConfig,
}

impl<B, D> BusTransactor<B, D>
where
    B: I2cMaster,
    D: DelayNs,
{
    /// Create a transactor
    pub fn new(bus: B, delay: D, config: TransactorConfig) -> Self {
        Self { bus, delay, config }
    }

    /// Write `bytes` to the slave at `address`
    ///
    /// Blocks until the stop condition completes (or, in bounded mode,
    /// until a wait gives up).
    pub fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), Error> {
        let mut phase = Phase::Idle;
        loop {
            match self.step(phase, address, bytes) {
                Ok(Phase::Done) => return Ok(()),
                Ok(next) => phase = next,
                Err(e) => {
                    if phase.holds_bus() && !matches!(e, Error::BusStartFailure(_)) {
                        self.bus.stop();
                    }
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "i2c write to {=u8:#x} aborted in {}: {}",
                        address.get(),
                        phase,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    fn step(&mut self, phase: Phase, address: BusAddress, bytes: &[u8]) -> Result<Phase, Error> {
        match phase {
            Phase::Idle => Ok(if self.bus.is_idle() {
                Phase::Starting
            } else {
                Phase::Recovering(0)
            }),

            Phase::Recovering(attempts) => {
                if self.config.poll.limit().is_some_and(|limit| attempts >= limit) {
                    return Err(Error::Timeout(WaitPoint::BusIdle));
                }
                #[cfg(feature = "defmt")]
                defmt::debug!("i2c bus busy, forcing stop (attempt {=u32})", attempts.saturating_add(1));
                // A wedged controller usually lets go of SDA after a stop
                self.bus.stop();
                self.delay.delay_ms(self.config.recovery_delay_ms);
                Ok(if self.bus.is_idle() {
                    Phase::Starting
                } else {
                    Phase::Recovering(attempts.saturating_add(1))
                })
            }

            Phase::Starting => {
                self.bus.start().map_err(Error::BusStartFailure)?;
                Ok(Phase::StartIssued)
            }

            Phase::StartIssued => {
                self.wait(WaitPoint::StartComplete, |bus| {
                    bus.is_start_complete() || bus.has_arbitration_loss()
                })?;
                if self.bus.has_arbitration_loss() {
                    self.bus.clear_arbitration_loss();
                    return Err(Error::BusStartFailure(BusFault::ArbitrationLost));
                }
                Ok(Phase::Address)
            }

            Phase::Address => {
                // Write-only devices: R/W bit always clear
                let acked = self
                    .send(address.write_byte())
                    .map_err(|e| e.map_send(Error::AddressSendFailure))?;
                if !acked {
                    return Err(Error::AddressNackFailure);
                }
                Ok(Phase::Data(0))
            }

            Phase::Data(index) => {
                let Some(&byte) = bytes.get(index) else {
                    return Ok(Phase::Stopping);
                };
                let acked = self
                    .send(byte)
                    .map_err(|e| e.map_send(|fault| Error::DataSendFailure { index, fault }))?;
                if !acked {
                    return Err(Error::DataNackFailure(index));
                }
                Ok(Phase::Data(index + 1))
            }

            Phase::Stopping => {
                self.bus.stop();
                self.wait(WaitPoint::StopComplete, |bus| bus.is_stop_complete())?;
                Ok(Phase::Done)
            }

            Phase::Done => Ok(Phase::Done),
        }
    }

    /// Clock one byte out and report whether it was acknowledged
    fn send(&mut self, byte: u8) -> Result<bool, SendError> {
        self.wait(WaitPoint::TransmitterReady, |bus| bus.is_transmitter_ready())
            .map_err(SendError::Wait)?;
        self.bus.send_byte(byte).map_err(SendError::Fault)?;
        self.wait(WaitPoint::TransmissionComplete, |bus| {
            bus.is_transmission_complete()
        })
        .map_err(SendError::Wait)?;
        Ok(self.bus.is_acknowledged())
    }

    /// Poll `ready` until it holds or the poll limit is reached
    fn wait(&mut self, point: WaitPoint, mut ready: impl FnMut(&mut B) -> bool) -> Result<(), Error> {
        let limit = self.config.poll.limit();
        let mut polls: u32 = 0;
        while !ready(&mut self.bus) {
            if limit.is_some_and(|limit| polls >= limit) {
                return Err(Error::Timeout(point));
            }
            polls = polls.saturating_add(1);
        }
        Ok(())
    }

    /// Transaction configuration
    pub fn config(&self) -> &TransactorConfig {
        &self.config
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Borrow the delay provider
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Mutably borrow the delay provider
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }
}

enum SendError {
    Wait(Error),
    Fault(BusFault),
}

impl SendError {
    fn map_send(self, on_fault: impl FnOnce(BusFault) -> Error) -> Error {
        match self {
            SendError::Wait(e) => e,
            SendError::Fault(fault) => on_fault(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segline_hal_sim::{BusEvent, Signal, SimBus, SimDelay};

    const SMALL: BusAddress = BusAddress::new(0x38);

    fn transactor(poll: PollMode) -> BusTransactor<SimBus, SimDelay> {
        BusTransactor::new(
            SimBus::new(),
            SimDelay::new(),
            TransactorConfig {
                poll,
                recovery_delay_ms: 2,
            },
        )
    }

    #[test]
    fn test_successful_write() {
        let mut t = transactor(PollMode::Blocking);
        t.write(SMALL, &[0x80, 0x60, 1, 2, 3, 4, 5]).unwrap();

        let bus = t.bus();
        assert_eq!(
            bus.events(),
            &[
                BusEvent::Start,
                BusEvent::Byte(0x70),
                BusEvent::Byte(0x80),
                BusEvent::Byte(0x60),
                BusEvent::Byte(1),
                BusEvent::Byte(2),
                BusEvent::Byte(3),
                BusEvent::Byte(4),
                BusEvent::Byte(5),
                BusEvent::Stop,
            ]
        );
        assert_eq!(bus.small().ram(0), Some(&[1, 2, 3, 4, 5]));
        assert!(!bus.is_owned());
        assert_eq!(t.delay().calls(), 0);
    }

    #[test]
    fn test_empty_write_is_address_only() {
        let mut t = transactor(PollMode::Blocking);
        t.write(SMALL, &[]).unwrap();
        assert_eq!(
            t.bus().events(),
            &[BusEvent::Start, BusEvent::Byte(0x70), BusEvent::Stop]
        );
    }

    #[test]
    fn test_address_nack_never_sends_data() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().remove_device(SMALL);

        assert_eq!(t.write(SMALL, &[0x80, 0x60, 1]), Err(Error::AddressNackFailure));

        let bus = t.bus();
        assert!(bus.bytes_sent().eq([0x70]));
        // The bus is released even though the slave never answered
        assert_eq!(bus.count(BusEvent::Stop), 1);
        assert!(!bus.is_owned());
    }

    #[test]
    fn test_data_nack_reports_index() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().nack_data_at(Some(2));

        assert_eq!(t.write(SMALL, &[0x80, 0x60, 1, 2]), Err(Error::DataNackFailure(2)));

        let bus = t.bus();
        assert_eq!(bus.bytes_sent().count(), 4); // address + 3 data bytes
        assert_eq!(bus.count(BusEvent::Stop), 1);
    }

    #[test]
    fn test_start_failure_sends_no_stop() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().fail_start(Some(BusFault::Collision));

        assert_eq!(
            t.write(SMALL, &[1]),
            Err(Error::BusStartFailure(BusFault::Collision))
        );
        assert!(t.bus().events().is_empty());
    }

    #[test]
    fn test_arbitration_loss_is_start_failure() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().lose_arbitration(true);

        assert_eq!(
            t.write(SMALL, &[1]),
            Err(Error::BusStartFailure(BusFault::ArbitrationLost))
        );
        assert_eq!(t.bus().count(BusEvent::Stop), 0);
        assert_eq!(t.bus().bytes_sent().count(), 0);
        // flag cleared for the next attempt
        assert!(!t.bus_mut().has_arbitration_loss());
    }

    #[test]
    fn test_address_collision() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().collide_at(Some(0));
        assert_eq!(
            t.write(SMALL, &[1]),
            Err(Error::AddressSendFailure(BusFault::Collision))
        );
        assert_eq!(t.bus().count(BusEvent::Stop), 1);
    }

    #[test]
    fn test_data_collision() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().collide_at(Some(2));
        assert_eq!(
            t.write(SMALL, &[1, 2, 3]),
            Err(Error::DataSendFailure {
                index: 1,
                fault: BusFault::Collision
            })
        );
    }

    #[test]
    fn test_busy_bus_is_recovered() {
        let mut t = transactor(PollMode::Blocking);
        t.bus_mut().wedge(3);

        t.write(SMALL, &[0x80, 0x60, 0, 0, 0, 0, 0]).unwrap();

        let bus = t.bus();
        // three forced stops, then the normal stop
        assert_eq!(bus.count(BusEvent::Stop), 4);
        assert_eq!(bus.events()[..3], [BusEvent::Stop; 3]);
        assert_eq!(bus.events()[3], BusEvent::Start);
        assert_eq!(t.delay().elapsed_ms(), 6);
        assert_eq!(t.delay().calls(), 3);
    }

    #[test]
    fn test_persistent_busy_times_out_when_bounded() {
        let mut t = transactor(PollMode::Bounded { max_polls: 5 });
        t.bus_mut().wedge_forever();

        assert_eq!(t.write(SMALL, &[1]), Err(Error::Timeout(WaitPoint::BusIdle)));

        let bus = t.bus();
        assert_eq!(bus.count(BusEvent::Stop), 5);
        assert_eq!(bus.count(BusEvent::Start), 0);
        assert_eq!(t.delay().elapsed_ms(), 10);
    }

    #[test]
    fn test_bounded_recovery_within_limit_succeeds() {
        let mut t = transactor(PollMode::Bounded { max_polls: 5 });
        t.bus_mut().wedge(5);
        assert_eq!(t.write(SMALL, &[]), Ok(()));
    }

    #[test]
    fn test_stalled_transmitter_times_out() {
        let mut t = transactor(PollMode::Bounded { max_polls: 10 });
        t.bus_mut().stall(Some(Signal::TransmitterReady));

        assert_eq!(
            t.write(SMALL, &[1]),
            Err(Error::Timeout(WaitPoint::TransmitterReady))
        );
        assert_eq!(t.bus().count(BusEvent::Stop), 1);
        assert!(!t.bus().is_owned());
    }

    #[test]
    fn test_stalled_start_releases_bus() {
        let mut t = transactor(PollMode::Bounded { max_polls: 10 });
        t.bus_mut().stall(Some(Signal::StartComplete));

        assert_eq!(
            t.write(SMALL, &[1]),
            Err(Error::Timeout(WaitPoint::StartComplete))
        );
        let bus = t.bus();
        assert_eq!(bus.events(), &[BusEvent::Start, BusEvent::Stop]);
        assert!(!bus.is_owned());
    }

    #[test]
    fn test_stalled_transmission_times_out() {
        let mut t = transactor(PollMode::Bounded { max_polls: 10 });
        t.bus_mut().stall(Some(Signal::TransmissionComplete));

        assert_eq!(
            t.write(SMALL, &[1, 2]),
            Err(Error::Timeout(WaitPoint::TransmissionComplete))
        );
        let bus = t.bus();
        // aborted while the address byte was clocking out
        assert!(bus.bytes_sent().eq([0x70]));
        assert_eq!(bus.count(BusEvent::Stop), 1);
        assert!(!bus.is_owned());
    }

    #[test]
    fn test_stalled_stop_times_out() {
        let mut t = transactor(PollMode::Bounded { max_polls: 10 });
        t.bus_mut().stall(Some(Signal::StopComplete));

        assert_eq!(t.write(SMALL, &[1]), Err(Error::Timeout(WaitPoint::StopComplete)));
        // data made it to the controller before the stop hung
        assert_eq!(t.bus().count(BusEvent::Stop), 1);
    }

    #[test]
    fn test_release() {
        let t = transactor(PollMode::Blocking);
        let (bus, delay) = t.release();
        assert!(bus.events().is_empty());
        assert_eq!(delay.calls(), 0);
    }
}
