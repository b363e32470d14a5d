//! Simulated I2C master
//!
//! Every primitive the driver calls is recorded as a [`BusEvent`]. Bytes
//! of a completed write (terminated by a stop) are routed to the modeled
//! controller behind the addressed slave, so tests can check both the wire
//! sequence and the resulting segment RAM.

use heapless::Vec;
use segline_hal::{BusAddress, BusFault, I2cMaster};

use crate::controller::{Pcf85134, Pcf85176};

/// Maximum recorded events; later events are counted but dropped
pub const EVENT_CAPACITY: usize = 1024;

/// Longest write transaction the simulator buffers
const MAX_TRANSACTION: usize = 32;

/// PCF85176 slave address
const SMALL_ADDRESS: BusAddress = BusAddress::new(0x38);

/// PCF85134 slave address
const LARGE_ADDRESS: BusAddress = BusAddress::new(0x39);

/// One bus primitive as seen by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Peripheral configured for this source clock
    Configure(u32),
    /// SCL frequency requested
    SetFrequency(u32),
    /// Peripheral enabled or disabled
    Enable(bool),
    /// Start condition issued
    Start,
    /// Stop condition issued
    Stop,
    /// Byte loaded into the transmitter
    Byte(u8),
}

/// Status signals that can be held de-asserted to simulate a hang
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Start condition generated
    StartComplete,
    /// Transmit buffer empty
    TransmitterReady,
    /// Byte and ACK clocked out
    TransmissionComplete,
    /// Stop condition generated
    StopComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Busy {
    Clear,
    Polls(u32),
    Forever,
}

#[derive(Debug, Clone, Default)]
struct Transaction {
    address: Option<u8>,
    address_acked: bool,
    data: Vec<u8, MAX_TRANSACTION>,
    nacked: bool,
}

/// Simulated I2C master with two controller families attached
#[derive(Debug, Clone)]
pub struct SimBus {
    events: Vec<BusEvent, EVENT_CAPACITY>,
    dropped: usize,
    enabled: bool,
    frequency: u32,
    owned: bool,
    busy: Busy,
    idle_polls: u32,
    transaction: Option<Transaction>,
    last_ack: bool,
    arbitration_lost: bool,
    // fault injection
    absent: Vec<u8, 8>,
    nack_data_at: Option<usize>,
    collide_at: Option<usize>,
    start_fault: Option<BusFault>,
    lose_arbitration: bool,
    stalled: Option<Signal>,
    // attached devices
    small: Pcf85176,
    large: Pcf85134,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Idle bus with both controller families present
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            dropped: 0,
            enabled: false,
            frequency: 0,
            owned: false,
            busy: Busy::Clear,
            idle_polls: 0,
            transaction: None,
            last_ack: false,
            arbitration_lost: false,
            absent: Vec::new(),
            nack_data_at: None,
            collide_at: None,
            start_fault: None,
            lose_arbitration: false,
            stalled: None,
            small: Pcf85176::default(),
            large: Pcf85134::default(),
        }
    }

    /// Report the bus busy for the next `polls` idle checks
    pub fn wedge(&mut self, polls: u32) {
        self.busy = if polls == 0 { Busy::Clear } else { Busy::Polls(polls) };
    }

    /// Report the bus busy on every idle check
    pub fn wedge_forever(&mut self) {
        self.busy = Busy::Forever;
    }

    /// Stop acknowledging `address`
    pub fn remove_device(&mut self, address: BusAddress) {
        if !self.absent.contains(&address.get()) {
            let _ = self.absent.push(address.get());
        }
    }

    /// NACK the data byte at `index` (0 = first byte after the address)
    pub fn nack_data_at(&mut self, index: Option<usize>) {
        self.nack_data_at = index;
    }

    /// Fail `send_byte` with a collision at transaction byte `index`
    /// (0 = the address byte)
    pub fn collide_at(&mut self, index: Option<usize>) {
        self.collide_at = index;
    }

    /// Make `start` fail with `fault`
    pub fn fail_start(&mut self, fault: Option<BusFault>) {
        self.start_fault = fault;
    }

    /// Raise the arbitration loss flag after each start
    pub fn lose_arbitration(&mut self, lose: bool) {
        self.lose_arbitration = lose;
    }

    /// Hold a status signal de-asserted forever
    pub fn stall(&mut self, signal: Option<Signal>) {
        self.stalled = signal;
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Events that did not fit in the transcript
    pub fn dropped_events(&self) -> usize {
        self.dropped
    }

    /// Forget the recorded transcript
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Number of recorded events equal to `event`
    pub fn count(&self, event: BusEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    /// Bytes loaded into the transmitter, in order
    pub fn bytes_sent(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|e| match e {
            BusEvent::Byte(b) => Some(*b),
            _ => None,
        })
    }

    /// Number of `is_idle` polls made so far
    pub fn idle_polls(&self) -> u32 {
        self.idle_polls
    }

    /// True while a start has been issued without a matching stop
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Whether the peripheral is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last frequency requested through `set_frequency`
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// The PCF85176 bank
    pub fn small(&self) -> &Pcf85176 {
        &self.small
    }

    /// The PCF85134 pair
    pub fn large(&self) -> &Pcf85134 {
        &self.large
    }

    fn record(&mut self, event: BusEvent) {
        if self.events.push(event).is_err() {
            self.dropped += 1;
        }
    }

    fn signal(&self, signal: Signal) -> bool {
        self.stalled != Some(signal)
    }

    fn finish(&mut self) {
        let Some(tx) = self.transaction.take() else {
            return;
        };
        let Some(address) = tx.address else {
            return;
        };
        if !tx.address_acked {
            return;
        }
        let acked = match (tx.nacked, self.nack_data_at) {
            (true, Some(index)) => &tx.data[..index.min(tx.data.len())],
            _ => &tx.data[..],
        };
        let target = BusAddress::new(address >> 1);
        if target == SMALL_ADDRESS {
            self.small.apply(acked);
        } else if target == LARGE_ADDRESS {
            self.large.apply(acked);
        }
    }
}

impl I2cMaster for SimBus {
    fn configure(&mut self, peripheral_clock_hz: u32) {
        self.record(BusEvent::Configure(peripheral_clock_hz));
    }

    fn set_frequency(&mut self, bus_clock_hz: u32) -> u32 {
        self.record(BusEvent::SetFrequency(bus_clock_hz));
        self.frequency = bus_clock_hz;
        bus_clock_hz
    }

    fn enable(&mut self, enabled: bool) {
        self.record(BusEvent::Enable(enabled));
        self.enabled = enabled;
    }

    fn is_idle(&mut self) -> bool {
        self.idle_polls = self.idle_polls.saturating_add(1);
        match self.busy {
            Busy::Forever => false,
            Busy::Polls(n) => {
                self.busy = if n <= 1 { Busy::Clear } else { Busy::Polls(n - 1) };
                false
            }
            Busy::Clear => !self.owned,
        }
    }

    fn start(&mut self) -> Result<(), BusFault> {
        if let Some(fault) = self.start_fault {
            return Err(fault);
        }
        self.record(BusEvent::Start);
        self.owned = true;
        self.transaction = Some(Transaction::default());
        if self.lose_arbitration {
            self.arbitration_lost = true;
        }
        Ok(())
    }

    fn is_start_complete(&mut self) -> bool {
        self.owned && self.signal(Signal::StartComplete)
    }

    fn stop(&mut self) {
        self.record(BusEvent::Stop);
        self.finish();
        self.owned = false;
    }

    fn is_stop_complete(&mut self) -> bool {
        !self.owned && self.signal(Signal::StopComplete)
    }

    fn is_transmitter_ready(&mut self) -> bool {
        self.signal(Signal::TransmitterReady)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), BusFault> {
        let absent = self.absent.contains(&(byte >> 1));
        let nack_at = self.nack_data_at;
        let collide_at = self.collide_at;
        let Some(tx) = self.transaction.as_mut() else {
            return Err(BusFault::Other);
        };
        let index = if tx.address.is_none() { 0 } else { tx.data.len() + 1 };
        if collide_at == Some(index) {
            return Err(BusFault::Collision);
        }

        let ack = if tx.address.is_none() {
            tx.address = Some(byte);
            tx.address_acked = byte & 0x01 == 0 && !absent;
            tx.address_acked
        } else {
            let data_index = tx.data.len();
            let _ = tx.data.push(byte);
            let ack = nack_at != Some(data_index);
            if !ack {
                tx.nacked = true;
            }
            ack
        };
        self.last_ack = ack;
        self.record(BusEvent::Byte(byte));
        Ok(())
    }

    fn is_transmission_complete(&mut self) -> bool {
        self.signal(Signal::TransmissionComplete)
    }

    fn is_acknowledged(&mut self) -> bool {
        self.last_ack
    }

    fn has_arbitration_loss(&mut self) -> bool {
        self.arbitration_lost
    }

    fn clear_arbitration_loss(&mut self) {
        self.arbitration_lost = false;
    }
}
