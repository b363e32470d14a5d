//! Simulated delay provider

use embedded_hal::delay::DelayNs;

/// Delay that returns immediately and accumulates the requested time
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    elapsed_ns: u64,
    calls: u32,
}

impl SimDelay {
    /// Create a delay with nothing elapsed
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time requested, in nanoseconds
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    /// Total time requested, in whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }

    /// Number of delay calls made
    pub fn calls(&self) -> u32 {
        self.calls
    }

    fn add(&mut self, ns: u64) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(ns);
        self.calls = self.calls.saturating_add(1);
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.add(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.add(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.add(u64::from(ms) * 1_000_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates() {
        let mut delay = SimDelay::new();
        delay.delay_ms(2);
        delay.delay_us(500);
        delay.delay_ns(500_000);
        assert_eq!(delay.elapsed_ms(), 3);
        assert_eq!(delay.elapsed_ns(), 3_000_000);
        assert_eq!(delay.calls(), 3);
    }
}
