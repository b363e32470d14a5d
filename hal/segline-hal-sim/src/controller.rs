//! Behavioral models of the LCD controller chips
//!
//! Only the write path the segment driver uses is modeled: command
//! parsing, device selection and segment RAM. Blinking, multiplex timing
//! and RAM auto-cascading between chips are not.
//!
//! The two chips frame commands differently:
//!
//! - PCF85176: every command byte carries a continuation bit (bit 7).
//!   The first command byte with bit 7 clear is the last; data follows.
//! - PCF85134: commands and data are introduced by control bytes
//!   (bit 7 = more control bytes follow, bit 6 = data rather than command).

/// Segment RAM bytes per PCF85176 (40 segments, static drive)
pub const PCF85176_RAM: usize = 5;

/// Segment RAM bytes per PCF85134 (60 segments, static drive)
pub const PCF85134_RAM: usize = 8;

const CONTINUE: u8 = 0x80;
const CONTROL_DATA: u8 = 0x40;

/// Mode-set bit 3: display enabled
const MODE_ENABLE: u8 = 0x08;

/// Up to three PCF85176 sharing one slave address
#[derive(Debug, Clone, Default)]
pub struct Pcf85176 {
    ram: [[u8; PCF85176_RAM]; 3],
    mode: Option<u8>,
    bank: Option<u8>,
    blink: Option<u8>,
    selected: u8,
    pointer: usize,
}

impl Pcf85176 {
    /// Segment RAM of the chip strapped to hardware address `device`
    pub fn ram(&self, device: u8) -> Option<&[u8; PCF85176_RAM]> {
        self.ram.get(usize::from(device))
    }

    /// Last mode-set command received, without the continuation bit
    pub fn mode(&self) -> Option<u8> {
        self.mode
    }

    /// Last bank-select command received
    pub fn bank(&self) -> Option<u8> {
        self.bank
    }

    /// Last blink-select command received
    pub fn blink(&self) -> Option<u8> {
        self.blink
    }

    /// True once a mode-set enabled the display
    pub fn is_enabled(&self) -> bool {
        self.mode.is_some_and(|m| m & MODE_ENABLE != 0)
    }

    /// Apply the acknowledged bytes of one write transaction
    pub fn apply(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        while let Some((&byte, tail)) = rest.split_first() {
            rest = tail;
            self.command(byte & !CONTINUE);
            if byte & CONTINUE == 0 {
                break;
            }
        }
        for &byte in rest {
            if let Some(slot) = self
                .ram
                .get_mut(usize::from(self.selected))
                .and_then(|ram| ram.get_mut(self.pointer))
            {
                *slot = byte;
            }
            self.pointer += 1;
        }
    }

    fn command(&mut self, cmd: u8) {
        match cmd {
            0x00..=0x3F => self.pointer = usize::from(cmd) / 8,
            0x40..=0x4F => self.mode = Some(cmd),
            0x60..=0x67 => self.selected = cmd & 0x07,
            0x70..=0x77 => self.blink = Some(cmd),
            0x78..=0x7F => self.bank = Some(cmd),
            _ => {}
        }
    }
}

/// Two PCF85134 sharing one slave address (hardware addresses 0 and 1)
#[derive(Debug, Clone, Default)]
pub struct Pcf85134 {
    ram: [[u8; PCF85134_RAM]; 2],
    mode: Option<u8>,
    bank: Option<u8>,
    blink: Option<u8>,
    selected: u8,
    pointer: usize,
}

impl Pcf85134 {
    /// Segment RAM of the chip strapped to hardware address `device`
    pub fn ram(&self, device: u8) -> Option<&[u8; PCF85134_RAM]> {
        self.ram.get(usize::from(device))
    }

    /// Last mode-set command received
    pub fn mode(&self) -> Option<u8> {
        self.mode
    }

    /// Last bank-select command received
    pub fn bank(&self) -> Option<u8> {
        self.bank
    }

    /// Last blink-select command received
    pub fn blink(&self) -> Option<u8> {
        self.blink
    }

    /// True once a mode-set enabled the display
    pub fn is_enabled(&self) -> bool {
        self.mode.is_some_and(|m| m & MODE_ENABLE != 0)
    }

    /// Apply the acknowledged bytes of one write transaction
    pub fn apply(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        while let Some((&control, tail)) = rest.split_first() {
            rest = tail;
            let last = control & CONTINUE == 0;
            let data = control & CONTROL_DATA != 0;
            if last {
                for &byte in rest {
                    if data {
                        self.write(byte);
                    } else {
                        self.command(byte);
                    }
                }
                return;
            }
            let Some((&byte, tail)) = rest.split_first() else {
                return;
            };
            rest = tail;
            if data {
                self.write(byte);
            } else {
                self.command(byte);
            }
        }
    }

    fn write(&mut self, byte: u8) {
        if let Some(slot) = self
            .ram
            .get_mut(usize::from(self.selected))
            .and_then(|ram| ram.get_mut(self.pointer))
        {
            *slot = byte;
        }
        self.pointer += 1;
    }

    fn command(&mut self, cmd: u8) {
        match cmd {
            0x00..=0x7F => self.pointer = usize::from(cmd) / 8,
            0xC0..=0xCF => self.mode = Some(cmd),
            0xE0..=0xE7 => self.selected = cmd & 0x07,
            0xF0..=0xF7 => self.blink = Some(cmd),
            0xF8..=0xFF => self.bank = Some(cmd),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcf85176_select_and_write() {
        let mut chip = Pcf85176::default();
        chip.apply(&[0x80, 0x62, 0x0C, 0xB6, 0x9E, 0xCC, 0x07]);
        assert_eq!(chip.ram(2), Some(&[0x0C, 0xB6, 0x9E, 0xCC, 0x07]));
        assert_eq!(chip.ram(0), Some(&[0; 5]));
    }

    #[test]
    fn test_pcf85176_mode_sequence() {
        let mut chip = Pcf85176::default();
        chip.apply(&[0x80, 0xC9, 0x80, 0xF8, 0x00, 0xF0]);
        assert_eq!(chip.mode(), Some(0x49));
        assert_eq!(chip.bank(), Some(0x78));
        assert!(chip.is_enabled());
        // The trailing byte lands in RAM of the default device
        assert_eq!(chip.ram(0).unwrap()[0], 0xF0);
    }

    #[test]
    fn test_pcf85176_ignores_overflow() {
        let mut chip = Pcf85176::default();
        chip.apply(&[0x60, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(chip.ram(0), Some(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_pcf85134_control_bytes() {
        let mut chip = Pcf85134::default();
        chip.apply(&[0x80, 0xE1, 0x80, 0x00, 0x40, 1, 2, 3, 4, 5, 6, 7, 0]);
        assert_eq!(chip.ram(1), Some(&[1, 2, 3, 4, 5, 6, 7, 0]));
        assert_eq!(chip.ram(0), Some(&[0; 8]));
    }

    #[test]
    fn test_pcf85134_mode_sequence() {
        let mut chip = Pcf85134::default();
        chip.apply(&[0x80, 0xC9, 0x80, 0xF8, 0x00, 0xF0]);
        assert_eq!(chip.mode(), Some(0xC9));
        assert_eq!(chip.bank(), Some(0xF8));
        assert_eq!(chip.blink(), Some(0xF0));
        assert!(chip.is_enabled());
        assert_eq!(chip.ram(0), Some(&[0; 8]));
    }
}
