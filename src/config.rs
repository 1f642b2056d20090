//! Defines the struct holding the register values the SSD1306 is programmed with at power-on.

use crate::command::*;
use crate::interface;

/// A configuration for the controller's power-on sequence. Builder methods offer a declarative
/// way to override single settings; everything else keeps the values of the UG-2832HSWEG04
/// 128x32 panel, which is what `Config::default()` and `Config::new()` produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    mux_ratio: u8,
    display_offset: u8,
    segment_remap: SegmentRemap,
    com_scan_direction: ComScanDirection,
    com_pins: u8,
    contrast: u8,
    clock_divide_ratio: u8,
    charge_pump: bool,
    vcomh_deselect_level: u8,
    pre_charge_period: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mux_ratio: 32,
            display_offset: 0x00,
            segment_remap: SegmentRemap::Column127,
            com_scan_direction: ComScanDirection::Down,
            com_pins: 0x02,
            contrast: 0x8F,
            clock_divide_ratio: 0x80,
            charge_pump: true,
            vcomh_deselect_level: 0x40,
            pre_charge_period: 0xF1,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active pixel rows. See `Command::MultiplexRatio`.
    pub fn mux_ratio(self, rows: u8) -> Self {
        Self {
            mux_ratio: rows,
            ..self
        }
    }

    /// See `Command::DisplayOffset`.
    pub fn display_offset(self, offset: u8) -> Self {
        Self {
            display_offset: offset,
            ..self
        }
    }

    /// See `Command::SegmentRemap`.
    pub fn segment_remap(self, remap: SegmentRemap) -> Self {
        Self {
            segment_remap: remap,
            ..self
        }
    }

    /// See `Command::ComScanDirection`.
    pub fn com_scan_direction(self, dir: ComScanDirection) -> Self {
        Self {
            com_scan_direction: dir,
            ..self
        }
    }

    /// COM pins hardware configuration; must match the module wiring, see its datasheet.
    pub fn com_pins(self, config: u8) -> Self {
        Self {
            com_pins: config,
            ..self
        }
    }

    pub fn contrast(self, contrast: u8) -> Self {
        Self { contrast, ..self }
    }

    /// See `Command::ClockDivideRatio`.
    pub fn clock_divide_ratio(self, ratio: u8) -> Self {
        Self {
            clock_divide_ratio: ratio,
            ..self
        }
    }

    /// Panels powered from an external VCC should disable the charge pump.
    pub fn charge_pump(self, enabled: bool) -> Self {
        Self {
            charge_pump: enabled,
            ..self
        }
    }

    pub fn vcomh_deselect_level(self, level: u8) -> Self {
        Self {
            vcomh_deselect_level: level,
            ..self
        }
    }

    pub fn pre_charge_period(self, period: u8) -> Self {
        Self {
            pre_charge_period: period,
            ..self
        }
    }

    /// The contrast this configuration programs.
    pub fn contrast_value(&self) -> u8 {
        self.contrast
    }

    /// Transmit the power-on command sequence encoded in `self` to the controller at `iface`,
    /// ending with the display switched on.
    pub(crate) fn send<DI>(&self, iface: &mut DI) -> Result<(), DI::Error>
    where
        DI: interface::DisplayInterface,
    {
        Command::MultiplexRatio(self.mux_ratio).send(iface)?;
        Command::DisplayOffset(self.display_offset).send(iface)?;
        Command::StartLine(0).send(iface)?;
        Command::SegmentRemap(self.segment_remap).send(iface)?;
        Command::ComScanDirection(self.com_scan_direction).send(iface)?;
        Command::ComPins(self.com_pins).send(iface)?;
        Command::Contrast(self.contrast).send(iface)?;
        Command::EntireDisplayOn(false).send(iface)?;
        Command::Invert(false).send(iface)?;
        Command::ClockDivideRatio(self.clock_divide_ratio).send(iface)?;
        Command::ChargePump(self.charge_pump).send(iface)?;
        Command::VcomhDeselectLevel(self.vcomh_deselect_level).send(iface)?;
        Command::PreChargePeriod(self.pre_charge_period).send(iface)?;
        Command::DisplayOn(true).send(iface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::TestSpyInterface;

    #[test]
    fn default_power_on_sequence() {
        let di = TestSpyInterface::new();
        Config::default().send(&mut di.split()).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0xA8, 0x1F, // multiplex ratio, 32 rows
            0xD3, 0x00, // display offset
            0x40,       // start line 0
            0xA1,       // column 127 drives SEG0
            0xC8,       // COM scan down
            0xDA, 0x02, // COM pins
            0x81, 0x8F, // contrast
            0xA4,       // follow display RAM
            0xA6,       // normal display
            0xD5, 0x80, // clock divide ratio
            0x8D, 0x14, // charge pump on
            0xDB, 0x40, // VCOMH deselect level
            0xD9, 0xF1, // pre-charge period
            0xAF,       // display on
        ];
        assert_eq!(di.commands(), expected);
    }

    #[test]
    fn overridden_settings() {
        let di = TestSpyInterface::new();
        let cfg = Config::new()
            .mux_ratio(64)
            .com_pins(0x12)
            .contrast(0x10)
            .charge_pump(false)
            .segment_remap(SegmentRemap::Column0)
            .com_scan_direction(ComScanDirection::Up);
        assert_eq!(cfg.contrast_value(), 0x10);
        cfg.send(&mut di.split()).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0xA8, 0x3F,
            0xD3, 0x00,
            0x40,
            0xA0,
            0xC0,
            0xDA, 0x12,
            0x81, 0x10,
            0xA4,
            0xA6,
            0xD5, 0x80,
            0x8D, 0x10,
            0xDB, 0x40,
            0xD9, 0xF1,
            0xAF,
        ];
        assert_eq!(di.commands(), expected);
    }
}
