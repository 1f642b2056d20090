//! The command set for the SSD1306.
//!
//! The SSD1306 display RAM is 128 columns by 8 pages, where a page is a horizontal band of 8
//! pixel rows and each byte of display RAM is one column of one page, least significant bit on
//! top. Unlike most controllers in the family, the SSD1306 takes command parameters on the
//! command channel (D/C low), so every byte of a command goes out through `send_command`.

use crate::interface::DisplayInterface;

pub mod consts {
    //! Opcodes of the SSD1306, as they appear on the wire.

    pub const SET_LOW_COL: u8 = 0x00;
    pub const SET_HIGH_COL: u8 = 0x10;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEGMENT_REMAP_COL0: u8 = 0xA0;
    pub const SET_SEGMENT_REMAP_COL127: u8 = 0xA1;
    pub const ENTIRE_DISPLAY_FOLLOWS_RAM: u8 = 0xA4;
    pub const ENTIRE_DISPLAY_ON: u8 = 0xA5;
    pub const SET_NORMAL_DISPLAY: u8 = 0xA6;
    pub const SET_INVERSE_DISPLAY: u8 = 0xA7;
    pub const SET_MULTIPLEX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFF: u8 = 0xAE;
    pub const SET_DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE_START: u8 = 0xB0;
    pub const SET_COM_SCAN_UP: u8 = 0xC0;
    pub const SET_COM_SCAN_DOWN: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIVIDE_RATIO: u8 = 0xD5;
    pub const SET_PRE_CHARGE_PERIOD: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOMH_DESELECT_LEVEL: u8 = 0xDB;

    /// Charge pump parameter which enables the internal DC-DC converter.
    pub const CHARGE_PUMP_ENABLE: u8 = 0x14;
    /// Charge pump parameter which disables the internal DC-DC converter.
    pub const CHARGE_PUMP_DISABLE: u8 = 0x10;
}

use self::consts::*;

/// Mapping of display RAM columns onto the segment drivers. Changing this setting will flip the
/// image horizontally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentRemap {
    /// Column address 0 drives SEG0.
    Column0,
    /// Column address 127 drives SEG0.
    Column127,
}

/// Setting of the COM line scanning of rows. Changing this setting will flip the image
/// vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComScanDirection {
    /// COM lines scan from COM0 to COM[N-1].
    Up,
    /// COM lines scan from COM[N-1] to COM0.
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Turn the panel on (`true`) or put it to sleep (`false`). Display RAM is kept while
    /// sleeping.
    DisplayOn(bool),
    /// Set the contrast, 0-255.
    Contrast(u8),
    /// Set the number of active COM lines, which is the number of visible pixel rows. The
    /// register holds the value minus one in 6 bits, so the useful range is 1-64.
    MultiplexRatio(u8),
    /// Set the vertical shift of the COM lines, 0-63.
    DisplayOffset(u8),
    /// Set the display RAM row shown on the first COM line, 0-63. Higher bits are dropped.
    StartLine(u8),
    /// Set the column to segment mapping.
    SegmentRemap(SegmentRemap),
    /// Set the COM scan direction.
    ComScanDirection(ComScanDirection),
    /// Set the COM pins hardware configuration byte, as dictated by how the panel is wired.
    ComPins(u8),
    /// Set the display clock divide ratio (low nibble) and oscillator frequency (high nibble).
    ClockDivideRatio(u8),
    /// Enable or disable the internal charge pump.
    ChargePump(bool),
    /// Set the VCOMH deselect level byte.
    VcomhDeselectLevel(u8),
    /// Set the pre-charge period byte: phase 1 in the low nibble, phase 2 in the high nibble.
    PreChargePeriod(u8),
    /// Show the display RAM with inverted pixels (`true`) or normally (`false`).
    Invert(bool),
    /// Light every pixel regardless of display RAM (`true`), or follow RAM again (`false`).
    EntireDisplayOn(bool),
    /// Select the display RAM page written next, 0-7. Higher bits are dropped.
    PageStart(u8),
    /// Set the low nibble of the column address written next.
    LowColumn(u8),
    /// Set the high nibble of the column address written next.
    HighColumn(u8),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[]) => {{
        $buf[0] = $cmd;
        &$buf[..1]
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr]) => {{
        $buf[0] = $cmd;
        $buf[1] = $arg0;
        &$buf[..2]
    }};
}

impl Command {
    /// The bytes of this command as they go out on the wire.
    pub fn encode(self, buf: &mut [u8; 2]) -> &[u8] {
        match self {
            Command::DisplayOn(on) => ok_command!(
                buf,
                match on {
                    true => SET_DISPLAY_ON,
                    false => SET_DISPLAY_OFF,
                },
                []
            ),
            Command::Contrast(contrast) => ok_command!(buf, SET_CONTRAST, [contrast]),
            Command::MultiplexRatio(rows) => {
                ok_command!(buf, SET_MULTIPLEX_RATIO, [rows.wrapping_sub(1) & 0x3F])
            }
            Command::DisplayOffset(offset) => ok_command!(buf, SET_DISPLAY_OFFSET, [offset & 0x3F]),
            Command::StartLine(line) => ok_command!(buf, SET_START_LINE | (line & 0x3F), []),
            Command::SegmentRemap(remap) => ok_command!(
                buf,
                match remap {
                    SegmentRemap::Column0 => SET_SEGMENT_REMAP_COL0,
                    SegmentRemap::Column127 => SET_SEGMENT_REMAP_COL127,
                },
                []
            ),
            Command::ComScanDirection(dir) => ok_command!(
                buf,
                match dir {
                    ComScanDirection::Up => SET_COM_SCAN_UP,
                    ComScanDirection::Down => SET_COM_SCAN_DOWN,
                },
                []
            ),
            Command::ComPins(config) => ok_command!(buf, SET_COM_PINS, [config]),
            Command::ClockDivideRatio(ratio) => ok_command!(buf, SET_CLOCK_DIVIDE_RATIO, [ratio]),
            Command::ChargePump(ena) => ok_command!(
                buf,
                SET_CHARGE_PUMP,
                [match ena {
                    true => CHARGE_PUMP_ENABLE,
                    false => CHARGE_PUMP_DISABLE,
                }]
            ),
            Command::VcomhDeselectLevel(level) => {
                ok_command!(buf, SET_VCOMH_DESELECT_LEVEL, [level])
            }
            Command::PreChargePeriod(period) => ok_command!(buf, SET_PRE_CHARGE_PERIOD, [period]),
            Command::Invert(inverse) => ok_command!(
                buf,
                match inverse {
                    true => SET_INVERSE_DISPLAY,
                    false => SET_NORMAL_DISPLAY,
                },
                []
            ),
            Command::EntireDisplayOn(on) => ok_command!(
                buf,
                match on {
                    true => ENTIRE_DISPLAY_ON,
                    false => ENTIRE_DISPLAY_FOLLOWS_RAM,
                },
                []
            ),
            Command::PageStart(page) => ok_command!(buf, SET_PAGE_START | (page & 0x07), []),
            Command::LowColumn(nibble) => ok_command!(buf, SET_LOW_COL | (nibble & 0x0F), []),
            Command::HighColumn(nibble) => ok_command!(buf, SET_HIGH_COL | (nibble & 0x0F), []),
        }
    }

    pub fn send<DI>(self, iface: &mut DI) -> Result<(), DI::Error>
    where
        DI: DisplayInterface,
    {
        let mut buf = [0u8; 2];
        for byte in self.encode(&mut buf) {
            iface.send_command(*byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    fn sent(cmd: Command) -> Vec<u8> {
        let di = TestSpyInterface::new();
        cmd.send(&mut di.split()).unwrap();
        assert!(di.data().is_empty());
        di.commands()
    }

    #[test]
    fn display_on_off() {
        assert_eq!(sent(Command::DisplayOn(true)), [0xAF]);
        assert_eq!(sent(Command::DisplayOn(false)), [0xAE]);
    }

    #[test]
    fn parameters_go_out_as_commands() {
        let di = TestSpyInterface::new();
        Command::Contrast(0x8F).send(&mut di.split()).unwrap();
        di.check_multi(&[Sent::Cmd(0x81), Sent::Cmd(0x8F)]);
    }

    #[test]
    fn multiplex_ratio() {
        assert_eq!(sent(Command::MultiplexRatio(32)), [0xA8, 0x1F]);
        assert_eq!(sent(Command::MultiplexRatio(64)), [0xA8, 0x3F]);
    }

    #[test]
    fn display_offset() {
        assert_eq!(sent(Command::DisplayOffset(0)), [0xD3, 0x00]);
        assert_eq!(sent(Command::DisplayOffset(0x45)), [0xD3, 0x05]);
    }

    #[test]
    fn start_line_masks_to_six_bits() {
        assert_eq!(sent(Command::StartLine(0)), [0x40]);
        assert_eq!(sent(Command::StartLine(63)), [0x7F]);
        assert_eq!(sent(Command::StartLine(64)), [0x40]);
    }

    #[test]
    fn remapping_and_scan_direction() {
        assert_eq!(sent(Command::SegmentRemap(SegmentRemap::Column0)), [0xA0]);
        assert_eq!(sent(Command::SegmentRemap(SegmentRemap::Column127)), [0xA1]);
        assert_eq!(sent(Command::ComScanDirection(ComScanDirection::Up)), [0xC0]);
        assert_eq!(sent(Command::ComScanDirection(ComScanDirection::Down)), [0xC8]);
    }

    #[test]
    fn analog_settings() {
        assert_eq!(sent(Command::ComPins(0x02)), [0xDA, 0x02]);
        assert_eq!(sent(Command::ClockDivideRatio(0x80)), [0xD5, 0x80]);
        assert_eq!(sent(Command::ChargePump(true)), [0x8D, 0x14]);
        assert_eq!(sent(Command::ChargePump(false)), [0x8D, 0x10]);
        assert_eq!(sent(Command::VcomhDeselectLevel(0x40)), [0xDB, 0x40]);
        assert_eq!(sent(Command::PreChargePeriod(0xF1)), [0xD9, 0xF1]);
    }

    #[test]
    fn display_modes() {
        assert_eq!(sent(Command::Invert(false)), [0xA6]);
        assert_eq!(sent(Command::Invert(true)), [0xA7]);
        assert_eq!(sent(Command::EntireDisplayOn(false)), [0xA4]);
        assert_eq!(sent(Command::EntireDisplayOn(true)), [0xA5]);
    }

    #[test]
    fn addressing() {
        assert_eq!(sent(Command::PageStart(3)), [0xB3]);
        assert_eq!(sent(Command::PageStart(0x0B)), [0xB3]);
        assert_eq!(sent(Command::LowColumn(0x0A)), [0x0A]);
        assert_eq!(sent(Command::HighColumn(0x07)), [0x17]);
        assert_eq!(sent(Command::HighColumn(0x17)), [0x17]);
    }
}
