//! Framing of the 25-series SPI flash instructions.
//!
//! Every instruction starts with a one byte opcode. Addresses follow as 3 bytes, most
//! significant first. Instructions which answer with a response are framed with the don't-care
//! bytes clocked out while the response clocks in.

pub mod opcode {
    pub const IDENTIFY: u8 = 0x9F;
    pub const READ_STATUS: u8 = 0x05;
    pub const PAGE_PROGRAM: u8 = 0x02;
    pub const READ: u8 = 0x03;
    pub const WRITE_ENABLE: u8 = 0x06;
    pub const SECTOR_ERASE: u8 = 0x20;
}

/// Status register bit set while an erase or program is in progress.
pub const STATUS_BUSY: u8 = 0x01;

/// Length of the longest instruction frame.
pub const MAX_FRAME_LEN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Read the id bytes. The manufacturer id answers in the second byte of the frame and the
    /// device id in the fourth.
    Identify,
    /// Read the status register, which answers in the second byte of the frame.
    ReadStatus,
    /// Set the write enable latch, required before every program and erase.
    WriteEnable,
    /// Start reading at an address. Data follows for as long as the chip stays selected.
    Read(u32),
    /// Start programming at an address. Data to program follows within the same selection.
    PageProgram(u32),
    /// Erase the sector containing an address.
    SectorErase(u32),
}

impl Command {
    /// The bytes of this instruction as they go out on the wire.
    pub fn encode(self, buf: &mut [u8; MAX_FRAME_LEN]) -> &[u8] {
        let (op, addr) = match self {
            Command::Identify => {
                *buf = [opcode::IDENTIFY, 0, 0, 0];
                return &buf[..4];
            }
            Command::ReadStatus => {
                *buf = [opcode::READ_STATUS, 0, 0, 0];
                return &buf[..3];
            }
            Command::WriteEnable => {
                buf[0] = opcode::WRITE_ENABLE;
                return &buf[..1];
            }
            Command::Read(addr) => (opcode::READ, addr),
            Command::PageProgram(addr) => (opcode::PAGE_PROGRAM, addr),
            Command::SectorErase(addr) => (opcode::SECTOR_ERASE, addr),
        };
        buf[0] = op;
        buf[1] = (addr >> 16) as u8;
        buf[2] = (addr >> 8) as u8;
        buf[3] = addr as u8;
        &buf[..4]
    }
}
