//! Geometry and identities of the supported flash parts.

/// Smallest erasable unit, in bytes.
pub const SECTOR_SIZE: u32 = 0x1000;
/// Largest span a single page program may cover, in bytes. A program never crosses a multiple
/// of this size.
pub const PAGE_SIZE: u32 = 0x100;

/// JEDEC manufacturer id of Adesto.
pub const MANUFACTURER_ADESTO: u8 = 0x1F;

/// A flash part, as identified by its manufacturer and device id bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: u8,
    pub device: u8,
    /// Capacity in bytes.
    pub size: u32,
}

impl DeviceInfo {
    pub fn sectors(&self) -> u32 {
        self.size / SECTOR_SIZE
    }
}

/// Every part `SpiFlash::open` accepts.
pub static KNOWN_DEVICES: &[DeviceInfo] = &[
    // 8 Mbit
    DeviceInfo {
        manufacturer: MANUFACTURER_ADESTO,
        device: 0x01,
        size: 0x10_0000,
    },
];

/// The known part with the given id pair.
pub fn lookup(manufacturer: u8, device: u8) -> Option<&'static DeviceInfo> {
    KNOWN_DEVICES
        .iter()
        .find(|info| info.manufacturer == manufacturer && info.device == device)
}
