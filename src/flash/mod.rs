//! A driver for 25-series SPI NOR flash.
//!
//! The chip must be identified with `open` before it can be read, programmed or erased. Every
//! instruction is one chip-select window on a full-duplex SPI bus; the driver polls the bus for
//! completion of each word and the chip's status register for completion of each erase or
//! program, by default without bound. `Config` can bound both waits so a wedged bus or chip
//! surfaces as `Error::Timeout` instead of hanging.

pub mod command;
pub mod device;

use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;
use hal::spi::FullDuplex;

use self::command::{Command, MAX_FRAME_LEN, STATUS_BUSY};
use self::device::{DeviceInfo, PAGE_SIZE, SECTOR_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<SpiE, PinE> {
    /// The SPI bus reported a failure.
    Spi(SpiE),
    /// The chip-select pin could not be driven.
    Pin(PinE),
    /// `open` read an id pair which is not in `device::KNOWN_DEVICES`.
    UnknownDevice { manufacturer: u8, device: u8 },
    /// The chip has not been successfully opened.
    NotOpen,
    /// The requested span runs past the end of the chip.
    OutOfRange,
    /// A configured poll limit ran out while the bus or the chip stayed busy.
    Timeout,
}

/// Polling behaviour of the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    poll_backoff_us: u32,
    transfer_poll_limit: Option<u32>,
    busy_wait_limit: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll_backoff_us: 10,
            transfer_poll_limit: None,
            busy_wait_limit: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay between polls of a busy SPI bus.
    pub fn poll_backoff_us(self, us: u32) -> Self {
        Self {
            poll_backoff_us: us,
            ..self
        }
    }

    /// Give up on a bus word after this many busy polls. `None` waits forever.
    pub fn transfer_poll_limit(self, limit: Option<u32>) -> Self {
        Self {
            transfer_poll_limit: limit,
            ..self
        }
    }

    /// Give up waiting for an erase or program after this many busy status reads. `None` waits
    /// forever.
    pub fn busy_wait_limit(self, limit: Option<u32>) -> Self {
        Self {
            busy_wait_limit: limit,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Identified(&'static DeviceInfo),
    Ready(&'static DeviceInfo),
}

pub struct SpiFlash<SPI, CS, D> {
    spi: SPI,
    /// Active-low chip-select of the flash.
    cs: CS,
    delay: D,
    config: Config,
    state: State,
}

impl<SPI, CS, D> SpiFlash<SPI, CS, D>
where
    SPI: FullDuplex<u8>,
    CS: OutputPin,
    D: DelayUs<u32>,
{
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self::with_config(spi, cs, delay, Config::default())
    }

    pub fn with_config(spi: SPI, cs: CS, delay: D, config: Config) -> Self {
        SpiFlash {
            spi,
            cs,
            delay,
            config,
            state: State::Uninitialized,
        }
    }

    /// Identify the chip and check that it answers status reads. On success the chip can be
    /// read, programmed and erased, and its description is returned.
    pub fn open(&mut self) -> Result<&'static DeviceInfo, Error<SPI::Error, CS::Error>> {
        self.state = State::Uninitialized;
        let (manufacturer, device) = self.read_id()?;
        let info = match device::lookup(manufacturer, device) {
            Some(info) => info,
            None => {
                warn!(
                    "flash: unknown device {=u8:#x}:{=u8:#x}",
                    manufacturer, device
                );
                return Err(Error::UnknownDevice {
                    manufacturer,
                    device,
                });
            }
        };
        self.state = State::Identified(info);
        self.read_status()?;
        self.state = State::Ready(info);
        info!(
            "flash: opened {=u8:#x}:{=u8:#x}, {=u32} bytes",
            manufacturer, device, info.size
        );
        Ok(info)
    }

    pub fn is_open(&self) -> bool {
        match self.state {
            State::Ready(_) => true,
            _ => false,
        }
    }

    /// The identified chip, once `open` has succeeded.
    pub fn info(&self) -> Option<&'static DeviceInfo> {
        match self.state {
            State::Ready(info) => Some(info),
            _ => None,
        }
    }

    /// Read the manufacturer and device id bytes.
    pub fn read_id(&mut self) -> Result<(u8, u8), Error<SPI::Error, CS::Error>> {
        let mut frame = [0; MAX_FRAME_LEN];
        let len = Command::Identify.encode(&mut frame).len();
        self.transfer(&mut frame[..len])?;
        Ok((frame[1], frame[3]))
    }

    pub fn read_status(&mut self) -> Result<u8, Error<SPI::Error, CS::Error>> {
        let mut frame = [0; MAX_FRAME_LEN];
        let len = Command::ReadStatus.encode(&mut frame).len();
        self.transfer(&mut frame[..len])?;
        Ok(frame[1])
    }

    /// Read status until the chip is no longer busy.
    pub fn wait_ready(&mut self) -> Result<(), Error<SPI::Error, CS::Error>> {
        let mut busy_reads = 0u32;
        while self.read_status()? & STATUS_BUSY != 0 {
            busy_reads = busy_reads.saturating_add(1);
            if let Some(limit) = self.config.busy_wait_limit {
                if busy_reads >= limit {
                    warn!("flash: still busy after {=u32} status reads", busy_reads);
                    return Err(Error::Timeout);
                }
            }
        }
        Ok(())
    }

    /// Set the write enable latch. Only the transfer is checked, not the latch itself.
    pub fn write_enable(&mut self) -> Result<(), Error<SPI::Error, CS::Error>> {
        self.command(Command::WriteEnable)
    }

    /// Fill `buf` with the bytes starting at `offset`.
    pub fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Error<SPI::Error, CS::Error>> {
        self.check_span(offset, buf.len())?;
        self.wait_ready()?;
        let mut header = [0; MAX_FRAME_LEN];
        let header = Command::Read(offset).encode(&mut header);
        self.selected(|flash| {
            flash.write_words(header)?;
            for byte in buf.iter_mut() {
                *byte = flash.exchange(0x00)?;
            }
            Ok(())
        })
    }

    /// Program `data` starting at `offset`, one page program per flash page touched.
    ///
    /// The target bytes must have been erased. If a transfer fails part way, the pages already
    /// programmed stay programmed.
    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Error<SPI::Error, CS::Error>> {
        self.check_span(offset, data.len())?;
        let mut offset = offset;
        let mut rest = data;
        while !rest.is_empty() {
            self.wait_ready()?;
            self.write_enable()?;
            let room = (PAGE_SIZE - offset % PAGE_SIZE) as usize;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));
            trace!("flash: program {=u32:#x}+{=usize}", offset, chunk.len());
            let mut header = [0; MAX_FRAME_LEN];
            let header = Command::PageProgram(offset).encode(&mut header);
            self.selected(|flash| {
                flash.write_words(header)?;
                flash.write_words(chunk)
            })?;
            offset += chunk.len() as u32;
            rest = tail;
        }
        Ok(())
    }

    /// Erase every sector overlapping the `len` bytes at `offset`.
    pub fn erase(&mut self, offset: u32, len: u32) -> Result<(), Error<SPI::Error, CS::Error>> {
        if len == 0 {
            return Ok(());
        }
        self.check_span(offset, len as usize)?;
        let first = offset / SECTOR_SIZE;
        let last = (offset + (len - 1)) / SECTOR_SIZE;
        for sector in first..=last {
            self.wait_ready()?;
            self.write_enable()?;
            trace!("flash: erase sector {=u32}", sector);
            self.command(Command::SectorErase(sector * SECTOR_SIZE))?;
        }
        Ok(())
    }

    /// Give back the SPI bus, the chip-select pin and the delay.
    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }

    fn check_span(&self, offset: u32, len: usize) -> Result<(), Error<SPI::Error, CS::Error>> {
        let info = match self.state {
            State::Ready(info) => info,
            _ => return Err(Error::NotOpen),
        };
        if u64::from(offset) + len as u64 > u64::from(info.size) {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    /// Send one instruction in its own chip-select window, discarding what comes back.
    fn command(&mut self, cmd: Command) -> Result<(), Error<SPI::Error, CS::Error>> {
        let mut frame = [0; MAX_FRAME_LEN];
        let frame = cmd.encode(&mut frame);
        self.selected(|flash| flash.write_words(frame))
    }

    /// Exchange `words` in place in one chip-select window.
    fn transfer(&mut self, words: &mut [u8]) -> Result<(), Error<SPI::Error, CS::Error>> {
        self.selected(|flash| {
            for word in words.iter_mut() {
                *word = flash.exchange(*word)?;
            }
            Ok(())
        })
    }

    /// Run `f` with the chip selected. The chip is deselected afterwards whether `f` succeeded
    /// or not, and `f`'s error takes precedence over a deselect failure.
    fn selected<R, F>(&mut self, f: F) -> Result<R, Error<SPI::Error, CS::Error>>
    where
        F: FnOnce(&mut Self) -> Result<R, Error<SPI::Error, CS::Error>>,
    {
        self.cs.set_low().map_err(Error::Pin)?;
        let result = f(self);
        let released = self.cs.set_high().map_err(Error::Pin);
        let value = result?;
        released?;
        Ok(value)
    }

    fn write_words(&mut self, words: &[u8]) -> Result<(), Error<SPI::Error, CS::Error>> {
        for word in words {
            self.exchange(*word)?;
        }
        Ok(())
    }

    /// Clock out `word` and return the word clocked in with it.
    fn exchange(&mut self, word: u8) -> Result<u8, Error<SPI::Error, CS::Error>> {
        self.poll(|spi| spi.send(word))?;
        self.poll(|spi| spi.read())
    }

    /// Retry `op` while the bus reports it busy, backing off between attempts.
    fn poll<T, F>(&mut self, mut op: F) -> Result<T, Error<SPI::Error, CS::Error>>
    where
        F: FnMut(&mut SPI) -> nb::Result<T, SPI::Error>,
    {
        let mut busy_polls = 0u32;
        loop {
            match op(&mut self.spi) {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(e)) => return Err(Error::Spi(e)),
                Err(nb::Error::WouldBlock) => {
                    if let Some(limit) = self.config.transfer_poll_limit {
                        if busy_polls >= limit {
                            warn!("flash: bus still busy after {=u32} polls", busy_polls);
                            return Err(Error::Timeout);
                        }
                    }
                    busy_polls = busy_polls.saturating_add(1);
                    self.delay.delay_us(self.config.poll_backoff_us);
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::command::opcode::*;
    use super::sim::{self, BusFault, Bus, ChipSelect, Delay, Shared};
    use super::*;
    use std::rc::Rc;

    type Flash = SpiFlash<Bus, ChipSelect, Delay>;

    fn flash_with(config: Config) -> (Flash, Shared) {
        let chip = sim::chip();
        let flash = SpiFlash::with_config(
            Bus(chip.clone()),
            ChipSelect(chip.clone()),
            Delay(chip.clone()),
            config,
        );
        (flash, chip)
    }

    fn opened() -> (Flash, Shared) {
        let (mut flash, chip) = flash_with(Config::default());
        flash.open().unwrap();
        chip.borrow_mut().frames.clear();
        (flash, chip)
    }

    #[test]
    fn open_identifies_then_reads_status() {
        let (mut flash, chip) = flash_with(Config::default());
        assert!(!flash.is_open());
        let info = flash.open().unwrap();
        assert_eq!((info.manufacturer, info.device, info.size), (0x1F, 0x01, 0x10_0000));
        assert!(flash.is_open());
        assert_eq!(flash.info(), Some(info));
        let chip = chip.borrow();
        assert_eq!(chip.frames, [vec![0x9F, 0, 0, 0], vec![0x05, 0, 0]]);
        assert!(!chip.selected);
    }

    #[test]
    fn unknown_device_stops_before_status() {
        let (mut flash, chip) = flash_with(Config::default());
        chip.borrow_mut().device = 0x42;
        assert_eq!(
            flash.open(),
            Err(Error::UnknownDevice {
                manufacturer: 0x1F,
                device: 0x42
            })
        );
        assert!(!flash.is_open());
        assert_eq!(chip.borrow().opcodes(), [IDENTIFY]);
        let mut buf = [0u8; 4];
        assert_eq!(flash.read(0, &mut buf), Err(Error::NotOpen));
        assert_eq!(flash.write(0, &buf), Err(Error::NotOpen));
        assert_eq!(flash.erase(0, 4), Err(Error::NotOpen));
    }

    #[test]
    fn read_id_and_status() {
        let (mut flash, chip) = flash_with(Config::default());
        assert_eq!(flash.read_id(), Ok((0x1F, 0x01)));
        chip.borrow_mut().busy_reads = 1;
        assert_eq!(flash.read_status(), Ok(0x01));
        assert_eq!(flash.read_status(), Ok(0x00));
    }

    #[test]
    fn write_splits_at_page_boundaries() {
        let (mut flash, chip) = opened();
        let data: Vec<u8> = (0..300).map(|i| i as u8).collect();
        flash.write(200, &data).unwrap();

        let chip = chip.borrow();
        let programs = chip.frames_of(PAGE_PROGRAM);
        let spans: Vec<(usize, usize)> = programs
            .iter()
            .map(|f| (sim::address(f), sim::address(f) + f.len() - 4))
            .collect();
        assert_eq!(spans, [(200, 256), (256, 500)]);

        // Each program is preceded by a status poll until ready, then write enable.
        let ops = chip.opcodes();
        assert_eq!(
            ops,
            [
                READ_STATUS, WRITE_ENABLE, PAGE_PROGRAM,
                READ_STATUS, READ_STATUS, READ_STATUS, WRITE_ENABLE, PAGE_PROGRAM,
            ]
        );
        assert_eq!(&chip.memory[200..500], &data[..]);
        assert_eq!(chip.memory[199], 0xFF);
        assert_eq!(chip.memory[500], 0xFF);
    }

    #[test]
    fn aligned_write_of_whole_pages() {
        let (mut flash, chip) = opened();
        flash.write(0x1000, &[0xA5; 512]).unwrap();
        let chip = chip.borrow();
        let spans: Vec<usize> = chip
            .frames_of(PAGE_PROGRAM)
            .iter()
            .map(|f| sim::address(f))
            .collect();
        assert_eq!(spans, [0x1000, 0x1100]);
    }

    #[test]
    fn erase_covers_every_touched_sector() {
        let (mut flash, chip) = opened();
        flash.erase(4090, 10).unwrap();
        let chip = chip.borrow();
        let sectors: Vec<usize> = chip
            .frames_of(SECTOR_ERASE)
            .iter()
            .map(|f| sim::address(f))
            .collect();
        assert_eq!(sectors, [0, 4096]);
        assert_eq!(
            chip.opcodes(),
            [
                READ_STATUS, WRITE_ENABLE, SECTOR_ERASE,
                READ_STATUS, READ_STATUS, READ_STATUS, WRITE_ENABLE, SECTOR_ERASE,
            ]
        );
    }

    #[test]
    fn erase_of_one_aligned_byte_erases_its_sector() {
        let (mut flash, chip) = opened();
        flash.erase(0x2000, 1).unwrap();
        flash.erase(0x3000, 0).unwrap();
        let chip = chip.borrow();
        let sectors: Vec<usize> = chip
            .frames_of(SECTOR_ERASE)
            .iter()
            .map(|f| sim::address(f))
            .collect();
        assert_eq!(sectors, [0x2000]);
    }

    #[test]
    fn round_trip() {
        let (mut flash, chip) = opened();
        chip.borrow_mut().memory[0x5000..0x5400]
            .iter_mut()
            .for_each(|b| *b = 0x00);
        let data: Vec<u8> = (0..700u32).map(|i| (i * 7 + 3) as u8).collect();
        flash.erase(0x5010, data.len() as u32).unwrap();
        flash.write(0x5010, &data).unwrap();
        let mut back = vec![0u8; data.len()];
        flash.read(0x5010, &mut back).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn read_is_one_window() {
        let (mut flash, chip) = opened();
        chip.borrow_mut().memory[0x123..0x126].copy_from_slice(&[1, 2, 3]);
        let mut buf = [0u8; 3];
        flash.read(0x123, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        let chip = chip.borrow();
        assert_eq!(
            chip.frames,
            [vec![0x05, 0, 0], vec![0x03, 0x00, 0x01, 0x23, 0, 0, 0]]
        );
    }

    #[test]
    fn spans_past_the_end_are_refused() {
        let (mut flash, chip) = opened();
        let mut buf = [0u8; 2];
        assert_eq!(flash.read(0xF_FFFF, &mut buf), Err(Error::OutOfRange));
        assert_eq!(flash.write(0x10_0000, &[1]), Err(Error::OutOfRange));
        assert_eq!(flash.erase(0xF_F000, 0x1001), Err(Error::OutOfRange));
        assert!(chip.borrow().frames.is_empty());
        assert_eq!(flash.read(0xF_FFFE, &mut buf), Ok(()));
    }

    #[test]
    fn failed_program_keeps_earlier_pages() {
        let (mut flash, chip) = opened();
        chip.borrow_mut().fail_program_after = Some(1);
        let data = [0x3C; 300];
        assert_eq!(flash.write(200, &data), Err(Error::Spi(BusFault)));
        let chip = chip.borrow();
        assert!(!chip.selected);
        assert!(chip.memory[200..256].iter().all(|b| *b == 0x3C));
        assert!(chip.memory[256..500].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn busy_bus_is_polled_with_backoff() {
        let (mut flash, chip) = flash_with(Config::default());
        chip.borrow_mut().bus_stalls = 2;
        assert_eq!(flash.read_id(), Ok((0x1F, 0x01)));
        let chip = chip.borrow();
        assert_eq!(chip.delays_us, vec![10; 8]);
    }

    #[test]
    fn stuck_bus_times_out_when_bounded() {
        let config = Config::new()
            .poll_backoff_us(25)
            .transfer_poll_limit(Some(3));
        let (mut flash, chip) = flash_with(config);
        chip.borrow_mut().bus_stuck = true;
        assert_eq!(flash.open(), Err(Error::Timeout));
        let chip = chip.borrow();
        assert_eq!(chip.delays_us, [25, 25, 25]);
        assert!(!chip.selected);
    }

    #[test]
    fn stuck_chip_times_out_when_bounded() {
        let (mut flash, chip) = flash_with(Config::new().busy_wait_limit(Some(5)));
        flash.open().unwrap();
        {
            let mut chip = chip.borrow_mut();
            chip.frames.clear();
            chip.stuck_busy = true;
        }
        assert_eq!(flash.erase(0, 1), Err(Error::Timeout));
        assert_eq!(chip.borrow().opcodes(), [READ_STATUS; 5]);
    }

    #[test]
    fn release_gives_back_the_parts() {
        let (flash, chip) = opened();
        let (_bus, _cs, _delay) = flash.release();
        assert_eq!(Rc::strong_count(&chip), 4);
    }
}
