//! The byte transport between the MCU and the display controller.

/// A write-only link to a display controller. Commands and data are told apart by the
/// controller's D/C line; how that line is driven is up to the implementation.
pub trait DisplayInterface {
    type Error;

    fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error>;
    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

pub mod spi {
    //! The SPI interface supports the "4-wire" interface of the controller, such that each word
    //! on the SPI bus is 8 bits, a GPIO drives the D/C line, and a second GPIO frames every
    //! transfer with chip-select. The "3-wire" mode replaces the D/C GPIO with a 9th bit on each
    //! word, which seems really awkward to implement with embedded_hal SPI.

    use hal::digital::v2::OutputPin;

    use super::DisplayInterface;

    /// Failure of one of the two collaborators of the SPI interface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum InterfaceError<SpiE, PinE> {
        /// The SPI write did not complete.
        Spi(SpiE),
        /// The D/C or chip-select pin could not be driven.
        Pin(PinE),
    }

    pub struct SpiInterface<SPI, DC, CS> {
        /// The SPI master device connected to the controller.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the controller (the
        /// fourth "wire" of "4-wire" mode). Low selects command, high selects data.
        dc: DC,
        /// A GPIO output pin connected to the active-low chip-select of the controller.
        cs: CS,
    }

    impl<SPI, DC, CS, PinE> SpiInterface<SPI, DC, CS>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: OutputPin<Error = PinE>,
        CS: OutputPin<Error = PinE>,
    {
        /// Create a new SPI interface to communicate with the display controller. `spi` is the
        /// SPI master device, `dc` is the GPIO output pin connected to the D/C pin and `cs` the
        /// one connected to chip-select.
        pub fn new(spi: SPI, dc: DC, cs: CS) -> Self {
            Self { spi, dc, cs }
        }

        /// Give back the SPI device and pins.
        pub fn release(self) -> (SPI, DC, CS) {
            (self.spi, self.dc, self.cs)
        }

        /// Write `buf` with chip-select held low for exactly this one transfer. Chip-select is
        /// released even when the SPI write fails.
        fn framed_write(&mut self, buf: &[u8]) -> Result<(), InterfaceError<SPI::Error, PinE>> {
            self.cs.set_low().map_err(InterfaceError::Pin)?;
            let written = self.spi.write(buf).map_err(InterfaceError::Spi);
            let released = self.cs.set_high().map_err(InterfaceError::Pin);
            written.and(released)
        }
    }

    impl<SPI, DC, CS, PinE> DisplayInterface for SpiInterface<SPI, DC, CS>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: OutputPin<Error = PinE>,
        CS: OutputPin<Error = PinE>,
    {
        type Error = InterfaceError<SPI::Error, PinE>;

        fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
            self.dc.set_low().map_err(InterfaceError::Pin)?;
            self.framed_write(&[cmd])
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.dc.set_high().map_err(InterfaceError::Pin)?;
            self.framed_write(buf)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use core::convert::Infallible;
        use std::cell::RefCell;
        use std::rc::Rc;
        use std::vec::Vec;

        #[derive(Clone, Copy, Debug, PartialEq)]
        enum Ev {
            Dc(bool),
            Cs(bool),
            Write(u8),
        }

        type Log = Rc<RefCell<Vec<Ev>>>;

        struct Bus(Log);
        struct Pin(Log, fn(bool) -> Ev);

        impl hal::blocking::spi::Write<u8> for Bus {
            type Error = Infallible;
            fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
                self.0.borrow_mut().extend(words.iter().map(|w| Ev::Write(*w)));
                Ok(())
            }
        }

        impl OutputPin for Pin {
            type Error = Infallible;
            fn set_low(&mut self) -> Result<(), Infallible> {
                self.0.borrow_mut().push((self.1)(false));
                Ok(())
            }
            fn set_high(&mut self) -> Result<(), Infallible> {
                self.0.borrow_mut().push((self.1)(true));
                Ok(())
            }
        }

        /// A bus whose every write fails.
        struct BrokenBus(Log);

        impl hal::blocking::spi::Write<u8> for BrokenBus {
            type Error = ();
            fn write(&mut self, words: &[u8]) -> Result<(), ()> {
                self.0.borrow_mut().extend(words.iter().map(|w| Ev::Write(*w)));
                Err(())
            }
        }

        fn interface() -> (SpiInterface<Bus, Pin, Pin>, Log) {
            let log: Log = Rc::new(RefCell::new(Vec::new()));
            let iface = SpiInterface::new(
                Bus(log.clone()),
                Pin(log.clone(), Ev::Dc),
                Pin(log.clone(), Ev::Cs),
            );
            (iface, log)
        }

        #[test]
        fn command_drives_dc_low_inside_one_cs_window() {
            let (mut iface, log) = interface();
            iface.send_command(0xAF).unwrap();
            assert_eq!(
                *log.borrow(),
                [Ev::Dc(false), Ev::Cs(false), Ev::Write(0xAF), Ev::Cs(true)]
            );
        }

        #[test]
        fn failed_write_still_releases_chip_select() {
            let log: Log = Rc::new(RefCell::new(Vec::new()));
            let mut iface = SpiInterface::new(
                BrokenBus(log.clone()),
                Pin(log.clone(), Ev::Dc),
                Pin(log.clone(), Ev::Cs),
            );
            assert_eq!(iface.send_data(&[0x01]), Err(InterfaceError::Spi(())));
            assert_eq!(
                *log.borrow(),
                [Ev::Dc(true), Ev::Cs(false), Ev::Write(0x01), Ev::Cs(true)]
            );
        }

        #[test]
        fn data_drives_dc_high_inside_one_cs_window() {
            let (mut iface, log) = interface();
            iface.send_data(&[0xDE, 0xAD]).unwrap();
            assert_eq!(
                *log.borrow(),
                [
                    Ev::Dc(true),
                    Ev::Cs(false),
                    Ev::Write(0xDE),
                    Ev::Write(0xAD),
                    Ev::Cs(true)
                ]
            );
        }
    }
}
