//! Drivers for the peripherals found on SAMD21 demo boards: a monochrome graphics stack for
//! SSD1306-based OLED panels, and a driver for 25-series SPI NOR flash.
//!
//! The graphics stack is layered leaf-first. An [`interface::DisplayInterface`] moves bytes to
//! the controller, a [`controller::DisplayController`] turns page/column addressing into
//! controller commands, a [`display::Display`] exposes a page-addressed byte store (optionally
//! mirrored in RAM by a [`display::framebuffer::Framebuffer`]), and [`gfx::Gfx`] rasterizes
//! lines, circles, bitmaps and text on top of any `Display`.
//!
//! The flash driver, [`flash::SpiFlash`], is independent of the graphics stack and talks to the
//! chip through any `embedded-hal` full-duplex SPI bus.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate embedded_hal as hal;

// This has to come first so the macros are visible in the modules declared afterwards.
#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod controller;
pub mod display;
pub mod flash;
pub mod font;
pub mod gfx;
pub mod interface;

// Re-exports for primary API.
pub use command::{ComScanDirection, SegmentRemap};
pub use config::Config;
pub use controller::{DisplayController, Ssd1306};
pub use display::framebuffer::{Framebuffer, NullDisplay};
pub use display::{Display, OledDisplay, PixelOp};
pub use flash::SpiFlash;
pub use font::Font;
pub use gfx::Gfx;
pub use interface::spi::SpiInterface;
