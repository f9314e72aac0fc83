pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod debugger;
pub mod memory;
pub mod ppu;

pub use console::{Console, Observer, Signal};
