//! The aggregate that owns the whole machine and drives it forward one
//! frame at a time.
use crate::cartridge::{self, Mapper, RomError};
use crate::controller::Controller;
use crate::cpu::{self, Cpu};
use crate::memory::Ram;
use crate::ppu::Ppu;
use log::info;
use std::path::Path;

/// Events a host can subscribe to without reaching into `Console`'s
/// internals on every tick.
#[derive(Debug, Clone)]
pub enum Signal {
    FrameReady { buffer: Vec<u8> },
    NesReset,
}

pub trait Observer {
    fn on_signal(&mut self, signal: &Signal);
}

pub struct Console {
    pub cpu: Cpu,
    pub ppu: Ppu,
    pub mapper: Box<dyn Mapper>,
    pub ram: Ram,
    pub controllers: [Controller; 2],
    observers: Vec<Box<dyn Observer>>,
    running: bool,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("cpu", &self.cpu)
            .field("ppu", &self.ppu)
            .field("mapper", &self.mapper)
            .field("controllers", &self.controllers)
            .field("running", &self.running)
            .finish()
    }
}

impl Console {
    /// Low-level constructor used by tests and by `load_rom` below; the
    /// CPU is left unreset so callers control exactly when the reset
    /// vector is read.
    pub fn with_mapper(mapper: Box<dyn Mapper>) -> Console {
        Console {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            mapper,
            ram: Ram::new(),
            controllers: [Controller::new(), Controller::new()],
            observers: Vec::new(),
            running: false,
        }
    }

    /// Parses an iNES file, builds its mapper, and boots a fresh `Console`
    /// from the reset vector.
    pub fn load_rom(path: impl AsRef<Path>) -> Result<Console, RomError> {
        Console::load_rom_with_mapper_override(path, None)
    }

    /// Like `load_rom`, but lets a debug flag force the mapper number.
    pub fn load_rom_with_mapper_override(
        path: impl AsRef<Path>,
        mapper_override: Option<u8>,
    ) -> Result<Console, RomError> {
        let (header, mapper) = cartridge::load_rom_with_mapper_override(path, mapper_override)?;
        info!(
            "loaded rom: mapper {}, {} prg bank(s), {} chr bank(s)",
            header.mapper, header.prg_banks, header.chr_banks
        );
        let mut console = Console::with_mapper(mapper);
        console.reset();
        Ok(console)
    }

    /// Like `load_rom`, but takes an already-read iNES image instead of a
    /// path. Used by integration tests that build a synthetic ROM in memory.
    pub fn load_rom_bytes(bytes: &[u8]) -> Result<Console, RomError> {
        let (header, mapper) = cartridge::load_rom_bytes(bytes)?;
        info!(
            "loaded rom: mapper {}, {} prg bank(s), {} chr bank(s)",
            header.mapper, header.prg_banks, header.chr_banks
        );
        let mut console = Console::with_mapper(mapper);
        console.reset();
        Ok(console)
    }

    /// Resets the CPU from the reset vector and notifies observers, the way
    /// a host pressing a physical reset button would. Emitted both here and
    /// after ROM load.
    pub fn reset(&mut self) {
        cpu::reset(self);
        self.notify(Signal::NesReset);
    }

    /// Host-facing input entry point: replaces a pad's latched button state
    /// (`A, B, Select, Start, Up, Down, Left, Right`). `pad` is 0 or 1.
    pub fn set_button_state(&mut self, pad: usize, state: [bool; 8]) {
        self.controllers[pad].set_buttons(state);
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    fn notify(&mut self, signal: Signal) {
        for observer in &mut self.observers {
            observer.on_signal(&signal);
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Runs CPU and PPU together, 3 PPU dots per CPU cycle, until the PPU
    /// reports a completed frame, then emits `Signal::FrameReady`.
    pub fn run_frame(&mut self) {
        loop {
            let cpu_cycles = cpu::tick(self);
            for _ in 0..(cpu_cycles as u32 * 3) {
                self.ppu.tick();
                if self.ppu.take_nmi() {
                    cpu::trigger_nmi(self);
                }
            }
            if self.ppu.take_frame_complete() {
                break;
            }
        }
        let buffer = self.ppu.framebuffer().to_vec();
        self.notify(Signal::FrameReady { buffer });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use crate::memory;

    #[derive(Debug)]
    struct TestMapper {
        prg: [u8; 0x8000],
    }

    impl TestMapper {
        fn new() -> TestMapper {
            TestMapper { prg: [0xEA; 0x8000] } // NOP sea, so the CPU just free-runs
        }
    }

    impl Mapper for TestMapper {
        fn read_prg(&mut self, addr: u16) -> u8 {
            self.prg[addr as usize & 0x7FFF]
        }
        fn write_prg(&mut self, addr: u16, value: u8) {
            self.prg[addr as usize & 0x7FFF] = value;
        }
        fn read_chr(&mut self, _addr: u16) -> u8 {
            0
        }
        fn write_chr(&mut self, _addr: u16, _value: u8) {}
        fn mirroring(&self) -> Mirroring {
            Mirroring::Horizontal
        }
    }

    struct RecordingObserver {
        frames: std::rc::Rc<std::cell::RefCell<usize>>,
        resets: std::rc::Rc<std::cell::RefCell<usize>>,
    }

    impl Observer for RecordingObserver {
        fn on_signal(&mut self, signal: &Signal) {
            match signal {
                Signal::FrameReady { .. } => *self.frames.borrow_mut() += 1,
                Signal::NesReset => *self.resets.borrow_mut() += 1,
            }
        }
    }

    fn test_console() -> Console {
        let mut console = Console::with_mapper(Box::new(TestMapper::new()));
        memory::write8(&mut console, 0xFFFC, 0x00);
        memory::write8(&mut console, 0xFFFD, 0x80);
        cpu::reset(&mut console);
        console
    }

    #[test]
    fn run_frame_emits_frame_ready() {
        let mut console = test_console();
        let frames = std::rc::Rc::new(std::cell::RefCell::new(0));
        let resets = std::rc::Rc::new(std::cell::RefCell::new(0));
        console.add_observer(Box::new(RecordingObserver {
            frames: frames.clone(),
            resets,
        }));
        console.run_frame();
        assert_eq!(*frames.borrow(), 1);
        assert_eq!(console.ppu.framebuffer().len(), crate::ppu::FRAME_BYTES);
    }

    #[test]
    fn explicit_reset_reloads_vector_and_notifies_observers() {
        let mut console = test_console();
        let frames = std::rc::Rc::new(std::cell::RefCell::new(0));
        let resets = std::rc::Rc::new(std::cell::RefCell::new(0));
        console.add_observer(Box::new(RecordingObserver {
            frames,
            resets: resets.clone(),
        }));

        console.cpu.pc = 0x1234;
        console.reset();

        assert_eq!(console.cpu.pc, 0x8000);
        assert_eq!(console.cpu.sp, 0xFD);
        assert_eq!(*resets.borrow(), 1);
    }

    #[test]
    fn set_button_state_drives_pad_one_through_the_bus() {
        let mut console = test_console();
        console.set_button_state(0, [true, false, true, false, false, false, false, false]);

        memory::write8(&mut console, 0x4016, 0x01);
        memory::write8(&mut console, 0x4016, 0x00);
        assert_eq!(memory::read8(&mut console, 0x4016), 1); // A
        assert_eq!(memory::read8(&mut console, 0x4016), 0); // B
        assert_eq!(memory::read8(&mut console, 0x4016), 1); // Select

        // pad 1 is a real Controller a host can latch state into, but $4017
        // is a stub per the memory map, so none of it is bus-observable.
        console.set_button_state(1, [true, true, true, true, true, true, true, true]);
        assert_eq!(memory::read8(&mut console, 0x4017), 0);
    }

    #[test]
    fn start_stop_toggles_running_flag() {
        let mut console = test_console();
        assert!(!console.is_running());
        console.start();
        assert!(console.is_running());
        console.stop();
        assert!(!console.is_running());
    }

    #[test]
    fn ppu_nmi_reaches_cpu_during_run_frame() {
        let mut console = test_console();
        console.ppu.regs.ctrl = 0x80; // enable NMI-on-vblank
        console.run_frame();
        // A full frame always crosses vblank once; by the time it
        // completes the CPU should have serviced (and cleared) the NMI.
        assert!(console.cpu.pending_interrupt.is_none());
    }
}
