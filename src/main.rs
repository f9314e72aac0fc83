use anyhow::{Context, Result};
use clap::Parser;
use crossterm::ExecutableCommand;
use nes::{debugger, memory, Console};
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Layout, Margin},
    prelude::*,
    symbols::{border, scrollbar},
    widgets::{block::*, *},
};
use std::path::PathBuf;
use std::{io, time::Duration, time::Instant};

/// A cycle-budgeted NES core with a terminal register/stack/disassembly
/// debugger.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to an iNES (.nes) ROM file.
    rom: PathBuf,

    /// Log every retired instruction at trace level.
    #[arg(long)]
    trace: bool,

    /// Force a specific mapper number instead of trusting the header.
    #[arg(long, value_name = "NUMBER")]
    mapper_override: Option<u8>,
}

#[derive(Debug, Default)]
pub struct App {
    scroll_state: ScrollbarState,
    stack_scroll: u16,
    current_instr_context: Vec<String>,
    current_instr_loc: usize,
    current_pc: u16,
}

fn ui(f: &mut Frame, app: &mut App, console: &mut Console) {
    let size = f.size();

    let chunks = Layout::horizontal([
        Constraint::Percentage(100),
        Constraint::Min(15),
        Constraint::Min(24),
    ])
    .split(size);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED);

    if app.current_instr_context.is_empty() {
        let instrs = debugger::debug_instructions(console, console.cpu.pc, 30);
        app.current_instr_context = instrs.into_iter().map(|i| i.text).collect();
    }

    let rendertext: Vec<Line> = app
        .current_instr_context
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if i == app.current_instr_loc {
                Line::from(text.clone()).on_green().black()
            } else {
                Line::from(text.clone())
            }
        })
        .collect();

    if app.current_pc != console.cpu.pc {
        app.current_instr_loc += 1;
        app.current_pc = console.cpu.pc;
    }
    if app.current_instr_loc >= app.current_instr_context.len().saturating_sub(1) {
        app.current_instr_loc = 0;
        app.current_instr_context.clear();
    }

    let instr_text = Text::from(rendertext);

    let reg_text = Text::from(format!(
        "PC: ${:04X}\nA:  ${:02X}\nX:  ${:02X}\nY:  ${:02X}\nSP: ${:02X}\nP:  {}\ncycles: {}",
        console.cpu.pc,
        console.cpu.a,
        console.cpu.x,
        console.cpu.y,
        console.cpu.sp,
        console.cpu.flags,
        console.cpu.cycles,
    ));

    let stack: Vec<Line> = (0x0100u16..=0x01FF)
        .map(|addr| {
            let value = memory::read8(console, addr);
            let line = format!("{:04X}: {:02X}", addr, value);
            if addr == 0x0100 | console.cpu.sp as u16 {
                Line::from(line).on_green().black()
            } else {
                Line::from(line)
            }
        })
        .collect();
    let stack_text = Text::from(stack);

    app.scroll_state = app
        .scroll_state
        .content_length(256)
        .position((app.stack_scroll % 0x100) as usize);

    let instr_par = Paragraph::new(instr_text).left_aligned().block(block);

    let stackblock = Block::default()
        .title(Title::from("Stack".bold()).alignment(Alignment::Center))
        .borders(Borders::ALL)
        .border_set(border::ROUNDED);
    let stack_par = Paragraph::new(stack_text)
        .left_aligned()
        .block(stackblock)
        .scroll((app.stack_scroll, 0));

    let regblock = Block::default()
        .title(Title::from("Registers".bold()).alignment(Alignment::Center))
        .borders(Borders::ALL)
        .border_set(border::ROUNDED);
    let reg_par = Paragraph::new(reg_text).left_aligned().block(regblock);

    f.render_widget(instr_par, chunks[0]);
    f.render_widget(stack_par, chunks[1]);
    f.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(scrollbar::VERTICAL)
            .track_symbol(None)
            .begin_symbol(None)
            .end_symbol(None),
        chunks[1].inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
        &mut app.scroll_state,
    );
    f.render_widget(reg_par, chunks[2]);
}

fn main() -> Result<()> {
    better_panic::install();
    let args = Args::parse();
    if args.trace && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "trace");
    }
    pretty_env_logger::init();

    let mut console =
        Console::load_rom_with_mapper_override(&args.rom, args.mapper_override)
            .with_context(|| format!("failed to load rom {}", args.rom.display()))?;
    console.start();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(16);
    let mut app = App::default();
    app.current_pc = console.cpu.pc;
    let mut last_tick = Instant::now();

    'mainloop: loop {
        terminal.draw(|f| ui(f, &mut app, &mut console))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break 'mainloop,
                    KeyCode::Up => app.stack_scroll = app.stack_scroll.wrapping_sub(1),
                    KeyCode::Down => app.stack_scroll = app.stack_scroll.wrapping_add(1),
                    KeyCode::PageUp => app.stack_scroll = app.stack_scroll.wrapping_sub(0x10),
                    KeyCode::PageDown => app.stack_scroll = app.stack_scroll.wrapping_add(0x10),
                    KeyCode::Enter => app.stack_scroll = console.cpu.sp as u16,
                    _ => {}
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            if console.is_running() {
                console.run_frame();
            }
            last_tick = Instant::now();
        }
    }

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
