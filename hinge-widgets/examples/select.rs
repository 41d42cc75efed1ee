//! Minimal terminal host for a `Select`.
//!
//! Run with `cargo run -p hinge-widgets --example select`. Arrow keys or the
//! mouse pick a fruit, `q` quits. Debug logs go to `select-demo.log`.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use hinge::{Candidate, InputEvent, Key, Rect};
use hinge_widgets::{EventContext, FlipResolver, Select, WidgetEventKind, dispatch};
use simplelog::LevelFilter;

const TRIGGER: Rect = Rect::new(2, 1, 16, 1);

struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn draw(out: &mut Stdout, select: &Select<&'static str>, status: &str) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let screen = Rect::new(0, 0, width, height);
    queue!(out, Clear(ClearType::All))?;
    queue!(
        out,
        MoveTo(TRIGGER.x, TRIGGER.y),
        Print(format!("[ {:<12} ]", select.display_text()))
    )?;

    if let Some(panel) = select.place(screen, &FlipResolver) {
        let highlighted = select.highlighted_index();
        for (row, item) in select.items().iter().enumerate() {
            let y = panel.y + row as u16;
            queue!(out, MoveTo(panel.x, y))?;
            if Some(row) == highlighted {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }
            if item.disabled {
                queue!(out, SetAttribute(Attribute::Dim))?;
            }
            queue!(
                out,
                Print(format!(" {:<w$}", item.label, w = usize::from(panel.width) - 1)),
                SetAttribute(Attribute::Reset)
            )?;
        }
    }

    queue!(out, MoveTo(0, height.saturating_sub(1)), Print(status))?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    hinge::logging::init_file_logger("select-demo.log", LevelFilter::Debug)?;

    let select = Select::new([
        Candidate::new("apple", "Apple"),
        Candidate::new("banana", "Banana"),
        Candidate::new("cherry", "Cherry").disabled(),
        Candidate::new("damson", "Damson"),
    ])
    .with_placeholder("Pick a fruit");
    select.set_trigger_rect(TRIGGER);

    let (cx, mut rx) = EventContext::channel();
    let mut guard = TerminalGuard::new()?;
    let mut status = String::from("q quits");

    loop {
        draw(&mut guard.stdout, &select, &status)?;

        let input = match InputEvent::try_from(event::read()?) {
            Ok(input) => input,
            Err(unsupported) => {
                log::trace!("{unsupported}");
                continue;
            }
        };
        if input == InputEvent::key(Key::Char('q')) && !select.is_open() {
            break;
        }
        dispatch(&select, &input, &cx);

        while let Ok(event) = rx.try_recv() {
            if event.kind == WidgetEventKind::Change {
                status = format!("picked {:?}", select.value());
            }
            log::debug!("{event:?}");
        }
    }
    Ok(())
}
