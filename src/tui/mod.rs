pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::error;

use crate::config::Config;
use app::{App, InputField, InputMode};
use ui::ui;

/// How often the loop wakes without input to check reminders.
const TICK: Duration = Duration::from_millis(500);

pub fn run_tui(config: &Config) -> crate::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Local::now());

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("tui exited with error: {err}");
    }
    res.map_err(crate::Error::from)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick(Local::now());
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('e') => app.start_edit(InputField::Text),
                KeyCode::Char('t') => app.start_edit(InputField::Due),
                KeyCode::Char('r') => app.start_edit(InputField::Recur),
                KeyCode::Char('n') => app.start_edit(InputField::Remind),
                KeyCode::Char('p') => app.cycle_priority(),
                KeyCode::Char('J') => app.move_selected(1),
                KeyCode::Char('K') => app.move_selected(-1),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('s') => app.cycle_sort(),
                KeyCode::Char('x') => app.clear_completed(),
                KeyCode::Char('v') => app.toggle_view(),
                _ => {}
            },
            InputMode::Editing | InputMode::Adding => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
        }
    }
}
