use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, InputField, InputMode, ViewMode};
use crate::commands::repeat_label;
use crate::models::Priority;
use crate::priority::{days_until, format_due_date, is_due_soon, is_overdue, score};
use crate::schedule::{day_label, distribute};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    match app.view_mode {
        ViewMode::Tasks => render_tasks(f, app, chunks[0]),
        ViewMode::Week => render_week(f, app, chunks[0]),
    }

    let left = app.board.tasks_left();
    let status = match &app.status {
        Some(s) => s.clone(),
        None => format!("{} task{} left", left, if left == 1 { "" } else { "s" }),
    };
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
        chunks[1],
    );

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Tasks => "q: Quit | a: Add | Space: Done | e: Text | t: Due | p: Priority | r: Recur | n: Remind | J/K: Move | f: Filter | s: Sort | x: Clear Done | d: Del | v: Week",
            ViewMode::Week => "q: Quit | a: Add | v: View Tasks",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.input_mode {
            InputMode::Adding => match app.add_state.step {
                0 => "Add Task: Enter Text",
                _ => "Add Task: Enter Due Date (YYYY-MM-DD, optional)",
            },
            _ => match app.input_field {
                InputField::Text => "Edit Text",
                InputField::Due => "Edit Due Date (YYYY-MM-DD, empty to clear)",
                InputField::Recur => "Repeat: <pattern> <end YYYY-MM-DD | count> (empty to stop)",
                InputField::Remind => "Remind Minutes Before (empty to turn off)",
            },
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let now = Local::now();
    let today = now.date_naive();

    let rows: Vec<Row> = app
        .visible()
        .into_iter()
        .map(|t| {
            let (due, due_style) = match t.due_date {
                None => (String::new(), Style::default()),
                Some(d) if !t.completed && is_overdue(d, today) => (
                    format!("{}d overdue", -days_until(d, today)),
                    Style::default().fg(Color::Red),
                ),
                Some(d) if !t.completed && is_due_soon(d, today) => {
                    (format_due_date(d, today), Style::default().fg(Color::Yellow))
                }
                Some(d) => (format_due_date(d, today), Style::default()),
            };
            let priority_style = match t.priority {
                Priority::Urgent | Priority::High => Style::default().fg(Color::Red),
                Priority::Low => Style::default().fg(Color::Green),
                _ => Style::default(),
            };
            let remind = match t.notifications {
                Some(n) if n.enabled => format!("{}m", n.time),
                _ => String::new(),
            };
            let row_style = if t.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(t.text.clone()),
                Cell::from(t.priority.to_string()).style(priority_style),
                Cell::from(due).style(due_style),
                Cell::from(repeat_label(t)),
                Cell::from(remind),
                Cell::from(format!("{:.1}", score(t, now))),
                Cell::from(if t.completed { "Done" } else { "Pending" }),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(8),
    ];

    let title = format!("Taskloop - Tasks [{} | sort: {}]", app.filter, app.sort);
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Task", "Priority", "Due", "Repeats", "Remind", "Score", "Status"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_week(f: &mut Frame, app: &App, area: Rect) {
    let today = Local::now().date_naive();
    let week = distribute(app.board.tasks(), today);

    let mut lines = Vec::new();
    for day in &week.days {
        lines.push(Line::from(Span::styled(
            day_label(day.date, today),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        if day.tasks.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No tasks scheduled",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for t in &day.tasks {
            let color = match t.priority.tier() {
                3 => Color::Red,
                1 => Color::Green,
                _ => Color::Reset,
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("[{}] ", t.priority), Style::default().fg(color)),
                Span::raw(t.text.clone()),
            ]));
        }
    }

    let plan = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Taskloop - Next 7 Days"));
    f.render_widget(plan, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
