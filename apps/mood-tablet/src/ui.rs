//! UI rendering for the mood tablet.

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, MessageType, View};
use crate::models::{month_grid, Mood, ALL_MOODS};

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view {
        View::Login => draw_login(f, app),
        View::Tracker => draw_tracker(f, app),
        View::Chart => draw_chart(f, app),
    }

    if app.show_help {
        draw_help(f);
    }

    if app.editing_note {
        draw_note_input(f, app);
    }

    if let Some((text, kind)) = &app.message {
        draw_message(f, text, *kind);
    }
}

/// The saved `#RRGGBB` accent as a terminal color.
fn accent(app: &App) -> Color {
    let hex = app.accent.trim_start_matches('#');
    let parse = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0xFF);
    if hex.len() == 6 {
        Color::Rgb(parse(0..2), parse(2..4), parse(4..6))
    } else {
        Color::Magenta
    }
}

fn mood_color(mood: Mood) -> Color {
    match mood {
        Mood::Happy => Color::Yellow,
        Mood::Sad => Color::Blue,
        Mood::Angry => Color::Red,
        Mood::Calm => Color::Cyan,
        Mood::Excited => Color::Magenta,
        Mood::Tired => Color::DarkGray,
    }
}

fn draw_login(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 30, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3)])
        .split(area);

    let title = Paragraph::new("Mood Tablet\n\nWhat should we call you? (2-20 characters)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(accent(app)).add_modifier(Modifier::BOLD));
    f.render_widget(title, chunks[0]);

    let input = Paragraph::new(app.login_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Name "));
    f.render_widget(input, chunks[1]);

    f.set_cursor_position((
        chunks[1].x + 1 + app.login_buffer.len() as u16,
        chunks[1].y + 1,
    ));
}

fn draw_tracker(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let name = app.username.as_deref().unwrap_or("Guest");
    let header = Paragraph::new(format!(
        "Hello, {}! Ready to track your mood today?",
        name
    ))
    .style(Style::default().fg(accent(app)).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    draw_mood_picker(f, app, body[0]);
    draw_calendar(f, app, body[1]);

    let footer = Paragraph::new(
        "1-6:Pick mood  n:Note  Enter:Save  h/l:Month  t:Today  c:Chart  o:Log out  ?:Help  q:Quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_mood_picker(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = ALL_MOODS
        .iter()
        .enumerate()
        .map(|(i, mood)| {
            let selected = app.selected_mood == Some(*mood);
            let marker = if selected { ">" } else { " " };
            let style = if selected {
                Style::default()
                    .fg(mood_color(*mood))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(mood_color(*mood))
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker} {}. ", i + 1)),
                Span::styled(mood.label(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" How are you feeling? "),
    );
    f.render_widget(list, chunks[0]);

    let note = Paragraph::new(app.note_buffer.as_str())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(" Note (n) "));
    f.render_widget(note, chunks[1]);
}

fn draw_calendar(f: &mut Frame, app: &App, area: Rect) {
    let (year, month) = app.month;
    let month_name = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();

    let weekday_header = if app.config.calendar.week_starts_sunday {
        "Su  Mo  Tu  We  Th  Fr  Sa"
    } else {
        "Mo  Tu  We  Th  Fr  Sa  Su"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            weekday_header,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    let cells = month_grid(year, month, app.config.calendar.week_starts_sunday);
    let today = app.today();
    for week in cells.chunks(7) {
        let mut spans = Vec::new();
        for cell in week {
            match cell {
                Some(date) => {
                    let glyph = app
                        .log
                        .entry_on(*date)
                        .map(|e| e.mood.glyph())
                        .unwrap_or(' ');
                    let mut style = app
                        .log
                        .entry_on(*date)
                        .map(|e| Style::default().fg(mood_color(e.mood)))
                        .unwrap_or_default();
                    if *date == today {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    spans.push(Span::styled(
                        format!("{:>2}{} ", date.format("%e"), glyph),
                        style,
                    ));
                }
                None => spans.push(Span::raw("    ")),
            }
        }
        lines.push(Line::from(spans));
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", month_name)),
    );
    f.render_widget(calendar, area);
}

fn draw_chart(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new("Mood Frequency")
        .style(Style::default().fg(accent(app)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let counts = app.log.mood_counts();
    if app.log.is_empty() {
        let msg = Paragraph::new("No entries yet. Save a mood to see the chart.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(msg, chunks[1]);
    } else {
        let bars: Vec<Bar> = counts
            .iter()
            .map(|(mood, count)| {
                Bar::default()
                    .label(Line::from(mood.label()))
                    .value(*count as u64)
                    .style(Style::default().fg(mood_color(*mood)))
            })
            .collect();
        let chart = BarChart::default()
            .block(Block::default().borders(Borders::ALL))
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(2);
        f.render_widget(chart, chunks[1]);
    }

    let footer = Paragraph::new("q:Back  ?:Help")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Mood Tablet Keybindings

Tracker:
  1-6             Pick a mood
  n               Edit today's note
  Enter, s        Save today's entry
  h/l, Left/Right Previous/next month
  t               Jump to this month
  c               Frequency chart
  o               Log out
  q               Quit

Chart:
  q, Esc          Back to tracker

General:
  ?               Show this help

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_note_input(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 15, f.area());
    f.render_widget(Clear, area);

    let input = Paragraph::new(app.note_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Note for today "));
    f.render_widget(input, area);

    f.set_cursor_position((area.x + 1 + app.note_buffer.len() as u16, area.y + 1));
}

fn draw_message(f: &mut Frame, text: &str, kind: MessageType) {
    let area = Rect::new(
        f.area().x + 2,
        f.area().height.saturating_sub(5),
        f.area().width.saturating_sub(4),
        3,
    );
    f.render_widget(Clear, area);

    let color = match kind {
        MessageType::Info => Color::Cyan,
        MessageType::Success => Color::Green,
        MessageType::Error => Color::Red,
    };
    let message = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
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
