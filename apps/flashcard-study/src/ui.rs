//! UI rendering for the flashcard study app.

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Row, Sparkline, Table, Wrap},
    Frame,
};

use crate::app::{App, InputField, MessageType, View};
use crate::session::CardFace;
use crate::stats;

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view {
        View::Instructions => draw_instructions(f),
        View::Dashboard => draw_dashboard(f, app),
        View::Study => draw_study(f, app),
        View::Stats => draw_stats(f, app),
    }

    if app.show_help {
        draw_help(f);
    }

    if app.editing {
        draw_input(f, app);
    }

    if let Some((text, kind)) = &app.message {
        draw_message(f, text, *kind);
    }
}

fn accent(app: &App) -> Color {
    if app.dark_mode {
        Color::Magenta
    } else {
        Color::Blue
    }
}

fn draw_instructions(f: &mut Frame) {
    let text = r#"
Welcome to Flashcard Study!

  1. Create categories for your subjects
  2. Add question/answer cards to them
  3. Pick a category and study: flip the card,
     then say whether you knew the answer
  4. Mastered cards and daily streaks earn XP

Everything is stored locally on this machine.

Press any key to get started
"#;

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Getting Started "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, centered_rect(60, 70, f.area()));
}

fn draw_dashboard(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let summary = app.store.summary();
    let header_text = format!(
        "Flashcard Study — {} cards, {} mastered, {} day streak",
        summary.total_cards,
        summary.mastered_cards,
        app.day_streak(),
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(accent(app)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    draw_category_list(f, app, body[0]);
    draw_dashboard_sidebar(f, app, body[1]);

    let footer = Paragraph::new(
        "j/k:Navigate  Enter:Study  a:Add category  c:Add card  s:Stats  t:Theme  ?:Help  q:Quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_category_list(f: &mut Frame, app: &App, area: Rect) {
    if app.collection.is_empty() {
        let msg = Paragraph::new("No categories yet. Press 'a' to add one.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Categories "));
        f.render_widget(msg, area);
        return;
    }

    let stats = stats::collection_stats(&app.collection, Utc::now());
    let items: Vec<ListItem> = stats
        .per_category
        .iter()
        .enumerate()
        .map(|(i, (name, cat))| {
            let selected = i == app.selected_category;
            let style = if selected {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let spans = vec![
                Span::styled(name.clone(), style),
                Span::raw(" - "),
                Span::styled(
                    format!("{} cards", cat.total),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(", "),
                Span::styled(
                    format!("{}% mastered", cat.mastery_percent()),
                    Style::default().fg(Color::Green),
                ),
            ];
            ListItem::new(Line::from(spans)).style(if selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            })
        })
        .collect();

    let list =
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Categories "));
    f.render_widget(list, area);
}

fn draw_dashboard_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(5)])
        .split(area);

    let stats = stats::collection_stats(&app.collection, Utc::now());
    let lines = vec![
        Line::from(format!("Total cards:      {}", stats.total)),
        Line::from(format!("Mastered:         {}", stats.mastered)),
        Line::from(format!("Overall mastery:  {}%", stats.mastery_percent())),
        Line::from(format!("Reviewed (24h):   {}", stats.recently_reviewed)),
        Line::from(format!("Day streak:       {}", app.day_streak())),
    ];
    let overview = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Overview "));
    f.render_widget(overview, chunks[0]);

    if app.config.display.show_activity_chart {
        let activity = stats::last_7_days_activity(&app.collection);
        let data: Vec<u64> = activity.iter().map(|(_, count)| *count as u64).collect();
        let chart = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(" Activity (7 days) "))
            .data(&data)
            .style(Style::default().fg(accent(app)));
        f.render_widget(chart, chunks[1]);
    }
}

fn draw_study(f: &mut Frame, app: &App) {
    let Some(session) = &app.session else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Card
            Constraint::Length(3), // Keys
        ])
        .split(f.area());

    let count = session.card_count(&app.collection);
    let stats = stats::collection_stats(&app.collection, Utc::now());
    let mastery = stats
        .per_category
        .iter()
        .find(|(name, _)| name == session.category())
        .map(|(_, cat)| cat.mastery_percent())
        .unwrap_or(0);

    let mut label = format!(
        "{} — Card {}/{} — {}% mastered",
        session.category(),
        session.index() + 1,
        count,
        mastery,
    );
    if app.config.display.show_session_xp {
        label.push_str(&format!(
            " — {} reviewed, {} XP this session",
            session.cards_reviewed(),
            session.xp_earned()
        ));
    }
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(f64::from(mastery) / 100.0)
        .label(label);
    f.render_widget(progress, chunks[0]);

    if let Some(card) = session.current_card(&app.collection) {
        match session.face() {
            CardFace::Question => {
                let front = Paragraph::new(card.question.as_str())
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title(" Question "))
                    .wrap(Wrap { trim: true });
                f.render_widget(front, chunks[1]);
            }
            CardFace::Answer => {
                let inner = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[1]);

                let front = Paragraph::new(card.question.as_str())
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title(" Question "))
                    .wrap(Wrap { trim: true });
                f.render_widget(front, inner[0]);

                let mut back_title = String::from(" Answer ");
                if !card.tags.is_empty() {
                    back_title = format!(" Answer [{}] ", card.tags.join(", "));
                }
                let back = Paragraph::new(card.answer.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Green))
                    .block(Block::default().borders(Borders::ALL).title(back_title))
                    .wrap(Wrap { trim: true });
                f.render_widget(back, inner[1]);
            }
        }
    }

    let keys = match session.face() {
        CardFace::Question => "Space:Flip  Right/k:I knew it  Left/d:Still learning  r:Shuffle  Esc:Back",
        CardFace::Answer => "Right/k:I knew it  Left/d:Still learning  Space:Flip back  r:Shuffle  Esc:Back",
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_stats(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new("Statistics")
        .style(Style::default().fg(accent(app)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let stats = stats::collection_stats(&app.collection, Utc::now());
    let rows: Vec<Row> = stats
        .per_category
        .iter()
        .map(|(name, cat)| {
            Row::new(vec![
                name.clone(),
                cat.total.to_string(),
                cat.mastered.to_string(),
                format!("{}%", cat.mastery_percent()),
                cat.recently_reviewed.to_string(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
        ],
    )
    .header(
        Row::new(vec!["Category", "Total", "Mastered", "Mastery", "Last 24h"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, chunks[1]);

    let footer = Paragraph::new("q:Back  ?:Help")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Flashcard Study Keybindings

Dashboard:
  j/k, Up/Down    Navigate categories
  Enter, Space    Study selected category
  a               Add category
  c               Add card
  s               Statistics
  t               Toggle dark mode
  q               Quit

Study:
  Space, Enter    Flip card
  Right, k        I knew it
  Left, d         Still learning
  r               Shuffle cards
  Esc, q          Back to dashboard

General:
  ?               Show this help

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_input(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 15, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_field {
        InputField::CategoryName => "New category name",
        InputField::CardCategory => "Card category",
        InputField::CardQuestion => "Question",
        InputField::CardAnswer => "Answer",
        InputField::CardTags => "Tags (comma separated, optional)",
        InputField::None => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    f.render_widget(input, area);

    f.set_cursor_position((area.x + 1 + app.input_buffer.len() as u16, area.y + 1));
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
