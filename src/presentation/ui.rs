use crate::application::{App, MenuItem};
use crate::domain::{AnswerFeedback, Screen, SessionSnapshot};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let snapshot = app.snapshot();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, &snapshot, chunks[0]);
    match snapshot.screen {
        Screen::MainMenu => render_main_menu(f, app, chunks[1]),
        Screen::Question => render_question(f, app, &snapshot, chunks[1]),
        Screen::Leaderboard => render_leaderboard(f, &snapshot, chunks[1]),
        Screen::GameOver => render_game_over(f, &snapshot, chunks[1]),
    }
    render_status_bar(f, app, &snapshot, chunks[2]);
}

fn render_header(f: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let text = match snapshot.screen {
        Screen::Question => format!(
            "pokequiz | Question {}/{} | Score: {}",
            snapshot.current_index + 1,
            snapshot.total_questions,
            snapshot.score
        ),
        _ => "pokequiz - Pokémon Trivia".to_string(),
    };
    let header = Paragraph::new(text).style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_main_menu(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.menu_index {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(item.label()).alignment(Alignment::Center)).style(style)
        })
        .collect();

    let menu = List::new(items).block(Block::default().borders(Borders::ALL).title("Main Menu"));
    f.render_widget(menu, centered(area, 40, 5));
}

fn render_question(f: &mut Frame, app: &App, snapshot: &SessionSnapshot, area: Rect) {
    let Some(question) = snapshot.question.as_ref() else {
        return;
    };

    let feedback_style = match snapshot.last_answer {
        AnswerFeedback::Correct => Style::default().bg(Color::Green).fg(Color::Black),
        AnswerFeedback::Incorrect => Style::default().bg(Color::Red).fg(Color::White),
        AnswerFeedback::Unknown => Style::default(),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(question.options().len() as u16 + 2),
            Constraint::Length(3),
        ])
        .split(area);

    let text = Paragraph::new(question.text())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"))
        .style(feedback_style);
    f.render_widget(text, chunks[0]);

    let image = Paragraph::new(format!("[image: {}]", question.image().as_str()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(image, chunks[1]);

    let items: Vec<ListItem> = question
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if i == app.selected_option && !snapshot.input_locked {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if snapshot.input_locked && i == question.correct_answer_index()
                && snapshot.last_answer != AnswerFeedback::Unknown
            {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}. {}", i + 1, option)).style(style)
        })
        .collect();
    let options = List::new(items).block(Block::default().borders(Borders::ALL).title("Options"));
    f.render_widget(options, chunks[2]);

    render_countdown(f, snapshot, app.controller.config().question_seconds, chunks[3]);
}

fn render_countdown(f: &mut Frame, snapshot: &SessionSnapshot, total: u32, area: Rect) {
    let ratio = if total == 0 {
        0.0
    } else {
        f64::from(snapshot.time_remaining) / f64::from(total)
    };
    let color = if snapshot.time_remaining <= 5 { Color::Red } else { Color::Yellow };
    let label = if snapshot.time_remaining == 0 {
        "Time's up!".to_string()
    } else {
        format!("Time remaining: {} s", snapshot.time_remaining)
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Timer"))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_leaderboard(f: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let items: Vec<ListItem> = if snapshot.leaderboard.is_empty() {
        vec![ListItem::new("No scores yet")]
    } else {
        snapshot
            .leaderboard
            .iter()
            .enumerate()
            .map(|(i, score)| ListItem::new(format!("Player {}: {} points", i + 1, score)))
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Leaderboard"));
    f.render_widget(list, area);
}

fn render_game_over(f: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let text = vec![
        Line::from("You lost!").style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(format!(
            "Time ran out on question {} of {}.",
            snapshot.current_index + 1,
            snapshot.total_questions
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Game Over"));
    f.render_widget(paragraph, centered(area, 50, 5));
}

fn render_status_bar(f: &mut Frame, app: &App, snapshot: &SessionSnapshot, area: Rect) {
    let text = if let Some(ref status) = app.status_message {
        status.clone()
    } else {
        match snapshot.screen {
            Screen::MainMenu => "↑↓: choose | Enter: select | s: start | l: leaderboard | q: quit".to_string(),
            Screen::Question if snapshot.input_locked => match snapshot.last_answer {
                AnswerFeedback::Correct => "Correct!".to_string(),
                AnswerFeedback::Incorrect => "Wrong answer".to_string(),
                AnswerFeedback::Unknown => "Time's up!".to_string(),
            },
            Screen::Question => "1-9: answer | ↑↓ + Enter: answer | Esc: back to menu".to_string(),
            Screen::Leaderboard | Screen::GameOver => {
                "Enter: play again | r: main menu | q: quit".to_string()
            }
        }
    };

    let style = match snapshot.last_answer {
        AnswerFeedback::Correct => Style::default().fg(Color::Green),
        AnswerFeedback::Incorrect => Style::default().fg(Color::Red),
        AnswerFeedback::Unknown if app.status_message.is_some() => Style::default().fg(Color::Yellow),
        AnswerFeedback::Unknown => Style::default(),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leaderboard, QuestionBank, QuizConfig, QuizController};
    use ratatui::{backend::TestBackend, Terminal};

    fn app_with(leaderboard: Leaderboard) -> App {
        let bank = QuestionBank::builtin().unwrap();
        App::new(QuizController::with_seed(bank, leaderboard, QuizConfig::default(), 8))
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_main_menu_render() {
        let app = app_with(Leaderboard::new());
        let screen = render(&app);
        assert!(screen.contains("Main Menu"));
        assert!(screen.contains("Start quiz"));
        assert!(screen.contains("View leaderboard"));
    }

    #[test]
    fn test_question_render_shows_timer_and_options() {
        let mut app = app_with(Leaderboard::new());
        app.start_quiz();
        let screen = render(&app);
        let question = app.controller.current_question().unwrap();

        assert!(screen.contains("Question 1/10"));
        assert!(screen.contains("Time remaining: 30 s"));
        assert!(screen.contains(&format!("1. {}", question.options()[0])));
        assert!(screen.contains(&format!("[image: {}]", question.image().as_str())));
    }

    #[test]
    fn test_feedback_render() {
        let mut app = app_with(Leaderboard::new());
        app.start_quiz();
        let correct = app.controller.current_question().unwrap().correct_answer_index();
        app.submit_answer(correct);

        assert!(render(&app).contains("Correct!"));
    }

    #[test]
    fn test_leaderboard_render_sorted() {
        let leaderboard = Leaderboard::new();
        leaderboard.record(3);
        leaderboard.record(7);
        leaderboard.record(1);
        let mut app = app_with(leaderboard);
        app.show_leaderboard();

        let screen = render(&app);
        let first = screen.find("Player 1: 7 points").unwrap();
        let second = screen.find("Player 2: 3 points").unwrap();
        let third = screen.find("Player 3: 1 points").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_empty_leaderboard_render() {
        let mut app = app_with(Leaderboard::new());
        app.show_leaderboard();
        assert!(render(&app).contains("No scores yet"));
    }

    #[test]
    fn test_status_message_render() {
        let mut app = app_with(Leaderboard::new());
        app.restart();
        assert!(render(&app).contains("cannot restart from the main menu screen"));
    }

    #[test]
    fn test_centered_fits_small_area() {
        let area = Rect { x: 0, y: 0, width: 20, height: 3 };
        let rect = centered(area, 40, 5);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 3);
    }
}
