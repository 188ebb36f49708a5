use crate::application::App;
use crate::domain::Screen;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            app.quit();
            return;
        }

        match app.screen() {
            Screen::MainMenu => Self::handle_main_menu(app, key),
            Screen::Question => Self::handle_question(app, key),
            Screen::Leaderboard | Screen::GameOver => Self::handle_finished(app, key),
        }
    }

    fn handle_main_menu(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_menu_item(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_menu_item(),
            KeyCode::Enter => app.activate_menu_item(),
            KeyCode::Char('s') => app.start_quiz(),
            KeyCode::Char('l') => app.show_leaderboard(),
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
            _ => {}
        }
    }

    fn handle_question(app: &mut App, key: KeyCode) {
        // Feedback is on screen; wait for the delay to move things along
        if app.snapshot().input_locked {
            if key == KeyCode::Esc {
                app.abandon();
            }
            return;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
            KeyCode::Enter => app.submit_selected(),
            KeyCode::Char(c @ '1'..='9') => {
                let option = c as usize - '1' as usize;
                let available = app
                    .controller
                    .current_question()
                    .map(|q| q.options().len())
                    .unwrap_or(0);
                // Digits past the last option are not offered
                if option < available {
                    app.submit_answer(option);
                }
            }
            KeyCode::Esc => app.abandon(),
            _ => {}
        }
    }

    fn handle_finished(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.start_quiz(),
            KeyCode::Char('r') | KeyCode::Esc => app.restart(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        }
    }
}
