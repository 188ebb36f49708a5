//! Application state management for the terminal quiz.
//!
//! This module ties the quiz controller to the wall-clock timer driver and
//! keeps the small amount of UI state (cursors, status line) the terminal
//! front end needs.

use crate::domain::{QuizController, QuizError, QuizResult, Resolution, Screen, SessionSnapshot, TickOutcome};
use crate::infrastructure::{TimerDriver, TimerEvent};
use std::time::{Duration, Instant};
use tracing::warn;

/// Entries on the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    StartQuiz,
    Leaderboard,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::StartQuiz, MenuItem::Leaderboard, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::StartQuiz => "Start quiz",
            MenuItem::Leaderboard => "View leaderboard",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Main application state.
///
/// Every controller call goes through here so that the timer driver is
/// re-synced right after the state it mirrors changes.
pub struct App {
    /// The quiz session controller
    pub controller: QuizController,
    /// Countdown and delayed-transition timers
    pub timers: TimerDriver,
    /// Highlighted main menu entry
    pub menu_index: usize,
    /// Highlighted answer option on the question screen
    pub selected_option: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Set once the user asks to leave
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: QuizController) -> Self {
        Self {
            controller,
            timers: TimerDriver::new(),
            menu_index: 0,
            selected_option: 0,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    pub fn screen(&self) -> Screen {
        self.controller.screen()
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_index.min(MenuItem::ALL.len() - 1)]
    }

    pub fn select_next_menu_item(&mut self) {
        self.menu_index = (self.menu_index + 1) % MenuItem::ALL.len();
    }

    pub fn select_previous_menu_item(&mut self) {
        self.menu_index = (self.menu_index + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    /// Runs whatever the highlighted main menu entry stands for.
    pub fn activate_menu_item(&mut self) {
        match self.selected_menu_item() {
            MenuItem::StartQuiz => self.start_quiz(),
            MenuItem::Leaderboard => self.show_leaderboard(),
            MenuItem::Quit => self.quit(),
        }
    }

    pub fn start_quiz(&mut self) {
        let result = self.controller.start_quiz();
        if result.is_ok() {
            self.selected_option = 0;
        }
        self.finish(result);
    }

    /// Answers the current question with `option`.
    pub fn submit_answer(&mut self, option: usize) {
        let result = self.controller.submit_answer(option).map(|_| ());
        self.finish(result);
    }

    /// Answers with whichever option the cursor is on.
    pub fn submit_selected(&mut self) {
        self.submit_answer(self.selected_option);
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + count - 1) % count;
        }
    }

    pub fn restart(&mut self) {
        let result = self.controller.restart();
        if result.is_ok() {
            self.menu_index = 0;
        }
        self.finish(result);
    }

    pub fn show_leaderboard(&mut self) {
        let result = self.controller.show_leaderboard();
        self.finish(result);
    }

    /// Drops the running session and goes back to the main menu.
    pub fn abandon(&mut self) {
        let result = self.controller.abandon();
        self.finish(result);
    }

    pub fn quit(&mut self) {
        self.timers.cancel_all();
        self.should_quit = true;
    }

    /// Dispatches every timer event due at `now` into the controller.
    ///
    /// Returns true when anything changed and the screen needs redrawing.
    pub fn process_timers(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for event in self.timers.poll(now) {
            changed |= match event {
                TimerEvent::Tick(tag) => self.controller.tick_tagged(tag) != TickOutcome::Ignored,
                TimerEvent::Delay(tag) => match self.controller.resolve_pending(tag) {
                    Resolution::NextQuestion(_) => {
                        self.selected_option = 0;
                        true
                    }
                    Resolution::Stale => false,
                    Resolution::Finished { .. } | Resolution::GameOver => true,
                },
            };
            // A resolved delay may start the next question's countdown
            self.timers.sync(&self.controller, now);
        }
        changed
    }

    /// How long the event loop may wait for input before timers need
    /// servicing.
    pub fn next_timeout(&self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    fn option_count(&self) -> usize {
        self.controller
            .current_question()
            .map(|q| q.options().len())
            .unwrap_or(0)
    }

    fn finish(&mut self, result: QuizResult<()>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(err) => self.report(err),
        }
        self.timers.sync(&self.controller, Instant::now());
    }

    fn report(&mut self, err: QuizError) {
        warn!(error = %err, "quiz operation rejected");
        self.status_message = Some(err.to_string());
    }
}
