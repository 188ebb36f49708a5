//! Quiz session controller.
//!
//! Owns all mutable session state and exposes the transitions a
//! presentation layer drives: starting a quiz, answering, countdown ticks
//! and returning to the menu. Delayed transitions (the answer
//! acknowledgment and the time's-up pause) are not executed here; the
//! controller only records them as [`PendingTransition`]s tagged with the
//! question they belong to, and an external timer resolves them.

use super::bank::QuestionBank;
use super::errors::{QuizError, QuizResult};
use super::models::{AnswerFeedback, Leaderboard, Question, QuizConfig, Screen};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identifies which question of which session a timer was armed for.
///
/// The epoch changes every time a session starts or is torn down, so a tag
/// captured before that point can never match again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag {
    pub epoch: u64,
    pub question: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    /// Move to the next question, or to the leaderboard after the last one
    Advance,
    /// Time ran out; show the game over screen
    GameOver,
}

/// A transition the controller is waiting on an external delay to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub tag: TimerTag,
    pub kind: PendingKind,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown moved on; carries the seconds left
    Counting(u32),
    /// Countdown reached zero and a game over is now pending
    TimeUp,
    /// No countdown is running, or the tick belonged to another question
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    NextQuestion(usize),
    Finished { score: u32 },
    GameOver,
    /// The tag no longer matches anything pending
    Stale,
}

/// Mutable state of the session in progress.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: u32,
    pub time_remaining: u32,
    pub screen: Screen,
    pub last_answer: AnswerFeedback,
}

/// Read-only copy of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub screen: Screen,
    pub question: Option<Question>,
    pub current_index: usize,
    pub total_questions: usize,
    pub score: u32,
    pub time_remaining: u32,
    pub last_answer: AnswerFeedback,
    /// True while an answer or timeout transition is pending
    pub input_locked: bool,
    pub leaderboard: Vec<u32>,
}

pub struct QuizController {
    bank: QuestionBank,
    leaderboard: Leaderboard,
    config: QuizConfig,
    rng: StdRng,
    state: SessionState,
    epoch: u64,
    pending: Option<PendingTransition>,
}

impl QuizController {
    /// Creates a controller sitting on the main menu.
    ///
    /// The leaderboard handle is shared: scores recorded here stay visible
    /// to whoever else holds a clone of it.
    pub fn new(bank: QuestionBank, leaderboard: Leaderboard, config: QuizConfig) -> Self {
        Self::with_rng(bank, leaderboard, config, StdRng::from_os_rng())
    }

    /// Same as [`QuizController::new`] but with a deterministic shuffle.
    pub fn with_seed(bank: QuestionBank, leaderboard: Leaderboard, config: QuizConfig, seed: u64) -> Self {
        Self::with_rng(bank, leaderboard, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bank: QuestionBank, leaderboard: Leaderboard, config: QuizConfig, rng: StdRng) -> Self {
        let questions = bank.questions().to_vec();
        Self {
            bank,
            leaderboard,
            config,
            rng,
            state: SessionState {
                questions,
                current_index: 0,
                score: 0,
                time_remaining: config.question_seconds,
                screen: Screen::MainMenu,
                last_answer: AnswerFeedback::Unknown,
            },
            epoch: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state.screen {
            Screen::Question => self.state.questions.get(self.state.current_index),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// Tag the running countdown must carry, or `None` when no countdown
    /// should be running at all.
    pub fn countdown_tag(&self) -> Option<TimerTag> {
        if self.state.screen == Screen::Question && self.pending.is_none() {
            Some(self.current_tag())
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            screen: self.state.screen,
            question: self.current_question().cloned(),
            current_index: self.state.current_index,
            total_questions: self.state.questions.len(),
            score: self.state.score,
            time_remaining: self.state.time_remaining,
            last_answer: self.state.last_answer,
            input_locked: self.pending.is_some(),
            leaderboard: self.leaderboard.ranked(),
        }
    }

    /// Begins a fresh session with a newly shuffled bank.
    ///
    /// # Errors
    ///
    /// [`QuizError::InvalidStateTransition`] while a question is active.
    pub fn start_quiz(&mut self) -> QuizResult<()> {
        self.require(
            "start the quiz",
            &[Screen::MainMenu, Screen::Leaderboard, Screen::GameOver],
        )?;

        self.state.questions = self.bank.shuffled(&mut self.rng);
        self.reset_counters();
        self.state.screen = Screen::Question;
        info!(epoch = self.epoch, questions = self.state.questions.len(), "quiz started");
        Ok(())
    }

    /// Scores the given option and schedules the move to the next state.
    ///
    /// # Errors
    ///
    /// [`QuizError::InvalidStateTransition`] outside an unlocked question,
    /// [`QuizError::InvalidOptionIndex`] when `option` is out of range.
    pub fn submit_answer(&mut self, option: usize) -> QuizResult<AnswerFeedback> {
        self.require("submit an answer", &[Screen::Question])?;
        if self.pending.is_some() {
            return Err(self.reject("submit an answer"));
        }

        let question = &self.state.questions[self.state.current_index];
        let options = question.options().len();
        if option >= options {
            warn!(option, options, "answer index out of range");
            return Err(QuizError::InvalidOptionIndex { index: option, options });
        }

        let feedback = if question.is_correct(option) {
            self.state.score += 1;
            AnswerFeedback::Correct
        } else {
            AnswerFeedback::Incorrect
        };
        self.state.last_answer = feedback;
        self.pending = Some(PendingTransition {
            tag: self.current_tag(),
            kind: PendingKind::Advance,
            delay: self.config.answer_delay,
        });
        debug!(
            question = self.state.current_index,
            option,
            ?feedback,
            score = self.state.score,
            "answer submitted"
        );
        Ok(feedback)
    }

    /// Advances the countdown by one second.
    ///
    /// A no-op unless a question is on screen and still waiting for an
    /// answer.
    pub fn tick(&mut self) -> TickOutcome {
        if self.countdown_tag().is_none() {
            return TickOutcome::Ignored;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining > 0 {
            return TickOutcome::Counting(self.state.time_remaining);
        }

        self.pending = Some(PendingTransition {
            tag: self.current_tag(),
            kind: PendingKind::GameOver,
            delay: self.config.timeout_delay,
        });
        info!(question = self.state.current_index, "time is up");
        TickOutcome::TimeUp
    }

    /// Like [`QuizController::tick`], but drops ticks from a countdown armed
    /// for a different question or session.
    pub fn tick_tagged(&mut self, tag: TimerTag) -> TickOutcome {
        if self.countdown_tag() != Some(tag) {
            debug!(?tag, "stale countdown tick discarded");
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    /// Applies the pending transition if `tag` still identifies it.
    pub fn resolve_pending(&mut self, tag: TimerTag) -> Resolution {
        let pending = match self.pending {
            Some(pending) if pending.tag == tag => pending,
            _ => {
                debug!(?tag, "stale delayed transition discarded");
                return Resolution::Stale;
            }
        };
        self.pending = None;
        self.state.last_answer = AnswerFeedback::Unknown;

        match pending.kind {
            PendingKind::Advance if self.state.current_index + 1 < self.state.questions.len() => {
                self.state.current_index += 1;
                self.state.time_remaining = self.config.question_seconds;
                Resolution::NextQuestion(self.state.current_index)
            }
            PendingKind::Advance => {
                let score = self.state.score;
                self.leaderboard.record(score);
                self.state.screen = Screen::Leaderboard;
                info!(score, "quiz finished");
                Resolution::Finished { score }
            }
            PendingKind::GameOver => {
                self.state.screen = Screen::GameOver;
                info!(score = self.state.score, "game over");
                Resolution::GameOver
            }
        }
    }

    /// Returns to the main menu from a finished session.
    ///
    /// The leaderboard is left untouched.
    ///
    /// # Errors
    ///
    /// [`QuizError::InvalidStateTransition`] unless on the leaderboard or
    /// game over screen.
    pub fn restart(&mut self) -> QuizResult<()> {
        self.require("restart", &[Screen::Leaderboard, Screen::GameOver])?;
        self.reset_counters();
        self.state.screen = Screen::MainMenu;
        Ok(())
    }

    /// Opens the leaderboard straight from the main menu.
    ///
    /// # Errors
    ///
    /// [`QuizError::InvalidStateTransition`] outside the main menu.
    pub fn show_leaderboard(&mut self) -> QuizResult<()> {
        self.require("view the leaderboard", &[Screen::MainMenu])?;
        self.state.screen = Screen::Leaderboard;
        Ok(())
    }

    /// Tears down the active session without recording a score.
    ///
    /// Any pending delayed transition is cancelled.
    ///
    /// # Errors
    ///
    /// [`QuizError::InvalidStateTransition`] when no question is active.
    pub fn abandon(&mut self) -> QuizResult<()> {
        self.require("abandon the quiz", &[Screen::Question])?;
        info!(question = self.state.current_index, score = self.state.score, "quiz abandoned");
        self.reset_counters();
        self.state.screen = Screen::MainMenu;
        Ok(())
    }

    fn reset_counters(&mut self) {
        self.epoch += 1;
        self.pending = None;
        self.state.current_index = 0;
        self.state.score = 0;
        self.state.time_remaining = self.config.question_seconds;
        self.state.last_answer = AnswerFeedback::Unknown;
    }

    fn current_tag(&self) -> TimerTag {
        TimerTag {
            epoch: self.epoch,
            question: self.state.current_index,
        }
    }

    fn require(&self, operation: &'static str, allowed: &[Screen]) -> QuizResult<()> {
        if allowed.contains(&self.state.screen) {
            Ok(())
        } else {
            Err(self.reject(operation))
        }
    }

    fn reject(&self, operation: &'static str) -> QuizError {
        warn!(operation, screen = %self.state.screen, "rejected state transition");
        QuizError::InvalidStateTransition {
            operation,
            screen: self.state.screen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageRef;

    fn question(text: &str, correct: usize) -> Question {
        let options = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        Question::new(text, ImageRef::new(text), options, correct).unwrap()
    }

    fn controller_with(questions: Vec<Question>) -> QuizController {
        let bank = QuestionBank::new(questions).unwrap();
        QuizController::with_seed(bank, Leaderboard::new(), QuizConfig::default(), 1)
    }

    fn builtin_controller() -> QuizController {
        let bank = QuestionBank::builtin().unwrap();
        QuizController::with_seed(bank, Leaderboard::new(), QuizConfig::default(), 99)
    }

    fn resolve(controller: &mut QuizController) -> Resolution {
        let pending = controller.pending().expect("a pending transition");
        controller.resolve_pending(pending.tag)
    }

    fn correct_index(controller: &QuizController) -> usize {
        controller.current_question().unwrap().correct_answer_index()
    }

    #[test]
    fn test_starts_on_main_menu() {
        let controller = builtin_controller();
        assert_eq!(controller.screen(), Screen::MainMenu);
        assert!(controller.current_question().is_none());
        assert!(controller.countdown_tag().is_none());
    }

    #[test]
    fn test_start_quiz_resets_session() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        let state = controller.state();
        assert_eq!(state.screen, Screen::Question);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_remaining, 30);
        assert_eq!(state.questions.len(), 10);
        assert!(controller.countdown_tag().is_some());
    }

    #[test]
    fn test_start_quiz_rejected_while_active() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        let err = controller.start_quiz().unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidStateTransition {
                operation: "start the quiz",
                screen: Screen::Question,
            }
        );
    }

    #[test]
    fn test_correct_answer_scores_one() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        let feedback = controller.submit_answer(correct_index(&controller)).unwrap();
        assert_eq!(feedback, AnswerFeedback::Correct);
        assert_eq!(controller.state().score, 1);
        assert_eq!(controller.state().last_answer, AnswerFeedback::Correct);
    }

    #[test]
    fn test_wrong_answer_keeps_score() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        let wrong = (correct_index(&controller) + 1) % 4;
        let feedback = controller.submit_answer(wrong).unwrap();
        assert_eq!(feedback, AnswerFeedback::Incorrect);
        assert_eq!(controller.state().score, 0);
    }

    #[test]
    fn test_out_of_range_answer_rejected_without_mutation() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        let err = controller.submit_answer(4).unwrap_err();
        assert_eq!(err, QuizError::InvalidOptionIndex { index: 4, options: 4 });
        assert_eq!(controller.state().score, 0);
        assert_eq!(controller.state().last_answer, AnswerFeedback::Unknown);
        assert!(controller.pending().is_none());
    }

    #[test]
    fn test_answer_rejected_outside_question() {
        let mut controller = builtin_controller();
        assert!(matches!(
            controller.submit_answer(0),
            Err(QuizError::InvalidStateTransition { screen: Screen::MainMenu, .. })
        ));
    }

    #[test]
    fn test_second_answer_during_acknowledgment_rejected() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.submit_answer(correct_index(&controller)).unwrap();

        assert!(matches!(
            controller.submit_answer(0),
            Err(QuizError::InvalidStateTransition { .. })
        ));
        assert_eq!(controller.state().score, 1);
    }

    #[test]
    fn test_feedback_held_until_delay_resolves() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.submit_answer(correct_index(&controller)).unwrap();

        let pending = controller.pending().unwrap();
        assert_eq!(pending.kind, PendingKind::Advance);
        assert_eq!(pending.delay, Duration::from_secs(1));
        assert_eq!(controller.state().current_index, 0);
        assert!(controller.snapshot().input_locked);

        assert_eq!(resolve(&mut controller), Resolution::NextQuestion(1));
        assert_eq!(controller.state().last_answer, AnswerFeedback::Unknown);
        assert_eq!(controller.state().time_remaining, 30);
    }

    #[test]
    fn test_two_question_scenario() {
        let mut controller = controller_with(vec![question("first", 2), question("second", 1)]);
        controller.start_quiz().unwrap();

        // Shuffle may reorder the bank; answer by text
        let answer_for = |c: &QuizController, right: bool| {
            let q = c.current_question().unwrap();
            let correct = q.correct_answer_index();
            if right { correct } else { (correct + 1) % 4 }
        };

        let first = answer_for(&controller, true);
        controller.submit_answer(first).unwrap();
        assert_eq!(resolve(&mut controller), Resolution::NextQuestion(1));
        assert_eq!(controller.state().current_index, 1);
        assert_eq!(controller.state().score, 1);

        let second = answer_for(&controller, false);
        controller.submit_answer(second).unwrap();
        assert_eq!(resolve(&mut controller), Resolution::Finished { score: 1 });
        assert_eq!(controller.screen(), Screen::Leaderboard);
        assert_eq!(controller.leaderboard().entries(), vec![1]);
    }

    #[test]
    fn test_literal_two_question_scenario() {
        let mut controller = controller_with(vec![question("first", 2), question("second", 1)]);
        controller.start_quiz().unwrap();
        // Reshuffle until the bank comes up in its original order
        while controller.current_question().unwrap().text() != "first" {
            controller.abandon().unwrap();
            controller.start_quiz().unwrap();
        }

        controller.submit_answer(2).unwrap();
        resolve(&mut controller);
        assert_eq!(controller.state().current_index, 1);
        assert_eq!(controller.state().score, 1);

        controller.submit_answer(0).unwrap();
        resolve(&mut controller);
        assert_eq!(controller.screen(), Screen::Leaderboard);
        assert_eq!(controller.leaderboard().entries(), vec![1]);
    }

    #[test]
    fn test_full_run_adds_single_leaderboard_entry() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();

        for i in 0..10 {
            let option = if i % 2 == 0 { correct_index(&controller) } else { (correct_index(&controller) + 1) % 4 };
            controller.submit_answer(option).unwrap();
            let score = controller.state().score;
            assert!(score as usize <= controller.state().questions.len());
            resolve(&mut controller);
        }

        assert_eq!(controller.screen(), Screen::Leaderboard);
        assert_eq!(controller.leaderboard().entries(), vec![5]);
    }

    #[test]
    fn test_thirty_ticks_end_in_game_over() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.submit_answer(correct_index(&controller)).unwrap();
        resolve(&mut controller);

        for _ in 0..29 {
            assert!(matches!(controller.tick(), TickOutcome::Counting(_)));
        }
        assert_eq!(controller.tick(), TickOutcome::TimeUp);
        assert_eq!(controller.state().time_remaining, 0);
        // Still on the question during the pause
        assert_eq!(controller.screen(), Screen::Question);

        assert_eq!(resolve(&mut controller), Resolution::GameOver);
        assert_eq!(controller.screen(), Screen::GameOver);
        assert!(controller.leaderboard().is_empty());
    }

    #[test]
    fn test_tick_outside_question_is_noop() {
        let mut controller = builtin_controller();
        assert_eq!(controller.tick(), TickOutcome::Ignored);
        assert_eq!(controller.state().time_remaining, 30);
    }

    #[test]
    fn test_tick_ignored_while_answer_pending() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.tick();
        controller.submit_answer(0).unwrap();

        assert_eq!(controller.tick(), TickOutcome::Ignored);
        assert_eq!(controller.state().time_remaining, 29);
    }

    #[test]
    fn test_stale_tick_discarded_after_question_advances() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        let first_tag = controller.countdown_tag().unwrap();

        controller.submit_answer(0).unwrap();
        resolve(&mut controller);

        assert_eq!(controller.tick_tagged(first_tag), TickOutcome::Ignored);
        assert_eq!(controller.state().time_remaining, 30);

        let current = controller.countdown_tag().unwrap();
        assert_eq!(current.question, 1);
        assert_eq!(controller.tick_tagged(current), TickOutcome::Counting(29));
    }

    #[test]
    fn test_stale_resolution_after_abandon() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.submit_answer(correct_index(&controller)).unwrap();
        let tag = controller.pending().unwrap().tag;

        controller.abandon().unwrap();
        assert_eq!(controller.screen(), Screen::MainMenu);
        assert!(controller.pending().is_none());

        // Starting again must not let the old delay advance the new session
        controller.start_quiz().unwrap();
        assert_eq!(controller.resolve_pending(tag), Resolution::Stale);
        assert_eq!(controller.state().current_index, 0);
        assert!(controller.leaderboard().is_empty());
    }

    #[test]
    fn test_restart_then_start_resets() {
        let mut controller = builtin_controller();
        controller.start_quiz().unwrap();
        controller.submit_answer(correct_index(&controller)).unwrap();
        resolve(&mut controller);
        for _ in 0..30 {
            controller.tick();
        }
        resolve(&mut controller);
        assert_eq!(controller.screen(), Screen::GameOver);

        controller.restart().unwrap();
        assert_eq!(controller.screen(), Screen::MainMenu);
        controller.start_quiz().unwrap();

        let state = controller.state();
        assert_eq!(state.current_index, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_remaining, 30);
    }

    #[test]
    fn test_restart_keeps_leaderboard() {
        let mut controller = controller_with(vec![question("only", 0)]);
        controller.start_quiz().unwrap();
        controller.submit_answer(0).unwrap();
        resolve(&mut controller);

        controller.restart().unwrap();
        assert_eq!(controller.leaderboard().entries(), vec![1]);
    }

    #[test]
    fn test_restart_rejected_from_menu_and_question() {
        let mut controller = builtin_controller();
        assert!(controller.restart().is_err());
        controller.start_quiz().unwrap();
        assert!(controller.restart().is_err());
    }

    #[test]
    fn test_show_leaderboard_from_menu_only() {
        let mut controller = builtin_controller();
        controller.show_leaderboard().unwrap();
        assert_eq!(controller.screen(), Screen::Leaderboard);
        assert!(controller.show_leaderboard().is_err());

        // A fresh quiz can start straight from the leaderboard
        controller.start_quiz().unwrap();
        assert_eq!(controller.screen(), Screen::Question);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let leaderboard = Leaderboard::new();
        leaderboard.record(3);
        leaderboard.record(7);
        leaderboard.record(1);
        let bank = QuestionBank::builtin().unwrap();
        let mut controller = QuizController::with_seed(bank, leaderboard, QuizConfig::default(), 5);
        controller.start_quiz().unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.screen, Screen::Question);
        assert!(snapshot.question.is_some());
        assert_eq!(snapshot.total_questions, 10);
        assert_eq!(snapshot.time_remaining, 30);
        assert!(!snapshot.input_locked);
        assert_eq!(snapshot.leaderboard, vec![7, 3, 1]);
    }

    #[test]
    fn test_custom_question_time() {
        let config = QuizConfig::default().with_question_seconds(3).unwrap();
        let bank = QuestionBank::builtin().unwrap();
        let mut controller = QuizController::with_seed(bank, Leaderboard::new(), config, 0);
        controller.start_quiz().unwrap();

        assert_eq!(controller.tick(), TickOutcome::Counting(2));
        assert_eq!(controller.tick(), TickOutcome::Counting(1));
        assert_eq!(controller.tick(), TickOutcome::TimeUp);
    }
}
