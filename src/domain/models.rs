use super::errors::{QuizError, QuizResult};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Opaque handle to a question's illustration.
///
/// The controller never interprets it; the presentation layer decides
/// what (if anything) to draw for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single multiple-choice question.
///
/// Always holds at least one option and a correct index inside the option
/// range; deserialization goes through [`Question::new`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    text: String,
    image: ImageRef,
    options: Vec<String>,
    correct_answer_index: usize,
}

#[derive(Deserialize)]
struct RawQuestion {
    text: String,
    image: ImageRef,
    options: Vec<String>,
    correct_answer_index: usize,
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuizError;

    fn try_from(raw: RawQuestion) -> QuizResult<Self> {
        Question::new(raw.text, raw.image, raw.options, raw.correct_answer_index)
    }
}

impl Question {
    /// Builds a question, rejecting empty option lists and out-of-range
    /// correct indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokequiz::domain::{ImageRef, Question};
    ///
    /// let q = Question::new(
    ///     "Which type is Pikachu?",
    ///     ImageRef::new("pikachu"),
    ///     vec!["Fire".into(), "Electric".into()],
    ///     1,
    /// ).unwrap();
    /// assert!(q.is_correct(1));
    /// ```
    pub fn new(
        text: impl Into<String>,
        image: ImageRef,
        options: Vec<String>,
        correct_answer_index: usize,
    ) -> QuizResult<Self> {
        let text = text.into();
        if options.is_empty() {
            return Err(QuizError::InvalidQuestion(format!("\"{}\" has no options", text)));
        }
        if correct_answer_index >= options.len() {
            return Err(QuizError::InvalidQuestion(format!(
                "\"{}\" marks option {} correct but has only {} options",
                text,
                correct_answer_index,
                options.len()
            )));
        }
        Ok(Self {
            text,
            image,
            options,
            correct_answer_index,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer_index
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer_index
    }
}

/// Which logical screen is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Question,
    Leaderboard,
    GameOver,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::MainMenu => "main menu",
            Screen::Question => "question",
            Screen::Leaderboard => "leaderboard",
            Screen::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// Outcome of the most recent answer, kept only while the acknowledgment
/// delay runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerFeedback {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// Process-lifetime record of finished sessions' scores.
///
/// Cloning yields another handle onto the same scores, so the binary can
/// create one and hand it to every controller it builds.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    scores: Rc<RefCell<Vec<u32>>>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, score: u32) {
        self.scores.borrow_mut().push(score);
    }

    pub fn len(&self) -> usize {
        self.scores.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.borrow().is_empty()
    }

    /// Scores in insertion order.
    pub fn entries(&self) -> Vec<u32> {
        self.scores.borrow().clone()
    }

    /// Scores sorted for display, highest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokequiz::domain::Leaderboard;
    ///
    /// let board = Leaderboard::new();
    /// board.record(3);
    /// board.record(7);
    /// board.record(1);
    /// assert_eq!(board.ranked(), vec![7, 3, 1]);
    /// ```
    pub fn ranked(&self) -> Vec<u32> {
        let mut scores = self.entries();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores
    }
}

/// Timing knobs for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    /// Countdown length for each question, in whole seconds
    pub question_seconds: u32,
    /// How long answer feedback stays up before the quiz moves on
    pub answer_delay: Duration,
    /// Pause between the countdown hitting zero and the game over screen
    pub timeout_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_seconds: 30,
            answer_delay: Duration::from_secs(1),
            timeout_delay: Duration::from_secs(1),
        }
    }
}

impl QuizConfig {
    pub fn with_question_seconds(mut self, seconds: u32) -> QuizResult<Self> {
        if seconds == 0 {
            return Err(QuizError::InvalidConfig(
                "question time must be at least one second".to_string(),
            ));
        }
        self.question_seconds = seconds;
        Ok(self)
    }
}
