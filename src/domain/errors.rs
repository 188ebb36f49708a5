use super::models::Screen;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("cannot {operation} from the {screen} screen")]
    InvalidStateTransition {
        operation: &'static str,
        screen: Screen,
    },
    #[error("option {index} is out of range for a question with {options} options")]
    InvalidOptionIndex { index: usize, options: usize },
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
    #[error("question bank is empty")]
    EmptyBank,
    #[error("question bank could not be parsed: {0}")]
    BankFormat(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type QuizResult<T> = Result<T, QuizError>;
