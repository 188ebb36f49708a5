//! The fixed question bank quizzes draw from.

use super::errors::{QuizError, QuizResult};
use super::models::Question;
use rand::Rng;
use rand::seq::SliceRandom;

const BUILTIN_QUESTIONS: &str = include_str!("questions.json");

/// Non-empty, read-only list of every available question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> QuizResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        Ok(Self { questions })
    }

    /// Parses a bank from a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::BankFormat`] for malformed JSON or invalid
    /// questions and [`QuizError::EmptyBank`] for an empty array.
    pub fn from_json(json: &str) -> QuizResult<Self> {
        let questions: Vec<Question> =
            serde_json::from_str(json).map_err(|e| QuizError::BankFormat(e.to_string()))?;
        Self::new(questions)
    }

    /// The ten Pokémon questions bundled with the game.
    pub fn builtin() -> QuizResult<Self> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns a fresh random permutation of the bank.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question> {
        let mut questions = self.questions.clone();
        questions.shuffle(rng);
        questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_builtin_bank_loads() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.len(), 10);
        for question in bank.questions() {
            assert_eq!(question.options().len(), 4);
            assert!(question.correct_answer_index() < 4);
        }
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert_eq!(QuestionBank::from_json("[]"), Err(QuizError::EmptyBank));
        assert_eq!(QuestionBank::new(Vec::new()), Err(QuizError::EmptyBank));
    }

    #[test]
    fn test_malformed_bank_rejected() {
        let result = QuestionBank::from_json("{not json");
        assert!(matches!(result, Err(QuizError::BankFormat(_))));

        let invalid = r#"[{"text":"Q","image":"i","options":[],"correct_answer_index":0}]"#;
        assert!(matches!(QuestionBank::from_json(invalid), Err(QuizError::BankFormat(_))));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let bank = QuestionBank::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = bank.shuffled(&mut rng);

        assert_eq!(shuffled.len(), bank.len());
        for question in bank.questions() {
            assert!(shuffled.contains(question));
        }
    }

    #[test]
    fn test_shuffle_deterministic_with_seed() {
        let bank = QuestionBank::builtin().unwrap();
        let first = bank.shuffled(&mut StdRng::seed_from_u64(42));
        let second = bank.shuffled(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
