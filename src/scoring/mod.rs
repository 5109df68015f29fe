pub mod engine;
pub mod key;
pub mod rules;
pub mod types;
pub mod validation;

pub use engine::score;
pub use key::{AnswerKey, Group};
pub use types::{CardRef, Combination, ResultDetail, ScoreBreakdown, ScoreResult};
pub use validation::{validate_answer_key, validate_submission, ScoreError};
