mod question_repository;
mod response_repository;

pub use question_repository::{QuestionRepository, SeedOutcome};
pub use response_repository::ResponseRepository;
