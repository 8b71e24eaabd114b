pub mod diagnosis;
pub mod error;
pub mod json_extract;
pub mod openai;
pub mod prompt;
