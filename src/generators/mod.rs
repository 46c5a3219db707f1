//! Text generation backends.

pub mod generator;
pub mod openai;
pub mod scripted;

pub use generator::TextGenerator;
pub use openai::OpenAiGenerator;
pub use scripted::ScriptedGenerator;
