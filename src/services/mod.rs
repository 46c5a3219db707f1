pub mod openai_client;
pub mod prompts;
pub mod retry;
