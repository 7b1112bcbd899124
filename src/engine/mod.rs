pub mod engine;
pub mod protocol;
pub mod roles;

pub mod llm_client;
pub mod prompt_builder;
