// Library interface for newspress modules
// This allows tests and other binaries to import modules

pub mod llm;
pub mod processing;
pub mod prompts;
