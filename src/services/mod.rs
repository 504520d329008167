pub mod classifier;
pub mod excel;
pub mod gemini;
pub mod prompts;
