pub mod extract;
pub mod images;
pub mod llm;
