pub mod decoder;
pub mod engine;
pub mod mixer;
pub mod stream;
