pub mod embedder;
pub mod judge;
pub mod nli;
