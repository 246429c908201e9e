// src/engine/mod.rs
pub mod dates;
pub mod fields;
pub mod types;

mod engine;

pub use engine::Extractor;
pub use types::{InlineDate, PageShape, SlotTable};
