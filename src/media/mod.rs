//! Media module for item representation and parsing.

pub mod item;
pub mod parser;

pub use item::Item;
pub use parser::{parse_gif, select_url, QUALITY_PREFERENCE};
