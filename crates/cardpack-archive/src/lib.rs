//! In-memory ZIP assembly and atomic delivery for exported ID cards.
//!
//! # Architecture
//!
//! - `name.rs` - member and archive filename derivation
//! - `assembler.rs` - ordered entry accumulation and ZIP encoding
//! - `deliver.rs` - temp-then-rename placement on disk

pub use assembler::Assembler;
pub use deliver::deliver;
pub use error::{Error, Result};
pub use name::{archive_name, collapse_whitespace, member_name, single_card_name};

mod assembler;
mod deliver;
mod error;
mod name;
