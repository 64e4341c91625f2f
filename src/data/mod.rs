//! Raw records, fixed vocabularies, and categorical encoding.
//!
//! This module owns everything upstream of feature construction:
//!
//! - [`Record`]: one diamond observation (CSV row or JSON request body)
//! - [`Vocabulary`]: the fixed ordered value sets for cut, color, and clarity
//! - [`encode`]: one-hot and ordinal encodings over those vocabularies
//! - [`load_records`]: CSV loading for training and reference data

pub mod encode;
mod io;
mod record;
pub mod vocab;

pub use encode::{one_hot_columns, one_hot_fill, one_hot_width, ordinal_code, ValidationError};
pub use io::{load_records, DataError};
pub use record::Record;
pub use vocab::{Vocabulary, CLARITY, COLOR, CUT};
