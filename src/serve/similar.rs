//! Similar-diamond lookup over the reference dataset.

use serde::Deserialize;

use crate::data::vocab::{CLARITY, COLOR, CUT};
use crate::data::{Record, ValidationError};

use super::ServeError;

fn default_n() -> usize {
    5
}

/// A similarity query: exact categorical match, ranked by weight proximity.
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarQuery {
    pub cut: String,
    pub color: String,
    pub clarity: String,
    /// Carat weight to rank against.
    pub weight: f32,
    /// Number of records to return.
    #[serde(default = "default_n")]
    pub n: usize,
}

/// Find the `n` records matching the query's cut/color/clarity exactly,
/// nearest in carat weight first. Ties keep the reference dataset's order
/// (stable sort).
pub fn find_similar(records: &[Record], query: &SimilarQuery) -> Result<Vec<Record>, ServeError> {
    for (vocab, value) in [
        (&CUT, query.cut.as_str()),
        (&COLOR, query.color.as_str()),
        (&CLARITY, query.clarity.as_str()),
    ] {
        if vocab.index_of(value).is_none() {
            return Err(ValidationError::UnknownCategory {
                attribute: vocab.attribute(),
                value: value.to_string(),
            }
            .into());
        }
    }

    let mut matches: Vec<(f32, &Record)> = records
        .iter()
        .filter(|r| r.cut == query.cut && r.color == query.color && r.clarity == query.clarity)
        .map(|r| ((r.carat - query.weight).abs(), r))
        .collect();

    if matches.is_empty() {
        return Err(ServeError::NoMatches);
    }

    // The weight distance is scratch state; only the records go back out.
    matches.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(matches
        .into_iter()
        .take(query.n)
        .map(|(_, r)| r.clone())
        .collect())
}
