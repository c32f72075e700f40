//! Orientation selection for list queries.
//!
//! A pair may be stored as `JPY/CNY` while clients ask for `CNY/JPY`. List
//! queries read the requested orientation first, consult the inverse when the
//! direct side looks thin, and keep whichever side holds more rows.

use rates_types::CurrencyPair;

/// Direct row counts below this also consult the inverse orientation.
pub const INVERSE_THRESHOLD: i64 = 10;

/// Which stored orientation answered a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Direct,
    Inverse,
}

impl Orientation {
    /// Stored pair read for this orientation of `requested`.
    pub fn stored_pair(self, requested: CurrencyPair) -> CurrencyPair {
        match self {
            Orientation::Direct => requested,
            Orientation::Inverse => requested.inverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Direct => "direct",
            Orientation::Inverse => "inverse",
        }
    }
}

/// Rows read for one orientation plus how many rows that orientation holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Side<T> {
    pub rows: Vec<T>,
    pub count: i64,
}

impl<T> Side<T> {
    pub fn new(rows: Vec<T>, count: i64) -> Self {
        Self { rows, count }
    }

    /// Side whose count is the number of rows fetched.
    pub fn counted(rows: Vec<T>) -> Self {
        let count = rows.len() as i64;
        Self { rows, count }
    }
}

/// Whether the direct result warrants a look at the inverse orientation.
pub fn needs_inverse<T, E>(direct: &Result<Side<T>, E>) -> bool {
    match direct {
        Err(_) => true,
        Ok(side) => side.rows.is_empty() || side.count < INVERSE_THRESHOLD,
    }
}

/// Picks the orientation to answer with.
///
/// The inverse wins when it holds strictly more rows, or when the direct read
/// failed and the inverse succeeded. Ties keep the direct side. When both
/// reads fail the direct error is returned.
pub fn select<T, E>(
    direct: Result<Side<T>, E>,
    inverse: Option<Result<Side<T>, E>>,
) -> Result<(Orientation, Side<T>), E> {
    match (direct, inverse) {
        (direct, None) => direct.map(|side| (Orientation::Direct, side)),
        (Ok(direct), Some(Ok(inverse))) => {
            if inverse.count > direct.count {
                Ok((Orientation::Inverse, inverse))
            } else {
                Ok((Orientation::Direct, direct))
            }
        }
        (Ok(direct), Some(Err(_))) => Ok((Orientation::Direct, direct)),
        (Err(_), Some(Ok(inverse))) => Ok((Orientation::Inverse, inverse)),
        (Err(e), Some(Err(_))) => Err(e),
    }
}
