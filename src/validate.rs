//! Request validation shared by every front end.
//!
//! The index itself accepts any input and answers with empty results; these
//! checks reject requests that are malformed before they reach it.

use crate::{
    error::{Error, Result},
    player::{PlayerId, Season},
};

pub const MAX_QUERY_CHARS: usize = 100;

pub const INVALID_QUERY: &str = "Invalid player name query.";
pub const INVALID_PLAYER_ID: &str = "Invalid player ID.";
pub const INVALID_PLAYER_OR_SEASON: &str = "Invalid player ID or season.";

/// Accept a search query that is not blank and at most
/// [`MAX_QUERY_CHARS`] characters long. The query is returned unchanged.
pub fn validate_query(query: &str) -> Result<&str> {
    if query.trim().is_empty() || query.chars().count() > MAX_QUERY_CHARS {
        return Err(Error::InvalidRequest(INVALID_QUERY));
    }
    Ok(query)
}

/// Outcome of checking a positive identifier.
///
/// Identifiers larger than the index can hold are valid requests that can
/// never match anything, so they are reported separately from rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked<T> {
    Known(T),
    OutOfRange,
}

pub fn validate_player_id(raw: i64) -> Result<Checked<PlayerId>> {
    positive(raw, INVALID_PLAYER_ID)
}

pub fn validate_player_season(
    player_id: i64,
    season: i64,
) -> Result<Checked<(PlayerId, Season)>> {
    let player = positive(player_id, INVALID_PLAYER_OR_SEASON)?;
    let season = positive(season, INVALID_PLAYER_OR_SEASON)?;

    Ok(match (player, season) {
        (Checked::Known(p), Checked::Known(s)) => Checked::Known((p, s)),
        _ => Checked::OutOfRange,
    })
}

fn positive(raw: i64, message: &'static str) -> Result<Checked<u32>> {
    if raw <= 0 {
        return Err(Error::InvalidRequest(message));
    }
    Ok(u32::try_from(raw).map_or(Checked::OutOfRange, Checked::Known))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_bounds() {
        assert_eq!(validate_query("Jam").unwrap(), "Jam");
        assert_eq!(validate_query(" Jam ").unwrap(), " Jam ");
        assert!(validate_query("").is_err());
        assert!(validate_query("   \t").is_err());

        let longest = "a".repeat(MAX_QUERY_CHARS);
        assert!(validate_query(&longest).is_ok());
        assert!(validate_query(&format!("{longest}a")).is_err());
    }

    #[test]
    fn query_length_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_QUERY_CHARS);
        assert!(validate_query(&accented).is_ok());
    }

    #[test]
    fn player_id_must_be_positive() {
        assert_eq!(validate_player_id(7).unwrap(), Checked::Known(7));
        assert_eq!(
            validate_player_id(i64::from(u32::MAX) + 1).unwrap(),
            Checked::OutOfRange
        );

        let err = validate_player_id(0).unwrap_err();
        assert_eq!(err.to_string(), INVALID_PLAYER_ID);
        assert!(validate_player_id(-3).is_err());
    }

    #[test]
    fn season_requests_check_both_parts() {
        assert_eq!(
            validate_player_season(7, 2001).unwrap(),
            Checked::Known((7, 2001))
        );

        let err = validate_player_season(7, 0).unwrap_err();
        assert_eq!(err.to_string(), INVALID_PLAYER_OR_SEASON);
        assert!(validate_player_season(-1, 2001).is_err());
    }
}
