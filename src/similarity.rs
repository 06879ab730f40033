//! Loading of the precomputed similarity tables.
//!
//! Both tables are JSON objects mapping a source key to a ranked list of
//! matches. Career tables are keyed by the stringified player id, season
//! tables by `"{playerId}_{season}"`. Ranking happens offline; the lists are
//! kept in the order the producer wrote them.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A career-scoped match: another player and how similar their career is.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CareerMatch {
    #[serde(
        rename = "playerId",
        alias = "PlayerId",
        alias = "playerid",
        alias = "player_id"
    )]
    pub player_id: i64,
    #[serde(alias = "Score")]
    pub score: f64,
}

/// A season-scoped match: one season of another (or the same) player.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeasonMatch {
    #[serde(
        rename = "playerId",
        alias = "PlayerId",
        alias = "playerid",
        alias = "player_id"
    )]
    pub player_id: i64,
    #[serde(alias = "Season")]
    pub season: i64,
    #[serde(alias = "Score")]
    pub score: f64,
}

pub trait Scored {
    fn score(&self) -> f64;
}

impl Scored for CareerMatch {
    fn score(&self) -> f64 {
        self.score
    }
}

impl Scored for SeasonMatch {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Key of a season similarity list.
pub fn season_key(player_id: u32, season: u32) -> String {
    format!("{player_id}_{season}")
}

/// How to treat lists whose scores are not in descending order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Keep the stored order and log how many lists were unordered.
    #[default]
    Trust,
    /// Abort the load on the first unordered list.
    Strict,
}

#[derive(Debug, Clone)]
pub struct SimilarityTable<E> {
    lists: HashMap<String, Vec<E>>,
    unordered: usize,
}

impl<E: Scored + DeserializeOwned> SimilarityTable<E> {
    pub fn load(path: &Path, policy: OrderPolicy) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(BufReader::new(file), path, policy)?;

        debug!(
            path = %path.display(),
            lists = table.len(),
            "loaded similarity table"
        );
        Ok(table)
    }

    /// Parse a table from any reader. `path` is only used in errors.
    pub fn from_reader<R: Read>(
        reader: R,
        path: &Path,
        policy: OrderPolicy,
    ) -> Result<Self> {
        let raw: HashMap<String, Vec<E>> = serde_json::from_reader(reader)
            .map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_lists(raw, path, policy)
    }

    fn from_lists(
        raw: HashMap<String, Vec<E>>,
        path: &Path,
        policy: OrderPolicy,
    ) -> Result<Self> {
        let mut lists = HashMap::with_capacity(raw.len());
        let mut unordered = 0;

        for (key, entries) in raw {
            let key = key.trim().to_string();
            if !is_descending(&entries) {
                if policy == OrderPolicy::Strict {
                    return Err(Error::UnorderedSimilarity {
                        path: PathBuf::from(path),
                        key,
                    });
                }
                unordered += 1;
            }
            match lists.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(entries);
                }
                Entry::Occupied(slot) => {
                    return Err(Error::DuplicateKey {
                        path: PathBuf::from(path),
                        key: slot.key().clone(),
                    });
                }
            }
        }

        if unordered > 0 {
            warn!(
                path = %path.display(),
                unordered,
                "similarity lists not sorted by descending score; keeping stored order"
            );
        }

        Ok(Self { lists, unordered })
    }
}

impl<E> SimilarityTable<E> {
    pub fn get(&self, key: &str) -> Option<&[E]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Number of lists whose scores were not in descending order.
    pub fn unordered(&self) -> usize {
        self.unordered
    }
}

fn is_descending<E: Scored>(entries: &[E]) -> bool {
    entries.windows(2).all(|w| w[0].score() >= w[1].score())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<E: Scored + DeserializeOwned>(
        json: &str,
        policy: OrderPolicy,
    ) -> Result<SimilarityTable<E>> {
        SimilarityTable::from_reader(
            json.as_bytes(),
            Path::new("test.json"),
            policy,
        )
    }

    #[test]
    fn keys_are_trimmed() {
        let table: SimilarityTable<CareerMatch> = parse(
            r#"{" 12 ": [{"playerId": 7, "score": 0.9}]}"#,
            OrderPolicy::Trust,
        )
        .unwrap();

        let list = table.get("12").expect("trimmed key");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].player_id, 7);
        assert_eq!(list[0].score, 0.9);
        assert!(table.get(" 12 ").is_none());
    }

    #[test]
    fn keys_colliding_after_trim_are_fatal() {
        let err = parse::<CareerMatch>(
            r#"{
                "12": [{"playerId": 7, "score": 0.9}],
                " 12 ": [{"playerId": 8, "score": 0.8}]
            }"#,
            OrderPolicy::Trust,
        )
        .unwrap_err();

        assert!(
            matches!(err, Error::DuplicateKey { ref key, .. } if key == "12")
        );
    }

    #[test]
    fn field_names_are_case_tolerant() {
        let table: SimilarityTable<SeasonMatch> = parse(
            r#"{"3_2001": [
                {"PlayerId": 4, "Season": 1999, "Score": 0.8},
                {"player_id": 5, "season": 2004, "score": 0.7}
            ]}"#,
            OrderPolicy::Trust,
        )
        .unwrap();

        let list = table.get(&season_key(3, 2001)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].player_id, 4);
        assert_eq!(list[0].season, 1999);
        assert_eq!(list[1].player_id, 5);
        assert_eq!(list[1].season, 2004);
    }

    #[test]
    fn unordered_lists_are_kept_in_stored_order_by_default() {
        let table: SimilarityTable<CareerMatch> = parse(
            r#"{"1": [
                {"playerId": 2, "score": 0.1},
                {"playerId": 3, "score": 0.9}
            ]}"#,
            OrderPolicy::Trust,
        )
        .unwrap();

        let ids: Vec<i64> =
            table.get("1").unwrap().iter().map(|m| m.player_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(table.unordered(), 1);
    }

    #[test]
    fn strict_policy_rejects_unordered_lists() {
        let err = parse::<CareerMatch>(
            r#"{"1": [
                {"playerId": 2, "score": 0.1},
                {"playerId": 3, "score": 0.9}
            ]}"#,
            OrderPolicy::Strict,
        )
        .unwrap_err();

        assert!(
            matches!(err, Error::UnorderedSimilarity { ref key, .. } if key == "1")
        );
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err =
            parse::<CareerMatch>(r#"{"1": [{"playerId": }"#, OrderPolicy::Trust)
                .unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn missing_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SimilarityTable::<CareerMatch>::load(
            &tmp.path().join("missing.json"),
            OrderPolicy::Trust,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
