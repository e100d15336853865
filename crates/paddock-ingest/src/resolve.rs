//! Natural-key to surrogate-id resolution
//!
//! Reference entities (circuits, constructors, drivers) are identified upstream by
//! slugs such as `max_verstappen`. Stored rows use dense integer ids instead. Ids
//! are handed out in encounter order, so a deterministic extraction order gives
//! deterministic ids. A key with no match resolves to [`UNRESOLVED_ID`].

use std::collections::BTreeMap;

/// Id recorded for a reference that matched nothing
pub const UNRESOLVED_ID: i64 = 0;

/// Assigns ids 1, 2, 3, ... to natural keys in the order they are first seen
#[derive(Debug, Clone)]
pub struct SurrogateKeys {
    ids: BTreeMap<String, i64>,
    next: i64,
}

impl Default for SurrogateKeys {
    fn default() -> Self {
        Self {
            ids: BTreeMap::new(),
            next: 1,
        }
    }
}

impl SurrogateKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `natural_key`, assigning the next free one on first sight
    pub fn assign(&mut self, natural_key: &str) -> i64 {
        if let Some(&id) = self.ids.get(natural_key) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.ids.insert(natural_key.to_string(), id);
        id
    }

    pub fn get(&self, natural_key: &str) -> Option<i64> {
        self.ids.get(natural_key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A row of a reference table
pub trait ReferenceRow {
    fn natural_key(&self) -> &str;

    /// Id carried by the staged row, if any
    fn surrogate_key(&self) -> Option<i64>;

    /// Rows with a blank natural key cannot be referenced
    fn has_key(&self) -> bool {
        !self.natural_key().trim().is_empty()
    }
}

/// Read-only natural key to id map built from one reference table
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    ids: BTreeMap<String, i64>,
}

impl Lookup {
    /// Build the lookup for a reference table
    ///
    /// Rows with a blank natural key are ignored. Staged ids are used when every
    /// remaining row carries one. Otherwise ids are assigned in row order, starting
    /// at 1. A key seen twice keeps its first id.
    pub fn build<R: ReferenceRow>(rows: &[R]) -> Self {
        let mut ids = BTreeMap::new();
        let keyed: Vec<&R> = rows.iter().filter(|row| row.has_key()).collect();

        if keyed.iter().all(|row| row.surrogate_key().is_some()) {
            for row in keyed {
                if let Some(id) = row.surrogate_key() {
                    ids.entry(row.natural_key().to_string()).or_insert(id);
                }
            }
        } else {
            let mut keys = SurrogateKeys::new();
            for row in keyed {
                keys.assign(row.natural_key());
            }
            ids = keys.ids;
        }

        Self { ids }
    }

    /// Id of `natural_key`, or [`UNRESOLVED_ID`] when the key is unknown
    pub fn resolve(&self, natural_key: &str) -> i64 {
        self.ids.get(natural_key).copied().unwrap_or(UNRESOLVED_ID)
    }

    pub fn contains(&self, natural_key: &str) -> bool {
        self.ids.contains_key(natural_key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<SurrogateKeys> for Lookup {
    fn from(keys: SurrogateKeys) -> Self {
        Self { ids: keys.ids }
    }
}

/// Tally of one resolution pass, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub resolved: usize,
    pub unresolved: usize,
}

impl ResolveStats {
    /// Resolve `natural_key` against `lookup` and count the outcome
    pub fn resolve(&mut self, lookup: &Lookup, natural_key: &str) -> i64 {
        let id = lookup.resolve(natural_key);
        if id == UNRESOLVED_ID {
            self.unresolved += 1;
        } else {
            self.resolved += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, Option<i64>);

    impl ReferenceRow for Row {
        fn natural_key(&self) -> &str {
            self.0
        }

        fn surrogate_key(&self) -> Option<i64> {
            self.1
        }
    }

    #[test]
    fn test_resolves_known_and_unknown_keys() {
        let lookup = Lookup::build(&[Row("max_verstappen", Some(1)), Row("hamilton", Some(2))]);

        assert_eq!(lookup.resolve("max_verstappen"), 1);
        assert_eq!(lookup.resolve("unknown_driver"), UNRESOLVED_ID);
    }

    #[test]
    fn test_assigns_in_encounter_order_when_ids_missing() {
        let lookup = Lookup::build(&[Row("spa", None), Row("monza", Some(7)), Row("suzuka", None)]);

        assert_eq!(lookup.resolve("spa"), 1);
        assert_eq!(lookup.resolve("monza"), 2);
        assert_eq!(lookup.resolve("suzuka"), 3);
    }

    #[test]
    fn test_duplicate_keys_keep_first_id() {
        let staged = Lookup::build(&[Row("alonso", Some(4)), Row("alonso", Some(9))]);
        assert_eq!(staged.resolve("alonso"), 4);
        assert_eq!(staged.len(), 1);

        let assigned = Lookup::build(&[Row("alonso", None), Row("norris", None), Row("alonso", None)]);
        assert_eq!(assigned.resolve("alonso"), 1);
        assert_eq!(assigned.resolve("norris"), 2);
    }

    #[test]
    fn test_blank_keys_stay_unresolved() {
        let staged = Lookup::build(&[Row("", Some(1)), Row("leclerc", Some(2))]);
        assert_eq!(staged.resolve(""), UNRESOLVED_ID);
        assert_eq!(staged.resolve("leclerc"), 2);
        assert_eq!(staged.len(), 1);

        // A blank row neither consumes an id nor forces reassignment
        let assigned = Lookup::build(&[Row("  ", None), Row("piastri", None)]);
        assert_eq!(assigned.resolve("  "), UNRESOLVED_ID);
        assert_eq!(assigned.resolve("piastri"), 1);

        let mixed = Lookup::build(&[Row("", None), Row("russell", Some(63))]);
        assert_eq!(mixed.resolve("russell"), 63);
    }

    #[test]
    fn test_surrogate_keys_are_dense_and_stable() {
        let mut keys = SurrogateKeys::new();
        assert_eq!(keys.assign("red_bull"), 1);
        assert_eq!(keys.assign("ferrari"), 2);
        assert_eq!(keys.assign("red_bull"), 1);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("mclaren"), None);

        let lookup = Lookup::from(keys);
        assert_eq!(lookup.resolve("ferrari"), 2);
    }

    #[test]
    fn test_stats_count_outcomes() {
        let lookup = Lookup::build(&[Row("a", Some(1))]);
        let mut stats = ResolveStats::default();

        assert_eq!(stats.resolve(&lookup, "a"), 1);
        assert_eq!(stats.resolve(&lookup, "b"), UNRESOLVED_ID);
        assert_eq!(
            stats,
            ResolveStats {
                resolved: 1,
                unresolved: 1
            }
        );
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let lookup = Lookup::build::<Row>(&[]);
        assert!(lookup.is_empty());
        assert_eq!(lookup.resolve("anything"), UNRESOLVED_ID);
    }
}
