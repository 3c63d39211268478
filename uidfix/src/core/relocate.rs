//! Carry uid renames over to data keyed by uid.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::reconcile::UidMapping;

/// A value that stores the uid it is keyed under.
pub trait UidKeyed {
    fn set_uid(&mut self, uid: &str);
}

/// Source bounds of a node, keyed by its uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightBounds {
    pub uid: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl UidKeyed for HighlightBounds {
    fn set_uid(&mut self, uid: &str) {
        self.uid = uid.to_string();
    }
}

pub type HighlightBoundsForUids = BTreeMap<String, HighlightBounds>;

/// Move entries of `keyed` to the uids they were renamed to.
///
/// Mappings are applied in order, so a later mapping onto the same new uid
/// overwrites an earlier one. Entries that were not moved are copied over
/// afterwards and win over a moved entry with the same key.
pub fn relocate<V>(keyed: &BTreeMap<String, V>, mappings: &[UidMapping]) -> BTreeMap<String, V>
where
    V: UidKeyed + Clone,
{
    let mut result = BTreeMap::new();
    let mut moved: HashSet<&str> = HashSet::new();

    for mapping in mappings {
        if let Some(entry) = keyed.get(&mapping.original_uid) {
            moved.insert(mapping.original_uid.as_str());
            let mut entry = entry.clone();
            entry.set_uid(&mapping.new_uid);
            result.insert(mapping.new_uid.clone(), entry);
        }
    }

    for (uid, entry) in keyed {
        if !moved.contains(uid.as_str()) {
            result.insert(uid.clone(), entry.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(uid: &str, start_line: u32) -> HighlightBounds {
        HighlightBounds {
            uid: uid.to_string(),
            start_line,
            start_col: 0,
            end_line: start_line + 1,
            end_col: 4,
        }
    }

    fn keyed(entries: Vec<HighlightBounds>) -> HighlightBoundsForUids {
        entries.into_iter().map(|b| (b.uid.clone(), b)).collect()
    }

    #[test]
    fn moves_mapped_entries_and_rewrites_uid() {
        let input = keyed(vec![bounds("u1", 3), bounds("u3", 7)]);
        let result = relocate(&input, &[UidMapping::new("u1", "u2")]);

        assert_eq!(result.len(), 2);
        assert_eq!(result["u2"], bounds("u2", 3));
        assert_eq!(result["u3"], bounds("u3", 7));
        assert!(!result.contains_key("u1"));
    }

    #[test]
    fn skips_mappings_without_entries() {
        let input = keyed(vec![bounds("u1", 3)]);
        let result = relocate(&input, &[UidMapping::new("missing", "u9")]);
        assert_eq!(result, input);
    }

    #[test]
    fn later_mapping_wins_on_same_destination() {
        let input = keyed(vec![bounds("a", 1), bounds("b", 2)]);
        let result = relocate(
            &input,
            &[UidMapping::new("a", "c"), UidMapping::new("b", "c")],
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result["c"], bounds("c", 2));
    }

    /// A chained rename only follows the first hop; the moved entry lands on
    /// the intermediate key and stays there.
    #[test]
    fn renames_are_not_chained() {
        let input = keyed(vec![bounds("a", 1)]);
        let result = relocate(
            &input,
            &[UidMapping::new("a", "b"), UidMapping::new("b", "c")],
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result["b"], bounds("b", 1));
    }
}
