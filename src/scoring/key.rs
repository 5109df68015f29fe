use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Canonical trios of the current board (every trio sums to 2025).
const STANDARD_GROUPS: [[&str; 3]; 9] = [
    ["662", "676", "687"],
    ["663", "677", "685"],
    ["664", "678", "683"],
    ["665", "679", "681"],
    ["666", "671", "688"],
    ["667", "672", "686"],
    ["668", "673", "684"],
    ["669", "674", "682"],
    ["670", "675", "680"],
];

/// Cards drawn by a model rather than a human artist.
const STANDARD_SYNTHETIC: [&str; 4] = ["683", "686", "684", "680"];

static STANDARD_KEY: LazyLock<AnswerKey> =
    LazyLock::new(|| AnswerKey::from_parts(&STANDARD_GROUPS, &STANDARD_SYNTHETIC));

/// One canonical group: an unordered set of card ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    ids: BTreeSet<String>,
}

impl Group {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// True when `ids` is exactly this group, in any order.
    pub fn matches<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let submitted: BTreeSet<&str> = ids.into_iter().collect();
        submitted.len() == self.ids.len() && submitted.iter().all(|id| self.ids.contains(*id))
    }
}

/// The hidden ground truth: canonical groups plus the synthetic card ids.
///
/// Immutable once built. The standard key lives for the whole process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    groups: Vec<Group>,
    synthetic: BTreeSet<String>,
}

impl AnswerKey {
    /// The board every player is scored against.
    pub fn standard() -> &'static AnswerKey {
        &STANDARD_KEY
    }

    /// Build a key without checking invariants; run
    /// [`validate_answer_key`](super::validate_answer_key) before trusting it.
    pub fn from_parts(groups: &[[&str; 3]], synthetic: &[&str]) -> Self {
        Self {
            groups: groups.iter().map(|g| Group::new(g.iter().copied())).collect(),
            synthetic: synthetic.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn synthetic_ids(&self) -> impl Iterator<Item = &str> {
        self.synthetic.iter().map(String::as_str)
    }

    pub fn is_synthetic(&self, id: &str) -> bool {
        self.synthetic.contains(id)
    }

    /// The canonical group whose ids are exactly `ids`, if any.
    pub fn matching_group<'a, I>(&self, ids: I) -> Option<&Group>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.groups.iter().find(|g| g.matches(ids.clone()))
    }

    /// Every card id covered by the key.
    pub fn universe(&self) -> BTreeSet<&str> {
        self.groups.iter().flat_map(Group::ids).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_key_shape() {
        let key = AnswerKey::standard();
        assert_eq!(key.groups().len(), 9);
        assert!(key.groups().iter().all(|g| g.len() == 3));
        assert_eq!(key.universe().len(), 27);
        assert_eq!(key.synthetic_ids().count(), 4);
    }

    #[test]
    fn test_synthetic_set_is_the_four_card_variant() {
        let key = AnswerKey::standard();
        let ids: Vec<&str> = key.synthetic_ids().collect();
        assert_eq!(ids, vec!["680", "683", "684", "686"]);
        assert!(!key.is_synthetic("662"));
    }

    #[test]
    fn test_group_match_ignores_order() {
        let group = Group::new(["662", "676", "687"]);
        assert!(group.matches(["687", "662", "676"]));
        assert!(!group.matches(["662", "676"]));
        assert!(!group.matches(["662", "676", "688"]));
        assert!(!group.matches(["662", "662", "676"]));
    }

    #[test]
    fn test_matching_group_lookup() {
        let key = AnswerKey::standard();
        let found = key.matching_group(["683", "664", "678"]).unwrap();
        assert!(found.contains("683"));
        assert!(key.matching_group(["662", "663", "664"]).is_none());
    }

    #[test]
    fn test_standard_groups_sum_to_2025() {
        for group in AnswerKey::standard().groups() {
            let sum: u32 = group.ids().map(|id| id.parse::<u32>().unwrap()).sum();
            assert_eq!(sum, 2025);
        }
    }
}
