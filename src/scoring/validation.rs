use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::cards::{CARD_ID_END, CARD_ID_START};

use super::key::AnswerKey;
use super::rules::{CARDS_PER_GROUP, TOTAL_CARDS, TOTAL_GROUPS};
use super::types::Combination;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Check the shape of a submission before scoring it.
///
/// Rejects an empty submission, any combination without exactly three cards,
/// and any combination that names the same card twice. Unknown card ids and
/// flags pointing outside the combination are accepted.
pub fn validate_submission(submission: &[Combination]) -> Result<(), ScoreError> {
    if submission.is_empty() {
        return Err(ScoreError::InvalidInput(
            "no combinations submitted".to_string(),
        ));
    }

    for (i, combination) in submission.iter().enumerate() {
        if combination.cards.len() != CARDS_PER_GROUP {
            return Err(ScoreError::InvalidInput(format!(
                "combination[{}]: expected exactly {} cards, got {}",
                i,
                CARDS_PER_GROUP,
                combination.cards.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for id in combination.card_ids() {
            if !seen.insert(id) {
                return Err(ScoreError::InvalidInput(format!(
                    "combination[{}]: card '{}' appears more than once",
                    i, id
                )));
            }
        }
    }

    Ok(())
}

/// Validate answer-key invariants at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_answer_key(key: &AnswerKey) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if key.groups().len() != TOTAL_GROUPS {
        errors.push(format!(
            "answer_key.groups: expected {} groups, got {}",
            TOTAL_GROUPS,
            key.groups().len()
        ));
    }

    let mut owner: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, group) in key.groups().iter().enumerate() {
        if group.len() != CARDS_PER_GROUP {
            errors.push(format!(
                "answer_key.groups[{}]: expected {} distinct cards, got {}",
                i,
                CARDS_PER_GROUP,
                group.len()
            ));
        }
        for id in group.ids() {
            if let Some(previous) = owner.insert(id, i) {
                errors.push(format!(
                    "answer_key.groups[{}]: card '{}' already belongs to group {}",
                    i, id, previous
                ));
            }
        }
    }

    if owner.len() != TOTAL_CARDS {
        errors.push(format!(
            "answer_key: groups cover {} cards, expected {}",
            owner.len(),
            TOTAL_CARDS
        ));
    }

    let catalog: BTreeSet<String> = (CARD_ID_START..=CARD_ID_END)
        .map(|n| n.to_string())
        .collect();
    let missing: Vec<&str> = catalog
        .iter()
        .map(String::as_str)
        .filter(|id| !owner.contains_key(id))
        .collect();
    if !missing.is_empty() {
        errors.push(format!(
            "answer_key: catalog cards missing from every group: {}",
            missing.join(", ")
        ));
    }
    let foreign: Vec<&str> = owner
        .keys()
        .copied()
        .filter(|id| !catalog.contains(*id))
        .collect();
    if !foreign.is_empty() {
        errors.push(format!(
            "answer_key: cards not in the catalog: {}",
            foreign.join(", ")
        ));
    }

    let mut synthetic_per_group: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for id in key.synthetic_ids() {
        match owner.get(id) {
            Some(&group) => synthetic_per_group.entry(group).or_default().push(id),
            None => errors.push(format!(
                "answer_key.synthetic: card '{}' is not in any group",
                id
            )),
        }
    }
    for (group, ids) in synthetic_per_group {
        if ids.len() > 1 {
            errors.push(format!(
                "answer_key.groups[{}]: {} synthetic cards ({}), at most one allowed",
                group,
                ids.len(),
                ids.join(", ")
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
