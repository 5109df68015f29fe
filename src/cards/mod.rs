use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scoring::rules::TOTAL_CARDS;

/// First card id of the board; ids are contiguous from here.
pub const CARD_ID_START: u32 = 662;

/// Last card id of the board (inclusive).
pub const CARD_ID_END: u32 = CARD_ID_START + TOTAL_CARDS as u32 - 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Card {
    fn numbered(n: u32) -> Self {
        Self {
            id: n.to_string(),
            image_url: format!("/cards/{}.png", n),
            name: Some(format!("CG {}", n)),
        }
    }
}

/// All cards of the board in ascending id order.
pub fn catalog() -> Vec<Card> {
    (CARD_ID_START..=CARD_ID_END).map(Card::numbered).collect()
}

/// Uniformly permute cards for display (Fisher-Yates).
pub fn shuffle_cards<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::AnswerKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_is_contiguous() {
        let cards = catalog();
        assert_eq!(cards.len(), 27);
        assert_eq!(cards[0].id, "662");
        assert_eq!(cards[26].id, "688");
        assert_eq!(cards[5].image_url, "/cards/667.png");
        assert_eq!(cards[5].name.as_deref(), Some("CG 667"));
    }

    #[test]
    fn test_catalog_matches_answer_key_universe() {
        let cards = catalog();
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        let universe: Vec<&str> = AnswerKey::standard().universe().into_iter().collect();
        assert_eq!(ids, universe);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut cards = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        shuffle_cards(&mut cards, &mut rng);

        let mut ids: Vec<String> = cards.into_iter().map(|c| c.id).collect();
        ids.sort();
        let expected: Vec<String> = catalog().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_shuffle_is_deterministic_for_a_seed() {
        let mut a = catalog();
        let mut b = catalog();
        shuffle_cards(&mut a, &mut StdRng::seed_from_u64(42));
        shuffle_cards(&mut b, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_ne!(a, catalog());
    }

    #[test]
    fn test_card_wire_shape() {
        let value = serde_json::to_value(&catalog()[0]).unwrap();
        assert_eq!(value["id"], "662");
        assert_eq!(value["imageUrl"], "/cards/662.png");
        assert_eq!(value["name"], "CG 662");
    }
}
