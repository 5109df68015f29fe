use serde::{Deserialize, Deserializer, Serialize};

/// A card reference inside a submitted combination.
///
/// Clients send either the bare id (`"662"`) or the full card object they
/// rendered (`{ "id": "662", "imageUrl": "/cards/662.png" }`). Only the id
/// takes part in scoring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CardRef {
    Id(String),
    Card {
        id: String,
        #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl CardRef {
    pub fn id(&self) -> &str {
        match self {
            CardRef::Id(id) => id,
            CardRef::Card { id, .. } => id,
        }
    }
}

impl From<&str> for CardRef {
    fn from(id: &str) -> Self {
        CardRef::Id(id.to_string())
    }
}

/// One trio proposed by the player, with the card they suspect is synthetic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub cards: Vec<CardRef>,
    #[serde(default, alias = "aiMarkedCardId", deserialize_with = "blank_as_none")]
    pub flagged_id: Option<String>,
}

/// Clients clear a flag by sending an empty id.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<String>::deserialize(deserializer)?;
    Ok(flag.filter(|id| !id.trim().is_empty()))
}

impl Combination {
    pub fn new(ids: [&str; 3], flagged_id: Option<&str>) -> Self {
        Self {
            cards: ids.iter().map(|id| CardRef::from(*id)).collect(),
            flagged_id: flagged_id.map(str::to_string),
        }
    }

    /// The flagged card id. A blank id is no flag.
    pub fn flag(&self) -> Option<&str> {
        self.flagged_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn card_ids(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(CardRef::id)
    }
}

/// Per-combination verdict, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
    pub user_combination: Combination,
    pub is_grouping_correct: bool,
    pub is_flag_correct: bool,
}

/// Intermediate counters behind a total score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub perfect_groups: u32,
    pub grouping_score: f64,
    pub hits: u32,
    pub false_positives: u32,
    pub flag_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub nickname: String,
    pub total_score: f64,
    pub results: Vec<ResultDetail>,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}
