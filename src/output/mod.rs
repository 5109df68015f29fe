pub mod formatter;

pub use formatter::{
    format_cards_tsv, format_leaderboard, format_score, format_score_result, format_stats,
    should_use_colors,
};
