use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::cards::Card;
use crate::scoring::{ResultDetail, ScoreResult};
use crate::store::{GameStats, LeaderboardPage};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with at most one decimal, dropping a trailing ".0"
/// (100.0 -> "100", 77.5 -> "77.5")
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.1}", score);
    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Format a mean with up to two decimals, dropping trailing zeros
/// (61.25 -> "61.25", 61.5 -> "61.5", 70.0 -> "70")
fn format_average(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a 0-1 ratio as a percentage
fn format_percent(ratio: f64) -> String {
    format!("{}%", format_score(ratio * 100.0))
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn mark(ok: bool, use_colors: bool) -> String {
    match (ok, use_colors) {
        (true, true) => "ok".green().to_string(),
        (false, true) => "--".red().to_string(),
        (true, false) => "ok".to_string(),
        (false, false) => "--".to_string(),
    }
}

fn format_detail_line(idx: usize, detail: &ResultDetail, use_colors: bool) -> String {
    let ids: Vec<&str> = detail.user_combination.card_ids().collect();
    let flagged = detail
        .user_combination
        .flagged_id
        .as_deref()
        .unwrap_or("-");
    format!(
        "{:>2}. [{}]  group {}  flag {} ({})",
        idx + 1,
        ids.join(", "),
        mark(detail.is_grouping_correct, use_colors),
        mark(detail.is_flag_correct, use_colors),
        flagged
    )
}

/// Format a scored submission: total, breakdown, then one line per combination
pub fn format_score_result(result: &ScoreResult, use_colors: bool) -> String {
    let b = &result.breakdown;
    let total = format_score(result.total_score);
    let header = if use_colors {
        format!("{} scored {}", result.nickname.yellow(), total.bold())
    } else {
        format!("{} scored {}", result.nickname, total)
    };

    let mut lines = vec![
        header,
        format!(
            "  Groups: {} matched -> {}",
            b.perfect_groups,
            format_score(b.grouping_score)
        ),
        format!(
            "  Flags: {} hits, {} false positives -> {}",
            b.hits,
            b.false_positives,
            format_score(b.flag_score)
        ),
    ];
    lines.extend(
        result
            .results
            .iter()
            .enumerate()
            .map(|(idx, detail)| format_detail_line(idx, detail, use_colors)),
    );
    lines.join("\n")
}

/// Format one leaderboard page as a table: Rank, Score, Nickname, Completed
/// No headers (minimal format)
pub fn format_leaderboard(page: &LeaderboardPage, use_colors: bool) -> String {
    if page.entries.is_empty() {
        return "No completed sessions yet.".to_string();
    }

    let term_width = get_terminal_width();
    let rank_width = 4;
    let score_width = 6;
    let date_width = 16;
    let separator = "  ";
    let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + date_width;

    let mut lines: Vec<String> = page
        .entries
        .iter()
        .map(|entry| {
            let rank_str = format!("{:>3}.", entry.rank);
            let score_str = format!("{:>width$}", format_score(entry.score), width = score_width);
            let completed = entry.completed_at.format("%Y-%m-%d %H:%M").to_string();

            let nickname = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate(&entry.nickname, width - fixed_width)
                }
                Some(_) => truncate(&entry.nickname, 20),
                None => entry.nickname.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_str.bold(),
                    separator,
                    nickname,
                    separator,
                    completed.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, score_str, separator, nickname, separator, completed
                )
            }
        })
        .collect();

    let last = page.offset + page.entries.len();
    lines.push(format!(
        "Showing {}-{} of {}",
        page.offset + 1,
        last,
        page.total
    ));
    lines.join("\n")
}

/// Format aggregate stats as labelled lines
pub fn format_stats(stats: &GameStats, use_colors: bool) -> String {
    let rows = [
        ("Players", stats.total_players.to_string()),
        ("Sessions", stats.total_sessions.to_string()),
        ("Average score", format_average(stats.average_score)),
        ("Highest score", format_score(stats.highest_score)),
        ("Full board rate", format_percent(stats.completion_rate)),
        (
            "Synthetic detection accuracy",
            format_percent(stats.ai_detection_accuracy),
        ),
    ];

    rows.iter()
        .map(|(label, value)| {
            if use_colors {
                format!("{:<30}{}", label.cyan(), value.bold())
            } else {
                format!("{:<30}{}", label, value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format cards as tab-separated values for scripting
/// Columns: id, name, image url (no headers, no colors)
pub fn format_cards_tsv(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            format!(
                "{}\t{}\t{}",
                card.id,
                card.name.as_deref().unwrap_or(""),
                card.image_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
