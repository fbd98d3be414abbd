//! Transcript segmentation and task classification.
//!
//! Turns a spoken transcript such as
//! "buy milk and eggs, then call the dentist tomorrow" into one
//! [`TaskCandidate`] per delimiter-separated fragment.
//!
//! # Invariants
//! - Never fails; empty or whitespace-only input yields no tasks.
//! - Output preserves fragment order.
//! - Meaningful input that yields no fragments still produces one task.
//! - Pure for a fixed clock: the same text and `now` give equal results.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};
use regex::{Match, Regex};
use tracing::debug;

use super::rules::{classify_category, classify_priority, detect_relative_date, RelativeDate};
use crate::domain::{Category, ParsedTaskList, TaskCandidate};

/// Fragments shorter than this (before prefix stripping) are dropped
const MIN_FRAGMENT_CHARS: usize = 3;

static DELIMITER_RE: OnceLock<Regex> = OnceLock::new();
static DATE_UNIT_RE: OnceLock<Regex> = OnceLock::new();
static INTENT_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static NOTE_RE: OnceLock<Regex> = OnceLock::new();

fn delimiter_re() -> &'static Regex {
    DELIMITER_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:and then|after that|then|also|next)\b|[,;]")
            .expect("valid delimiter regex")
    })
}

fn date_unit_re() -> &'static Regex {
    DATE_UNIT_RE
        .get_or_init(|| Regex::new(r"^\s+(?:week|month)\b").expect("valid date unit regex"))
}

fn intent_prefix_re() -> &'static Regex {
    INTENT_PREFIX_RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:i need to|i have to|need to|have to|must|should|to|go|get|buy|add|create|make)\s+",
        )
        .expect("valid intent prefix regex")
    })
}

fn note_re() -> &'static Regex {
    NOTE_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:note:|remember:|details?:|because:)\s*(.+)").expect("valid note regex")
    })
}

/// Parse a transcript into task candidates using the local clock
pub fn parse_transcript(text: &str) -> Vec<TaskCandidate> {
    parse_transcript_at(text, &Local::now())
}

/// Parse a transcript into task candidates, resolving due dates against `now`
pub fn parse_transcript_at<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> Vec<TaskCandidate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let lowered = trimmed.to_lowercase();
    let fragments = split_fragments(&lowered);
    debug!(fragments = fragments.len(), "Split transcript");

    let mut tasks: Vec<TaskCandidate> = fragments
        .into_iter()
        .filter_map(|fragment| parse_fragment(fragment, now))
        .collect();

    if tasks.is_empty() {
        tasks.push(TaskCandidate {
            title: capitalize_first(trimmed),
            category: classify_category(&lowered),
            priority: classify_priority(&lowered),
            due_date: None,
            note: None,
        });
    }

    tasks
}

/// Parse a transcript and attach a display summary
pub fn parse_tasks(text: &str) -> ParsedTaskList {
    let tasks = parse_transcript(text);
    let summary = summarize(&tasks);
    ParsedTaskList { tasks, summary }
}

/// One-line summary of a parse result
pub fn summarize(tasks: &[TaskCandidate]) -> String {
    let mut categories: Vec<Category> = Vec::new();
    for task in tasks {
        if !categories.contains(&task.category) {
            categories.push(task.category);
        }
    }

    match (tasks.len(), categories.as_slice()) {
        (0, _) => "Didn't catch that. Try again?".to_string(),
        (1, _) => format!("Added 1 task to {}.", tasks[0].category),
        (n, [only]) => format!("Added {} tasks to {}.", n, only),
        (n, many) => format!("Added {} tasks across {} categories.", n, many.len()),
    }
}

/// Split on delimiter phrases, keeping "next week"/"next month" intact
fn split_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for m in delimiter_re().find_iter(text) {
        if is_date_phrase(text, &m) {
            continue;
        }
        fragments.push(&text[start..m.start()]);
        start = m.end();
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

fn is_date_phrase(text: &str, m: &Match<'_>) -> bool {
    m.as_str().eq_ignore_ascii_case("next") && date_unit_re().is_match(&text[m.end()..])
}

fn parse_fragment<Tz: TimeZone>(fragment: &str, now: &DateTime<Tz>) -> Option<TaskCandidate> {
    if fragment.chars().count() < MIN_FRAGMENT_CHARS {
        return None;
    }

    let stripped = intent_prefix_re().replace(fragment, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }

    // Classify on the whole fragment so intent verbs such as "buy" still count
    Some(TaskCandidate {
        title: capitalize_first(stripped),
        category: classify_category(fragment),
        priority: classify_priority(fragment),
        due_date: detect_relative_date(fragment).and_then(|rule| resolve_due_date(rule, now)),
        note: extract_note(fragment),
    })
}

/// Resolve a relative date phrase against `now` in its own time zone
pub fn resolve_due_date<Tz: TimeZone>(
    rule: RelativeDate,
    now: &DateTime<Tz>,
) -> Option<DateTime<Utc>> {
    let resolved = match rule {
        RelativeDate::Now => Some(now.clone()),
        RelativeDate::Tomorrow => now.clone().checked_add_days(Days::new(1)),
        RelativeDate::EndOfWeek => {
            let days_to_sunday = 7 - u64::from(now.weekday().num_days_from_sunday());
            now.clone().checked_add_days(Days::new(days_to_sunday))
        }
        RelativeDate::NextWeek => now.clone().checked_add_days(Days::new(7)),
        RelativeDate::EndOfMonth => {
            let today = now.date_naive();
            let first_of_next = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
            };
            first_of_next
                .and_then(|d| d.pred_opt())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        }
    };

    resolved.map(|d| d.with_timezone(&Utc))
}

fn extract_note(text: &str) -> Option<String> {
    note_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|note| !note.is_empty())
        .map(capitalize_first)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    fn fixed_now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse_transcript_at("", &fixed_now()).is_empty());
        assert!(parse_transcript_at("   ", &fixed_now()).is_empty());
    }

    #[test]
    fn test_split_on_delimiters() {
        let fragments = split_fragments("wash car and then feed cat; call mom, also pay rent");
        assert_eq!(fragments, vec!["wash car", "feed cat", "call mom", "pay rent"]);
    }

    #[test]
    fn test_delimiters_inside_words_do_not_split() {
        let fragments = split_fragments("buy authentic olive oil");
        assert_eq!(fragments, vec!["buy authentic olive oil"]);
    }

    #[test]
    fn test_next_week_is_not_a_delimiter() {
        let fragments = split_fragments("book flights next week next clean the house");
        assert_eq!(fragments, vec!["book flights next week", "clean the house"]);
    }

    #[test]
    fn test_intent_prefix_is_stripped_once() {
        let tasks = parse_transcript_at("i need to buy bread", &fixed_now());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy bread");
        assert_eq!(tasks[0].category, Category::Shopping);
    }

    #[test]
    fn test_short_fragments_fall_back_to_whole_transcript() {
        let tasks = parse_transcript_at("Go", &fixed_now());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Go");
        assert_eq!(tasks[0].category, Category::General);
        assert_eq!(tasks[0].priority, Priority::Medium);
    }

    #[test]
    fn test_note_extraction() {
        let tasks = parse_transcript_at("pick up the suit note: it needs pressing", &fixed_now());
        assert_eq!(tasks[0].note.as_deref(), Some("It needs pressing"));

        let tasks = parse_transcript_at("pick up the suit note:", &fixed_now());
        assert_eq!(tasks[0].note, None);
    }

    #[test]
    fn test_due_date_resolution() {
        let now = fixed_now();

        let tomorrow = resolve_due_date(RelativeDate::Tomorrow, &now).unwrap();
        assert_eq!(tomorrow, Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap());

        let sunday = resolve_due_date(RelativeDate::EndOfWeek, &now).unwrap();
        assert_eq!(sunday, Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap());

        let next_week = resolve_due_date(RelativeDate::NextWeek, &now).unwrap();
        assert_eq!(next_week, Utc.with_ymd_and_hms(2026, 10, 21, 9, 30, 0).unwrap());

        let month_end = resolve_due_date(RelativeDate::EndOfMonth, &now).unwrap();
        assert_eq!(month_end, Utc.with_ymd_and_hms(2026, 10, 31, 0, 0, 0).unwrap());

        assert_eq!(resolve_due_date(RelativeDate::Now, &now), Some(now));
    }

    #[test]
    fn test_end_of_week_on_sunday_is_a_week_out() {
        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let due = resolve_due_date(RelativeDate::EndOfWeek, &sunday).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 10, 25, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_end_of_month_in_december() {
        let now = Utc.with_ymd_and_hms(2026, 12, 3, 8, 0, 0).unwrap();
        let due = resolve_due_date(RelativeDate::EndOfMonth, &now).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_summary_phrasing() {
        let now = fixed_now();
        assert_eq!(summarize(&[]), "Didn't catch that. Try again?");

        let one = parse_transcript_at("buy apples", &now);
        assert_eq!(summarize(&one), "Added 1 task to Shopping.");

        let same = parse_transcript_at("buy apples, buy pears", &now);
        assert_eq!(summarize(&same), "Added 2 tasks to Shopping.");

        let mixed = parse_transcript_at("buy apples, pay the bill, see the doctor", &now);
        assert_eq!(summarize(&mixed), "Added 3 tasks across 3 categories.");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("éclairs"), "Éclairs");
        assert_eq!(capitalize_first(""), "");
    }
}
