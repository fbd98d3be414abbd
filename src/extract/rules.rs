//! Ordered classification rules.
//!
//! Each table is a list of (pattern, label) pairs evaluated top to bottom;
//! the first pattern that matches decides the label. Table order is the
//! tie-break, so reordering a table changes classification.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{Category, Priority};

/// A keyword pattern paired with the label it assigns
#[derive(Debug)]
pub struct Rule<L> {
    pub label: L,
    pattern: Regex,
}

impl<L: Copy> Rule<L> {
    /// Build a rule matching any of the keywords as whole words (case-insensitive)
    pub fn keywords(label: L, keywords: &[&str]) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
            .expect("keyword rule pattern is valid");
        Self { label, pattern }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Label of the first rule that matches, if any
pub fn first_match<L: Copy>(rules: &[Rule<L>], text: &str) -> Option<L> {
    rules.iter().find(|r| r.matches(text)).map(|r| r.label)
}

/// Relative date phrases a transcript can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDate {
    /// "today", "now"
    Now,
    /// "tomorrow"
    Tomorrow,
    /// "this week": the upcoming Sunday
    EndOfWeek,
    /// "next week": seven days out
    NextWeek,
    /// "this month": last day of the current month
    EndOfMonth,
}

/// Category keywords in classification order; General is the fallback
pub fn category_rules() -> &'static [Rule<Category>] {
    static RULES: OnceLock<Vec<Rule<Category>>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::keywords(
                Category::Shopping,
                &[
                    "buy",
                    "purchase",
                    "get",
                    "shop",
                    "shopping",
                    "store",
                    "grocery",
                    "groceries",
                    "walmart",
                    "target",
                    "kroger",
                    "costco",
                    "safeway",
                    "whole foods",
                ],
            ),
            Rule::keywords(
                Category::Work,
                &[
                    "work",
                    "meeting",
                    "email",
                    "project",
                    "deadline",
                    "presentation",
                    "report",
                    "office",
                    "client",
                ],
            ),
            Rule::keywords(
                Category::Personal,
                &[
                    "personal", "home", "clean", "organize", "fix", "repair", "chore", "laundry",
                ],
            ),
            Rule::keywords(
                Category::Health,
                &[
                    "doctor",
                    "dentist",
                    "appointment",
                    "gym",
                    "exercise",
                    "workout",
                    "health",
                    "medication",
                    "prescription",
                    "pharmacy",
                ],
            ),
            Rule::keywords(
                Category::Finance,
                &[
                    "pay",
                    "bill",
                    "bills",
                    "bank",
                    "credit card",
                    "budget",
                    "money",
                    "finance",
                    "cashback",
                    "rent",
                    "taxes",
                ],
            ),
        ]
    })
}

/// Priority keywords; High is checked before Low, Medium is the fallback
pub fn priority_rules() -> &'static [Rule<Priority>] {
    static RULES: OnceLock<Vec<Rule<Priority>>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::keywords(
                Priority::High,
                &[
                    "urgent",
                    "asap",
                    "immediately",
                    "critical",
                    "important",
                    "must",
                    "now",
                    "today",
                ],
            ),
            Rule::keywords(
                Priority::Low,
                &[
                    "someday",
                    "eventually",
                    "maybe",
                    "when",
                    "if",
                    "later",
                    "low priority",
                ],
            ),
        ]
    })
}

pub fn due_date_rules() -> &'static [Rule<RelativeDate>] {
    static RULES: OnceLock<Vec<Rule<RelativeDate>>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::keywords(RelativeDate::Now, &["today", "now"]),
            Rule::keywords(RelativeDate::Tomorrow, &["tomorrow"]),
            Rule::keywords(RelativeDate::EndOfWeek, &["this week"]),
            Rule::keywords(RelativeDate::NextWeek, &["next week"]),
            Rule::keywords(RelativeDate::EndOfMonth, &["this month"]),
        ]
    })
}

pub fn classify_category(text: &str) -> Category {
    first_match(category_rules(), text).unwrap_or(Category::General)
}

pub fn classify_priority(text: &str) -> Priority {
    first_match(priority_rules(), text).unwrap_or(Priority::Medium)
}

pub fn detect_relative_date(text: &str) -> Option<RelativeDate> {
    first_match(due_date_rules(), text)
}
