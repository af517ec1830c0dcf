//! Review parsing and the quality filter applied before reviews are kept.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tablescout_core::Review;

use crate::html::{clean_text, decode_entities, extract_attr, json_ld_nodes, node_has_type};
use crate::json::{f64_at, str_at};

pub const MIN_REVIEW_RATING: f64 = 4.0;
pub const MIN_REVIEW_CHARS: usize = 40;
pub const MAX_REVIEWS: usize = 5;

static REVIEW_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<[a-z]+\b[^>]*\bdata-review-id\s*=\s*"([^"]*)"[^>]*>"#)
        .expect("valid review container regex")
});
static REVIEW_STARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)aria-label\s*=\s*"\s*(\d(?:[.,]\d)?)\s+stars?\b"#)
        .expect("valid review stars regex")
});
static REVIEW_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*class\s*=\s*"[^"]*\bwiI7pd\b[^"]*"[^>]*>(.*?)</span>"#)
        .expect("valid review text regex")
});
static REVIEW_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*class\s*=\s*"[^"]*\brsqaWe\b[^"]*"[^>]*>(.*?)</span>"#)
        .expect("valid review time regex")
});

/// Reviews found on a reviews page: JSON-LD first, rendered review cards
/// otherwise. Unfiltered.
#[must_use]
pub fn parse_reviews(page: &str) -> Vec<Review> {
    let from_ld: Vec<Review> = json_ld_nodes(page)
        .iter()
        .flat_map(|node| {
            if node_has_type(node, &["Review"]) {
                review_from_ld(node).into_iter().collect()
            } else {
                from_json_ld_node(node)
            }
        })
        .collect();
    if !from_ld.is_empty() {
        return from_ld;
    }
    from_review_cards(page)
}

/// Keeps reviews rated at least 4.0 with at least 40 characters of text,
/// drops repeated texts, and caps the list at five in page order.
#[must_use]
pub fn filter_reviews(reviews: Vec<Review>) -> Vec<Review> {
    let mut seen: HashSet<String> = HashSet::new();
    reviews
        .into_iter()
        .filter(|r| r.rating >= MIN_REVIEW_RATING)
        .filter(|r| r.text.chars().count() >= MIN_REVIEW_CHARS)
        .filter(|r| seen.insert(r.text.clone()))
        .take(MAX_REVIEWS)
        .collect()
}

/// The `review` entries embedded in a JSON-LD place node.
pub(super) fn from_json_ld_node(node: &Value) -> Vec<Review> {
    match node.get("review") {
        Some(Value::Array(items)) => items.iter().filter_map(review_from_ld).collect(),
        Some(obj @ Value::Object(_)) => review_from_ld(obj).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn review_from_ld(node: &Value) -> Option<Review> {
    let text = str_at(node, "/reviewBody")
        .or_else(|| str_at(node, "/description"))
        .map(|t| decode_entities(&t))?;
    let author = str_at(node, "/author/name")
        .or_else(|| str_at(node, "/author"))
        .unwrap_or_default();
    Some(Review {
        author,
        rating: f64_at(node, "/reviewRating/ratingValue"),
        text,
        relative_time: str_at(node, "/datePublished").unwrap_or_default(),
    })
}

/// Rendered review cards: each `data-review-id` container up to the next
/// one. The container's `aria-label` is the author.
fn from_review_cards(page: &str) -> Vec<Review> {
    // (offset, opening tag, review id)
    let opens: Vec<(usize, &str, &str)> = REVIEW_OPEN_RE
        .captures_iter(page)
        .filter_map(|c| {
            let tag = c.get(0)?;
            Some((tag.start(), tag.as_str(), c.get(1)?.as_str().trim()))
        })
        .collect();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut reviews = Vec::new();

    for (i, &(start, tag, id)) in opens.iter().enumerate() {
        // Cards nest several elements carrying the same id.
        if !seen_ids.insert(id) {
            continue;
        }
        let end = opens[i + 1..]
            .iter()
            .find(|(_, _, next_id)| *next_id != id)
            .map_or(page.len(), |(next_start, _, _)| *next_start);
        let block = &page[start..end];

        let text = REVIEW_TEXT_RE
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        reviews.push(Review {
            author: extract_attr(tag, "aria-label")
                .map(|a| decode_entities(&a))
                .unwrap_or_default(),
            rating: REVIEW_STARS_RE
                .captures(block)
                .and_then(|c| c[1].replace(',', ".").parse::<f64>().ok())
                .unwrap_or(0.0),
            text,
            relative_time: REVIEW_TIME_RE
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| clean_text(m.as_str()))
                .unwrap_or_default(),
        });
    }
    reviews
}
