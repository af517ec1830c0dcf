use super::*;

// -----------------------------------------------------------------------
// parse_compact_count
// -----------------------------------------------------------------------

#[test]
fn compact_count_thousands_suffix() {
    assert_eq!(parse_compact_count("12.3K"), 12_300);
}

#[test]
fn compact_count_lowercase_suffix() {
    assert_eq!(parse_compact_count("7k"), 7_000);
}

#[test]
fn compact_count_millions_suffix() {
    assert_eq!(parse_compact_count("4.5M"), 4_500_000);
    assert_eq!(parse_compact_count("1.25m"), 1_250_000);
}

#[test]
fn compact_count_thousands_separator() {
    assert_eq!(parse_compact_count("1,204"), 1_204);
    assert_eq!(parse_compact_count("12,345,678"), 12_345_678);
}

#[test]
fn compact_count_plain_integer() {
    assert_eq!(parse_compact_count("87"), 87);
}

#[test]
fn compact_count_rounds_fractional_results() {
    assert_eq!(parse_compact_count("1.2346K"), 1_235);
    assert_eq!(parse_compact_count("2.5"), 3);
}

#[test]
fn compact_count_ignores_surrounding_whitespace() {
    assert_eq!(parse_compact_count("  3.1 K "), 3_100);
}

#[test]
fn compact_count_empty_is_zero() {
    assert_eq!(parse_compact_count(""), 0);
    assert_eq!(parse_compact_count("   "), 0);
}

#[test]
fn compact_count_non_numeric_is_zero() {
    assert_eq!(parse_compact_count("abc"), 0);
    assert_eq!(parse_compact_count("K"), 0);
    assert_eq!(parse_compact_count("inf"), 0);
    assert_eq!(parse_compact_count("NaN"), 0);
    assert_eq!(parse_compact_count("-12"), 0);
    assert_eq!(parse_compact_count("12B"), 0);
}

// -----------------------------------------------------------------------
// to_slug
// -----------------------------------------------------------------------

fn is_canonical_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[test]
fn slug_strips_diacritics_and_punctuation() {
    let slug = to_slug("Café – Rösti!");
    assert_eq!(slug, "cafe-rosti");
    assert!(is_canonical_slug(&slug));
}

#[test]
fn slug_simple_name() {
    assert_eq!(to_slug("Blue Door Bistro"), "blue-door-bistro");
}

#[test]
fn slug_collapses_separator_runs() {
    assert_eq!(to_slug("Joe's   Pizza & Pasta"), "joe-s-pizza-pasta");
}

#[test]
fn slug_trims_leading_and_trailing_separators() {
    assert_eq!(to_slug("  --Taquería El Güero--  "), "taqueria-el-guero");
}

#[test]
fn slug_folds_ligatures_and_sharp_s() {
    assert_eq!(to_slug("Straße Œuvre"), "strasse-oeuvre");
}

#[test]
fn slug_drops_combining_marks() {
    assert_eq!(to_slug("Cafe\u{301} Noir"), "cafe-noir");
}

#[test]
fn slug_of_symbols_only_is_empty() {
    assert_eq!(to_slug("!!! ★ ???"), "");
}

#[test]
fn slug_is_idempotent() {
    for name in [
        "Café – Rösti!",
        "Señorita's Kitchen",
        "  Ünïcödé  ",
        "123 Main St.",
        "already-a-slug",
    ] {
        let once = to_slug(name);
        assert_eq!(to_slug(&once), once, "not idempotent for {name:?}");
    }
}
