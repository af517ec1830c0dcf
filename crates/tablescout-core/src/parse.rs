//! Value parsers shared by every extractor.
//!
//! Both functions are total: any input, however malformed, produces a value.

/// Parses locale-formatted, optionally abbreviated counts.
///
/// Thousands separators and whitespace are ignored, and one trailing
/// magnitude suffix is honoured (`K` = ×1 000, `M` = ×1 000 000, either
/// case). The product is rounded to the nearest integer.
///
/// Handles: `"12.3K"` → `12300`, `"1,204"` → `1204`, `"4.5M"` → `4500000`.
/// Empty, negative, or non-numeric input yields `0`.
#[must_use]
pub fn parse_compact_count(text: &str) -> u64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return 0;
    }

    let (number, multiplier) = match cleaned.as_bytes()[cleaned.len() - 1] {
        b'k' | b'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        b'm' | b'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    // `f64::from_str` accepts "inf" and "nan"; only plain decimals count.
    if number.is_empty()
        || !number
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.')
    {
        return 0;
    }

    let Ok(value) = number.parse::<f64>() else {
        return 0;
    };
    if !value.is_finite() || value < 0.0 {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = (value * multiplier).round() as u64;
    rounded
}

/// Derives a stable, URL-safe identifier from a free-form name.
///
/// Lowercases, folds accented Latin letters to their base letter, replaces
/// every run of other characters with a single hyphen, and trims hyphens at
/// both ends. The output only contains `[a-z0-9-]`, so applying it twice
/// yields the same string.
#[must_use]
pub fn to_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        // Combining marks (decomposed accents) vanish instead of splitting words.
        if ('\u{0300}'..='\u{036f}').contains(&c) {
            continue;
        }

        let folded: Option<&str> = if c.is_ascii_alphanumeric() {
            None
        } else {
            fold_diacritic(c)
        };

        if c.is_ascii_alphanumeric() || folded.is_some() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            match folded {
                Some(base) => slug.push_str(base),
                None => slug.push(c),
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Maps a lowercase accented Latin letter to its ASCII base form.
fn fold_diacritic(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
