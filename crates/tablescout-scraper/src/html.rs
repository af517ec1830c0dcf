//! Regex-based HTML scanning: meta tags, attributes, script payloads, and
//! JSON-LD nodes.
//!
//! Pages are treated as text; no DOM is built. Every helper is total and
//! returns `None`/empty on anything it does not recognize.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));
static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script>").expect("valid script regex")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid title regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").expect("valid entity regex")
});

/// Returns the `content` of the first `<meta>` whose `property` or `name`
/// equals `key` (case-insensitive), entity-decoded and trimmed.
#[must_use]
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let matches_key = ["property", "name", "itemprop"]
            .iter()
            .filter_map(|attr| extract_attr(tag, attr))
            .any(|v| v.eq_ignore_ascii_case(key));
        if !matches_key {
            return None;
        }
        extract_attr(tag, "content")
            .map(|c| decode_entities(&c).trim().to_string())
            .filter(|c| !c.is_empty())
    })
}

/// Extracts a quoted attribute value from a single tag's source.
#[must_use]
pub fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)(?:^|[\s<])(?:{})\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attr)
    );
    let re = Regex::new(&pattern).expect("valid attr regex");
    re.captures(tag).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Bodies of all `<script>` elements whose `type` attribute equals
/// `script_type`.
#[must_use]
pub fn scripts_of_type<'a>(html: &'a str, script_type: &str) -> Vec<&'a str> {
    SCRIPT_RE
        .captures_iter(html)
        .filter(|c| {
            c.get(1)
                .and_then(|attrs| extract_attr(attrs.as_str(), "type"))
                .is_some_and(|t| t.eq_ignore_ascii_case(script_type))
        })
        .filter_map(|c| c.get(2).map(|m| m.as_str().trim()))
        .collect()
}

/// Body of the `<script>` with the given `id`.
#[must_use]
pub fn script_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    SCRIPT_RE.captures_iter(html).find_map(|c| {
        let attrs = c.get(1)?.as_str();
        if extract_attr(attrs, "id").as_deref() == Some(id) {
            c.get(2).map(|m| m.as_str().trim())
        } else {
            None
        }
    })
}

/// The JSON object literal assigned to `name` in an inline script, as in
/// `var ytInitialData = {...};` or `window._sharedData = {...};`.
///
/// The object is delimited by brace balancing that respects string
/// literals, so trailing script text does not leak in.
#[must_use]
pub fn assigned_json<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(rel) = html[search_from..].find(name) {
        let after_name = search_from + rel + name.len();
        search_from = after_name;

        // Tolerate the closing `"]` of `window["name"] = {...}`.
        let rest = html[after_name..]
            .trim_start_matches(['"', '\'', ']'])
            .trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if rest.starts_with('{') {
            return balanced_object(rest);
        }
    }
    None
}

/// The leading balanced `{...}` of `text`, which must start with `{`.
#[must_use]
pub fn balanced_object(text: &str) -> Option<&str> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// All JSON-LD nodes on the page, with top-level arrays and `@graph`
/// containers flattened. Blocks that fail to parse are skipped.
#[must_use]
pub fn json_ld_nodes(html: &str) -> Vec<Value> {
    let mut nodes = Vec::new();
    for raw in scripts_of_type(html, "application/ld+json") {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            tracing::debug!("skipping malformed JSON-LD block");
            continue;
        };
        flatten_ld(value, &mut nodes);
    }
    nodes
}

fn flatten_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_ld(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_ld(graph, out);
            }
            if map.contains_key("@type") {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

/// True when the node's `@type` (string or array) contains any of `types`.
#[must_use]
pub fn node_has_type(node: &Value, types: &[&str]) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => types.iter().any(|want| t.eq_ignore_ascii_case(want)),
        Some(Value::Array(ts)) => ts
            .iter()
            .filter_map(Value::as_str)
            .any(|t| types.iter().any(|want| t.eq_ignore_ascii_case(want))),
        _ => false,
    }
}

/// Text of the `<title>` element.
#[must_use]
pub fn title_text(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Strips tags, decodes entities, and collapses whitespace.
#[must_use]
pub fn clean_text(fragment: &str) -> String {
    let without_tags = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Decodes the named entities pages commonly use plus numeric references.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let named = text
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&middot;", "·");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |c: &regex::Captures<'_>| {
        let code = c
            .get(1)
            .and_then(|h| u32::from_str_radix(h.as_str(), 16).ok())
            .or_else(|| c.get(2).and_then(|d| d.as_str().parse::<u32>().ok()));
        code.and_then(char::from_u32)
            .map_or_else(|| c[0].to_string(), |ch| ch.to_string())
    });
    // Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}

/// Resolves `candidate` against `base_url`.
#[must_use]
pub fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.replace("&amp;", "&");
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(candidate.trim()).ok().map(|u| u.to_string())
}
