use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static regex"));

/// Derives a URL-safe slug from a human-readable label.
///
/// Accented letters keep their base letter after NFKD decomposition, other
/// non-ASCII characters are dropped. The rest is lowercased, punctuation is
/// removed and runs of whitespace or hyphens collapse into a single hyphen.
/// The result is deterministic: the same label always gives the same slug.
pub fn slugify(label: &str) -> String {
    let ascii: String = label
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&ascii, "");
    let collapsed = SEPARATOR_RUNS.replace_all(cleaned.trim(), "-");
    collapsed.trim_matches(|c| c == '-' || c == '_').to_string()
}
