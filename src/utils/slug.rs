use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("static regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex"));
static EDGE_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-+|-+$").expect("static regex"));

/// Turns a post title into the URL fragment used in `/post/:slug`.
///
/// Lowercases, drops anything that is not an ASCII word character, space or
/// hyphen, collapses separator runs into one hyphen and trims edge hyphens.
pub fn create_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = NON_WORD.replace_all(lowered.trim(), "");
    let joined = SEPARATORS.replace_all(&cleaned, "-");
    EDGE_HYPHENS.replace_all(&joined, "").into_owned()
}

/// Recovers the post id from `<title-slug>-<id>`: everything after the last
/// hyphen, or the whole slug when it has none.
pub fn post_id_from_slug(slug: &str) -> Option<&str> {
    let id = match slug.rsplit_once('-') {
        Some((_, id)) => id,
        None => slug,
    };
    (!id.is_empty()).then_some(id)
}
