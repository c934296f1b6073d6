use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("static regex is valid"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex is valid"));

/// URL slug for a category name, e.g. `"Magical Girl!"` becomes `"magical-girl"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}
