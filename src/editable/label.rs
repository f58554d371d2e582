//! Display labels derived from structural names.

const NOISE_TOKENS: &[&str] =
    &["AutoColliderFemaleAutoColliders", "FemaleAutoColliders", "AutoColliders", "StandardColliders", "AutoCollider"];

const SEPARATORS: &[char] = &['_', '-', '.', ' '];

/// Shortens a structural path to something readable in a list.
///
/// Keeps the last path segment, drops well-known noise tokens and collapses
/// separators. When a segment repeats its parent (`Chest/Chest`) only one copy
/// is kept. Falls back to the raw leaf when nothing readable is left.
pub fn simplify(path: &str) -> String {
    let segments: Vec<&str> = path.split(['/', '\\', ':']).filter(|segment| !segment.is_empty()).collect();
    let Some(leaf) = segments.last().copied() else {
        return path.trim().to_string();
    };

    let mut stripped = leaf.to_string();
    for token in NOISE_TOKENS {
        stripped = stripped.replace(token, "");
    }

    let words: Vec<&str> = stripped.split(SEPARATORS).filter(|word| !word.is_empty()).collect();
    let mut simplified = words.join(" ");
    if simplified.is_empty() {
        simplified = leaf.to_string();
    }

    if segments.len() >= 2 {
        let parent = segments[segments.len() - 2];
        let parent_simplified = simplify(parent);
        if !parent_simplified.is_empty()
            && !parent_simplified.eq_ignore_ascii_case(&simplified)
            && is_generic(&simplified)
        {
            simplified = format!("{parent_simplified} {simplified}");
        }
    }
    simplified
}

/// Leaves like `hard` or `collider2` say nothing on their own.
fn is_generic(leaf: &str) -> bool {
    let lower = leaf.to_ascii_lowercase();
    let base = lower.trim_end_matches(|ch: char| ch.is_ascii_digit()).trim();
    matches!(base, "hard" | "joint" | "collider" | "col" | "capsule" | "sphere" | "box" | "")
}

pub fn prefixed(tag: &str, path: &str) -> String {
    format!("[{tag}] {}", simplify(path))
}
