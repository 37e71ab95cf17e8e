//! Glob resolution with alternation groups.
//!
//! The `glob` crate understands `*`, `**`, `?` and `[...]`. Patterns used by
//! commit hooks also rely on alternation, so two group syntaxes are expanded
//! up front:
//!
//! - `{a,b}`: brace alternation
//! - `(a|b)` / `@(a|b)`: extglob-style alternation
//!
//! ```text
//! img/{png,gif}/*.(jpg|png)
//!   ─► img/png/*.jpg, img/png/*.png, img/gif/*.jpg, img/gif/*.png
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::select::ResourceError;

/// Resolve `pattern` to the sorted, de-duplicated list of matching files.
///
/// Directories are never returned. Unreadable entries are skipped.
pub fn resolve(pattern: &str) -> Result<Vec<PathBuf>, ResourceError> {
    let mut found = BTreeSet::new();

    for expanded in expand(normalize(pattern)) {
        let entries = glob::glob(&expanded)
            .map_err(|err| ResourceError::Pattern(expanded.clone(), err))?;
        found.extend(entries.flatten().filter(|path| path.is_file()));
    }

    Ok(found.into_iter().collect())
}

/// Strip leading `./` so results compare equal to plain relative paths.
pub fn normalize(pattern: &str) -> &str {
    let mut pattern = pattern.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}

/// Expand every alternation group into plain glob patterns.
pub fn expand(pattern: &str) -> Vec<String> {
    let Some((open, close)) = find_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let separator = if pattern[open..].starts_with('{') { ',' } else { '|' };
    let prefix = &pattern[..open];
    // `@(a|b)` means exactly one of the alternatives
    let prefix = if separator == '|' {
        prefix.strip_suffix('@').unwrap_or(prefix)
    } else {
        prefix
    };
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    split_top_level(body, separator)
        .into_iter()
        .flat_map(|alt| expand(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

/// Byte offsets of the first balanced `{...}` or `(...)` group.
fn find_group(pattern: &str) -> Option<(usize, usize)> {
    let open = pattern.find(['{', '('])?;
    let mut depth = 0usize;

    for (i, c) in pattern[open..].char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `separator` outside of nested groups.
fn split_top_level(body: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&body[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
