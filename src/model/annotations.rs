use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Matches one pragma line inside a leading comment:
/// `// mocksmith: key` or `/// sourcery: key = v1, v2`.
static PRAGMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:/{2,3}\s*)?(?:mocksmith|sourcery)\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:=\s*(.+?))?\s*$")
        .expect("pragma regex is valid")
});

pub const MOCKABLE_KEY: &str = "AutoMockable";
pub const SKIP_KEY: &str = "skip";
pub const ALIAS_KEY: &str = "typealias";

/// Annotation pragmas parsed from a declaration's leading comment.
///
/// Unknown keys are preserved verbatim so downstream consumers can layer
/// their own pragmas on the same comment channel. Comments with no pragma
/// lines parse to an empty set, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    entries: BTreeMap<String, Vec<String>>,
}

impl Annotations {
    pub fn parse(comment: Option<&str>) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some(text) = comment else {
            return Annotations { entries };
        };
        for captures in PRAGMA_RE.captures_iter(text) {
            let key = captures[1].to_string();
            let values = match captures.get(2) {
                Some(raw) => split_values(raw.as_str()),
                None => Vec::new(),
            };
            entries.entry(key).or_default().extend(values);
        }
        Annotations { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_mockable(&self) -> bool {
        self.contains(MOCKABLE_KEY)
    }

    pub fn is_skipped(&self) -> bool {
        self.contains(SKIP_KEY)
    }

    /// Member names listed in a type-level `skip = a, b` pragma.
    pub fn skipped_members(&self) -> &[String] {
        self.values(SKIP_KEY)
    }

    /// `typealias = Name = Target` pragmas, as (name, target) pairs.
    pub fn declared_aliases(&self) -> Vec<(String, String)> {
        self.values(ALIAS_KEY)
            .iter()
            .filter_map(|value| {
                let (name, target) = value.split_once('=')?;
                let name = name.trim();
                let target = target.trim();
                if name.is_empty() || target.is_empty() {
                    return None;
                }
                Some((name.to_string(), target.to_string()))
            })
            .collect()
    }

    /// Later pragmas win key-by-key; used when extension annotations fold
    /// into their base type.
    pub fn merge_from(&mut self, other: &Annotations) {
        for (key, values) in &other.entries {
            self.entries.insert(key.clone(), values.clone());
        }
    }
}

/// Values split on commas, except when the payload itself contains `=`
/// (alias targets may be generic and carry commas of their own).
/// Quoting is optional: `skip = "forwarded"` and `skip = forwarded` agree.
fn split_values(raw: &str) -> Vec<String> {
    if raw.contains('=') {
        return vec![unquote(raw.trim())];
    }
    raw.split(',')
        .map(str::trim)
        .map(unquote)
        .filter(|v| !v.is_empty())
        .collect()
}

fn unquote(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'').to_string()
}
