use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed type reference as it appeared in a declaration.
///
/// The raw spelling is kept alongside the pieces the pipeline cares about:
/// optionality (including the implicitly-unwrapped form), closure-ness and
/// call-site attributes such as `@escaping`. Everything downstream of the
/// model builder works on the normalized form, where `T!` has already been
/// rewritten to `T?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    /// Canonical spelling with attributes stripped, e.g. `(Int) -> Void` or `String?`.
    pub name: String,
    /// Spelling without the trailing `?`/`!`.
    pub unwrapped: String,
    pub is_optional: bool,
    pub is_implicitly_unwrapped: bool,
    /// Attribute names without the leading `@` (`escaping`, `Sendable`, ...).
    pub attributes: Vec<String>,
}

impl TypeName {
    pub fn parse(raw: &str) -> Self {
        let mut working = raw.trim().to_string();

        let mut attributes = Vec::new();
        while let Some(at) = working.find('@') {
            let rest = &working[at + 1..];
            let end = rest
                .find(|c: char| !c.is_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            let attr = rest[..end].to_string();
            if attr.is_empty() {
                break;
            }
            working.replace_range(at..at + 1 + end, "");
            working = working.trim().to_string();
            attributes.push(attr);
        }
        let cleaned = collapse_spaces(&working);

        let (unwrapped, is_optional, is_implicitly_unwrapped) =
            if let Some(stripped) = cleaned.strip_suffix('!') {
                (stripped.to_string(), false, true)
            } else if let Some(stripped) = cleaned.strip_suffix('?') {
                (stripped.to_string(), true, false)
            } else {
                (cleaned.clone(), false, false)
            };

        TypeName {
            name: cleaned,
            unwrapped,
            is_optional,
            is_implicitly_unwrapped,
            attributes,
        }
    }

    pub fn void() -> Self {
        TypeName::parse("Void")
    }

    /// `Void` and the empty tuple count as void; optional `Void?` does not,
    /// because a value still has to be produced.
    pub fn is_void(&self) -> bool {
        !self.is_optional && !self.is_implicitly_unwrapped && is_void_spelling(&self.unwrapped)
    }

    /// A function type at the top level of the reference. Arrows nested in
    /// generic arguments or tuples do not make the whole reference a closure.
    pub fn is_closure(&self) -> bool {
        has_top_level_arrow(&self.unwrapped)
    }

    /// Implicitly-unwrapped optionals are modeled as plain optionals so that
    /// no later stage has to distinguish `T!` from `T?`.
    pub fn normalized(&self) -> TypeName {
        if !self.is_implicitly_unwrapped {
            return self.clone();
        }
        TypeName {
            name: format!("{}?", self.unwrapped),
            unwrapped: self.unwrapped.clone(),
            is_optional: true,
            is_implicitly_unwrapped: false,
            attributes: self.attributes.clone(),
        }
    }

    /// The spelling used inside matcher and perform signatures: normalized,
    /// with closures and `any` existentials parenthesized before `?`.
    pub fn signature_spelling(&self) -> String {
        let normalized = self.normalized();
        if normalized.is_optional
            && (has_top_level_arrow(&normalized.unwrapped)
                || normalized.unwrapped.starts_with("any "))
            && !normalized.unwrapped.starts_with('(')
        {
            return format!("({})?", normalized.unwrapped);
        }
        normalized.name
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Source spelling with attributes restored, `@escaping (Int) -> Void`.
    pub fn attributed_name(&self) -> String {
        if self.attributes.is_empty() {
            return self.name.clone();
        }
        let attrs: Vec<String> = self.attributes.iter().map(|a| format!("@{}", a)).collect();
        format!("{} {}", attrs.join(" "), self.name)
    }

    /// Every plain identifier path mentioned anywhere in the reference,
    /// in source order. `Dictionary<String, [Session]>` yields
    /// `Dictionary`, `String`, `Session`.
    pub fn referenced_names(&self) -> Vec<String> {
        referenced_identifiers(&self.unwrapped)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn is_void_spelling(s: &str) -> bool {
    s == "Void" || s == "()"
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_space && !out.is_empty() {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

fn has_top_level_arrow(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'<' => depth += 1,
            b')' | b']' | b'>' => depth -= 1,
            b'-' if depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b'>' => {
                return true;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

const TYPE_KEYWORDS: &[&str] = &[
    "any", "some", "inout", "throws", "rethrows", "async", "where", "Self", "Void",
];

fn referenced_identifiers(s: &str) -> Vec<String> {
    let mut names = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            let token = token.trim_matches('.').to_string();
            if !token.is_empty() && !TYPE_KEYWORDS.contains(&token.as_str()) {
                names.push(token);
            }
        } else {
            i += 1;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_type() {
        let t = TypeName::parse("String");
        assert_eq!(t.name, "String");
        assert_eq!(t.unwrapped, "String");
        assert!(!t.is_optional);
        assert!(!t.is_closure());
    }

    #[test]
    fn test_parse_optional() {
        let t = TypeName::parse("Int?");
        assert!(t.is_optional);
        assert_eq!(t.unwrapped, "Int");
    }

    #[test]
    fn test_parse_implicitly_unwrapped() {
        let t = TypeName::parse("String!");
        assert!(t.is_implicitly_unwrapped);
        assert!(!t.is_optional);
        assert_eq!(t.normalized().name, "String?");
        assert!(t.normalized().is_optional);
    }

    #[test]
    fn test_normalize_is_stable_for_plain_optional() {
        let t = TypeName::parse("Int?");
        assert_eq!(t.normalized(), t);
    }

    #[test]
    fn test_parse_escaping_closure() {
        let t = TypeName::parse("@escaping (Int) -> Void");
        assert_eq!(t.name, "(Int) -> Void");
        assert!(t.has_attribute("escaping"));
        assert!(t.is_closure());
    }

    #[test]
    fn test_nested_arrow_is_not_closure() {
        let t = TypeName::parse("Array<(Int) -> Void>");
        assert!(!t.is_closure());
    }

    #[test]
    fn test_void_detection() {
        assert!(TypeName::parse("Void").is_void());
        assert!(TypeName::parse("()").is_void());
        assert!(!TypeName::parse("Void?").is_void());
        assert!(!TypeName::parse("Int").is_void());
    }

    #[test]
    fn test_optional_closure_signature_spelling() {
        let t = TypeName::parse("((Int) -> Void)?");
        assert_eq!(t.signature_spelling(), "((Int) -> Void)?");
    }

    #[test]
    fn test_optional_existential_signature_spelling() {
        let t = TypeName::parse("any Codable?");
        assert_eq!(t.signature_spelling(), "(any Codable)?");
    }

    #[test]
    fn test_referenced_names() {
        let t = TypeName::parse("Dictionary<String, [Session]>");
        assert_eq!(t.referenced_names(), vec!["Dictionary", "String", "Session"]);
    }

    #[test]
    fn test_referenced_names_skips_keywords() {
        let t = TypeName::parse("(inout Request) async throws -> any Response");
        assert_eq!(t.referenced_names(), vec!["Request", "Response"]);
    }

    #[test]
    fn test_referenced_names_keeps_dotted_paths() {
        let t = TypeName::parse("Namespace.Inner?");
        assert_eq!(t.referenced_names(), vec!["Namespace.Inner"]);
    }
}
