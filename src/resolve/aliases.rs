//! Scope-aware alias resolution.
//!
//! Names are resolved against the collected table by walking enclosing
//! scopes innermost-out; the first scope defining the name wins, so inner
//! aliases shadow outer ones. Generic aliases substitute their arguments
//! positionally. Resolution re-resolves its own output until a fixed point,
//! bounded by [`MAX_ALIAS_DEPTH`]; a cycle or an exceeded bound yields the
//! original spelling unchanged rather than an error.

use crate::model::{qualify, AliasTable};
use log::debug;
use std::collections::HashSet;

pub const MAX_ALIAS_DEPTH: usize = 16;

/// Scope keys to search for a name used inside `scope`, innermost first,
/// ending with file scope: `"A.B"` yields `["A.B", "A", ""]`.
pub fn scope_chain(scope: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = scope;
    while !current.is_empty() {
        chain.push(current.to_string());
        current = match current.rfind('.') {
            Some(idx) => &current[..idx],
            None => "",
        };
    }
    chain.push(String::new());
    chain
}

pub struct AliasResolver<'a> {
    table: &'a AliasTable,
}

impl<'a> AliasResolver<'a> {
    pub fn new(table: &'a AliasTable) -> Self {
        AliasResolver { table }
    }

    /// Resolve every alias mentioned anywhere in `raw`, a full type
    /// reference. Idempotent on fully-resolved references.
    pub fn resolve(&self, raw: &str, scope: &str) -> String {
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = raw.to_string();
        for _ in 0..MAX_ALIAS_DEPTH {
            let rewritten = self.rewrite_once(&current, scope);
            if rewritten == current {
                return current;
            }
            if !seen.insert(rewritten.clone()) {
                debug!("alias cycle while resolving '{}', keeping original", raw);
                return raw.to_string();
            }
            current = rewritten;
        }
        debug!(
            "alias resolution for '{}' exceeded depth {}, keeping original",
            raw, MAX_ALIAS_DEPTH
        );
        raw.to_string()
    }

    /// One substitution pass over every identifier in the reference.
    fn rewrite_once(&self, raw: &str, scope: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            let rest = &raw[i..];
            let first = match rest.chars().next() {
                Some(c) => c,
                None => break,
            };
            if first.is_alphabetic() || first == '_' {
                let run = rest
                    .char_indices()
                    .find(|&(_, c)| !is_ident_char(c))
                    .map_or(rest.len(), |(pos, _)| pos);
                let token = &rest[..run];
                let token_end = i + run;
                let (args, args_end) = if raw[token_end..].starts_with('<') {
                    match matching_angle(raw, token_end) {
                        Some(end) => (Some(&raw[token_end + 1..end]), end + 1),
                        None => (None, token_end),
                    }
                } else {
                    (None, token_end)
                };
                match self.expand(token, args, scope) {
                    Some(expanded) => {
                        out.push_str(&expanded);
                        i = args_end;
                    }
                    None => {
                        out.push_str(token);
                        i = token_end;
                    }
                }
            } else {
                out.push(first);
                i += first.len_utf8();
            }
        }
        out
    }

    /// Expand one identifier (optionally with generic arguments) if any
    /// scope in the chain defines it as an alias.
    fn expand(&self, token: &str, args: Option<&str>, scope: &str) -> Option<String> {
        let def = self.lookup(token, scope)?;
        match (def.generic_parameters.is_empty(), args) {
            (true, None) => Some(def.target.clone()),
            (false, Some(args)) => {
                let values = split_top_level(args);
                if values.len() != def.generic_parameters.len() {
                    return None;
                }
                let mut target = def.target.clone();
                for (param, value) in def.generic_parameters.iter().zip(&values) {
                    target = replace_identifier(&target, param, value.trim());
                }
                Some(target)
            }
            // Arity mismatch between use and definition: leave untouched.
            _ => None,
        }
    }

    fn lookup(&self, token: &str, scope: &str) -> Option<&crate::model::AliasDef> {
        if let Some((prefix, last)) = token.rsplit_once('.') {
            for enclosing in scope_chain(scope) {
                let candidate = qualify(&enclosing, prefix);
                if let Some(def) = self.table.lookup(&candidate, last) {
                    return Some(def);
                }
            }
            return None;
        }
        for key in scope_chain(scope) {
            if let Some(def) = self.table.lookup(&key, token) {
                return Some(def);
            }
        }
        None
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Index of the `>` closing the `<` at `open`. The `>` of a `->` arrow does
/// not count as a closer.
fn matching_angle(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on commas not nested inside brackets or generic arguments.
fn split_top_level(s: &str) -> Vec<String> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' | b')' | b']' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(s[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    let tail = s[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }
    parts
}

/// Replace whole-identifier occurrences of `from` with `to`. Occurrences
/// preceded by `.` are member accesses of some other type and stay.
pub fn replace_identifier(haystack: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return haystack.to_string();
    }
    let mut out = String::with_capacity(haystack.len());
    let mut prev: Option<char> = None;
    let mut rest = haystack;
    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back().or(prev);
        let before_ok = before.map_or(true, |c| !is_ident_char(c));
        let after_ok = rest[pos + from.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        out.push_str(&rest[..pos]);
        if before_ok && after_ok {
            out.push_str(to);
        } else {
            out.push_str(from);
        }
        prev = from.chars().next_back();
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}
