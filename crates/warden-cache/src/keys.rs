//! Cache key builders and glob helpers.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the service writes.

use uuid::Uuid;

/// Separator between the segments of a session key.
pub const SESSION_KEY_SEPARATOR: char = '_';

// ── Session keys ───────────────────────────────────────────

/// Cache key for one session ticket: `{prefix}_{owner_id}_{nonce}`.
pub fn session_ticket(prefix: &str, owner_id: Uuid, nonce: &str) -> String {
    format!("{prefix}{SESSION_KEY_SEPARATOR}{owner_id}{SESSION_KEY_SEPARATOR}{nonce}")
}

/// Pattern matching every session ticket of one owner.
pub fn session_owner_pattern(prefix: &str, owner_id: Uuid) -> String {
    format!(
        "{}{SESSION_KEY_SEPARATOR}{owner_id}{SESSION_KEY_SEPARATOR}*",
        escape_glob(prefix)
    )
}

// ── Glob helpers ───────────────────────────────────────────

/// Prepend a literal backend namespace to an already-escaped `pattern`.
pub fn namespaced_pattern(namespace: &str, pattern: &str) -> String {
    format!("{}{pattern}", escape_glob(namespace))
}

/// Escape glob metacharacters so `literal` only matches itself.
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Match `key` against a Redis-style glob supporting `*`, `?` and `\` escapes.
///
/// Character classes are not supported; `[` and `]` match literally.
pub fn glob_matches(pattern: &str, key: &str) -> bool {
    let pattern = tokenize(pattern);
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0usize, 0usize);
    // Position of the last `*` and the key index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(Token::Any) => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(Token::One) => {
                p += 1;
                k += 1;
            }
            Some(Token::Literal(c)) if *c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    k = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|t| matches!(t, Token::Any))
}

enum Token {
    Any,
    One,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '*' => Token::Any,
            '?' => Token::One,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        });
    }
    tokens
}
