//! Placeholder rewriting.
//!
//! Statements are written with `?` (positional) or `:name` (named)
//! placeholders. Each driver takes its own native style, so the SQL is
//! rewritten once per statement and [`Params`] are bound to the resulting
//! slots in order.
//!
//! Quoted strings, quoted identifiers, dollar-quoted bodies (`$$...$$`,
//! `$tag$...$tag$`) and comments are copied untouched.
//! Backslash escapes inside string literals are not recognized.

use crate::error::{DbError, Result};
use crate::types::{Params, SqlValue};

/// Native placeholder style of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (sqlite, mysql)
    Question,
    /// `$1`, `$2`, ... (postgres)
    Numbered,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Positional,
    Named(String),
}

/// SQL rewritten into a driver's native placeholder style.
#[derive(Debug, Clone)]
pub struct RewrittenSql {
    sql: String,
    slots: Vec<Slot>,
}

impl RewrittenSql {
    /// The SQL text with native placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of values the driver expects.
    pub fn param_count(&self) -> usize {
        self.slots.len()
    }

    fn is_named(&self) -> bool {
        matches!(self.slots.first(), Some(Slot::Named(_)))
    }

    /// Orders `params` to match the native placeholders.
    pub fn bind(&self, params: &Params) -> Result<Vec<SqlValue>> {
        match params {
            Params::None => {
                if self.slots.is_empty() {
                    Ok(Vec::new())
                } else {
                    Err(count_mismatch(self.slots.len(), 0))
                }
            }
            Params::Positional(values) => {
                if values.len() != self.slots.len() {
                    return Err(count_mismatch(self.slots.len(), values.len()));
                }
                if self.is_named() {
                    return Err(DbError::ParameterMismatch(
                        "positional values bound to named placeholders".to_string(),
                    ));
                }
                Ok(values.clone())
            }
            Params::Named(pairs) => {
                if self.slots.is_empty() {
                    return if pairs.is_empty() {
                        Ok(Vec::new())
                    } else {
                        Err(count_mismatch(0, pairs.len()))
                    };
                }
                if !self.is_named() {
                    return Err(DbError::ParameterMismatch(
                        "named values bound to positional placeholders".to_string(),
                    ));
                }

                let mut values = Vec::with_capacity(self.slots.len());
                for slot in &self.slots {
                    if let Slot::Named(name) = slot {
                        let value = params.get_named(name).ok_or_else(|| {
                            DbError::ParameterMismatch(format!("no value bound for :{}", name))
                        })?;
                        values.push(value.clone());
                    }
                }

                for (key, _) in pairs {
                    let key = key.trim_start_matches(':');
                    let used = self
                        .slots
                        .iter()
                        .any(|slot| matches!(slot, Slot::Named(name) if name == key));
                    if !used {
                        return Err(DbError::ParameterMismatch(format!(
                            "parameter :{} is not used by the statement",
                            key
                        )));
                    }
                }

                Ok(values)
            }
        }
    }
}

fn count_mismatch(expected: usize, actual: usize) -> DbError {
    DbError::ParameterMismatch(format!(
        "statement expects {} parameter(s), {} bound",
        expected, actual
    ))
}

/// Rewrites `?` and `:name` placeholders into `style`.
///
/// Mixing named and positional placeholders in one statement is an error.
pub fn rewrite(sql: &str, style: PlaceholderStyle) -> Result<RewrittenSql> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut slots: Vec<Slot> = Vec::new();
    let mut has_named = false;
    let mut has_positional = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '\'' | '"' | '`' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == c)
                    .map(|p| i + 1 + p + 1)
                    .unwrap_or(chars.len());
                out.extend(&chars[i..end]);
                i = end;
            }
            '-' if next == Some('-') => {
                let end = chars[i..]
                    .iter()
                    .position(|&ch| ch == '\n')
                    .map(|p| i + p)
                    .unwrap_or(chars.len());
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if next == Some('*') => {
                let end = chars[i + 2..]
                    .windows(2)
                    .position(|w| w == ['*', '/'])
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(chars.len());
                out.extend(&chars[i..end]);
                i = end;
            }
            '$' if i == 0 || !is_ident_char(chars[i - 1]) => match dollar_tag(&chars[i..]) {
                Some(tag_len) => {
                    let body = i + tag_len;
                    let end = chars[body..]
                        .windows(tag_len)
                        .position(|w| w == &chars[i..body])
                        .map(|p| body + p + tag_len)
                        .unwrap_or(chars.len());
                    out.extend(&chars[i..end]);
                    i = end;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            ':' if next == Some(':') => {
                out.push_str("::");
                i += 2;
            }
            ':' if next.is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_') => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                has_named = true;

                match style {
                    PlaceholderStyle::Question => {
                        out.push('?');
                        slots.push(Slot::Named(name));
                    }
                    PlaceholderStyle::Numbered => {
                        let existing = slots
                            .iter()
                            .position(|slot| matches!(slot, Slot::Named(n) if *n == name));
                        let number = match existing {
                            Some(index) => index + 1,
                            None => {
                                slots.push(Slot::Named(name));
                                slots.len()
                            }
                        };
                        out.push('$');
                        out.push_str(&number.to_string());
                    }
                }
                i = end;
            }
            '?' => {
                has_positional = true;
                slots.push(Slot::Positional);
                match style {
                    PlaceholderStyle::Question => out.push('?'),
                    PlaceholderStyle::Numbered => {
                        out.push('$');
                        out.push_str(&slots.len().to_string());
                    }
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }

        if has_named && has_positional {
            return Err(DbError::ParameterMismatch(
                "mixed named and positional placeholders".to_string(),
            ));
        }
    }

    Ok(RewrittenSql { sql: out, slots })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of the `$$` or `$tag$` opener at the start of `chars`.
fn dollar_tag(chars: &[char]) -> Option<usize> {
    let mut end = 1;
    if chars.get(end).is_some_and(|c| c.is_ascii_alphabetic() || *c == '_') {
        while chars.get(end).copied().is_some_and(is_ident_char) {
            end += 1;
        }
    }
    (chars.get(end) == Some(&'$')).then_some(end + 1)
}
