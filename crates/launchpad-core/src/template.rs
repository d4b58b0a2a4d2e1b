//! Submission script templating.
//!
//! Placeholders are `$name` or `${name}`. Substitution is safe: placeholders
//! without a value are left in place, so shell variables survive rendering.
//! `$$` renders a literal `$`.

use crate::error::{SweepError, SweepResult};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_ARRAY_TEMPLATE: &str = include_str!("../templates/array.sbatch");

/// Named substitution values.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    content: String,
}

fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
            bytes.iter().take_while(|b| b.is_ascii_alphanumeric() || **b == b'_').count()
        }
        _ => 0,
    }
}

/// Placeholder right after a `$`: its name and the bytes it spans.
fn placeholder_at(rest: &str) -> Option<(&str, usize)> {
    if let Some(inner) = rest.strip_prefix('{') {
        let len = identifier_len(inner);
        (len > 0 && inner[len..].starts_with('}')).then(|| (&inner[..len], len + 2))
    } else {
        let len = identifier_len(rest);
        (len > 0).then(|| (&rest[..len], len))
    }
}

impl ScriptTemplate {
    pub fn load(path: &Path) -> SweepResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SweepError::Template(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(Self { content })
    }

    #[must_use]
    pub fn from_string(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// The job array script shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_string(BUILTIN_ARRAY_TEMPLATE)
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn render(&self, context: &TemplateContext) -> String {
        let src = self.content.as_str();
        let mut out = String::with_capacity(src.len());
        let mut last = 0;
        let mut i = 0;

        while let Some(offset) = src[i..].find('$') {
            let dollar = i + offset;
            out.push_str(&src[last..dollar]);
            let rest = &src[dollar + 1..];

            i = if rest.starts_with('$') {
                out.push('$');
                dollar + 2
            } else if let Some((name, len)) = placeholder_at(rest) {
                let end = dollar + 1 + len;
                out.push_str(context.get(name).unwrap_or(&src[dollar..end]));
                end
            } else {
                out.push('$');
                dollar + 1
            };
            last = i;
        }

        out.push_str(&src[last..]);
        out
    }

    /// Distinct placeholder names, in order of first appearance.
    #[must_use]
    pub fn list_placeholders(&self) -> Vec<String> {
        let src = self.content.as_str();
        let mut names: Vec<String> = Vec::new();
        let mut i = 0;

        while let Some(offset) = src[i..].find('$') {
            let rest = &src[i + offset + 1..];
            if rest.starts_with('$') {
                i += offset + 2;
                continue;
            }
            match placeholder_at(rest) {
                Some((name, len)) => {
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                    i += offset + 1 + len;
                }
                None => i += offset + 1,
            }
        }

        names
    }
}
