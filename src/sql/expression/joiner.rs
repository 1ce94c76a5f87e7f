use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::sql::{flatten, flatten_counted, Chunk, Component, Expression, RenderStats};

/// An ordered list of chunks rendered with a separator between them and a
/// prefix and suffix around the whole.
///
/// Children that render to nothing (an absent optional clause, or a
/// combinator whose own children were all absent) are left out, so they
/// never produce a dangling separator. If every child is left out, the
/// prefix and suffix are dropped too.
#[derive(Debug, Clone)]
pub struct Joiner {
    parts: Vec<Arc<dyn Chunk>>,
    separator: String,
    prefix: String,
    suffix: String,
}

impl Joiner {
    pub fn new(parts: Vec<Arc<dyn Chunk>>, separator: &str, prefix: &str, suffix: &str) -> Self {
        Joiner {
            parts,
            separator: separator.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Flattens `components` and applies the escaping policy to each of them.
    pub fn from_components(
        components: Vec<Component>,
        separator: &str,
        prefix: &str,
        suffix: &str,
    ) -> Self {
        Self::counted(components, separator, prefix, suffix, None)
    }

    /// Same as [`Joiner::from_components()`], recording the work in `stats`.
    pub fn counted(
        components: Vec<Component>,
        separator: &str,
        prefix: &str,
        suffix: &str,
        stats: Option<&RenderStats>,
    ) -> Self {
        let flat = match stats {
            Some(stats) => flatten_counted(components, stats),
            None => flatten(components),
        };
        let parts = flat
            .into_iter()
            .filter_map(|component| component.into_chunk(stats))
            .collect();
        Self::new(parts, separator, prefix, suffix)
    }

    /// Reads prefix, separator and suffix from a format string, using `1`
    /// and `2` as markers: `"(1 AND 2)"` gives prefix `(`, separator ` AND `
    /// and suffix `)`.
    pub fn from_format(format: &str, components: Vec<Component>) -> Result<Self> {
        let (prefix, rest) = format
            .split_once('1')
            .ok_or_else(|| anyhow!("join format `{}` has no `1` marker", format))?;
        let (separator, suffix) = rest
            .split_once('2')
            .ok_or_else(|| anyhow!("join format `{}` has no `2` marker after `1`", format))?;

        Ok(Self::from_components(components, separator, prefix, suffix))
    }

    pub fn parts(&self) -> &[Arc<dyn Chunk>] {
        &self.parts
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Chunk for Joiner {
    fn render_chunk(&self) -> Expression {
        let rendered: Vec<Expression> = self
            .parts
            .iter()
            .map(|part| part.render_chunk())
            .filter(|expression| !expression.is_empty())
            .collect();

        if rendered.is_empty() {
            return Expression::empty();
        }

        Expression::from_vec(rendered, &self.separator).wrap(&self.prefix, &self.suffix)
    }
}

/// `NOT` in front of a chunk. The chunk is put in parentheses unless it
/// already renders as one parenthesized group.
#[derive(Debug, Clone)]
pub struct Negation {
    inner: Joiner,
}

impl Negation {
    pub fn new(inner: Joiner) -> Self {
        Negation { inner }
    }
}

impl Chunk for Negation {
    fn render_chunk(&self) -> Expression {
        let inner = self.inner.render_chunk();
        if inner.is_empty() {
            return inner;
        }
        if is_enclosed(inner.sql()) {
            inner.wrap("NOT ", "")
        } else {
            inner.wrap("NOT (", ")")
        }
    }
}

// True when the first `(` is closed by the very last character.
fn is_enclosed(sql: &str) -> bool {
    if !sql.starts_with('(') || !sql.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, ch) in sql.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == sql.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}
