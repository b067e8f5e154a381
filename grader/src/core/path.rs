//! Root-relative child-index paths into the rubric tree.

use std::fmt;
use std::str::FromStr;

use crate::core::error::CoreError;

/// Separator used by [`NodePath::key`].
pub const KEY_SEPARATOR: char = '-';
/// Separator used by [`NodePath::sort_key`]; must order below ASCII digits.
pub const SORT_SEPARATOR: char = '.';
/// Component width for [`NodePath::sort_key`].
pub const DEFAULT_PAD_WIDTH: usize = 4;

/// Zero-based child indices from the root; the root itself is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Indentation depth: top-level deductions sit at 0, the root is floored at 0.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Lookup key: indices joined by `-`; the root key is empty.
    pub fn key(&self) -> String {
        self.0
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(&KEY_SEPARATOR.to_string())
    }

    /// Zero-padded key whose string order equals pre-order traversal order.
    pub fn sort_key(&self, width: usize) -> String {
        self.0
            .iter()
            .map(|index| format!("{index:0width$}"))
            .collect::<Vec<_>>()
            .join(&SORT_SEPARATOR.to_string())
    }

    /// True iff `self` is longer than `ancestor` and starts with it.
    pub fn is_strict_descendant_of(&self, ancestor: &NodePath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    pub fn is_strict_ancestor_of(&self, descendant: &NodePath) -> bool {
        descendant.is_strict_descendant_of(self)
    }

    /// Ancestor paths from the first level below the root down to the parent.
    pub fn proper_ancestors(&self) -> impl Iterator<Item = NodePath> + '_ {
        (1..self.0.len()).map(|len| NodePath(self.0[..len].to_vec()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("root");
        }
        f.write_str(&self.key())
    }
}

impl FromStr for NodePath {
    type Err = CoreError;

    /// Parse `""`/`"root"` as the root, otherwise `-`-separated indices.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "root" {
            return Ok(Self::root());
        }
        raw.split(KEY_SEPARATOR)
            .map(|part| {
                part.trim().parse::<usize>().map_err(|_| {
                    CoreError::MalformedInput(format!("invalid path component '{part}' in '{raw}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
