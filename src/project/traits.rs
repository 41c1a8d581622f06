//! Trait vocabulary used to classify requirements.
//!
//! Traits are only a lookup key for the initial project state; later
//! transitions never consult them.

use std::collections::BTreeSet;
use std::fmt;

/// A boolean classifier over a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trait {
    Archive,
    Directory,
    Editable,
    Local,
    Named,
    Remote,
    Unnamed,
    Vcs,
    Wheel,
}

impl Trait {
    /// The tag used in registry keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Archive => "archive",
            Trait::Directory => "directory",
            Trait::Editable => "editable",
            Trait::Local => "local",
            Trait::Named => "named",
            Trait::Remote => "remote",
            Trait::Unnamed => "unnamed",
            Trait::Vcs => "vcs",
            Trait::Wheel => "wheel",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unordered, duplicate-free set of traits.
///
/// Iteration is sorted by tag name, so two sets built from the same traits in
/// any order are equal and display identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitSet(BTreeSet<&'static str>);

impl TraitSet {
    /// Create an empty set.
    pub fn new() -> Self {
        TraitSet(BTreeSet::new())
    }

    /// Add a trait.
    pub fn insert(&mut self, t: Trait) {
        self.0.insert(t.as_str());
    }

    /// Number of traits in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Trait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = Trait>>(iter: I) -> Self {
        let mut set = TraitSet::new();
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl From<&[Trait]> for TraitSet {
    fn from(traits: &[Trait]) -> Self {
        traits.iter().copied().collect()
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key: Vec<&str> = self.0.iter().copied().collect();
        f.write_str(&key.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_set_is_order_independent() {
        let a: TraitSet = [Trait::Remote, Trait::Archive, Trait::Unnamed].into_iter().collect();
        let b: TraitSet = [Trait::Unnamed, Trait::Remote, Trait::Archive, Trait::Remote]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.to_string(), "archive-remote-unnamed");
    }
}
