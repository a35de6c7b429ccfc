use std::collections::HashMap;

/// Case-insensitive name index mapping a folded name to a position.
///
/// The first spelling registered for a name wins.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveIndex {
    map: HashMap<String, usize>,
}

impl CaseInsensitiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` at `position`, returning the existing position on collision.
    pub fn insert(&mut self, name: &str, position: usize) -> Option<usize> {
        let key = name.to_lowercase();
        if let Some(existing) = self.map.get(&key) {
            return Some(*existing);
        }
        self.map.insert(key, position);
        None
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.map.get(&name.to_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
