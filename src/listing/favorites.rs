use crate::models::Flat;
use std::collections::HashMap;

/// Per-flat "favorited by the current user" flags.
///
/// Lookups for ids that were never seeded answer `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteMap {
    entries: HashMap<String, bool>,
}

impl FavoriteMap {
    /// A map with a `false` entry for every flat
    pub fn seeded(flats: &[Flat]) -> Self {
        Self {
            entries: flats.iter().map(|flat| (flat.id.clone(), false)).collect(),
        }
    }

    pub fn is_favorite(&self, flat_id: &str) -> bool {
        self.entries.get(flat_id).copied().unwrap_or(false)
    }

    pub fn contains(&self, flat_id: &str) -> bool {
        self.entries.contains_key(flat_id)
    }

    /// Write a single entry, leaving every other key untouched
    pub fn set(&mut self, flat_id: &str, favorited: bool) {
        self.entries.insert(flat_id.to_string(), favorited);
    }

    /// Flip one entry and return its new value
    pub fn flip(&mut self, flat_id: &str) -> bool {
        let next = !self.is_favorite(flat_id);
        self.set(flat_id, next);
        next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(id, favorited)| (id.as_str(), *favorited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Owner;

    fn flat(id: &str) -> Flat {
        Flat {
            id: id.to_string(),
            city: String::new(),
            street_name: String::new(),
            street_number: String::new(),
            rent_price: 0.0,
            area_size: 0.0,
            year_built: None,
            has_ac: false,
            date_available: None,
            latitude: None,
            longitude: None,
            owner: Owner {
                id: "owner".to_string(),
                email: String::new(),
                avatar: String::new(),
            },
        }
    }

    #[test]
    fn seeding_creates_one_false_entry_per_flat() {
        let flats: Vec<Flat> = ["a", "b", "c"].into_iter().map(flat).collect();
        let map = FavoriteMap::seeded(&flats);

        assert_eq!(map.len(), 3);
        for f in &flats {
            assert!(map.contains(&f.id));
            assert!(!map.is_favorite(&f.id));
        }
    }

    #[test]
    fn missing_key_reads_as_not_favorited() {
        let map = FavoriteMap::default();
        assert!(!map.is_favorite("ghost"));
        assert!(map.is_empty());
    }

    #[test]
    fn flip_touches_only_its_key() {
        let mut map = FavoriteMap::seeded(&[flat("a"), flat("b")]);
        map.set("b", true);
        let before_b = map.is_favorite("b");

        assert!(map.flip("a"));
        assert!(map.is_favorite("a"));
        assert_eq!(map.is_favorite("b"), before_b);

        assert!(!map.flip("a"));
        assert_eq!(map.len(), 2);
    }
}
