use crate::listing::favorites::FavoriteMap;
use crate::models::{Flat, ListingMode};
use crate::session::Session;

/// One rendered row of the listing
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCard<'a> {
    pub flat: &'a Flat,
    pub is_favorite: bool,
    /// The viewer owns this flat and may edit it
    pub can_edit: bool,
    /// The viewer may message the owner
    pub can_contact: bool,
}

impl<'a> FlatCard<'a> {
    pub fn new(flat: &'a Flat, favorites: &FavoriteMap, session: &Session) -> Self {
        let owned = session.owns(&flat.owner.id);
        Self {
            flat,
            is_favorite: favorites.is_favorite(&flat.id),
            can_edit: owned,
            can_contact: !owned,
        }
    }

    pub fn address(&self) -> String {
        format!("{}, {}", self.flat.street_name, self.flat.street_number)
    }

    pub fn availability(&self) -> String {
        self.flat
            .date_available
            .map(|date| date.format("%a %b %d %Y").to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Flats to render for `mode`, in collection order
pub fn visible_flats<'a>(
    flats: &'a [Flat],
    favorites: &FavoriteMap,
    mode: ListingMode,
) -> Vec<&'a Flat> {
    match mode {
        ListingMode::All => flats.iter().collect(),
        ListingMode::FavoritesOnly => flats
            .iter()
            .filter(|flat| favorites.is_favorite(&flat.id))
            .collect(),
    }
}
