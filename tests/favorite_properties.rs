//! Property tests for favorite state: seeding, per-key merging, toggles and
//! the favorites-only view, over generated collections and arrival orders.

use flat_scout::api::InMemoryFlatSource;
use flat_scout::error::ApiError;
use flat_scout::listing::StatusUpdate;
use flat_scout::models::{Flat, Owner};
use flat_scout::{ListingRoute, ListingScreen, Session};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

const VIEWER: &str = "viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Favorited,
    NotFavorited,
    Failed,
}

impl Outcome {
    fn into_result(self) -> Result<bool, ApiError> {
        match self {
            Outcome::Favorited => Ok(true),
            Outcome::NotFavorited => Ok(false),
            Outcome::Failed => Err(ApiError::Timeout),
        }
    }
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Favorited),
        Just(Outcome::NotFavorited),
        Just(Outcome::Failed),
    ]
}

fn flat_ids(min: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z0-9]{1,8}", min..24)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Ids, one outcome per id, and the order their lookups complete in
fn arrivals(min: usize) -> impl Strategy<Value = (Vec<String>, Vec<Outcome>, Vec<usize>)> {
    flat_ids(min).prop_flat_map(|ids| {
        let n = ids.len();
        (
            Just(ids),
            prop::collection::vec(outcome(), n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

fn flat(id: &str) -> Flat {
    Flat {
        id: id.to_string(),
        city: "Quito".to_string(),
        street_name: "Av. Amazonas".to_string(),
        street_number: "1".to_string(),
        rent_price: 500.0,
        area_size: 700.0,
        year_built: None,
        has_ac: false,
        date_available: None,
        latitude: None,
        longitude: None,
        owner: Owner {
            id: "owner".to_string(),
            email: "owner@example.com".to_string(),
            avatar: String::new(),
        },
    }
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// A screen that has loaded `ids`. In favorites-only mode every id is
/// favorited remotely so the whole collection is listed.
fn loaded_screen(
    rt: &Runtime,
    ids: &[String],
    route: ListingRoute,
) -> ListingScreen<InMemoryFlatSource> {
    let source = ids.iter().fold(
        InMemoryFlatSource::new(ids.iter().map(|id| flat(id)).collect()),
        |source, id| source.with_favorite(id, VIEWER),
    );
    let mut screen = ListingScreen::new(Arc::new(source), Session::new(VIEWER, None), route);
    assert!(rt.block_on(screen.load()));
    screen
}

fn apply_in_order(
    screen: &mut ListingScreen<InMemoryFlatSource>,
    ids: &[String],
    outcomes: &[Outcome],
    order: &[usize],
) {
    let generation = screen.generation();
    for &index in order {
        screen.apply_status(StatusUpdate {
            flat_id: ids[index].clone(),
            generation,
            outcome: outcomes[index].into_result(),
        });
    }
}

fn snapshot(screen: &ListingScreen<InMemoryFlatSource>) -> HashMap<String, bool> {
    screen
        .favorites()
        .iter()
        .map(|(id, favorited)| (id.to_string(), favorited))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_load_seeds_one_false_entry_per_flat(ids in flat_ids(0)) {
        let rt = runtime();
        let screen = loaded_screen(&rt, &ids, ListingRoute::all());

        prop_assert_eq!(screen.flats().len(), ids.len());
        prop_assert_eq!(screen.favorites().len(), ids.len());
        for id in &ids {
            prop_assert!(screen.favorites().contains(id));
            prop_assert!(!screen.favorites().is_favorite(id));
        }
    }

    #[test]
    fn prop_merge_result_ignores_arrival_order((ids, outcomes, order) in arrivals(0)) {
        let rt = runtime();
        let mut shuffled = loaded_screen(&rt, &ids, ListingRoute::all());
        let mut sequential = loaded_screen(&rt, &ids, ListingRoute::all());

        apply_in_order(&mut shuffled, &ids, &outcomes, &order);
        let in_sequence: Vec<usize> = (0..ids.len()).collect();
        apply_in_order(&mut sequential, &ids, &outcomes, &in_sequence);

        prop_assert_eq!(shuffled.favorites(), sequential.favorites());
        prop_assert_eq!(shuffled.favorites().len(), ids.len());
        for (id, outcome) in ids.iter().zip(&outcomes) {
            prop_assert_eq!(
                shuffled.favorites().is_favorite(id),
                *outcome == Outcome::Favorited
            );
        }
    }

    #[test]
    fn prop_toggle_leaves_other_keys_unchanged(
        (ids, outcomes, order) in arrivals(1),
        pick in any::<Index>(),
    ) {
        let rt = runtime();
        let mut screen = loaded_screen(&rt, &ids, ListingRoute::all());
        apply_in_order(&mut screen, &ids, &outcomes, &order);
        let before = snapshot(&screen);
        let target = pick.get(&ids).clone();

        let accepted = rt.block_on(screen.toggle_favorite(&target));

        prop_assert!(accepted);
        let after = snapshot(&screen);
        prop_assert_eq!(after.len(), before.len());
        prop_assert_eq!(after[&target], !before[&target]);
        for (id, favorited) in &before {
            if id != &target {
                prop_assert_eq!(after[id], *favorited);
            }
        }
    }

    #[test]
    fn prop_favorites_view_is_collection_filtered_by_map(
        (ids, outcomes, order) in arrivals(0),
        toggles in prop::collection::vec(any::<Index>(), 0..4),
    ) {
        let rt = runtime();
        let mut screen = loaded_screen(&rt, &ids, ListingRoute::favorites_of(VIEWER));
        apply_in_order(&mut screen, &ids, &outcomes, &order);
        if !ids.is_empty() {
            for pick in &toggles {
                let _ = screen.toggle_favorite(pick.get::<String>(&ids));
            }
        }

        let visible: Vec<String> = screen.visible_flats().iter().map(|f| f.id.clone()).collect();
        let expected: Vec<String> = screen
            .flats()
            .iter()
            .filter(|f| screen.favorites().is_favorite(&f.id))
            .map(|f| f.id.clone())
            .collect();
        prop_assert_eq!(visible, expected);
    }

    #[test]
    fn prop_all_view_is_whole_collection((ids, outcomes, order) in arrivals(0)) {
        let rt = runtime();
        let mut screen = loaded_screen(&rt, &ids, ListingRoute::all());
        apply_in_order(&mut screen, &ids, &outcomes, &order);

        let visible: Vec<&str> = screen.visible_flats().iter().map(|f| f.id.as_str()).collect();
        let loaded: Vec<&str> = screen.flats().iter().map(|f| f.id.as_str()).collect();
        prop_assert_eq!(visible, loaded);
    }
}
