// "What do we eat today?" - pick one restaurant that fits the mood.

use crate::core::records::{PriceTier, RestaurantEntry};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Used when nobody has filled in the Restaurants tab yet.
pub const QUICK_PICKS: [&str; 6] = ["火鍋", "義大利麵", "壽司", "麥當勞", "牛排", "拉麵"];

/// Allowed price tiers and categories. A restaurant must match both.
#[derive(Debug, Clone, Default)]
pub struct ChoiceFilter {
    tiers: HashSet<PriceTier>,
    categories: HashSet<String>,
}

impl ChoiceFilter {
    pub fn new(
        tiers: impl IntoIterator<Item = PriceTier>,
        categories: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
            categories: categories
                .into_iter()
                .map(|c| normalize_category(c.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, candidate: &RestaurantEntry) -> bool {
        self.tiers.contains(&candidate.price_tier)
            && self
                .categories
                .contains(&normalize_category(&candidate.category))
    }
}

/// Picks one matching candidate uniformly at random. `None` means nothing matched.
pub fn choose<'a>(
    candidates: &'a [RestaurantEntry],
    filter: &ChoiceFilter,
) -> Option<&'a RestaurantEntry> {
    choose_with(candidates, filter, &mut rand::thread_rng())
}

pub fn choose_with<'a, R: Rng + ?Sized>(
    candidates: &'a [RestaurantEntry],
    filter: &ChoiceFilter,
    rng: &mut R,
) -> Option<&'a RestaurantEntry> {
    let matching: Vec<&RestaurantEntry> =
        candidates.iter().filter(|c| filter.matches(c)).collect();
    matching.choose(rng).copied()
}

pub fn quick_pick() -> &'static str {
    QUICK_PICKS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUICK_PICKS[0])
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn restaurant(name: &str, category: &str, tier: u8) -> RestaurantEntry {
        RestaurantEntry {
            name: name.into(),
            category: category.into(),
            price_tier: PriceTier::new(tier).unwrap(),
        }
    }

    fn sample() -> Vec<RestaurantEntry> {
        vec![
            restaurant("鼎泰豐", "台式", 2),
            restaurant("Sushiro", "日式", 1),
            restaurant("Wagyu House", "日式", 3),
            restaurant("Pizza Place", "Italian", 2),
        ]
    }

    #[test]
    fn empty_candidates_yield_no_match() {
        let filter = ChoiceFilter::new([PriceTier::new(1).unwrap()], ["A"]);
        assert!(choose(&[], &filter).is_none());
    }

    #[test]
    fn open_filter_always_returns_a_member() {
        let candidates = sample();
        let filter =
            ChoiceFilter::new(PriceTier::ALL, candidates.iter().map(|c| c.category.as_str()));
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let picked = choose_with(&candidates, &filter, &mut rng).unwrap();
            assert!(candidates.contains(picked));
        }
    }

    #[test]
    fn both_facets_must_match() {
        let candidates = sample();
        let filter = ChoiceFilter::new([PriceTier::new(1).unwrap()], ["日式"]);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            let picked = choose_with(&candidates, &filter, &mut rng).unwrap();
            assert_eq!(picked.name, "Sushiro");
        }
    }

    #[test]
    fn category_matching_ignores_case_and_padding() {
        let candidates = sample();
        let filter = ChoiceFilter::new([PriceTier::new(2).unwrap()], [" italian "]);
        assert_eq!(choose(&candidates, &filter).unwrap().name, "Pizza Place");
    }

    #[test]
    fn no_match_is_not_an_error() {
        let candidates = sample();
        let filter = ChoiceFilter::new([PriceTier::new(3).unwrap()], ["台式"]);
        assert!(choose(&candidates, &filter).is_none());
    }

    #[test]
    fn every_match_is_reachable() {
        let candidates = sample();
        let tiers = [PriceTier::new(1).unwrap(), PriceTier::new(3).unwrap()];
        let filter = ChoiceFilter::new(tiers, ["日式"]);
        let mut rng = StdRng::seed_from_u64(42);

        let seen: HashSet<&str> = (0..200)
            .filter_map(|_| choose_with(&candidates, &filter, &mut rng))
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(seen, HashSet::from(["Sushiro", "Wagyu House"]));
    }

    #[test]
    fn quick_pick_comes_from_the_built_in_list() {
        assert!(QUICK_PICKS.contains(&quick_pick()));
    }
}
