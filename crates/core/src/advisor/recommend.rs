//! Seed recommendation scoring.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tables::{Budget, crops_for_soil, regions_for_state};
use crate::catalogue::CatalogueItem;

/// Products scoring at or below this are dropped.
const MIN_SCORE: i32 = 20;
/// Maximum number of recommendations returned.
const MAX_RESULTS: usize = 5;

/// A distributor's growing conditions.
///
/// Missing fields deserialize as empty so callers can report them together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationRequest {
    pub state: String,
    pub soil_type: String,
    pub season: String,
    pub budget: String,
    pub crop_interest: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Suitability {
    Excellent,
    Good,
    Moderate,
}

impl Suitability {
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score >= 70 {
            Self::Excellent
        } else if score >= 45 {
            Self::Good
        } else {
            Self::Moderate
        }
    }
}

/// A scored product.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<'a, P> {
    pub product: &'a P,
    pub score: i32,
    pub reasons: Vec<String>,
    pub estimated_yield: String,
    pub suitability: Suitability,
}

/// Score every product against `request` and return the best matches.
///
/// Scores are additive: season +30 (or -20 on a miss), region +25, soil +20,
/// budget +15, germination +10 at 94% or +5 at 90%, preferred crop +20.
/// Products scoring above 20 are kept, best first, at most five. Ties keep
/// catalogue order.
pub fn recommend<'a, P: CatalogueItem>(
    request: &RecommendationRequest,
    products: &'a [P],
) -> Vec<Recommendation<'a, P>> {
    let regions = regions_for_state(&request.state);
    let soil_crops = crops_for_soil(&request.soil_type);
    let budget = Budget::from_label(&request.budget);
    let season = request.season.trim();
    let state = request.state.trim();
    let crop_interest = request
        .crop_interest
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut results: Vec<Recommendation<'a, P>> = products
        .iter()
        .filter_map(|product| {
            let mut score = 0;
            let mut reasons = Vec::new();

            if season_matches(product.suitable_season(), season) {
                score += 30;
                reasons.push(format!("Suitable for {season} season"));
            } else {
                score -= 20;
            }

            let product_regions = product.suitable_regions().to_lowercase();
            let region_match = regions
                .iter()
                .any(|r| product_regions.contains(&r.to_lowercase()))
                || (!state.is_empty() && product_regions.contains(&state.to_lowercase()));
            if region_match {
                score += 25;
                reasons.push(format!("Recommended for {state}"));
            }

            if soil_crops.iter().any(|c| *c == product.category()) {
                score += 20;
                reasons.push(format!("Suitable for {} soil", request.soil_type.trim()));
            }

            if product
                .tier_pricing()
                .base_price()
                .is_some_and(|price| budget.contains(price))
            {
                score += 15;
                reasons.push(format!("Fits your {} budget", budget.label()));
            }

            let germination = product.germination_pct();
            if germination >= Decimal::from(94) {
                score += 10;
                reasons.push(format!("Excellent germination: {}%", germination.normalize()));
            } else if germination >= Decimal::from(90) {
                score += 5;
                reasons.push(format!("Good germination: {}%", germination.normalize()));
            }

            if crop_interest.is_some_and(|c| product.category().eq_ignore_ascii_case(c)) {
                score += 20;
                reasons.push("Matches your preferred crop".to_owned());
            }

            if score <= MIN_SCORE {
                return None;
            }
            if reasons.is_empty() {
                reasons.push("Based on regional data".to_owned());
            }

            let estimated_yield = match product.yield_per_acre().trim() {
                "" => "Contact for details".to_owned(),
                text => text.to_owned(),
            };

            Some(Recommendation {
                product,
                score,
                reasons,
                estimated_yield,
                suitability: Suitability::from_score(score),
            })
        })
        .collect();

    // stable: equal scores keep catalogue order
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(MAX_RESULTS);
    results
}

fn season_matches(product_seasons: &str, requested: &str) -> bool {
    product_seasons
        .split([',', '/'])
        .map(str::trim)
        .any(|s| s.eq_ignore_ascii_case(requested) || s.eq_ignore_ascii_case("All season"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalogue::fixtures::{self, Seed};

    fn catalogue() -> Vec<Seed> {
        vec![
            fixtures::wheat(),
            fixtures::tomato(),
            fixtures::cotton(),
            fixtures::chickpea(),
        ]
    }

    fn request(state: &str, soil: &str, season: &str, budget: &str) -> RecommendationRequest {
        RecommendationRequest {
            state: state.to_owned(),
            soil_type: soil.to_owned(),
            season: season.to_owned(),
            budget: budget.to_owned(),
            crop_interest: None,
        }
    }

    #[test]
    fn test_punjab_rabi_prefers_wheat() {
        let products = catalogue();
        let recs = recommend(&request("Punjab", "Alluvial", "Rabi", "low"), &products);

        let top = recs.first().unwrap();
        assert_eq!(top.product.variety, "RH-749 Wheat");
        // season 30 + region 25 + soil 20 + budget 15 + germination 10
        assert_eq!(top.score, 100);
        assert_eq!(top.suitability, Suitability::Excellent);
        assert_eq!(top.reasons.len(), 5);
        assert_eq!(top.estimated_yield, "20–25 quintals");
    }

    #[test]
    fn test_season_miss_penalizes() {
        let products = vec![fixtures::cotton()];
        // Kharif cotton asked for in Rabi: -20 + region 25 + soil 20 + budget 15 + germination 5
        let recs = recommend(&request("Maharashtra", "black", "Rabi", "high"), &products);
        let rec = recs.first().unwrap();
        assert_eq!(rec.score, 45);
        assert_eq!(rec.suitability, Suitability::Good);
    }

    #[test]
    fn test_low_scores_are_dropped() {
        let products = vec![fixtures::cotton()];
        // season miss -20, germination +5, nothing else applies
        let recs = recommend(&request("Kerala", "clay", "Rabi", "medium"), &products);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_all_season_matches_any_season() {
        assert!(season_matches("All season", "Zaid"));
        assert!(season_matches("Rabi / Kharif", "kharif"));
        assert!(!season_matches("Kharif", "Rabi"));
    }

    #[test]
    fn test_crop_interest_bonus_and_yield_fallback() {
        let products = vec![fixtures::chickpea()];
        let mut req = request("Madhya Pradesh", "red", "Rabi", "low");
        req.crop_interest = Some(" pulses ".to_owned());

        let recs = recommend(&req, &products);
        let rec = recs.first().unwrap();
        // 30 season + 25 region + 20 soil + 15 budget + 5 germination + 20 interest
        assert_eq!(rec.score, 115);
        assert_eq!(rec.estimated_yield, "Contact for details");
        assert!(rec.reasons.iter().any(|r| r == "Matches your preferred crop"));
    }

    #[test]
    fn test_results_capped_and_sorted() {
        let products: Vec<Seed> = (0..8)
            .map(|i| {
                let mut seed = fixtures::tomato();
                seed.germination = Decimal::from(88 + i);
                seed
            })
            .collect();
        let recs = recommend(&request("Tamil Nadu", "loam", "Kharif", "high"), &products);
        assert_eq!(recs.len(), 5);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(recs[0].product.germination, Decimal::from(94));
    }

    #[test]
    fn test_suitability_bands() {
        assert_eq!(Suitability::from_score(70), Suitability::Excellent);
        assert_eq!(Suitability::from_score(69), Suitability::Good);
        assert_eq!(Suitability::from_score(45), Suitability::Good);
        assert_eq!(Suitability::from_score(44), Suitability::Moderate);
    }
}
