use serde::Serialize;

use crate::models::Product;
use crate::profile::{Gender, UserProfile};

/// Default number of tiles on the market map
pub const DEFAULT_TOP_N: usize = 10;

/// Smallest size a tile is drawn with
const MIN_TILE_SIZE: u64 = 100;

pub const TILE_COLORS: [&str; 15] = [
    "#3b82f6", "#6366f1", "#8b5cf6", "#a855f7", "#d946ef", "#ec4899", "#f43f5e", "#f59e0b",
    "#10b981", "#06b6d4", "#2dd4bf", "#fb923c", "#fb7185", "#818cf8", "#c084fc",
];

/// One weighted entry of the market map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTile {
    pub name: String,
    pub company: String,
    pub size: u64,
    pub avg_premium: Option<u64>,
    pub color: &'static str,
}

/// Profile-dependent multiplier for one product
pub fn product_weight(product: &Product, profile: &UserProfile) -> f64 {
    let mut weight = 1.0;
    let age = profile.age.years();

    if age <= 20 {
        if product.company == "카카오페이" || product.company == "캐롯" {
            weight *= 1.5;
        }
    } else if age >= 50 && (product.company == "삼성화재" || product.company == "교보생명") {
        weight *= 1.4;
    }

    let boosted = match profile.gender {
        Gender::Female => product.name.contains("어린이") || product.name.contains("실손"),
        Gender::Male => product.name.contains("자동차") || product.name.contains("종신"),
    };
    if boosted {
        weight *= 1.2;
    }

    weight
}

/// Filters the catalog to the profile's category, weights each product and keeps the
/// `top_n` largest tiles. Ties keep catalog order.
pub fn market_map(catalog: &[Product], profile: &UserProfile, top_n: usize) -> Vec<MarketTile> {
    let mut tiles: Vec<MarketTile> = catalog
        .iter()
        .filter(|p| p.category == profile.insurance_type)
        .enumerate()
        .map(|(index, p)| {
            let weighted = (p.count as f64 * product_weight(p, profile)).round() as u64;
            MarketTile {
                name: p.name.clone(),
                company: p.company.clone(),
                size: weighted.max(MIN_TILE_SIZE),
                avg_premium: p.avg_premium,
                color: TILE_COLORS[index % TILE_COLORS.len()],
            }
        })
        .collect();

    tiles.sort_by(|a, b| b.size.cmp(&a.size));
    tiles.truncate(top_n);
    tiles
}

/// The leading tiles of an already ranked map
pub fn top_tiles(tiles: &[MarketTile], n: usize) -> &[MarketTile] {
    &tiles[..tiles.len().min(n)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::market_catalog;
    use crate::profile::{AgeGroup, Category};

    fn profile(age: u8, gender: Gender, category: Category) -> UserProfile {
        UserProfile::from_selectors(AgeGroup::try_from(age).unwrap(), gender, category)
    }

    #[test]
    fn female_profile_boosts_children_and_indemnity_products() {
        let tiles = market_map(
            &market_catalog(),
            &profile(30, Gender::Female, Category::Health),
            DEFAULT_TOP_N,
        );
        let summary: Vec<(&str, u64)> = tiles.iter().map(|t| (t.name.as_str(), t.size)).collect();
        assert_eq!(
            summary,
            vec![
                ("다이렉트 실손보험", 540_000),
                ("굿앤굿 어린이보험", 384_000),
                ("참좋은 건강보험", 280_000),
                ("비갱신 암보험", 240_000),
            ]
        );
    }

    #[test]
    fn senior_profile_boosts_established_insurers() {
        let p = profile(50, Gender::Male, Category::Health);
        let catalog = market_catalog();
        assert!((product_weight(&catalog[0], &p) - 1.4).abs() < f64::EPSILON);
        let tiles = market_map(&catalog, &p, DEFAULT_TOP_N);
        assert_eq!(tiles[0].name, "다이렉트 실손보험");
        assert_eq!(tiles[0].size, 630_000);
    }

    #[test]
    fn young_profile_boosts_platform_insurers() {
        let tiles = market_map(
            &market_catalog(),
            &profile(20, Gender::Male, Category::Travel),
            DEFAULT_TOP_N,
        );
        assert_eq!(tiles[0].company, "카카오페이");
        assert_eq!(tiles[0].size, 435_000);
        assert_eq!(tiles[1].size, 180_000);
    }

    #[test]
    fn ranking_is_deterministic_and_bounded() {
        let catalog = market_catalog();
        let p = profile(40, Gender::Male, Category::Car);
        let first = market_map(&catalog, &p, DEFAULT_TOP_N);
        let second = market_map(&catalog, &p, DEFAULT_TOP_N);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);

        let health = profile(40, Gender::Male, Category::Health);
        assert_eq!(market_map(&catalog, &health, 3).len(), 3);
        assert_eq!(market_map(&catalog, &health, 0).len(), 0);
    }

    #[test]
    fn tiny_products_are_drawn_at_minimum_size() {
        let mut catalog = market_catalog();
        catalog[6].count = 10;
        let tiles = market_map(&catalog, &profile(40, Gender::Male, Category::Travel), 10);
        assert_eq!(tiles.last().unwrap().size, 100);
    }

    #[test]
    fn colors_follow_catalog_position() {
        let tiles = market_map(
            &market_catalog(),
            &profile(30, Gender::Male, Category::Health),
            DEFAULT_TOP_N,
        );
        let indemnity = tiles.iter().find(|t| t.name == "다이렉트 실손보험").unwrap();
        assert_eq!(indemnity.color, TILE_COLORS[0]);
        let cancer = tiles.iter().find(|t| t.name == "비갱신 암보험").unwrap();
        assert_eq!(cancer.color, TILE_COLORS[3]);
        assert_eq!(top_tiles(&tiles, 3).len(), 3);
        assert_eq!(top_tiles(&tiles, 10).len(), 4);
    }
}
