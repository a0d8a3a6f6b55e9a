//! Canned news blurbs and synthetic reviews shown next to the market map.

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::profile::{Category, Gender, UserProfile};
use crate::ranking::MarketTile;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceReview {
    pub id: u32,
    pub product_name: String,
    pub user_name: String,
    pub rating: u8,
    pub content: String,
    pub views: u32,
    pub date: NaiveDate,
    pub is_positive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewBoard {
    pub positive: Vec<InsuranceReview>,
    pub negative: Vec<InsuranceReview>,
}

fn search(query: &str) -> String {
    format!("https://www.google.com/search?q={}", query.replace(' ', "+"))
}

fn article(title: String, source: &str, url: String) -> NewsArticle {
    NewsArticle {
        title,
        url,
        source: source.to_string(),
    }
}

/// Three headlines tailored to the selected age group, gender and category
pub fn dynamic_news(profile: &UserProfile) -> Vec<NewsArticle> {
    let age = profile.age;
    let gender = profile.gender;

    match profile.insurance_type {
        Category::Health => vec![
            article(
                format!("[단독] {age}대 {gender} 가입자 급증하는 건강보험 특약은?"),
                "금융포커스",
                search(&format!("{age}대 {gender} 건강보험 인기 특약")),
            ),
            article(
                format!("{age}세 맞춤 건강관리 서비스, 보험 가입만 해도 '무료'"),
                "헬스데일리",
                search("보험사 건강관리 서비스"),
            ),
            article(
                "실손보험 청구 간소화 서비스, 2030 이용률 압도적 1위".to_string(),
                "경제투데이",
                search("실손보험 청구 간소화"),
            ),
        ],
        Category::Car => {
            let accident = match gender {
                Gender::Male => "과속",
                Gender::Female => "접촉",
            };
            vec![
                article(
                    format!("[속보] {age}대 {gender} 운전자, 보험료 아끼는 '퍼마일' 방식 인기"),
                    "모빌리티뉴스",
                    search("캐롯 퍼마일 자동차보험 후기"),
                ),
                article(
                    "블랙박스·T맵 점수 할인... 내 차 보험료 얼마나 깎일까?".to_string(),
                    "카리포트",
                    search("자동차보험 T맵 할인"),
                ),
                article(
                    format!("최근 {age}대 사고 데이터 분석: {accident} 사고 주의보"),
                    "안전포럼",
                    search("연령별 사고 데이터"),
                ),
            ]
        }
        _ => vec![
            article(
                format!("[기획] {age}대 가정을 위한 '가성비' 종신보험 가이드"),
                "금융위클리",
                search("가성비 종신보험"),
            ),
            article(
                "사망 보장만? No! 상속세 재원 마련용 종신보험 인기".to_string(),
                "세무저널",
                search("종신보험 상속세 활용"),
            ),
            article(
                format!("정기보험 vs 종신보험: {age}대 {gender}에게 유리한 선택은?"),
                "보험의정석",
                search("정기보험 종신보험 비교"),
            ),
        ],
    }
}

/// Date stamped on positive reviews
fn positive_review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap_or_default()
}

/// One positive and one negative review for each of the given top tiles
pub fn synthetic_reviews(top: &[MarketTile], today: NaiveDate) -> ReviewBoard {
    let mut rng = rand::rng();

    let positive = top
        .iter()
        .enumerate()
        .map(|(i, tile)| InsuranceReview {
            id: i as u32,
            product_name: tile.name.clone(),
            user_name: format!("리뷰어_{}", rng.random_range(0..9999)),
            rating: 5,
            content: format!(
                "{} 가입했는데 보상 처리가 진짜 빠르네요. 상담사분도 너무 친절하셔서 믿고 추천합니다.",
                tile.name
            ),
            views: 12_000u32.saturating_sub(i as u32 * 2_500),
            date: positive_review_date(),
            is_positive: true,
        })
        .collect();

    let negative = top
        .iter()
        .enumerate()
        .map(|(i, tile)| InsuranceReview {
            id: i as u32 + 10,
            product_name: tile.name.clone(),
            user_name: format!("익명_{}", rng.random_range(0..9999)),
            rating: 2,
            content: format!(
                "{} 가입 시 고지 의무가 너무 까다롭네요. 나중에 문제 생길까 봐 걱정되긴 합니다. 가입 전 약관 꼭 확인하세요.",
                tile.name
            ),
            views: 1_200u32.saturating_sub(i as u32 * 200),
            date: today,
            is_positive: false,
        })
        .collect();

    ReviewBoard { positive, negative }
}
