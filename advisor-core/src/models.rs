use serde::{Deserialize, Serialize};

use crate::profile::Category;

/// An insurance product as shown on the market map or recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub company: String,
    pub count: u64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_premium: Option<u64>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Profile analysis produced once per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub estimated_premium: u64,
    pub risk_score: u8,
    pub recommendations: Vec<String>,
    pub comparative_insights: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// The static market catalog the market map is computed from.
pub fn market_catalog() -> Vec<Product> {
    let entry = |id: u32,
                 name: &str,
                 company: &str,
                 count: u64,
                 avg_premium: u64,
                 category: Category,
                 reason: &str| Product {
        id,
        name: name.to_string(),
        company: company.to_string(),
        count,
        category,
        avg_premium: Some(avg_premium),
        reason: reason.to_string(),
        link: None,
    };

    vec![
        entry(1, "다이렉트 실손보험", "삼성화재", 450_000, 15_000, Category::Health, "점유율 1위"),
        entry(2, "굿앤굿 어린이보험", "현대해상", 320_000, 42_000, Category::Health, "부모 선호도 1위"),
        entry(3, "참좋은 건강보험", "DB손보", 280_000, 55_000, Category::Health, "가성비 우수"),
        entry(4, "무배당 종신플랜", "한화생명", 150_000, 120_000, Category::Life, "안정성"),
        entry(5, "다이렉트 자동차", "KB손보", 600_000, 850_000, Category::Car, "보상 서비스"),
        entry(6, "원데이 자동차", "메리츠화재", 210_000, 5_000, Category::Car, "간편가입"),
        entry(7, "Global 여행보험", "AIG", 180_000, 25_000, Category::Travel, "해외보장"),
        entry(8, "평생 연금보험", "교보생명", 140_000, 300_000, Category::Pension, "공시이율"),
        entry(9, "비갱신 암보험", "신한라이프", 240_000, 35_000, Category::Health, "비갱신형"),
        entry(10, "해외여행 안심플랜", "카카오페이", 290_000, 8_000, Category::Travel, "간편결제"),
    ]
}
