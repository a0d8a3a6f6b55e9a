//! Locally computed substitutes for remote output.

use crate::models::{AnalysisResult, Product};
use crate::profile::{Category, Gender, UserProfile};

struct FallbackProduct {
    name: &'static str,
    company: &'static str,
    avg_premium: u64,
    reason: &'static str,
}

const fn item(
    name: &'static str,
    company: &'static str,
    avg_premium: u64,
    reason: &'static str,
) -> FallbackProduct {
    FallbackProduct {
        name,
        company,
        avg_premium,
        reason,
    }
}

const HEALTH: [FallbackProduct; 6] = [
    item("다이렉트 실손의료비보험", "삼성화재", 15_000, "가입자 수 1위의 표준형 실손 보장"),
    item("굿앤굿 건강보험", "현대해상", 48_000, "3대 질병 진단비 보장이 폭넓음"),
    item("참좋은 훼밀리 건강보험", "DB손해보험", 52_000, "가족 단위 가입 시 할인 혜택"),
    item("비갱신 암보험", "신한라이프", 35_000, "보험료 인상 없는 비갱신형 구조"),
    item("건강할때 받는 보험", "메리츠화재", 41_000, "건강체 할인으로 보험료 부담 완화"),
    item("간편 건강보험", "KB손해보험", 58_000, "유병자도 간편 심사로 가입 가능"),
];

const LIFE: [FallbackProduct; 6] = [
    item("무배당 종신플랜", "한화생명", 120_000, "평생 사망 보장과 안정적인 해지환급금"),
    item("통합 종신보험", "삼성생명", 135_000, "사망 보장과 질병 특약을 한 번에 구성"),
    item("교보 정기보험", "교보생명", 32_000, "합리적인 보험료로 가장의 책임 기간 보장"),
    item("라이프플러스 정기보험", "한화생명", 29_000, "온라인 가입으로 사업비 절감"),
    item("무배당 경영인 정기보험", "신한라이프", 210_000, "상속세 재원 마련에 활용"),
    item("미래에셋 변액종신", "미래에셋생명", 150_000, "투자 수익에 따라 보장 금액 증가"),
];

const CAR: [FallbackProduct; 6] = [
    item("다이렉트 자동차보험", "KB손해보험", 850_000, "사고 보상 서비스 만족도 상위"),
    item("퍼마일 자동차보험", "캐롯손해보험", 620_000, "주행거리만큼만 내는 후불형"),
    item("원데이 자동차보험", "메리츠화재", 5_000, "하루 단위 간편 가입"),
    item("애니카 다이렉트", "삼성화재", 910_000, "긴급출동 서비스 범위가 넓음"),
    item("하이카 다이렉트", "현대해상", 880_000, "블랙박스·안전운전 할인 적용"),
    item("프로미 다이렉트", "DB손해보험", 860_000, "마일리지 특약 환급률 우수"),
];

const TRAVEL: [FallbackProduct; 6] = [
    item("해외여행 안심플랜", "카카오페이", 8_000, "간편결제로 1분 만에 가입"),
    item("Global 여행보험", "AIG", 25_000, "해외 의료비 보장 한도가 큼"),
    item("해외여행보험 다이렉트", "삼성화재", 12_000, "항공기 지연 보상 포함"),
    item("여행자보험 플러스", "현대해상", 14_000, "휴대품 손해 보장 강화"),
    item("국내여행 보험", "DB손해보험", 4_000, "국내 레저 활동 상해 보장"),
    item("트래블 케어", "하나손해보험", 9_000, "환전·결제 연계 할인"),
];

const PENSION: [FallbackProduct; 6] = [
    item("평생 연금보험", "교보생명", 300_000, "공시이율 기반 평생 연금 수령"),
    item("연금저축보험", "삼성생명", 250_000, "세액공제 혜택"),
    item("변액연금보험", "미래에셋생명", 350_000, "투자 수익에 따른 연금액 증대"),
    item("즉시연금보험", "한화생명", 1_000_000, "일시납 후 바로 연금 개시"),
    item("개인연금 플러스", "신한라이프", 200_000, "최저 보증 이율 제공"),
    item("행복플러스 연금보험", "NH농협생명", 180_000, "소액으로 시작하는 노후 준비"),
];

fn table(category: Category) -> &'static [FallbackProduct; 6] {
    match category {
        Category::Health => &HEALTH,
        Category::Life => &LIFE,
        Category::Car => &CAR,
        Category::Travel => &TRAVEL,
        Category::Pension => &PENSION,
    }
}

/// The fixed six-item catalog for a category. Counts are left at zero; the requester assigns
/// synthetic popularity counts to every product it returns.
pub fn fallback_products(category: Category) -> Vec<Product> {
    table(category)
        .iter()
        .enumerate()
        .map(|(index, p)| Product {
            id: index as u32 + 1,
            name: p.name.to_string(),
            company: p.company.to_string(),
            count: 0,
            category,
            avg_premium: Some(p.avg_premium),
            reason: p.reason.to_string(),
            link: Some(search_link(p.company, p.name)),
        })
        .collect()
}

/// Google search URL for an insurer's product
pub fn search_link(company: &str, name: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(&format!("{company} {name}"))
    )
}

fn base_premium(category: Category) -> f64 {
    match category {
        Category::Health => 45_000.0,
        Category::Life => 120_000.0,
        Category::Car => 70_000.0,
        Category::Travel => 15_000.0,
        Category::Pension => 300_000.0,
    }
}

fn advice(category: Category) -> [&'static str; 3] {
    match category {
        Category::Health => [
            "실손의료비보험을 먼저 확보한 뒤 3대 질병 진단비 특약을 추가하세요.",
            "갱신형과 비갱신형의 총 납입 보험료를 비교해 보세요.",
            "가입 전 최근 5년 내 병력 고지 사항을 꼼꼼히 확인하세요.",
        ],
        Category::Life => [
            "부양가족의 생활비 기준으로 필요한 사망 보장액을 산정하세요.",
            "책임 기간이 정해져 있다면 종신보험 대신 정기보험을 검토하세요.",
            "해지환급금 구조를 확인해 중도 해지 손실을 줄이세요.",
        ],
        Category::Car => [
            "주행거리가 적다면 마일리지 또는 퍼마일 특약을 활용하세요.",
            "블랙박스·안전운전 점수 할인 적용 여부를 확인하세요.",
            "대인·대물 배상 한도를 충분히 높게 설정하세요.",
        ],
        Category::Travel => [
            "해외 의료비 보장 한도가 충분한지 먼저 확인하세요.",
            "항공기 지연과 휴대품 손해 보장 포함 여부를 비교하세요.",
            "출국 전에 가입해야 보장이 적용되니 일정에 맞춰 가입하세요.",
        ],
        Category::Pension => [
            "세액공제 한도를 고려해 연금저축과 IRP를 함께 활용하세요.",
            "공시이율형과 변액형의 위험과 수익 구조를 비교하세요.",
            "연금 개시 시점과 수령 기간을 노후 계획에 맞게 설정하세요.",
        ],
    }
}

fn insight(category: Category) -> &'static str {
    match category {
        Category::Health => {
            "최근 건강보험 시장은 비갱신형 진단비 상품과 간편 심사 상품의 비중이 커지고 있으며, 실손보험은 청구 간소화로 이용 편의성이 높아졌습니다."
        }
        Category::Life => {
            "종신보험 수요는 상속 설계 목적의 고액 계약 중심으로 재편되고 있고, 보장 위주의 저렴한 정기보험 가입이 늘고 있습니다."
        }
        Category::Car => {
            "자동차보험은 다이렉트 채널 점유율이 계속 확대되고 있으며 주행거리 연동형과 운전 습관 연계 할인 상품이 인기를 얻고 있습니다."
        }
        Category::Travel => {
            "해외여행 수요 회복과 함께 간편결제 플랫폼의 여행자보험 가입이 빠르게 늘고 있으며, 소액 단기 상품의 경쟁이 치열합니다."
        }
        Category::Pension => {
            "고령화로 연금보험 수요는 꾸준하지만 금리 변동에 따라 공시이율형과 변액형의 선호가 엇갈리고 있습니다."
        }
    }
}

/// Deterministic analysis computed from age, gender and category
pub fn fallback_analysis(profile: &UserProfile) -> AnalysisResult {
    let age = f64::from(profile.age.years());
    let male = profile.gender == Gender::Male;

    let age_factor = 1.0 + (age - 20.0) * 0.025;
    let gender_factor = if male { 1.1 } else { 1.0 };
    let estimated_premium =
        (base_premium(profile.insurance_type) * age_factor * gender_factor).round() as u64;

    let raw_risk = 15 + i32::from(profile.age.years()) - 20 + if male { 5 } else { 0 };
    let risk_score = raw_risk.clamp(1, 100) as u8;

    AnalysisResult {
        estimated_premium,
        risk_score,
        recommendations: advice(profile.insurance_type)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        comparative_insights: insight(profile.insurance_type).to_string(),
        sources: Vec::new(),
    }
}
