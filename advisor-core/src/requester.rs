use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::ops::Range;
use std::sync::Arc;
use tracing::{info, warn};

use crate::completion::{CompletionBackend, CompletionRequest, clean_json_response};
use crate::error::{AdvisorError, Result};
use crate::fallback::{fallback_analysis, fallback_products};
use crate::models::{AnalysisResult, Product};
use crate::profile::{UserProfile, format_won};
use crate::retry::{RetryPolicy, with_backoff};

/// Range the synthetic subscriber count is drawn from
pub const SYNTHETIC_POPULARITY: Range<u64> = 100_000..600_000;

/// Number of products requested from the model
pub const REQUESTED_PRODUCTS: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteProduct {
    name: String,
    company: String,
    reason: String,
    avg_premium: f64,
    link: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteAnalysis {
    estimated_premium: f64,
    risk_score: f64,
    recommendations: Vec<String>,
    comparative_insights: String,
}

/// Builds prompts, calls the completion backend and normalizes the answers.
/// Both public operations always produce a result; failures fall back to local data.
#[derive(Clone)]
pub struct InsuranceAdvisor {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl InsuranceAdvisor {
    pub fn new(backend: Arc<dyn CompletionBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Popular products for the profile's demographic and category
    pub async fn recommend_products(&self, profile: &UserProfile) -> Vec<Product> {
        let products = match self.request_products(profile).await {
            Ok(products) => {
                info!(
                    category = %profile.insurance_type,
                    count = products.len(),
                    "Received product recommendations"
                );
                products
            }
            Err(e) => {
                warn!(
                    category = %profile.insurance_type,
                    error = %e,
                    "Product recommendation failed, serving fallback catalog"
                );
                fallback_products(profile.insurance_type)
            }
        };
        assign_popularity(products)
    }

    /// Premium estimate, risk score and advice for the profile
    pub async fn analyze(&self, profile: &UserProfile) -> AnalysisResult {
        match self.request_analysis(profile).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    category = %profile.insurance_type,
                    error = %e,
                    "Profile analysis failed, serving computed fallback"
                );
                fallback_analysis(profile)
            }
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let backend = self.backend.clone();
        let request = Arc::new(request);
        with_backoff(
            || {
                let backend = backend.clone();
                let request = request.clone();
                async move { backend.complete(&request).await }
            },
            self.retry,
        )
        .await
    }

    async fn request_products(&self, profile: &UserProfile) -> Result<Vec<Product>> {
        let raw = self
            .complete(CompletionRequest {
                prompt: product_prompt(profile),
                schema: product_schema(),
            })
            .await?;

        let remote: Vec<RemoteProduct> = serde_json::from_str(clean_json_response(&raw))?;
        if remote.is_empty() {
            return Err(AdvisorError::ParseError(
                "model returned an empty product list".to_string(),
            ));
        }

        Ok(remote
            .into_iter()
            .enumerate()
            .map(|(index, p)| Product {
                id: index as u32 + 1,
                name: p.name,
                company: p.company,
                count: 0,
                category: profile.insurance_type,
                avg_premium: Some(p.avg_premium.max(0.0).round() as u64),
                reason: p.reason,
                link: Some(p.link),
            })
            .collect())
    }

    async fn request_analysis(&self, profile: &UserProfile) -> Result<AnalysisResult> {
        let raw = self
            .complete(CompletionRequest {
                prompt: analysis_prompt(profile),
                schema: analysis_schema(),
            })
            .await?;

        let remote: RemoteAnalysis = serde_json::from_str(clean_json_response(&raw))?;
        Ok(AnalysisResult {
            estimated_premium: remote.estimated_premium.max(0.0).round() as u64,
            risk_score: remote.risk_score.round().clamp(1.0, 100.0) as u8,
            recommendations: remote.recommendations,
            comparative_insights: remote.comparative_insights,
            sources: Vec::new(),
        })
    }
}

fn assign_popularity(products: Vec<Product>) -> Vec<Product> {
    let mut rng = rand::rng();
    products
        .into_iter()
        .map(|p| Product {
            count: rng.random_range(SYNTHETIC_POPULARITY),
            ..p
        })
        .collect()
}

pub fn product_prompt(profile: &UserProfile) -> String {
    format!(
        r#"
    대한민국 보험 시장에서 {age}대 {gender}에게 가장 인기 있는 {category} 상품 {count}개를 찾아주세요.
    실제 판매 중인 상품명과 보험사명을 정확히 포함해야 합니다.
    각 상품에 대해 다음 정보를 JSON 배열 형식으로 제공하세요:
    1. name: 상품명
    2. company: 보험사명
    3. reason: 추천 사유 (한 문장)
    4. avgPremium: 해당 연령대 평균 월 보험료 (숫자)
    5. link: 해당 상품 검색을 위한 구글 검색 URL (https://www.google.com/search?q=보험사+상품명 형태)

    반드시 {count}개를 채워서 응답하세요."#,
        age = profile.age,
        gender = profile.gender,
        category = profile.insurance_type,
        count = REQUESTED_PRODUCTS,
    )
}

pub fn product_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "company": { "type": "string" },
                "reason": { "type": "string" },
                "avgPremium": { "type": "number" },
                "link": { "type": "string" }
            },
            "required": ["name", "company", "reason", "avgPremium", "link"]
        }
    })
}

pub fn analysis_prompt(profile: &UserProfile) -> String {
    format!(
        r#"
    당신은 수석 보험 계리사 및 금융 상담가입니다. 다음 사용자 프로필을 분석하여 {category} 상품에 대한 분석을 제공하세요:
    - 나이: {age}세
    - 성별: {gender}
    - 흡연 여부: {smoker}
    - 직업: {occupation}
    - 연소득: ₩{income}
    - 인구통계적 위험 요소: {risk}

    다음 내용을 포함하세요:
    1. 예상 월 보험료 (대표값 숫자 하나만 JSON으로 반환).
    2. 위험도 점수 (1-100).
    3. 구체적이고 실행 가능한 3가지 보험 가입 조언.
    4. 최신 시장 트렌드와 비교 분석.

    모든 답변은 한국어로 작성하세요."#,
        category = profile.insurance_type,
        age = profile.age,
        gender = profile.gender,
        smoker = if profile.is_smoker { "흡연" } else { "비흡연" },
        occupation = profile.occupation,
        income = format_won(profile.annual_income),
        risk = profile.age.risk_context(),
    )
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "estimatedPremium": { "type": "number", "description": "월 예상 보험료 (원)" },
            "riskScore": { "type": "number", "description": "1~100 사이의 위험도 점수" },
            "recommendations": {
                "type": "array",
                "items": { "type": "string" },
                "description": "3가지 개인별 추천 사항"
            },
            "comparativeInsights": { "type": "string", "description": "시장 분석 및 비교 정보" }
        },
        "required": ["estimatedPremium", "riskScore", "recommendations", "comparativeInsights"]
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::profile::{AgeGroup, Category, Gender};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Backend that replays scripted responses and counts calls
    pub(crate) struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String>>>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedBackend {
        pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AdvisorError::CompletionFailed("script exhausted".into())))
        }
    }

    fn profile(category: Category) -> UserProfile {
        UserProfile {
            age: AgeGroup::try_from(30).unwrap(),
            gender: Gender::Female,
            insurance_type: category,
            ..UserProfile::default()
        }
    }

    fn advisor(backend: Arc<ScriptedBackend>) -> InsuranceAdvisor {
        InsuranceAdvisor::new(backend, RetryPolicy::new(2, Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn remote_products_are_normalized() {
        let body = r#"```json
        [
          {"name": "굿앤굿 어린이보험", "company": "현대해상", "reason": "보장 범위", "avgPremium": 42000.4, "link": "https://www.google.com/search?q=a"},
          {"name": "참좋은 건강보험", "company": "DB손보", "reason": "가성비", "avgPremium": 55000, "link": "https://www.google.com/search?q=b"}
        ]
        ```"#;
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(body.to_string())]));
        let products = advisor(backend.clone())
            .recommend_products(&profile(Category::Health))
            .await;

        assert_eq!(backend.calls(), 1);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[1].id, 2);
        assert_eq!(products[0].avg_premium, Some(42_000));
        assert!(products.iter().all(|p| p.category == Category::Health));
        assert!(products.iter().all(|p| SYNTHETIC_POPULARITY.contains(&p.count)));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_quota_falls_back_to_category_catalog() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(AdvisorError::CompletionFailed("429".into())),
            Err(AdvisorError::CompletionFailed("429".into())),
            Err(AdvisorError::CompletionFailed("RESOURCE_EXHAUSTED".into())),
        ]));
        let products = advisor(backend.clone())
            .recommend_products(&profile(Category::Car))
            .await;

        assert_eq!(backend.calls(), 3);
        assert_eq!(products.len(), 6);
        assert!(products.iter().all(|p| p.category == Category::Car));
        assert!(products.iter().all(|p| SYNTHETIC_POPULARITY.contains(&p.count)));
    }

    #[tokio::test]
    async fn unparseable_or_incomplete_output_falls_back() {
        for body in ["not json", "[]", r#"[{"name": "x"}]"#] {
            let backend = Arc::new(ScriptedBackend::new(vec![Ok(body.to_string())]));
            let products = advisor(backend.clone())
                .recommend_products(&profile(Category::Travel))
                .await;
            assert_eq!(backend.calls(), 1, "no retry for {body}");
            assert_eq!(products.len(), 6);
            assert_eq!(products[0].name, fallback_products(Category::Travel)[0].name);
        }
    }

    #[tokio::test]
    async fn analysis_is_parsed_and_clamped() {
        let body = r#"{"estimatedPremium": 61000, "riskScore": 140, "recommendations": ["a", "b", "c"], "comparativeInsights": "시장 분석"}"#;
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(body.to_string())]));
        let result = advisor(backend).analyze(&profile(Category::Life)).await;

        assert_eq!(result.estimated_premium, 61_000);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.recommendations, vec!["a", "b", "c"]);
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn analysis_failure_returns_formula_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(
            AdvisorError::CompletionFailed("500 internal".into()),
        )]));
        let p = profile(Category::Pension);
        let result = advisor(backend.clone()).analyze(&p).await;

        assert_eq!(backend.calls(), 1);
        assert_eq!(result, fallback_analysis(&p));
    }

    #[test]
    fn prompts_embed_profile_fields() {
        let p = UserProfile {
            is_smoker: true,
            occupation: "개발자".to_string(),
            annual_income: 72_000_000,
            ..profile(Category::Health)
        };
        let prompt = analysis_prompt(&p);
        assert!(prompt.contains("나이: 30세"));
        assert!(prompt.contains("성별: 여성"));
        assert!(prompt.contains("흡연 여부: 흡연"));
        assert!(prompt.contains("직업: 개발자"));
        assert!(prompt.contains("₩72,000,000"));
        assert!(prompt.contains("건강보험"));

        let prompt = product_prompt(&p);
        assert!(prompt.contains("30대 여성"));
        assert!(prompt.contains("상품 20개"));
        assert_eq!(analysis_schema()["required"].as_array().unwrap().len(), 4);
        assert_eq!(product_schema()["type"], "array");
    }
}
