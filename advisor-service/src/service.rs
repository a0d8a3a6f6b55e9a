use advisor_core::{
    AdminGate, AdminSession, AdvisorConfig, AdvisorError, AgeGroup, AnalysisResult, Category,
    CompletionBackend, Gender, InMemoryStore, Inquiry, InquiryBoard, InquiryType, InsuranceAdvisor,
    KeyValueStore, MailDraft, NewInquiry, NewsArticle, OfflineBackend, PostgresStore, Product,
    RecommendationCache, ReviewBoard, RigBackend, UserProfile, dynamic_news, market_catalog,
    market_map, synthetic_reviews, top_tiles,
};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware::from_fn,
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{
    AnswerRequest, ContactRequest, DeleteQuery, InquiryView, LoginRequest, LoginResponse,
    MarketResponse, OptionsResponse, ProfileQuery, RecommendationsResponse, SelectorOption,
};
use crate::telemetry::correlation_id_middleware;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const TOP_PRODUCTS: usize = 3;

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn api_error(err: AdvisorError) -> ApiError {
    let status = match &err {
        AdvisorError::InvalidInput(_) | AdvisorError::DeleteNotConfirmed(_) => {
            StatusCode::BAD_REQUEST
        }
        AdvisorError::Unauthorized => StatusCode::UNAUTHORIZED,
        AdvisorError::InquiryNotFound(_) => StatusCode::NOT_FOUND,
        AdvisorError::AlreadyCompleted(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Request failed");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

#[derive(Clone)]
pub struct AppState {
    pub advisor: InsuranceAdvisor,
    pub cache: RecommendationCache,
    pub board: InquiryBoard,
    pub admin_gate: Arc<AdminGate>,
    pub admin_sessions: Arc<DashMap<String, AdminSession>>,
    pub catalog: Arc<Vec<Product>>,
    pub contact_recipients: Arc<Vec<String>>,
    pub market_top_n: usize,
}

impl AppState {
    pub fn new(
        config: &AdvisorConfig,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            advisor: InsuranceAdvisor::new(backend, config.retry),
            cache: RecommendationCache::new(store.clone(), config.cache_ttl),
            board: InquiryBoard::new(store),
            admin_gate: Arc::new(AdminGate::new(config.admin_password.clone())),
            admin_sessions: Arc::new(DashMap::new()),
            catalog: Arc::new(market_catalog()),
            contact_recipients: Arc::new(config.contact_recipients.clone()),
            market_top_n: config.market_top_n,
        }
    }

    /// Session behind the admin token header; unauthenticated when absent or unknown
    fn admin_session(&self, headers: &HeaderMap) -> AdminSession {
        headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|token| self.admin_sessions.get(token).map(|entry| *entry.value()))
            .unwrap_or_default()
    }
}

pub async fn create_app(config: &AdvisorConfig) -> Router {
    let backend: Arc<dyn CompletionBackend> = match &config.openrouter_api_key {
        Some(api_key) => {
            info!(model = %config.model, "Using OpenRouter completion backend");
            Arc::new(RigBackend::new(api_key.clone(), config.model.clone()))
        }
        None => {
            warn!("OPENROUTER_API_KEY not set, recommendations will use fallback data");
            Arc::new(OfflineBackend)
        }
    };

    // Cache entries and the inquiry board share one store
    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(database_url) => {
            info!("Using PostgreSQL store");
            match PostgresStore::connect(database_url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!(
                        "Failed to connect to PostgreSQL: {}. Falling back to in-memory storage.",
                        e
                    );
                    Arc::new(InMemoryStore::new())
                }
            }
        }
        None => {
            info!("Using in-memory store (set DATABASE_URL to use PostgreSQL)");
            Arc::new(InMemoryStore::new())
        }
    };

    build_router(AppState::new(config, backend, store))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/options", get(options))
        .route("/market", get(market))
        .route("/news", get(news))
        .route("/reviews", get(reviews))
        .route("/recommendations", post(recommendations))
        .route("/analysis", post(analysis))
        .route("/contact", post(contact))
        .route("/inquiries", get(list_inquiries).post(submit_inquiry))
        .route("/inquiries/{id}", get(get_inquiry).delete(delete_inquiry))
        .route("/inquiries/{id}/answer", post(answer_inquiry))
        .route("/admin/login", post(admin_login))
        .layer(from_fn(correlation_id_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Insurance Advisor",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Insurance market map, AI product recommendations and consultation inquiries",
        "endpoints": {
            "GET /options": "Selector values",
            "GET /market?age&gender&category": "Weighted market map and top products",
            "GET /news?age&gender&category": "Headlines for the selected profile",
            "GET /reviews?age&gender&category": "Reviews of the top products",
            "POST /recommendations": "Recommended products for a profile (cached for 24h)",
            "POST /analysis": "Premium estimate and advice for a profile",
            "POST /contact": "Pre-filled consultation mail draft",
            "GET /inquiries": "List inquiries",
            "POST /inquiries": "Submit an inquiry",
            "POST /admin/login": "Admin login",
            "POST /inquiries/{id}/answer": "Answer an inquiry (admin)",
            "DELETE /inquiries/{id}?confirm=true": "Delete an inquiry (admin)",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        age_groups: AgeGroup::ALL
            .iter()
            .map(|age| SelectorOption {
                value: age.to_string(),
                label: age.label(),
            })
            .collect(),
        genders: Gender::ALL
            .iter()
            .map(|gender| SelectorOption {
                value: wire_name(gender),
                label: gender.label().to_string(),
            })
            .collect(),
        categories: Category::ALL
            .iter()
            .map(|category| SelectorOption {
                value: wire_name(category),
                label: category.short_label().to_string(),
            })
            .collect(),
        inquiry_types: InquiryType::ALL
            .iter()
            .map(|kind| SelectorOption {
                value: wire_name(kind),
                label: kind.label().to_string(),
            })
            .collect(),
    })
}

async fn market(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Json<MarketResponse> {
    let profile = UserProfile::from(query);
    let tiles = market_map(&state.catalog, &profile, state.market_top_n);
    let top = top_tiles(&tiles, TOP_PRODUCTS).to_vec();
    Json(MarketResponse { tiles, top })
}

async fn news(Query(query): Query<ProfileQuery>) -> Json<Vec<NewsArticle>> {
    Json(dynamic_news(&UserProfile::from(query)))
}

async fn reviews(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Json<ReviewBoard> {
    let profile = UserProfile::from(query);
    let tiles = market_map(&state.catalog, &profile, state.market_top_n);
    Json(synthetic_reviews(
        top_tiles(&tiles, TOP_PRODUCTS),
        Utc::now().date_naive(),
    ))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Json<RecommendationsResponse> {
    info!(
        age = %profile.age,
        gender = %profile.gender,
        category = %profile.insurance_type,
        "Recommendation request"
    );
    let result = state.cache.get_or_fetch(&state.advisor, &profile).await;
    Json(RecommendationsResponse {
        products: result.products,
        cached: result.cached,
    })
}

async fn analysis(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Json<AnalysisResult> {
    info!(category = %profile.insurance_type, "Analysis request");
    Json(state.advisor.analyze(&profile).await)
}

async fn contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> ApiResult<MailDraft> {
    let draft = MailDraft::compose(&request.profile, &request.form, &state.contact_recipients)
        .map_err(api_error)?;
    info!(inquiry_type = ?request.form.inquiry_type, "Contact mail draft composed");
    Ok(Json(draft))
}

async fn list_inquiries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<InquiryView>> {
    let reveal_contact = state.admin_session(&headers).is_authenticated();
    let inquiries = state.board.list().await.map_err(api_error)?;
    Ok(Json(
        inquiries
            .into_iter()
            .map(|inquiry| InquiryView::new(inquiry, reveal_contact))
            .collect(),
    ))
}

async fn get_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<InquiryView> {
    let reveal_contact = state.admin_session(&headers).is_authenticated();
    let inquiry = state.board.get(id).await.map_err(api_error)?;
    Ok(Json(InquiryView::new(inquiry, reveal_contact)))
}

async fn submit_inquiry(
    State(state): State<AppState>,
    Json(request): Json<NewInquiry>,
) -> Result<(StatusCode, Json<Inquiry>), ApiError> {
    let inquiry = state.board.submit(request).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let mut session = AdminSession::default();
    if !session.login(&state.admin_gate, &request.password) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "비밀번호가 올바르지 않습니다.",
                "authenticated": false
            })),
        ));
    }

    // One shared password, so every admin shares one token. Tokens live until restart.
    let existing = state
        .admin_sessions
        .iter()
        .find(|entry| entry.value().is_authenticated())
        .map(|entry| entry.key().clone());
    let token = match existing {
        Some(token) => token,
        None => {
            let token = Uuid::new_v4().to_string();
            state.admin_sessions.insert(token.clone(), session);
            info!("Admin session opened");
            token
        }
    };
    Ok(Json(LoginResponse {
        authenticated: true,
        token,
    }))
}

async fn answer_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<Inquiry> {
    let session = state.admin_session(&headers);
    state
        .board
        .answer(&session, id, &request.answer)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn delete_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = state.admin_session(&headers);
    state
        .board
        .delete(&session, id, query.confirm)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
