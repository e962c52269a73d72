//! Axum REST API handlers.
//!
//! Lifecycle calls identify the caller through the `x-principal` header.
//! Amounts are carried as decimal strings in both directions.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    Json,
};
use charity_crowdfunding::{
    Amount, Campaign, CampaignId, CampaignStatus, InMemoryValueLedger, Principal, TokenInfo,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db;
use crate::errors::{GatewayError, Result};
use crate::events::{EventKind, EventRecord};
use crate::Engine;

pub const PRINCIPAL_HEADER: &str = "x-principal";

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub engine: Arc<Engine>,
    /// Handle onto the engine's value rail, used by the dev faucet.
    pub rail: InMemoryValueLedger,
    pub enable_dev_faucet: bool,
}

/// The principal issuing a lifecycle call.
pub struct Caller(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Caller(Principal::new(v)))
            .ok_or(GatewayError::MissingPrincipal)
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<Amount> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::BadRequest(format!("{field} must be an integer amount")))
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub goal: String,
    pub deadline: u64,
}

#[derive(Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    /// Topic filter, e.g. `donated`.
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub journal_len: u64,
}

#[derive(Serialize)]
pub struct CampaignView {
    pub id: CampaignId,
    pub title: String,
    pub creator: String,
    pub goal: String,
    pub deadline: u64,
    pub total_raised: String,
    pub finalized: bool,
    pub exists: bool,
    pub status: CampaignStatus,
    pub custody_balance: String,
}

impl CampaignView {
    fn new(campaign: Campaign, status: CampaignStatus, custody: Amount) -> Self {
        Self {
            id: campaign.id,
            title: campaign.title,
            creator: campaign.creator.to_string(),
            goal: campaign.goal.to_string(),
            deadline: campaign.deadline,
            total_raised: campaign.total_raised.to_string(),
            finalized: campaign.finalized,
            exists: campaign.exists,
            status,
            custody_balance: custody.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub count: u64,
    pub campaigns: Vec<CampaignView>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: CampaignId,
}

#[derive(Serialize)]
pub struct DonationResponse {
    pub campaign_id: CampaignId,
    pub donor: String,
    pub amount: String,
    pub reward_credited: String,
}

#[derive(Serialize)]
pub struct WithdrawalResponse {
    pub campaign_id: CampaignId,
    pub amount: String,
}

#[derive(Serialize)]
pub struct ActiveResponse {
    pub id: CampaignId,
    pub active: bool,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub principal: String,
    pub balance: String,
}

#[derive(Serialize)]
pub struct RewardBalanceResponse {
    pub principal: String,
    pub balance: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
}

impl From<TokenInfo> for TokenResponse {
    fn from(info: TokenInfo) -> Self {
        Self {
            name: info.name,
            symbol: info.symbol,
            decimals: info.decimals,
            total_supply: info.total_supply.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub campaign_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        journal_len: state.engine.event_count(),
    })
}

/// `POST /campaigns`
pub async fn create_campaign(
    State(state): State<Arc<ApiState>>,
    Caller(caller): Caller,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<Json<CreatedResponse>> {
    let goal = parse_amount("goal", &req.goal)?;
    let id = state
        .engine
        .create_campaign(&caller, req.title, goal, req.deadline)?;
    Ok(Json(CreatedResponse { id }))
}

/// `GET /campaigns`
pub async fn list_campaigns(State(state): State<Arc<ApiState>>) -> Json<CampaignsResponse> {
    let engine = &state.engine;
    let campaigns: Vec<CampaignView> = engine
        .campaigns()
        .into_iter()
        .filter_map(|c| {
            let status = engine.campaign_status(c.id).ok()?;
            let custody = engine.custody_balance(c.id);
            Some(CampaignView::new(c, status, custody))
        })
        .collect();
    Json(CampaignsResponse {
        count: engine.campaign_count(),
        campaigns,
    })
}

/// `GET /campaigns/:id`
pub async fn get_campaign(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignView>> {
    let campaign = state.engine.get_campaign(id)?;
    let status = state.engine.campaign_status(id)?;
    let custody = state.engine.custody_balance(id);
    Ok(Json(CampaignView::new(campaign, status, custody)))
}

/// `GET /campaigns/:id/active`
pub async fn is_active(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<CampaignId>,
) -> Json<ActiveResponse> {
    Json(ActiveResponse {
        id,
        active: state.engine.is_active(id),
    })
}

/// `GET /campaigns/:id/donations/:principal`
pub async fn get_donation(
    State(state): State<Arc<ApiState>>,
    Path((id, principal)): Path<(CampaignId, String)>,
) -> Json<BalanceResponse> {
    let principal = Principal::new(principal);
    let amount = state.engine.get_donation(id, &principal);
    Json(BalanceResponse {
        principal: principal.to_string(),
        balance: amount.to_string(),
    })
}

/// `POST /campaigns/:id/donate`
pub async fn donate(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<CampaignId>,
    Caller(caller): Caller,
    Json(req): Json<AmountRequest>,
) -> Result<Json<DonationResponse>> {
    let amount = parse_amount("amount", &req.amount)?;
    let receipt = state.engine.donate(&caller, id, amount)?;
    Ok(Json(DonationResponse {
        campaign_id: receipt.campaign_id,
        donor: receipt.donor.to_string(),
        amount: receipt.amount.to_string(),
        reward_credited: receipt.reward_credited.to_string(),
    }))
}

/// `POST /campaigns/:id/finalize`
pub async fn finalize_campaign(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<CampaignId>,
    Caller(caller): Caller,
) -> Result<Json<CampaignView>> {
    state.engine.finalize_campaign(&caller, id)?;
    get_campaign(State(state), Path(id)).await
}

/// `POST /campaigns/:id/withdraw`
pub async fn withdraw_funds(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<CampaignId>,
    Caller(caller): Caller,
) -> Result<Json<WithdrawalResponse>> {
    let amount = state.engine.withdraw_funds(&caller, id)?;
    Ok(Json(WithdrawalResponse {
        campaign_id: id,
        amount: amount.to_string(),
    }))
}

/// `GET /rewards/:principal`
pub async fn reward_balance(
    State(state): State<Arc<ApiState>>,
    Path(principal): Path<String>,
) -> Json<RewardBalanceResponse> {
    let principal = Principal::new(principal);
    let token = state.engine.reward_token();
    Json(RewardBalanceResponse {
        balance: state.engine.reward_balance_of(&principal).to_string(),
        principal: principal.to_string(),
        symbol: token.symbol,
        decimals: token.decimals,
    })
}

/// `GET /rewards`
pub async fn reward_token(State(state): State<Arc<ApiState>>) -> Json<TokenResponse> {
    Json(state.engine.reward_token().into())
}

/// `GET /accounts/:principal/balance`
pub async fn account_balance(
    State(state): State<Arc<ApiState>>,
    Path(principal): Path<String>,
) -> Json<BalanceResponse> {
    let principal = Principal::new(principal);
    Json(BalanceResponse {
        balance: state.engine.value_balance_of(&principal).to_string(),
        principal: principal.to_string(),
    })
}

/// `POST /accounts/:principal/fund`
///
/// Mints value on the in-memory rail. Only served when the dev faucet is
/// enabled.
pub async fn fund_account(
    State(state): State<Arc<ApiState>>,
    Path(principal): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>> {
    if !state.enable_dev_faucet {
        return Err(GatewayError::NotFound("dev faucet is disabled".to_string()));
    }
    let amount = parse_amount("amount", &req.amount)?;
    let principal = Principal::new(principal);
    let balance = state.rail.mint(&principal, amount)?;
    tracing::info!(%principal, %amount, "dev faucet funded account");
    Ok(Json(BalanceResponse {
        principal: principal.to_string(),
        balance: balance.to_string(),
    }))
}

/// `GET /campaigns/:id/events`
///
/// Returns all indexed events for the given campaign.
pub async fn get_campaign_events(
    State(state): State<Arc<ApiState>>,
    Path(campaign_id): Path<String>,
) -> Result<Json<EventsResponse>> {
    let events = db::get_events_for_campaign(&state.pool, &campaign_id).await?;
    Ok(Json(EventsResponse {
        campaign_id,
        count: events.len(),
        events,
    }))
}

/// `GET /events?kind=<topic>`
///
/// Returns all indexed events, optionally filtered by topic.
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<AllEventsResponse>> {
    let kind = match query.kind.as_deref() {
        None => None,
        Some(topic) => Some(
            EventKind::from_topic(topic)
                .ok_or_else(|| GatewayError::BadRequest(format!("unknown event kind '{topic}'")))?,
        ),
    };
    let events = db::get_all_events(&state.pool, kind.map(|k| k.as_str())).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}
