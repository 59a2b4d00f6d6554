//! Request Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use upline_core::config::{period_key_for, ProfitSchedule};
use upline_core::rank::RankEngine;
use upline_core::types::{
    InvestmentLevel, Page, RewardId, TransactionId, UserId, WithdrawalBucket,
};

use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /health
pub async fn health_check(State(_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// GET /stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        service: state.config.service_name.clone(),
        version: state.config.version.clone(),
        uptime_secs: state.uptime_secs(),
        requests: state.request_count().await,
        schedule_version: state.current_schedule().await.version,
    })
}

/// GET /users/:id/balances
///
/// Unknown users report zero everywhere rather than 404: no data is not
/// an error for balance reads.
pub async fn get_balances(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BalancesResponse>> {
    let balances = state.balances.balances(&UserId::new(&user_id)).await?;
    Ok(Json(BalancesResponse::from_balances(&user_id, balances)))
}

/// GET /users/:id/referrals
pub async fn get_referrals(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<ReferralsQuery>,
) -> ApiResult<Json<ReferralsResponse>> {
    let page = Page::new(query.page.unwrap_or(1), query.page_size.unwrap_or(50));
    let depth_filter = match query.referral_type.as_deref() {
        Some("direct") | None => Some(1),
        Some("indirect") => query.level,
        Some(other) => {
            return Err(ApiError::validation(format!(
                "unknown referral type {other:?}, expected direct or indirect"
            )))
        }
    };

    let listing = state
        .referrals
        .referrals_page(&UserId::new(&user_id), depth_filter, page)
        .await?;
    Ok(Json(ReferralsResponse::from(listing)))
}

/// POST /users/:id/referrer
pub async fn assign_referrer(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<AssignReferrerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .graph
        .assign_referrer(&UserId::new(&user_id), &UserId::new(&request.referrer_id))
        .await?;
    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "referrer_id": request.referrer_id,
    })))
}

/// GET /users/:id/rank
///
/// Routine rank-status reads double as the automatic evaluation hook:
/// when the period has elapsed the reward is created here and the next
/// period starts.
pub async fn get_rank_info(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RankInfoResponse>> {
    let user_id = UserId::new(&user_id);
    let Some(info) = state.rank_engine.rank_info(&user_id).await? else {
        return Ok(Json(RankInfoResponse::empty()));
    };

    let now = Utc::now();
    if RankEngine::period_elapsed(info.period_start, now) {
        let reward = state.rank_engine.create_reward(&user_id, &info, false, now).await?;
        return Ok(Json(RankInfoResponse::from_info(info, Some(reward))));
    }
    Ok(Json(RankInfoResponse::from_info(info, None)))
}

/// POST /users/:id/rank/claim
pub async fn claim_reward(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RewardResponse>> {
    let reward = state
        .rank_engine
        .claim(&UserId::new(&user_id), Utc::now())
        .await?;
    Ok(Json(RewardResponse::from(reward)))
}

/// GET /users/:id/transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let page = Page::new(query.page.unwrap_or(1), query.page_size.unwrap_or(50));
    let rows = state
        .stores
        .transactions
        .list_for_user(&UserId::new(&user_id), page)
        .await?;
    Ok(Json(rows.into_iter().map(TransactionResponse::from).collect()))
}

/// POST /transactions/deposits
pub async fn create_deposit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDepositRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let transaction = state
        .ledger
        .create_deposit(&UserId::new(&request.user_id), request.amount, Utc::now())
        .await?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST /transactions/withdrawals
pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateWithdrawalRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let bucket = WithdrawalBucket::parse(&request.bucket).ok_or_else(|| {
        ApiError::validation(format!(
            "unknown bucket {:?}, expected deposit, profit or reward",
            request.bucket
        ))
    })?;
    let transaction = state
        .ledger
        .create_withdrawal(
            &UserId::new(&request.user_id),
            request.amount,
            bucket,
            Utc::now(),
        )
        .await?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST /transactions/:id/approve
pub async fn approve_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Json<TransactionResponse>> {
    let transaction = state
        .ledger
        .approve(&TransactionId::new(&transaction_id), Utc::now())
        .await?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST /transactions/:id/reject
pub async fn reject_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Json<TransactionResponse>> {
    let transaction = state
        .ledger
        .reject(&TransactionId::new(&transaction_id), Utc::now())
        .await?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST /rewards/:id/approve
pub async fn approve_reward(
    State(state): State<Arc<AppState>>,
    Path(reward_id): Path<String>,
) -> ApiResult<Json<RewardResponse>> {
    let reward = state
        .ledger
        .approve_reward(&RewardId::new(&reward_id), Utc::now())
        .await?;
    Ok(Json(RewardResponse::from(reward)))
}

/// POST /rewards/:id/reject
pub async fn reject_reward(
    State(state): State<Arc<AppState>>,
    Path(reward_id): Path<String>,
    Json(request): Json<RejectRewardRequest>,
) -> ApiResult<Json<RewardResponse>> {
    let reward = state
        .ledger
        .reject_reward(&RewardId::new(&reward_id), request.reason, Utc::now())
        .await?;
    Ok(Json(RewardResponse::from(reward)))
}

/// POST /distribution/run
pub async fn run_distribution(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunDistributionRequest>,
) -> ApiResult<Json<DistributionRunResponse>> {
    let now = Utc::now();
    let page = Page::new(request.page.unwrap_or(1), request.page_size.unwrap_or(100));
    let period_key = request.period_key.unwrap_or_else(|| period_key_for(now));
    let schedule = state.current_schedule().await;

    let outcome = state
        .distribution
        .run_page(page, &schedule, &period_key, now)
        .await?;
    Ok(Json(DistributionRunResponse::from_outcome(
        &period_key,
        page.page,
        outcome,
    )))
}

/// PUT /distribution/schedule
pub async fn set_schedule(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetScheduleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut rates = std::collections::HashMap::new();
    for (name, rate) in request.rates {
        let level = InvestmentLevel::parse(&name)
            .ok_or_else(|| ApiError::validation(format!("unknown level {name:?}")))?;
        rates.insert(level, rate);
    }
    let schedule = ProfitSchedule::new(request.version, request.valid_from, rates);
    schedule.validate()?;

    let version = schedule.version.clone();
    state.set_schedule(schedule).await;
    Ok(Json(serde_json::json!({ "schedule_version": version })))
}
