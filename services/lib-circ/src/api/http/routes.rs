//! 路由与应用状态

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use campus_telemetry::PrometheusHandle;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::application::handlers::{
    CheckEligibilityHandler, GetLoanPolicyHandler, IssueBookHandler, ListBookHistoryHandler,
    ListOpenIssuesHandler, PreviewFineHandler, ReturnBookHandler, UpdateLoanPolicyHandler,
};

use super::handlers;

/// HTTP 层共享状态
#[derive(Clone)]
pub struct AppState {
    pub issue_handler: Arc<IssueBookHandler>,
    pub return_handler: Arc<ReturnBookHandler>,
    pub update_policy_handler: Arc<UpdateLoanPolicyHandler>,
    pub eligibility_handler: Arc<CheckEligibilityHandler>,
    pub preview_fine_handler: Arc<PreviewFineHandler>,
    pub get_policy_handler: Arc<GetLoanPolicyHandler>,
    pub list_open_handler: Arc<ListOpenIssuesHandler>,
    pub book_history_handler: Arc<ListBookHistoryHandler>,
    pub pool: PgPool,
    pub metrics: PrometheusHandle,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/circulation/issues", post(handlers::issue_book))
        .route(
            "/circulation/issues/{issue_id}/return",
            post(handlers::return_book),
        )
        .route("/circulation/issues/open", get(handlers::list_open_issues))
        .route(
            "/circulation/students/{student_id}/eligibility",
            get(handlers::check_eligibility),
        )
        .route(
            "/circulation/books/{book_id}/history",
            get(handlers::book_history),
        )
        .route("/circulation/fines/preview", get(handlers::preview_fine))
        .route(
            "/circulation/policy",
            get(handlers::get_policy).put(handlers::update_policy),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
