//! HTTP 处理函数
//!
//! 只做协议转换：解析入站 DTO、调用命令/查询处理器、映射响应。
//! 业务裁决全部在应用层与存储侧完成

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use campus_common::{BookId, IssueId, Pagination, StudentId, UserId};
use campus_cqrs_core::{CommandHandler, QueryHandler};
use campus_errors::AppError;
use chrono::Utc;
use uuid::Uuid;

use crate::application::commands::{IssueBookCommand, ReturnBookCommand, UpdateLoanPolicyCommand};
use crate::application::queries::{
    CheckEligibilityQuery, GetLoanPolicyQuery, ListBookHistoryQuery, ListOpenIssuesQuery,
    PreviewFineQuery,
};

use super::dto::{
    CompletedReturnDto, EligibilityDto, FineDto, FinePreviewParams, IssueBookRequest,
    IssueRecordDto, LoanPolicyDto, OpenIssuesParams, PageParams, ReturnBookRequest,
    UpdatePolicyRequest, map_paged,
};
use super::routes::AppState;

pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    campus_adapter_postgres::check_connection(&state.pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

pub async fn issue_book(
    State(state): State<AppState>,
    Json(req): Json<IssueBookRequest>,
) -> Result<(StatusCode, Json<IssueRecordDto>), AppError> {
    let record = state
        .issue_handler
        .handle(IssueBookCommand {
            book_id: BookId::from_uuid(req.book_id),
            student_id: StudentId::from_uuid(req.student_id),
            issue_date: req.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
            issued_by: req.issued_by.map(UserId::from_uuid),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn return_book(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Json(req): Json<ReturnBookRequest>,
) -> Result<Json<CompletedReturnDto>, AppError> {
    let completed = state
        .return_handler
        .handle(ReturnBookCommand {
            issue_id: IssueId::from_uuid(issue_id),
            return_date: req.return_date.unwrap_or_else(|| Utc::now().date_naive()),
            returned_by: req.returned_by.map(UserId::from_uuid),
        })
        .await?;

    Ok(Json(CompletedReturnDto {
        record: completed.record.into(),
        fine: completed.assessment.into(),
    }))
}

pub async fn check_eligibility(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<EligibilityDto>, AppError> {
    let status = state
        .eligibility_handler
        .handle(CheckEligibilityQuery {
            student_id: StudentId::from_uuid(student_id),
        })
        .await?;

    Ok(Json(status.into()))
}

pub async fn list_open_issues(
    State(state): State<AppState>,
    Query(params): Query<OpenIssuesParams>,
) -> Result<Json<Vec<IssueRecordDto>>, AppError> {
    let records = state
        .list_open_handler
        .handle(ListOpenIssuesQuery {
            student_id: StudentId::from_uuid(params.student_id),
        })
        .await?;

    Ok(Json(records.into_iter().map(IssueRecordDto::from).collect()))
}

pub async fn book_history(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<campus_common::PagedResult<IssueRecordDto>>, AppError> {
    let default = Pagination::default();
    let pagination = Pagination::new(
        params.page.unwrap_or(default.page),
        params.page_size.unwrap_or(default.page_size),
    );

    let paged = state
        .book_history_handler
        .handle(ListBookHistoryQuery {
            book_id: BookId::from_uuid(book_id),
            pagination,
        })
        .await?;

    Ok(Json(map_paged(paged)))
}

pub async fn preview_fine(
    State(state): State<AppState>,
    Query(params): Query<FinePreviewParams>,
) -> Result<Json<FineDto>, AppError> {
    let assessment = state
        .preview_fine_handler
        .handle(PreviewFineQuery {
            issue_date: params.issue_date,
            candidate_return_date: params.return_date,
        })
        .await?;

    Ok(Json(assessment.into()))
}

pub async fn get_policy(State(state): State<AppState>) -> Result<Json<LoanPolicyDto>, AppError> {
    let policy = state.get_policy_handler.handle(GetLoanPolicyQuery).await?;
    Ok(Json(policy.into()))
}

pub async fn update_policy(
    State(state): State<AppState>,
    Json(req): Json<UpdatePolicyRequest>,
) -> Result<Json<LoanPolicyDto>, AppError> {
    let policy = state
        .update_policy_handler
        .handle(UpdateLoanPolicyCommand {
            max_books_per_student: req.max_books_per_student,
            loan_period_days: req.loan_period_days,
            fine_per_day_minor: req.fine_per_day_minor,
            fine_currency: req.fine_currency,
            updated_by: req.updated_by.map(UserId::from_uuid),
        })
        .await?;

    Ok(Json(policy.into()))
}
