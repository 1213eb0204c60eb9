//! PostgreSQL implementation of LoanPolicyRepository
//!
//! 策略只追加不更新，最新一条即当前策略；历史行保留作审计

use async_trait::async_trait;
use campus_adapter_postgres::with_db_retry;
use campus_common::retry::RetryConfig;
use campus_common::{AuditInfo, PolicyId, UserId};
use campus_domain_core::{Currency, Money};
use campus_errors::AppResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::LoanPolicy;
use crate::domain::repositories::LoanPolicyRepository;

use super::db_err;

pub struct PostgresLoanPolicyRepository {
    pool: PgPool,
    retry: RetryConfig,
}

impl PostgresLoanPolicyRepository {
    pub fn new(pool: PgPool, retry: RetryConfig) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl LoanPolicyRepository for PostgresLoanPolicyRepository {
    async fn get(&self) -> AppResult<Option<LoanPolicy>> {
        let row = with_db_retry(&self.retry, "policy_get", || async {
            sqlx::query_as::<_, PolicyRow>(
                r#"
                SELECT id, max_books_per_student, loan_period_days, fine_per_day_minor,
                       fine_currency, created_at, created_by, updated_at, updated_by
                FROM loan_policies
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                "#,
            )
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to load loan policy", e))
        })
        .await?;

        Ok(row.map(LoanPolicy::from))
    }

    async fn save(&self, policy: &LoanPolicy) -> AppResult<()> {
        debug!(policy_id = %policy.id, "Saving loan policy");

        sqlx::query(
            r#"
            INSERT INTO loan_policies (id, max_books_per_student, loan_period_days,
                                       fine_per_day_minor, fine_currency,
                                       created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(policy.id.0)
        .bind(policy.max_books_per_student as i32)
        .bind(policy.loan_period_days as i32)
        .bind(policy.fine_per_day.amount)
        .bind(policy.fine_per_day.currency.as_str())
        .bind(policy.audit.created_at)
        .bind(policy.audit.created_by.map(|u| u.0))
        .bind(policy.audit.updated_at)
        .bind(policy.audit.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to save loan policy", e))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PolicyRow {
    id: Uuid,
    max_books_per_student: i32,
    loan_period_days: i32,
    fine_per_day_minor: i64,
    fine_currency: String,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl From<PolicyRow> for LoanPolicy {
    fn from(row: PolicyRow) -> Self {
        LoanPolicy::from_parts(
            PolicyId::from_uuid(row.id),
            row.max_books_per_student as u32,
            row.loan_period_days as u32,
            Money::new(row.fine_per_day_minor, Currency::new(&row.fine_currency)),
            AuditInfo {
                created_at: row.created_at,
                created_by: row.created_by.map(UserId::from_uuid),
                updated_at: row.updated_at,
                updated_by: row.updated_by.map(UserId::from_uuid),
            },
        )
    }
}
