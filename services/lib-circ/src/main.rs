//! lib-circ - 图书馆流通服务入口

use std::sync::Arc;

use campus_adapter_postgres::{PostgresConfig, check_connection, create_pool};
use campus_bootstrap::{init_runtime, shutdown_signal};
use campus_common::retry::RetryConfig;
use campus_config::AppConfig;
use campus_telemetry::init_metrics;
use secrecy::ExposeSecret;
use tracing::info;

use lib_circ::api::{AppState, build_router};
use lib_circ::application::handlers::{
    CheckEligibilityHandler, GetLoanPolicyHandler, IssueBookHandler, ListBookHistoryHandler,
    ListOpenIssuesHandler, PreviewFineHandler, ReturnBookHandler, UpdateLoanPolicyHandler,
};
use lib_circ::config::fallback_policy;
use lib_circ::domain::repositories::{BookRepository, IssueRepository, LoanPolicyRepository};
use lib_circ::infrastructure::persistence::{
    PostgresBookRepository, PostgresIssueRepository, PostgresLoanPolicyRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;
    init_runtime(&config);
    let metrics = init_metrics();

    // 数据库连接与迁移
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&pg_config).await?;
    check_connection(&pool).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // 组装 Repositories（依赖 domain trait）
    let retry = RetryConfig::default();
    let book_repo: Arc<dyn BookRepository> =
        Arc::new(PostgresBookRepository::new(pool.clone(), retry.clone()));
    let issue_repo: Arc<dyn IssueRepository> =
        Arc::new(PostgresIssueRepository::new(pool.clone(), retry.clone()));
    let policy_repo: Arc<dyn LoanPolicyRepository> =
        Arc::new(PostgresLoanPolicyRepository::new(pool.clone(), retry));

    // 策略表为空时按兜底配置播种；之后以数据库记录为准
    if policy_repo.get().await?.is_none() {
        let seeded = fallback_policy(&config.circulation)?;
        policy_repo.save(&seeded).await?;
        info!(policy_id = %seeded.id, "Seeded initial loan policy from configuration");
    }

    // 组装命令/查询处理器
    let state = AppState {
        issue_handler: Arc::new(IssueBookHandler::new(
            issue_repo.clone(),
            policy_repo.clone(),
        )),
        return_handler: Arc::new(ReturnBookHandler::new(
            issue_repo.clone(),
            policy_repo.clone(),
        )),
        update_policy_handler: Arc::new(UpdateLoanPolicyHandler::new(policy_repo.clone())),
        eligibility_handler: Arc::new(CheckEligibilityHandler::new(
            issue_repo.clone(),
            policy_repo.clone(),
        )),
        preview_fine_handler: Arc::new(PreviewFineHandler::new(policy_repo.clone())),
        get_policy_handler: Arc::new(GetLoanPolicyHandler::new(policy_repo.clone())),
        list_open_handler: Arc::new(ListOpenIssuesHandler::new(issue_repo.clone())),
        book_history_handler: Arc::new(ListBookHistoryHandler::new(issue_repo, book_repo)),
        pool,
        metrics,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "lib-circ listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
