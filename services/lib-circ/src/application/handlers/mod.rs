//! 命令/查询处理器

mod circulation_query_handlers;
mod issue_book_handler;
mod return_book_handler;
mod update_policy_handler;

pub use circulation_query_handlers::{
    CheckEligibilityHandler, GetLoanPolicyHandler, ListBookHistoryHandler, ListOpenIssuesHandler,
    PreviewFineHandler,
};
pub use issue_book_handler::IssueBookHandler;
pub use return_book_handler::ReturnBookHandler;
pub use update_policy_handler::UpdateLoanPolicyHandler;
