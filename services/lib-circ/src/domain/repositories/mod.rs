//! 仓储接口定义

mod book_repository;
mod issue_repository;
mod loan_policy_repository;

pub use book_repository::{BookRepository, MockBookRepository};
pub use issue_repository::{CreateIssue, IssueRepository, MockIssueRepository, ReturnIssue};
pub use loan_policy_repository::{LoanPolicyRepository, MockLoanPolicyRepository};
