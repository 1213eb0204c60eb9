pub mod book;
pub mod issue_record;
pub mod loan_policy;

pub use book::{Book, BookStatus};
pub use issue_record::{IssueRecord, IssueStatus};
pub use loan_policy::LoanPolicy;
