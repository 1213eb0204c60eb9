mod loan_policy_evaluator;

pub use loan_policy_evaluator::{EligibilityStatus, FineAssessment, LoanPolicyEvaluator};
