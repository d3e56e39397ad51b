//! MBTI Match - candidate selection and match lifecycle for a social-introduction service
//!
//! The crate proposes compatible partners for an authenticated user, records
//! match requests, and lets the counterpart accept or reject them. Every
//! state change runs inside a single store transaction.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use auth::{AuthenticatedUser, JwtAuth};
pub use crate::core::{AcceptPolicy, CandidateSelector, Decision, MatchLedger, RejectPolicy};
pub use error::MatchingError;
pub use models::{Gender, Match, MatchStatus, MatchingStatus, User};
pub use services::{MatchStore, MemoryStore, PostgresStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(crate::core::compatible_types("INFP"), &["ENFJ", "ENTJ"]);
        assert_eq!(MatchingStatus::None.as_str(), "none");
    }
}
