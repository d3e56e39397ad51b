// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateQuery, Gender, Match, MatchStatus, MatchingStatus, User};
pub use requests::{MatchRequestBody, MatchResponseBody};
pub use responses::{DetailResponse, ErrorResponse, HealthResponse};
