// Core algorithm exports
pub mod compatibility;
pub mod filters;
pub mod ledger;
pub mod selector;
pub mod state_machine;

pub use compatibility::{compatible_types, is_compatible, is_known_type, PERSONALITY_TYPES};
pub use filters::{compatibility_tier, is_eligible, Tier};
pub use ledger::MatchLedger;
pub use selector::CandidateSelector;
pub use state_machine::{AcceptPolicy, Decision, RejectPolicy, Resolution};
