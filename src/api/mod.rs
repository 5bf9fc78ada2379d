// ==========================================
// Wellbeing Waitlist - API Layer
// ==========================================
// Business entry points for whatever front end is wired on top
// ==========================================

pub mod error;
pub mod waitlist_api;

pub use error::{ApiError, ApiResult};
pub use waitlist_api::{SubmitOutcome, WaitlistApi};
