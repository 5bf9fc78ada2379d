// ==========================================
// Wellbeing Waitlist - Application Layer
// ==========================================
// Shared state wiring for the binary and any embedding front end
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
