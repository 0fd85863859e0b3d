//! Session models

mod session;

pub use session::{EnrichProgress, EnrichmentSession, SessionState};
