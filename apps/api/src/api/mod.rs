// HTTP adapter: routing, extractors and JSON handlers over the repositories

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
