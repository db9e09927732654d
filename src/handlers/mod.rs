// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod analytics;
mod health;
mod metrics;
mod orders;
mod root;
mod shared_types;
mod simulate;
mod users;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Business handlers
pub use orders::process_order;
pub use users::register_user;

// Simulation handlers
pub use simulate::{simulate_error, simulate_load};

// Derived views over the registry
pub use analytics::{analytics_handler, summarize, AnalyticsSummary};
