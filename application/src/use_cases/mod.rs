//! Use cases (application services)

pub mod consume_stream;
pub mod dispatch;
pub mod manage_context;
pub mod monitor_health;
pub mod routing;
