pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod modal;
pub mod models;
pub mod session;
pub mod share;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use listing::{ListingRoute, ListingScreen, ScreenOptions};
pub use session::Session;
