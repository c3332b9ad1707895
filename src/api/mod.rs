pub mod http;
pub mod memory;
pub mod traits;
pub mod types;

pub use http::HttpFlatSource;
pub use memory::InMemoryFlatSource;
pub use traits::FlatSource;
pub use types::ApiEndpoints;
