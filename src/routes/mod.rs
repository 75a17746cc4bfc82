pub mod common;
pub mod record;

pub use common::common_routes;
pub use record::record_routes;
