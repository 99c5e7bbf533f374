pub mod cors;
pub mod extract;
pub mod handlers;
pub mod router;

pub use router::build_app_router;
