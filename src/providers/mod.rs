pub(crate) mod http_errors;
pub mod intervals;
pub mod openrouter;
