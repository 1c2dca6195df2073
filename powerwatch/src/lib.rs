// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    format_currency, load_session, parse_search_request, resolve_data_source, session_options,
};
