/// Command router and free-text chat handler
pub mod handlers;
