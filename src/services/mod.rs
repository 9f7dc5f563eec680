pub mod draft;
pub mod listing;
