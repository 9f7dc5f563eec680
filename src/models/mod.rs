pub mod blogs;
pub mod draft;
pub mod html;
pub mod notice;
pub mod query;
pub mod response;
pub mod upload;
