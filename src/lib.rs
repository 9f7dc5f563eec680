//! Client-side core for the HM Stores blog: the REST client, the paginated
//! listing controller and the draft form controller shared by the public,
//! shop-owner and admin blog views.

pub use self::errors::{Error, ErrorKind, Result};

pub mod config;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod session;

pub use config::Config;
pub use models::{
    blogs::{featured, BlogDetail, BlogId, BlogSummary},
    draft::{Draft, DraftPayload, FieldErrors},
    notice::Notice,
    query::{PageRequest, PageResult},
    response::{Ack, Envelope},
    upload::{UploadFile, UploadResult},
};
pub use repositories::{BlogRepository, HttpBlogRepo};
pub use services::{
    draft::{DraftFlow, DraftForm, DraftState},
    listing::{BlogListing, ListingScope, ListingSnapshot, LoadOutcome},
};
pub use session::{BearerToken, Session, SessionStore};
