mod client;
mod error;

pub use client::{ApiClient, MediaApi, MEDIA_FIELDS};
pub use error::{ApiError, ApiResult};
