pub mod compression;
pub mod fetchers;

pub use crate::domain::model::UploadFile;
pub use crate::domain::ports::Fetcher;
pub use crate::utils::error::Result;
