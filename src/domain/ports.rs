use crate::domain::model::UploadFile;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The four request shapes every fetcher backend supports.
///
/// Any non-success status fails with `FetchError::Http`; transport errors are
/// passed through untouched.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_binary(&self, url: &str) -> Result<Vec<u8>>;

    async fn fetch_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + Send;

    async fn send_file<T>(&self, url: &str, file: UploadFile) -> Result<T>
    where
        T: DeserializeOwned + Send;

    async fn send_json<D, T>(&self, url: &str, data: &D) -> Result<T>
    where
        D: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send;
}
