/// Request to store file content under a key chosen by the caller
#[derive(Debug, Clone)]
pub struct FileStorageRequest {
    /// Relative key, e.g. `uploads/2018/06/<uuid>.bin`
    pub storage_key: String,
    pub content: Vec<u8>,
}

/// Response from storing file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStorageResponse {
    /// Key to save in the database row
    pub storage_key: String,
    pub size_bytes: u64,
}
