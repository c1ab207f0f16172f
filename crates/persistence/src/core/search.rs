//! Search provider trait.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{SearchRequest, SearchResult};

/// Runs advanced searches.
///
/// # Example
///
/// ```ignore
/// use moltrack_persistence::StorageError;
/// use moltrack_persistence::core::SearchProvider;
/// use moltrack_persistence::types::{FieldPath, Level, SearchRequest};
///
/// async fn molregnos<S: SearchProvider>(storage: &S) -> Result<(), StorageError> {
///     let request = SearchRequest::new(
///         Level::Compounds,
///         vec![FieldPath::direct(Level::Compounds, "molregno")],
///     )?
///     .with_limit(20);
///
///     let result = storage.search(&request).await?;
///     println!("{} compounds", result.total_count());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Executes the request and returns its rows.
    ///
    /// # Errors
    ///
    /// * `StorageError::Validation` - If the request is malformed
    /// * `StorageError::Search` - If a field cannot be resolved or a condition
    ///   is invalid for its operator
    /// * `StorageError::Backend` - If the statement fails to execute
    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResult>;

    /// Short name of the backend, for logs and health reports.
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend can serve searches.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
