//! Search implementation for PostgreSQL backend.

use async_trait::async_trait;
use tracing::info;

use crate::core::SearchProvider;
use crate::error::StorageResult;
use crate::search::execute_search;
use crate::types::{SearchRequest, SearchResult};

use super::PostgresBackend;

#[async_trait]
impl SearchProvider for PostgresBackend {
    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResult> {
        let session = self.session().await?;
        let result = execute_search(&session, session.schema(), request).await?;
        info!(
            level = %request.level(),
            rows = result.total_count(),
            "Search returned rows"
        );
        Ok(result)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StorageResult<()> {
        PostgresBackend::health_check(self).await
    }
}
