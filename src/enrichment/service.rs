use super::audit_logger::EnrichmentAuditLogger;
use super::error::EnrichmentError;
use super::job::{EnrichmentJob, JobContext};
use super::jobs::all_jobs;
use super::models::{BatchOutput, BatchRequest, BatchRequestBody, JobKind};
use super::runner::BatchRunner;
use crate::config::EnrichmentSettings;
use crate::server::metrics;
use crate::server_store::{AuditRecord, ServerStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A finished batch plus its wall-clock duration.
#[derive(Debug, Clone)]
pub struct BatchExecution {
    pub output: BatchOutput,
    pub execution_time_ms: u64,
}

/// Entry point for batch invocations: validates the request, runs the job and
/// writes the audit record.
pub struct EnrichmentService {
    runner: BatchRunner,
    jobs: HashMap<JobKind, Arc<dyn EnrichmentJob>>,
    server_store: Arc<dyn ServerStore>,
    settings: EnrichmentSettings,
}

impl EnrichmentService {
    pub fn new(
        ctx: JobContext,
        server_store: Arc<dyn ServerStore>,
        settings: EnrichmentSettings,
    ) -> Self {
        let jobs = all_jobs(&settings)
            .into_iter()
            .map(|job| (job.kind(), job))
            .collect();
        Self {
            runner: BatchRunner::new(ctx),
            jobs,
            server_store,
            settings,
        }
    }

    fn job(&self, slug: &str) -> Result<&Arc<dyn EnrichmentJob>, EnrichmentError> {
        JobKind::from_slug(slug)
            .and_then(|kind| self.jobs.get(&kind))
            .ok_or_else(|| EnrichmentError::UnknownJob(slug.to_string()))
    }

    pub async fn run_batch(
        &self,
        slug: &str,
        body: &BatchRequestBody,
        actor_id: &str,
    ) -> Result<BatchExecution, EnrichmentError> {
        let job = self.job(slug)?;
        let request = BatchRequest::resolve(body, &self.settings)?;
        let kind = job.kind();

        info!(
            "{} requested {} batch of {} from index {}",
            actor_id, kind, request.batch_size, request.start_from_index
        );

        let audit = EnrichmentAuditLogger::new(
            Arc::clone(&self.server_store),
            kind,
            actor_id,
            serde_json::to_value(request).unwrap_or_default(),
        );
        let start = Instant::now();

        match self.runner.run(job.as_ref(), &request).await {
            Ok(output) => {
                let elapsed = start.elapsed();
                metrics::record_enrichment_batch(kind.slug(), "completed", elapsed);
                audit.log_completed(serde_json::json!({
                    "results": output.report,
                    "remaining": output.remaining,
                    "nextIndex": output.next_index,
                }));
                Ok(BatchExecution {
                    output,
                    execution_time_ms: elapsed.as_millis() as u64,
                })
            }
            Err(e) => {
                metrics::record_enrichment_batch(kind.slug(), "failed", start.elapsed());
                audit.log_failed(&e.to_string());
                Err(e)
            }
        }
    }

    pub fn remaining(&self, slug: &str) -> Result<(JobKind, usize), EnrichmentError> {
        let job = self.job(slug)?;
        Ok((job.kind(), self.runner.remaining(job.as_ref())?))
    }

    pub fn audit_log(&self, limit: usize, offset: usize) -> Result<Vec<AuditRecord>, EnrichmentError> {
        Ok(self.server_store.list_audit_records(limit, offset)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::Artist;
    use crate::enrichment::test_support::*;
    use crate::providers::ProviderResponse;
    use crate::server_store::{AuditStatus, SqliteServerStore};
    use tempfile::TempDir;

    fn service(
        catalog: Arc<dyn crate::catalog_store::CatalogStore>,
        backend: FakeBackend,
    ) -> (TempDir, Arc<SqliteServerStore>, EnrichmentService) {
        let dir = TempDir::new().unwrap();
        let server_store = Arc::new(SqliteServerStore::new(dir.path().join("server.db")).unwrap());
        let (_backend, providers) = backend.into_providers();
        let service = EnrichmentService::new(
            context(catalog, providers),
            server_store.clone(),
            EnrichmentSettings::default(),
        );
        (dir, server_store, service)
    }

    #[tokio::test]
    async fn successful_batch_writes_completed_audit() {
        let (_catalog_dir, catalog) = temp_catalog(&[Artist::new("a1", "Artist A")]);
        let mut backend = FakeBackend::default();
        backend.search.insert(
            "Artist A".to_string(),
            ProviderResponse::Found(vec![candidate("abc-123", "Artist A", 100)]),
        );
        let (_dir, server_store, service) = service(catalog, backend);

        let body = BatchRequestBody {
            batch_size: Some(1),
            ..Default::default()
        };
        let execution = service.run_batch("external-ids", &body, "7").await.unwrap();
        assert_eq!(execution.output.report.successful, 1);

        let records = server_store.list_audit_records(10, 0).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.action, "enrich_external_ids");
        assert_eq!(record.status, AuditStatus::Completed);
        assert_eq!(record.actor_id, "7");
        assert_eq!(record.request_snapshot["batchSize"], 1);
        assert_eq!(record.request_snapshot["forceRefresh"], false);
        let response = record.response_snapshot.as_ref().unwrap();
        assert_eq!(response["results"]["successful"], 1);
        assert_eq!(response["nextIndex"], 1);
    }

    #[tokio::test]
    async fn rejected_requests_leave_no_audit() {
        let (_catalog_dir, catalog) = temp_catalog(&[]);
        let (_dir, server_store, service) = service(catalog, FakeBackend::default());

        let unknown = service
            .run_batch("lyrics", &BatchRequestBody::default(), "7")
            .await;
        assert!(matches!(unknown, Err(EnrichmentError::UnknownJob(_))));

        let too_big = BatchRequestBody {
            batch_size: Some(1000),
            ..Default::default()
        };
        let invalid = service.run_batch("tracks", &too_big, "7").await;
        assert!(matches!(invalid, Err(EnrichmentError::InvalidBatchSize { .. })));

        assert!(server_store.list_audit_records(10, 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_writes_failed_audit() {
        let catalog = Arc::new(FixedCatalog {
            artists: vec![],
            broken: true,
        });
        let (_dir, server_store, service) = service(catalog, FakeBackend::default());

        let result = service
            .run_batch("social-links", &BatchRequestBody::default(), "7")
            .await;
        assert!(matches!(result, Err(EnrichmentError::Store(_))));

        let records = server_store.list_audit_records(10, 0).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "enrich_social_links");
        assert_eq!(records[0].status, AuditStatus::Failed);
        assert!(records[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("database is locked"));
    }

    #[test]
    fn remaining_counts_unforced_predicate() {
        let mut done = artist_with_id("t1", "Done", "mb-1");
        done.has_tracks = true;
        let (_catalog_dir, catalog) = temp_catalog(&[
            done,
            artist_with_id("t2", "Todo", "mb-2"),
            Artist::new("t3", "No Id"),
        ]);
        let (_dir, _server_store, service) = service(catalog, FakeBackend::default());

        let (kind, remaining) = service.remaining("tracks").unwrap();
        assert_eq!(kind, JobKind::Tracks);
        assert_eq!(remaining, 1);
        assert_eq!(service.remaining("external-ids").unwrap().1, 1);
    }
}
