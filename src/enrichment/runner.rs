//! Generic batch runner: select a slice, process it item by item, then work
//! out progress and completion.

use super::aggregator::ResultAggregator;
use super::error::EnrichmentError;
use super::job::{EnrichmentJob, JobContext};
use super::models::{BatchOutput, BatchRequest, Progress};
use super::worker::process_item;
use crate::server::metrics;
use tracing::{debug, error, info};

pub struct BatchRunner {
    ctx: JobContext,
}

impl BatchRunner {
    pub fn new(ctx: JobContext) -> Self {
        Self { ctx }
    }

    /// Number of artists the job would still select without a forced refresh.
    pub fn remaining(&self, job: &dyn EnrichmentJob) -> Result<usize, EnrichmentError> {
        Ok(self.ctx.catalog.count_artists(&job.predicate(false))?)
    }

    pub async fn run(
        &self,
        job: &dyn EnrichmentJob,
        request: &BatchRequest,
    ) -> Result<BatchOutput, EnrichmentError> {
        let kind = job.kind();
        let predicate = job.predicate(request.force_refresh);

        let total = self.ctx.catalog.count_artists(&predicate).map_err(|e| {
            error!("{}: failed to count artists: {}", kind, e);
            EnrichmentError::Store(e)
        })?;
        let artists = self
            .ctx
            .catalog
            .select_artists(&predicate, request.start_from_index, request.batch_size)
            .map_err(|e| {
                error!("{}: failed to select artists: {}", kind, e);
                EnrichmentError::Store(e)
            })?;

        info!(
            "{}: processing {} artists from index {} ({} matching, force_refresh={})",
            kind,
            artists.len(),
            request.start_from_index,
            total,
            request.force_refresh
        );

        let mut aggregator = ResultAggregator::new();
        for artist in &artists {
            let outcome = process_item(job, artist, request.force_refresh, &self.ctx).await;
            debug!("{}: {} -> {:?}", kind, artist.id, outcome);
            metrics::record_enrichment_item(kind.slug(), outcome.label());
            aggregator.record(outcome);
        }

        let slice_ids: Vec<String> = artists.iter().map(|a| a.id.clone()).collect();
        let (count_after, still_in_slice) = self
            .ctx
            .catalog
            .count_artists(&predicate)
            .and_then(|count| {
                let among = self.ctx.catalog.count_artists_among(&predicate, &slice_ids)?;
                Ok((count, among))
            })
            .map_err(|e| {
                error!("{}: failed to recount artists: {}", kind, e);
                EnrichmentError::Store(e)
            })?;

        // Artists ahead of the cursor were not touched, and updated ones left
        // the predicate, so only unvisited matches are counted.
        let next_index = request.start_from_index + aggregator.processed();
        let remaining = count_after
            .saturating_sub(request.start_from_index)
            .saturating_sub(still_in_slice);
        let completed = remaining == 0 || artists.len() < request.batch_size;

        let report = aggregator.into_report(Progress::new(next_index, total), completed);

        info!(
            "{}: batch done, {} successful, {} failed, {} skipped, {} remaining",
            kind, report.successful, report.failed, report.skipped, remaining
        );

        Ok(BatchOutput {
            report,
            remaining,
            next_index,
        })
    }
}
