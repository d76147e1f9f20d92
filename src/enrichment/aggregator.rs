use super::models::{BatchReport, EnrichmentOutcome, ItemError, Progress};

/// Folds per-item outcomes into batch counters.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    successful: usize,
    failed: usize,
    skipped: usize,
    errors: Vec<ItemError>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: EnrichmentOutcome) {
        match outcome {
            EnrichmentOutcome::Skipped(_) => self.skipped += 1,
            EnrichmentOutcome::Successful(_) => self.successful += 1,
            EnrichmentOutcome::Failed {
                entity_name,
                error_message,
            } => {
                self.failed += 1;
                self.errors.push(ItemError {
                    entity_name,
                    error_message,
                });
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    pub fn into_report(self, progress: Progress, completed: bool) -> BatchReport {
        BatchReport {
            processed: self.processed(),
            successful: self.successful,
            failed: self.failed,
            skipped: self.skipped,
            errors: self.errors,
            progress,
            completed,
        }
    }
}
