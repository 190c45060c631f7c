use nutrigrove_core::NutrientRecord;

use crate::error::SinkError;

/// Identifier the data store generated for an accepted record.
pub type RecordId = String;

/// A record that the sink rejected during a batch insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub food_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub inserted_ids: Vec<RecordId>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.inserted_ids.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write side of the pipeline: accepts nutrient records one at a time or in
/// batches.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    /// Insert one record and return its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] when the record is not accepted.
    async fn insert(&self, record: &NutrientRecord) -> Result<RecordId, SinkError>;

    /// Insert every record in order. A rejected record is logged and
    /// reported; the rest of the batch is still attempted.
    async fn insert_batch(&self, records: &[NutrientRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, record) in records.iter().enumerate() {
            match self.insert(record).await {
                Ok(id) => {
                    tracing::debug!(food = %record.food_name, id = %id, "record inserted");
                    report.inserted_ids.push(id);
                }
                Err(e) => {
                    tracing::warn!(
                        index,
                        food = %record.food_name,
                        error = %e,
                        "record rejected by sink"
                    );
                    report.failures.push(BatchFailure {
                        index,
                        food_name: record.food_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}
