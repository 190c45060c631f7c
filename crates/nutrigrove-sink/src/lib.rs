pub mod artifacts;
pub mod error;
pub(crate) mod retry;
pub mod sink;
pub mod supabase;

pub use artifacts::{read_raw_items, ArtifactWriter};
pub use error::SinkError;
pub use sink::{BatchFailure, BatchReport, RecordId, RecordSink};
pub use supabase::{SinkOptions, SupabaseSink};
