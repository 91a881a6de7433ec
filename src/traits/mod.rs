pub mod checkpoint;
pub mod dispatcher;
pub mod fetcher;
pub mod task;

pub use checkpoint::{CheckpointMap, CheckpointStore};
pub use dispatcher::{DeliveryReport, Dispatcher, Quota};
pub use fetcher::FeedFetcher;
pub use task::{ScheduledTask, TaskOutcome};
