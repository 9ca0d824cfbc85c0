pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, search_in_batches, worker_seed};
pub use pool::WorkerPool;
