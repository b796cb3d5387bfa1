pub mod feed;

pub use feed::{
    BatchQueue, ConsensusSnapshot, ConsensusWorker, FeedError, ProcessedBatch, SharedSnapshot,
};
