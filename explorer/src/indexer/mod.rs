//! Incremental block consumer: catch-up scans, steady-state events, reorg
//! rollback. All store writes happen here.

pub mod block_indexer;
pub mod name_indexer;
pub mod rollback;
pub mod service;
pub mod summary_indexer;

pub use service::IndexerService;
