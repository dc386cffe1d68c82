pub mod charts;
pub mod classifier;
pub mod data_store;
pub mod loader;
pub mod stats;
pub mod storage;
pub mod suggestions;
pub mod summary;
