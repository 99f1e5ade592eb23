//! Data module - CSV loading, sampling and cleaning

mod loader;
mod processor;

pub use loader::{DataLoader, LoaderError, DEFAULT_INPUT_PATH};
pub use processor::{
    default_flag, parse_percentage, DataProcessor, ProcessorError, SampleConfig, StatusPolicy,
    COLUMNS_OF_INTEREST, DEFAULT_STATUSES, RATE_COLUMN, SAMPLE_SEED, SAMPLE_SIZE, STATUS_COLUMN,
    TARGET_COLUMN,
};
