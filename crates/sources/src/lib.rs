pub mod file;
pub mod memory;
pub mod metadata;
pub mod refresh;
pub mod schedule;
pub mod wiring;

pub use file::{write_json_atomic, JsonFileSource};
pub use memory::InMemorySource;
pub use metadata::{
    feed_file_status, needs_refresh, read_metadata, FeedFileStatus, FeedMetadata, FeedStatus,
};
pub use refresh::{FeedRefresher, RefreshError, RefreshOutcome, RefreshSettings};
pub use schedule::{next_weekly_run, until_next_run};
pub use wiring::{file_catalog, FileCatalog};
