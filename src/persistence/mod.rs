pub mod csv;
pub mod files;
pub mod storage;

pub use csv::{export_csv, import_csv, ImportReport};
pub use files::{get_data_dir, init_local_data_dir};
pub use storage::{FileStorage, MemoryStorage, Storage, HOURLY_RATE_KEY, TASKS_KEY};
