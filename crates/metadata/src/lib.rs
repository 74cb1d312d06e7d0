mod error;
mod job_store;
mod media_file_store;
mod pool;
mod usage_store;

pub use error::*;
pub use job_store::*;
pub use media_file_store::*;
pub use pool::get_db_pool;
pub use usage_store::*;
