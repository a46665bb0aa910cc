pub mod conf;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod summary;
pub mod tail;
