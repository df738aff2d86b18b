mod log_utils;

pub use log_utils::log_init;

pub mod reexport {
    pub use tracing;
    pub use tracing_subscriber;
}
