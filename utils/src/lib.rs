pub mod endpoint;
pub mod surf_logging;
