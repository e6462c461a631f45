pub mod completion;
pub mod config;
pub mod touch_id;

pub use completion::handle_completion;
pub use config::handle_config;
pub use touch_id::{handle_disable, handle_enable, handle_status, handle_token, handle_verify};
