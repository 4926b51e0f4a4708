pub mod config;
pub mod token;

pub use config::{get_config, update_config};
pub use token::issue_token;
