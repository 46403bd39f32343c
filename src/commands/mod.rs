mod backends;
mod cat;
mod download;
mod upload;
mod whoami;

pub mod config;

pub use backends::backends;
pub use cat::cat;
pub use config::config;
pub use download::download;
pub use upload::upload;
pub use whoami::whoami;
