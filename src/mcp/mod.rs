pub mod catalog;
pub mod dispatch;
pub mod protocol;
pub mod resources;
pub mod server;
