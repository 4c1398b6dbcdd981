pub mod channel;
pub mod server;
pub mod user;
