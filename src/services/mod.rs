pub mod auth;
pub mod server_list;
pub mod server_query;
