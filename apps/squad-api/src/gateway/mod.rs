pub mod codes;
pub mod events;
pub mod fanout;
pub mod registry;
pub mod server;
pub mod session;
pub mod store;
