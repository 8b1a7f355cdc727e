pub mod events;
pub mod fanout;
pub mod heartbeat;
pub mod queue;
pub mod registry;
pub mod server;
pub mod session;
