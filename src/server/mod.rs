//! TCP accept loop. One task per connection, one request per connection.

pub mod listener;

pub use listener::Server;
