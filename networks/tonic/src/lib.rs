pub mod network;
pub mod protobuf;
pub mod serde;
pub mod server;
