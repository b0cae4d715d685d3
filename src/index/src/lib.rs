#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;

pub mod channel;
pub mod memory;
pub mod records;
pub mod request;
pub mod server;
pub mod service;
pub mod transport;
pub mod wire;

pub use crate::channel::get_channel;
pub use crate::memory::MemoryIndex;
pub use crate::service::{Reply, ReplyReader, SymbolIndex};
pub use crate::transport::RemoteIndex;
