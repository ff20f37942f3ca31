// Download engine: session state, the streaming loop, decoding, and the events it emits.

pub mod controller;
pub mod decode;
pub mod events;
pub mod session;
pub mod stats;
