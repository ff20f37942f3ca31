// Transport abstraction: the reqwest backend and the seam tests plug into.

pub mod http_source;
pub mod traits;
