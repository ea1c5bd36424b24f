pub mod clock;
pub mod header;
pub mod socket;
pub mod transport;

pub use clock::*;
pub use header::*;
pub use socket::*;
pub use transport::*;
