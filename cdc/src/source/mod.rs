mod base;
pub mod maxscale;

pub use base::StreamSource;
