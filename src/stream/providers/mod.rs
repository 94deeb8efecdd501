//! Site adapters
//!
//! One module per site, each covering a different way of finding the
//! content page: search (`hdhub4u`), direct path (`hdrezka`) and slug
//! registry (`serienfans`).

pub mod hdhub4u;
pub mod hdrezka;
pub mod serienfans;

pub use hdhub4u::Hdhub4uProvider;
pub use hdrezka::HdrezkaProvider;
pub use serienfans::SerienfansProvider;
