//! Photo Geo Common Library
//!
//! CLIから使われるI/Oを持たない型とユーティリティ

pub mod coords;
pub mod error;
pub mod naming;
pub mod place;

pub use coords::{to_decimal_degrees, GpsReading, Hemisphere, Quadrant, Rational};
pub use error::{Error, Result};
pub use naming::{next_available_path, sanitize_segment};
pub use place::{normalize, AddressFields, PlaceIdentity, UNKNOWN};
