pub mod dtc;
pub mod ecu;
pub mod error;
pub mod ids;
pub mod obd;
pub mod sensors;
pub mod timestamp;
pub mod vehicle;

pub use dtc::*;
pub use ecu::*;
pub use error::*;
pub use ids::*;
pub use obd::*;
pub use sensors::*;
pub use vehicle::*;
