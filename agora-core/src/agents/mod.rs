pub mod consumer;
pub mod farmer;
pub mod laborer;

pub use consumer::{Consumer, DayContext};
pub use farmer::Farmer;
pub use laborer::Laborer;
