//! Seams between the Wishbot core and the outside world.

pub mod channel;
pub mod clock;

pub use channel::Channel;
pub use clock::{Clock, FixedClock, SystemClock};
