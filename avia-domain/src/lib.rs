pub mod booking;
pub mod flight;
pub mod seat;

pub use booking::{Booking, BookingStatus};
pub use flight::Flight;
pub use seat::SeatRef;
