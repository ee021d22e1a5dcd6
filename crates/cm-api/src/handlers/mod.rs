pub mod bookings;
pub mod crews;
pub mod health;
