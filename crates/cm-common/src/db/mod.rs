pub mod bookings;
pub mod crews;
pub mod migrations;
pub mod pool;

pub use bookings::{persist_booking, persist_release, BookingStorageError};
pub use crews::{fetch_active_crews_by_trade, list_crews, CrewFetchError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
