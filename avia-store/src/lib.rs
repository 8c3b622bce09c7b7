pub mod app_config;
pub mod booking_store;
pub mod codec;
pub mod inventory;
pub mod lockfile;

pub use app_config::Config;
pub use booking_store::{BookingRequest, BookingStore, StoreError};
pub use inventory::{FlightInventory, InventoryError};
pub use lockfile::{FileLock, LockError, LockGuard};
