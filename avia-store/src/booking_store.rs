use avia_domain::{Booking, BookingStatus};
use chrono::Utc;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::app_config::FeeConfig;
use crate::codec;

/// Ids start here and are never reused: the counter persists in the file and
/// increments on every create, including for bookings later cancelled.
pub const FIRST_BOOKING_ID: u32 = 1000;

/// Default flat surcharge applied when a booking's seat is changed.
pub const SEAT_CHANGE_FEE: f64 = 25.0;

/// Default cancellation fee floor and flat fee for far-out cancellations.
pub const MIN_CANCELLATION_FEE: f64 = 25.0;
pub const LONG_HORIZON_CANCELLATION_FEE: f64 = 50.0;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("maximum bookings limit reached ({0})")]
    CapacityExceeded(usize),

    #[error("could not persist bookings to {path}: {source}")]
    Persistence {
        path: String,
        source: std::io::Error,
    },
}

/// Fields supplied by the workflow when creating a booking. Id, confirmation
/// code, status and creation stamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub passenger_name: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub departure_time: String,
    pub seat_number: String,
    pub cabin_class: String,
    pub total_price: f64,
}

/// Fee and refund quoted for a cancellation before it is executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancellationQuote {
    pub fee: f64,
    pub refund: f64,
}

/// Bounded, ordered collection of active bookings with the id counter.
pub struct BookingStore {
    bookings: Vec<Booking>,
    next_id: u32,
    capacity: usize,
    seat_change_fee: f64,
    min_cancellation_fee: f64,
    long_horizon_fee: f64,
}

impl BookingStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            bookings: Vec::new(),
            next_id: FIRST_BOOKING_ID,
            capacity,
            seat_change_fee: SEAT_CHANGE_FEE,
            min_cancellation_fee: MIN_CANCELLATION_FEE,
            long_horizon_fee: LONG_HORIZON_CANCELLATION_FEE,
        }
    }

    /// A store charging the configured fee schedule instead of the defaults.
    pub fn with_fees(capacity: usize, fees: &FeeConfig) -> Self {
        Self {
            seat_change_fee: fees.seat_change,
            min_cancellation_fee: fees.min_cancellation,
            long_horizon_fee: fees.long_horizon_cancellation,
            ..Self::new(capacity)
        }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Create a confirmed booking and return its id. The id counter
    /// advances even though the record may later be retired.
    pub fn create(&mut self, request: BookingRequest) -> Result<u32, StoreError> {
        if self.bookings.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded(self.capacity));
        }

        let id = self.next_id;
        self.next_id += 1;

        let now = Utc::now();
        self.bookings.push(Booking {
            id,
            confirmation_code: generate_confirmation_code(id),
            passenger_name: request.passenger_name,
            flight_number: request.flight_number,
            origin: request.origin,
            destination: request.destination,
            departure_date: request.departure_date,
            departure_time: request.departure_time,
            seat_number: request.seat_number,
            cabin_class: request.cabin_class,
            total_price: request.total_price,
            status: BookingStatus::Confirmed,
            booked_date: now.format("%Y-%m-%d").to_string(),
            booked_time: now.format("%H:%M").to_string(),
        });

        info!(id, "booking created");
        Ok(id)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Resolve a confirmation code to its booking id, if any.
    pub fn find_by_code(&self, code: &str) -> Option<u32> {
        self.bookings
            .iter()
            .find(|b| b.confirmation_code == code)
            .map(|b| b.id)
    }

    pub fn set_passenger_name(&mut self, id: u32, name: &str) -> bool {
        self.modify(id, |b| b.passenger_name = name.to_string())
    }

    /// Seat changes carry the flat surcharge on top of the stored price.
    pub fn set_seat_number(&mut self, id: u32, seat: &str) -> bool {
        let fee = self.seat_change_fee;
        self.modify(id, |b| {
            b.seat_number = seat.to_string();
            b.total_price += fee;
        })
    }

    /// Add a flat modification surcharge (date-change fee and the like) to
    /// the stored price.
    pub fn add_surcharge(&mut self, id: u32, amount: f64) -> bool {
        self.modify(id, |b| b.total_price += amount)
    }

    pub fn set_cabin_class(&mut self, id: u32, cabin: &str) -> bool {
        self.modify(id, |b| b.cabin_class = cabin.to_string())
    }

    pub fn set_departure_date(&mut self, id: u32, date: &str) -> bool {
        self.modify(id, |b| b.departure_date = date.to_string())
    }

    fn modify(&mut self, id: u32, mutate: impl FnOnce(&mut Booking)) -> bool {
        match self.bookings.iter_mut().find(|b| b.id == id) {
            Some(b) if b.can_be_modified() => {
                mutate(b);
                b.status = BookingStatus::Modified;
                true
            }
            _ => false,
        }
    }

    /// Remove an active booking, compacting the collection and preserving
    /// the relative order of the remaining records.
    pub fn retire(&mut self, id: u32) -> bool {
        let Some(index) = self.bookings.iter().position(|b| b.id == id) else {
            return false;
        };
        if !self.bookings[index].can_be_cancelled() {
            return false;
        }
        self.bookings.remove(index);
        info!(id, "booking retired");
        true
    }

    pub fn list_active(&self) -> Vec<&Booking> {
        self.bookings.iter().filter(|b| b.is_active()).collect()
    }

    /// Case-insensitive substring match on the passenger name.
    pub fn list_by_passenger(&self, fragment: &str) -> Vec<&Booking> {
        let needle = fragment.to_lowercase();
        self.bookings
            .iter()
            .filter(|b| b.passenger_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn list_by_flight(&self, flight_number: &str) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.flight_number == flight_number)
            .collect()
    }

    /// Sum of prices over confirmed and modified bookings.
    pub fn total_revenue(&self) -> f64 {
        self.bookings
            .iter()
            .filter(|b| b.is_active())
            .map(|b| b.total_price)
            .sum()
    }

    /// Quote the fee and refund for cancelling `id` at `days_until_departure`
    /// days out. `None` when the booking does not exist or is not active.
    pub fn cancellation_quote(&self, id: u32, days_until_departure: i64) -> Option<CancellationQuote> {
        let booking = self.find_by_id(id).filter(|b| b.can_be_cancelled())?;
        let fee = cancellation_fee(
            booking.total_price,
            days_until_departure,
            self.min_cancellation_fee,
            self.long_horizon_fee,
        );
        Some(CancellationQuote {
            fee,
            refund: booking.total_price - fee,
        })
    }

    /// Full-file rewrite of every booking plus the id counter.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let text = codec::encode_bookings(&self.bookings, self.next_id);
        fs::write(path, text).map_err(|source| StoreError::Persistence {
            path: path.display().to_string(),
            source,
        })?;
        info!(count = self.bookings.len(), path = %path.display(), "bookings saved");
        Ok(())
    }

    /// Replace the in-memory contents with the persisted file. An unreadable
    /// or empty file leaves the store empty rather than failing the caller.
    /// Returns whether the file could be read.
    pub fn load_from(&mut self, path: &Path) -> bool {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read bookings file; starting empty");
                self.bookings.clear();
                self.next_id = FIRST_BOOKING_ID;
                return false;
            }
        };

        let doc = codec::decode_bookings(&text, self.capacity);
        self.bookings = doc.bookings;
        self.next_id = doc.next_id;
        info!(
            count = self.bookings.len(),
            next_id = self.next_id,
            path = %path.display(),
            "bookings loaded"
        );
        true
    }
}

/// Fee schedule keyed on days until departure, floored at `min_fee`; past 30
/// days out the flat `long_horizon_fee` applies.
pub fn cancellation_fee(price: f64, days_until_departure: i64, min_fee: f64, long_horizon_fee: f64) -> f64 {
    let fee = if days_until_departure <= 1 {
        price * 0.50
    } else if days_until_departure <= 7 {
        price * 0.30
    } else if days_until_departure <= 14 {
        price * 0.20
    } else if days_until_departure <= 30 {
        price * 0.10
    } else {
        long_horizon_fee
    };
    fee.max(min_fee)
}

/// Six characters: two random letters followed by four digits of the id.
fn generate_confirmation_code(id: u32) -> String {
    let mut rng = rand::thread_rng();
    let letters = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
        'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z'];
    format!(
        "{}{}{:04}",
        letters[rng.gen_range(0..letters.len())],
        letters[rng.gen_range(0..letters.len())],
        id % 10000
    )
}
