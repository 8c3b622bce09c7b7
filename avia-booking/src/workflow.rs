//! Booking workflow orchestration.
//!
//! A [`BookingAttempt`] walks the staged state machine; every forward
//! transition checks its precondition and leaves the stage unchanged on
//! failure. Mutating operations (`confirm`, cancellation, modifications)
//! each run a full reload → mutate → persist cycle under the single global
//! file lock, so contending callers never interleave their critical
//! sections. Read-only listings load outside the lock and may observe stale
//! data; display is not authoritative.

use avia_domain::seat::{SEAT_MAP_COLUMNS, SEAT_MAP_ROWS};
use avia_domain::{Booking, Flight, SeatRef};
use avia_store::booking_store::{BookingRequest, BookingStore, StoreError};
use avia_store::inventory::{FlightInventory, InventoryError};
use avia_store::lockfile::{FileLock, LockError};
use avia_store::Config;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use crate::pricing;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid workflow transition from {from:?} to {to:?}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("booking not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Stages of a booking attempt, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SearchingRoute,
    FlightSelected,
    SeatsSelected,
    DetailsCollected,
    Validated,
    PaymentAuthorized,
    Confirmed,
    Aborted,
}

/// Route criteria supplied by the input-collection collaborator; origin and
/// destination are expected pre-normalized to uppercase.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

/// Lead passenger contact details, also collaborator-supplied.
#[derive(Debug, Clone)]
pub struct PassengerDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Display callback; the core hands over records, the collaborator renders.
pub trait Presenter {
    fn show_booking(&self, booking: &Booking);
    fn show_flight(&self, flight: &Flight);
}

/// One in-flight booking attempt. All mutation goes through the
/// orchestrator so stage preconditions cannot be bypassed.
#[derive(Debug)]
pub struct BookingAttempt {
    stage: Stage,
    route: RouteQuery,
    passenger_count: u32,
    matches: Vec<Flight>,
    flight_number: Option<String>,
    seat_number: Option<String>,
    cabin_class: String,
    details: Option<PassengerDetails>,
    quoted_price: f64,
}

impl BookingAttempt {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn matches(&self) -> &[Flight] {
        &self.matches
    }

    pub fn quoted_price(&self) -> f64 {
        self.quoted_price
    }
}

/// Outcome of a successful confirmation.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub booking_id: u32,
    pub confirmation_code: String,
    pub total_price: f64,
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, Copy)]
pub struct CancellationOutcome {
    pub booking_id: u32,
    pub fee: f64,
    pub refund: f64,
}

/// Occupancy of one rendered seat-map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Available,
    Occupied,
}

/// Seat occupancy grid for one flight, derived from active bookings.
#[derive(Debug)]
pub struct SeatMap {
    cells: [[SeatState; SEAT_MAP_COLUMNS]; SEAT_MAP_ROWS],
}

impl SeatMap {
    fn from_bookings(flight_number: &str, bookings: &[Booking]) -> Self {
        let mut cells = [[SeatState::Available; SEAT_MAP_COLUMNS]; SEAT_MAP_ROWS];
        for booking in bookings {
            if !booking.is_active() || booking.flight_number != flight_number {
                continue;
            }
            // Seats outside the rendered grid simply have no cell.
            if let Some((row, col)) = SeatRef::parse(&booking.seat_number)
                .ok()
                .and_then(|seat| seat.grid_index())
            {
                cells[row][col] = SeatState::Occupied;
            }
        }
        Self { cells }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<SeatState> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&s| s == SeatState::Occupied)
            .count()
    }
}

/// Sequences search → selection → confirmation against the shared files,
/// holding the global lock for every read-modify-write cycle.
pub struct BookingOrchestrator {
    config: Config,
    lock: FileLock,
}

impl BookingOrchestrator {
    pub fn new(config: Config) -> Self {
        if let Err(err) = std::fs::create_dir_all(&config.data.dir) {
            warn!(dir = %config.data.dir, %err, "could not create data directory");
        }
        let mut lock = FileLock::new(config.lock_path())
            .with_retry_interval(Duration::from_millis(config.lock.retry_ms));
        if let Some(ms) = config.lock.acquire_timeout_ms {
            lock = lock.with_acquire_timeout(Duration::from_millis(ms));
        }
        Self { config, lock }
    }

    pub fn start_attempt(&self, route: RouteQuery, passenger_count: u32) -> BookingAttempt {
        BookingAttempt {
            stage: Stage::SearchingRoute,
            route,
            passenger_count,
            matches: Vec::new(),
            flight_number: None,
            seat_number: None,
            cabin_class: "economy".to_string(),
            details: None,
            quoted_price: 0.0,
        }
    }

    /// Populate the attempt with flights matching its route. Stays in
    /// `SearchingRoute`; selecting a flight advances the stage.
    pub fn search(&self, attempt: &mut BookingAttempt) -> Result<usize, WorkflowError> {
        self.ensure_stage(attempt, Stage::SearchingRoute, Stage::SearchingRoute)?;
        let mut inventory = self.fresh_inventory();
        let count = inventory.search_by_route(
            &attempt.route.origin,
            &attempt.route.destination,
            &attempt.route.date,
            &self.config.flights_path(),
        );
        attempt.matches = inventory.flights().to_vec();
        info!(count, origin = %attempt.route.origin, destination = %attempt.route.destination, "route searched");
        Ok(count)
    }

    pub fn select_flight(
        &self,
        attempt: &mut BookingAttempt,
        flight_number: &str,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(attempt, Stage::SearchingRoute, Stage::FlightSelected)?;
        let flight = attempt
            .matches
            .iter()
            .find(|f| f.flight_number == flight_number)
            .ok_or_else(|| {
                WorkflowError::PreconditionFailed(format!(
                    "flight {flight_number} is not among the search results"
                ))
            })?;
        if !flight.is_available() {
            return Err(WorkflowError::PreconditionFailed(format!(
                "flight {flight_number} has no available seats"
            )));
        }
        attempt.flight_number = Some(flight_number.to_string());
        attempt.stage = Stage::FlightSelected;
        Ok(())
    }

    /// Record the lead seat. The occupancy check here reads without the
    /// lock and is advisory; `confirm` re-checks under the lock.
    pub fn select_seat(
        &self,
        attempt: &mut BookingAttempt,
        seat: &str,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(attempt, Stage::FlightSelected, Stage::SeatsSelected)?;
        let seat_ref = SeatRef::parse(seat)
            .map_err(|err| WorkflowError::PreconditionFailed(err.to_string()))?;
        let flight_number = attempt.flight_number.clone().unwrap_or_default();

        let store = self.fresh_store();
        if is_seat_occupied(store.bookings(), &flight_number, &seat_ref.to_string()) {
            return Err(WorkflowError::PreconditionFailed(format!(
                "seat {seat_ref} is already taken on flight {flight_number}"
            )));
        }
        attempt.seat_number = Some(seat_ref.to_string());
        attempt.stage = Stage::SeatsSelected;
        Ok(())
    }

    pub fn collect_details(
        &self,
        attempt: &mut BookingAttempt,
        details: PassengerDetails,
        cabin_class: &str,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(attempt, Stage::SeatsSelected, Stage::DetailsCollected)?;
        attempt.details = Some(details);
        attempt.cabin_class = cabin_class.to_string();
        attempt.stage = Stage::DetailsCollected;
        Ok(())
    }

    /// Recheck the flight against fresh inventory and quote the total price.
    pub fn validate(&self, attempt: &mut BookingAttempt) -> Result<(), WorkflowError> {
        self.ensure_stage(attempt, Stage::DetailsCollected, Stage::Validated)?;
        if attempt.passenger_count == 0 {
            return Err(WorkflowError::PreconditionFailed(
                "passenger count must be at least 1".to_string(),
            ));
        }
        let flight_number = attempt.flight_number.clone().unwrap_or_default();

        let inventory = self.fresh_inventory();
        let flight = inventory.find_by_number(&flight_number).ok_or_else(|| {
            WorkflowError::PreconditionFailed(format!(
                "flight {flight_number} is no longer available"
            ))
        })?;
        if flight.available_seats < attempt.passenger_count {
            return Err(WorkflowError::PreconditionFailed(format!(
                "flight {flight_number} has {} seats left, {} requested",
                flight.available_seats, attempt.passenger_count
            )));
        }

        let days = pricing::days_until_departure(&flight.departure_date, Utc::now().date_naive());
        let per_ticket = pricing::quote(flight, days, self.config.fees.taxes_and_fees).total();
        attempt.quoted_price = per_ticket * f64::from(attempt.passenger_count);
        attempt.stage = Stage::Validated;
        Ok(())
    }

    /// Payment itself is a collaborator concern; this transition only
    /// records that authorization happened for the quoted amount.
    pub fn authorize_payment(&self, attempt: &mut BookingAttempt) -> Result<(), WorkflowError> {
        self.ensure_stage(attempt, Stage::Validated, Stage::PaymentAuthorized)?;
        if attempt.quoted_price <= 0.0 {
            return Err(WorkflowError::PreconditionFailed(
                "no quoted price to authorize".to_string(),
            ));
        }
        attempt.stage = Stage::PaymentAuthorized;
        Ok(())
    }

    /// The critical section: under the global lock, reload both collections
    /// from disk, re-check the seat, then create the booking, decrement
    /// availability and persist both files. A concurrently-confirmed booking
    /// for the same seat fails this attempt without mutating anything.
    pub fn confirm(&self, attempt: &mut BookingAttempt) -> Result<Confirmation, WorkflowError> {
        self.ensure_stage(attempt, Stage::PaymentAuthorized, Stage::Confirmed)?;
        let flight_number = attempt.flight_number.clone().unwrap_or_default();
        let seat = attempt.seat_number.clone().unwrap_or_default();
        let details = attempt.details.clone().ok_or_else(|| {
            WorkflowError::PreconditionFailed("passenger details missing".to_string())
        })?;

        let _guard = self.lock.acquire()?;
        let mut store = self.fresh_store();
        let mut inventory = self.fresh_inventory();

        let flight = inventory
            .find_by_number(&flight_number)
            .ok_or_else(|| {
                WorkflowError::PreconditionFailed(format!(
                    "flight {flight_number} is no longer available"
                ))
            })?
            .clone();

        if is_seat_occupied(store.bookings(), &flight_number, &seat) {
            info!(%flight_number, %seat, "confirmation lost the seat to a concurrent booking");
            return Err(WorkflowError::PreconditionFailed(format!(
                "seat {seat} on flight {flight_number} was taken by another booking"
            )));
        }
        if flight.available_seats < attempt.passenger_count {
            return Err(WorkflowError::PreconditionFailed(format!(
                "flight {flight_number} has {} seats left, {} requested",
                flight.available_seats, attempt.passenger_count
            )));
        }

        let booking_id = store.create(BookingRequest {
            passenger_name: details.full_name,
            flight_number: flight_number.clone(),
            origin: attempt.route.origin.clone(),
            destination: attempt.route.destination.clone(),
            departure_date: attempt.route.date.clone(),
            departure_time: flight.departure_time.clone(),
            seat_number: seat,
            cabin_class: attempt.cabin_class.clone(),
            total_price: attempt.quoted_price,
        })?;
        inventory.decrement_availability(&flight_number, attempt.passenger_count)?;

        store.save_to(&self.config.bookings_path())?;
        inventory.save_to(&self.config.flights_path())?;

        attempt.stage = Stage::Confirmed;
        let confirmation_code = store
            .find_by_id(booking_id)
            .map(|b| b.confirmation_code.clone())
            .unwrap_or_default();
        info!(booking_id, %flight_number, "booking confirmed");
        Ok(Confirmation {
            booking_id,
            confirmation_code,
            total_price: attempt.quoted_price,
        })
    }

    /// Abandon the attempt; permitted from any stage before `Confirmed`.
    pub fn abort(&self, attempt: &mut BookingAttempt) {
        if attempt.stage != Stage::Confirmed {
            attempt.stage = Stage::Aborted;
        }
    }

    /// Cancel an active booking: retire the record and return its seat to
    /// the flight, all under the lock.
    pub fn cancel_by_id(&self, booking_id: u32) -> Result<CancellationOutcome, WorkflowError> {
        let _guard = self.lock.acquire()?;
        self.process_cancellation(booking_id)
    }

    pub fn cancel_by_code(&self, code: &str) -> Result<CancellationOutcome, WorkflowError> {
        let _guard = self.lock.acquire()?;
        let store = self.fresh_store();
        let booking_id = store
            .find_by_code(code)
            .ok_or_else(|| WorkflowError::NotFound(format!("confirmation code {code}")))?;
        self.process_cancellation(booking_id)
    }

    fn process_cancellation(&self, booking_id: u32) -> Result<CancellationOutcome, WorkflowError> {
        let mut store = self.fresh_store();
        let mut inventory = self.fresh_inventory();

        let booking = store
            .find_by_id(booking_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("booking id {booking_id}")))?;
        let flight_number = booking.flight_number.clone();
        let days = pricing::days_until_departure(&booking.departure_date, Utc::now().date_naive());

        let quote = store.cancellation_quote(booking_id, days).ok_or_else(|| {
            WorkflowError::PreconditionFailed(format!("booking {booking_id} cannot be cancelled"))
        })?;
        if !store.retire(booking_id) {
            return Err(WorkflowError::PreconditionFailed(format!(
                "booking {booking_id} cannot be cancelled"
            )));
        }

        // A missing flight is a consistency wrinkle, not a cancellation
        // failure: the record is retired either way.
        match inventory.increment_availability(&flight_number, 1) {
            Ok(()) => {}
            Err(InventoryError::NotFound(_)) => {
                warn!(%flight_number, "no matching flight to return the seat to");
            }
            Err(err) => return Err(err.into()),
        }

        store.save_to(&self.config.bookings_path())?;
        inventory.save_to(&self.config.flights_path())?;
        info!(booking_id, fee = quote.fee, refund = quote.refund, "booking cancelled");
        Ok(CancellationOutcome {
            booking_id,
            fee: quote.fee,
            refund: quote.refund,
        })
    }

    /// Move an active booking to another seat. Applies the seat-change fee
    /// and re-checks occupancy under the lock.
    pub fn change_seat(&self, booking_id: u32, new_seat: &str) -> Result<f64, WorkflowError> {
        let seat_ref = SeatRef::parse(new_seat)
            .map_err(|err| WorkflowError::PreconditionFailed(err.to_string()))?;
        let seat = seat_ref.to_string();

        let _guard = self.lock.acquire()?;
        let mut store = self.fresh_store();
        let booking = store
            .find_by_id(booking_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("booking id {booking_id}")))?;
        let flight_number = booking.flight_number.clone();

        let taken = store
            .bookings()
            .iter()
            .any(|b| b.id != booking_id && b.is_active()
                && b.flight_number == flight_number && b.seat_number == seat);
        if taken {
            return Err(WorkflowError::PreconditionFailed(format!(
                "seat {seat} is already taken on flight {flight_number}"
            )));
        }
        if !store.set_seat_number(booking_id, &seat) {
            return Err(WorkflowError::PreconditionFailed(format!(
                "booking {booking_id} cannot be modified"
            )));
        }

        store.save_to(&self.config.bookings_path())?;
        let new_price = store
            .find_by_id(booking_id)
            .map(|b| b.total_price)
            .unwrap_or_default();
        Ok(new_price)
    }

    /// Move an active booking to a new departure date for the flat
    /// date-change fee.
    pub fn change_departure_date(
        &self,
        booking_id: u32,
        new_date: &str,
    ) -> Result<f64, WorkflowError> {
        let _guard = self.lock.acquire()?;
        let mut store = self.fresh_store();
        if !store.set_departure_date(booking_id, new_date) {
            return Err(WorkflowError::PreconditionFailed(format!(
                "booking {booking_id} cannot be modified"
            )));
        }
        store.add_surcharge(booking_id, self.config.fees.date_change);
        store.save_to(&self.config.bookings_path())?;
        Ok(store
            .find_by_id(booking_id)
            .map(|b| b.total_price)
            .unwrap_or_default())
    }

    pub fn change_passenger_name(
        &self,
        booking_id: u32,
        new_name: &str,
    ) -> Result<(), WorkflowError> {
        self.locked_update(booking_id, |store| store.set_passenger_name(booking_id, new_name))
    }

    pub fn change_cabin_class(
        &self,
        booking_id: u32,
        new_cabin: &str,
    ) -> Result<(), WorkflowError> {
        self.locked_update(booking_id, |store| store.set_cabin_class(booking_id, new_cabin))
    }

    fn locked_update(
        &self,
        booking_id: u32,
        apply: impl FnOnce(&mut BookingStore) -> bool,
    ) -> Result<(), WorkflowError> {
        let _guard = self.lock.acquire()?;
        let mut store = self.fresh_store();
        if !apply(&mut store) {
            return Err(WorkflowError::PreconditionFailed(format!(
                "booking {booking_id} cannot be modified"
            )));
        }
        store.save_to(&self.config.bookings_path())?;
        Ok(())
    }

    // ---- read-only views; these load outside the lock and may be stale ----

    pub fn find_booking(&self, booking_id: u32) -> Option<Booking> {
        self.fresh_store().find_by_id(booking_id).cloned()
    }

    pub fn find_booking_by_code(&self, code: &str) -> Option<Booking> {
        let store = self.fresh_store();
        let id = store.find_by_code(code)?;
        store.find_by_id(id).cloned()
    }

    pub fn total_revenue(&self) -> f64 {
        self.fresh_store().total_revenue()
    }

    pub fn seat_map(&self, flight_number: &str) -> SeatMap {
        SeatMap::from_bookings(flight_number, self.fresh_store().bookings())
    }

    pub fn present_bookings_for_passenger(
        &self,
        fragment: &str,
        presenter: &dyn Presenter,
    ) -> usize {
        let store = self.fresh_store();
        let matches = store.list_by_passenger(fragment);
        for booking in &matches {
            presenter.show_booking(booking);
        }
        matches.len()
    }

    pub fn present_bookings_for_flight(
        &self,
        flight_number: &str,
        presenter: &dyn Presenter,
    ) -> usize {
        let store = self.fresh_store();
        let matches = store.list_by_flight(flight_number);
        for booking in &matches {
            presenter.show_booking(booking);
        }
        matches.len()
    }

    pub fn present_available_flights(&self, presenter: &dyn Presenter) -> usize {
        let inventory = self.fresh_inventory();
        let mut shown = 0;
        for flight in inventory.flights().iter().filter(|f| f.is_available()) {
            presenter.show_flight(flight);
            shown += 1;
        }
        shown
    }

    // ---- internals ----

    fn fresh_store(&self) -> BookingStore {
        let mut store = BookingStore::with_fees(self.config.limits.max_bookings, &self.config.fees);
        store.load_from(&self.config.bookings_path());
        store
    }

    fn fresh_inventory(&self) -> FlightInventory {
        let mut inventory = FlightInventory::new(self.config.limits.max_flights);
        inventory.load_from(&self.config.flights_path());
        inventory
    }

    fn ensure_stage(
        &self,
        attempt: &BookingAttempt,
        expected: Stage,
        to: Stage,
    ) -> Result<(), WorkflowError> {
        if attempt.stage != expected {
            return Err(WorkflowError::InvalidTransition {
                from: attempt.stage,
                to,
            });
        }
        Ok(())
    }
}

fn is_seat_occupied(bookings: &[Booking], flight_number: &str, seat: &str) -> bool {
    bookings
        .iter()
        .any(|b| b.is_active() && b.flight_number == flight_number && b.seat_number == seat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avia_domain::BookingStatus;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.data.dir = dir.display().to_string();
        config.lock.retry_ms = 5;
        config
    }

    fn seed_flight(config: &Config, number: &str, available: u32) {
        let mut inventory = FlightInventory::new(config.limits.max_flights);
        inventory.load_from(&config.flights_path());
        inventory
            .add(Flight {
                airline_name: "Air India".to_string(),
                flight_number: number.to_string(),
                origin: "DEL".to_string(),
                destination: "JFK".to_string(),
                departure_date: "2026-09-08".to_string(),
                arrival_date: "2026-09-08".to_string(),
                departure_time: "08:30".to_string(),
                arrival_time: "22:45".to_string(),
                aircraft_type: "Boeing 787-8".to_string(),
                total_seats: 180,
                available_seats: available,
                base_price: 299.99,
                duration: "14h 15m".to_string(),
            })
            .unwrap();
        inventory.save_to(&config.flights_path()).unwrap();
    }

    fn route() -> RouteQuery {
        RouteQuery {
            origin: "DEL".to_string(),
            destination: "JFK".to_string(),
            date: "2026-09-08".to_string(),
        }
    }

    fn details() -> PassengerDetails {
        PassengerDetails {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 555 0100".to_string(),
        }
    }

    fn run_to_authorized(desk: &BookingOrchestrator, seat: &str) -> BookingAttempt {
        let mut attempt = desk.start_attempt(route(), 1);
        assert_eq!(desk.search(&mut attempt).unwrap(), 1);
        desk.select_flight(&mut attempt, "AI101").unwrap();
        desk.select_seat(&mut attempt, seat).unwrap();
        desk.collect_details(&mut attempt, details(), "economy").unwrap();
        desk.validate(&mut attempt).unwrap();
        desk.authorize_payment(&mut attempt).unwrap();
        attempt
    }

    #[test]
    fn transitions_out_of_order_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = desk.start_attempt(route(), 1);
        // Cannot select a seat before selecting a flight.
        let err = desk.select_seat(&mut attempt, "5A").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_eq!(attempt.stage(), Stage::SearchingRoute);
    }

    #[test]
    fn selecting_a_flight_outside_the_results_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = desk.start_attempt(route(), 1);
        desk.search(&mut attempt).unwrap();
        let err = desk.select_flight(&mut attempt, "ZZ999").unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
        assert_eq!(attempt.stage(), Stage::SearchingRoute);
    }

    #[test]
    fn full_attempt_confirms_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config.clone());

        let mut attempt = run_to_authorized(&desk, "5A");
        assert!(attempt.quoted_price() > 0.0);
        let confirmation = desk.confirm(&mut attempt).unwrap();
        assert_eq!(attempt.stage(), Stage::Confirmed);

        let booking = desk.find_booking(confirmation.booking_id).unwrap();
        assert_eq!(booking.seat_number, "5A");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_price, confirmation.total_price);

        let mut inventory = FlightInventory::new(50);
        inventory.load_from(&config.flights_path());
        assert_eq!(inventory.find_by_number("AI101").unwrap().available_seats, 9);

        // Lock token was released.
        assert!(!config.lock_path().exists());
    }

    #[test]
    fn validate_fails_when_not_enough_seats() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 1);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = desk.start_attempt(route(), 3);
        desk.search(&mut attempt).unwrap();
        desk.select_flight(&mut attempt, "AI101").unwrap();
        desk.select_seat(&mut attempt, "5A").unwrap();
        desk.collect_details(&mut attempt, details(), "economy").unwrap();
        let err = desk.validate(&mut attempt).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
        assert_eq!(attempt.stage(), Stage::DetailsCollected);
    }

    #[test]
    fn confirm_fails_when_the_seat_was_taken_meanwhile() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut first = run_to_authorized(&desk, "5A");
        let mut second = run_to_authorized(&desk, "5A");

        desk.confirm(&mut first).unwrap();
        let err = desk.confirm(&mut second).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
        assert_eq!(second.stage(), Stage::PaymentAuthorized);
    }

    #[test]
    fn abort_is_reachable_from_any_stage_before_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = run_to_authorized(&desk, "5A");
        desk.abort(&mut attempt);
        assert_eq!(attempt.stage(), Stage::Aborted);
        let err = desk.confirm(&mut attempt).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn configured_fees_reach_the_charged_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.fees.seat_change = 40.0;
        config.fees.date_change = 90.0;
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = run_to_authorized(&desk, "5A");
        let confirmation = desk.confirm(&mut attempt).unwrap();

        let repriced = desk.change_seat(confirmation.booking_id, "6B").unwrap();
        assert_eq!(repriced, confirmation.total_price + 40.0);

        let repriced = desk
            .change_departure_date(confirmation.booking_id, "2026-09-09")
            .unwrap();
        assert_eq!(repriced, confirmation.total_price + 40.0 + 90.0);
    }

    #[test]
    fn seat_map_reflects_active_bookings() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_flight(&config, "AI101", 10);
        let desk = BookingOrchestrator::new(config);

        let mut attempt = run_to_authorized(&desk, "5A");
        desk.confirm(&mut attempt).unwrap();

        let map = desk.seat_map("AI101");
        assert_eq!(map.occupied_count(), 1);
        assert_eq!(map.cell(4, 0), Some(SeatState::Occupied));
        assert_eq!(map.cell(4, 1), Some(SeatState::Available));
    }
}
