use avia_domain::Flight;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("maximum flights limit reached ({0})")]
    CapacityExceeded(usize),

    #[error("flight not found: {0}")]
    NotFound(String),

    #[error("insufficient seats on {flight}: requested {requested}, available {available}")]
    InsufficientSeats {
        flight: String,
        requested: u32,
        available: u32,
    },

    #[error("releasing {requested} seats on {flight} would exceed its {total} total seats")]
    ExceedsTotalSeats {
        flight: String,
        requested: u32,
        total: u32,
    },

    #[error("could not persist flights to {path}: {source}")]
    Persistence {
        path: String,
        source: std::io::Error,
    },
}

/// Bounded collection of flights with their mutable seat counters. The
/// ledger exclusively owns every `Flight`; bookings refer to flights only by
/// number, so the workflow re-validates that link on every load.
pub struct FlightInventory {
    flights: Vec<Flight>,
    capacity: usize,
}

impl FlightInventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            flights: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn add(&mut self, flight: Flight) -> Result<(), InventoryError> {
        if self.flights.len() >= self.capacity {
            return Err(InventoryError::CapacityExceeded(self.capacity));
        }
        self.flights.push(flight);
        Ok(())
    }

    pub fn find_by_number(&self, flight_number: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.flight_number == flight_number)
    }

    pub fn find_by_index(&self, index: usize) -> Option<&Flight> {
        self.flights.get(index)
    }

    /// Reload from the persisted file and keep only exact, case-sensitive
    /// matches on origin, destination and departure date as the current
    /// contents. Returns the number of matches. Origin/destination are
    /// expected pre-normalized to uppercase by the caller.
    pub fn search_by_route(
        &mut self,
        origin: &str,
        destination: &str,
        date: &str,
        path: &Path,
    ) -> usize {
        self.load_from(path);
        self.flights.retain(|f| {
            f.origin == origin && f.destination == destination && f.departure_date == date
        });
        self.flights.len()
    }

    /// Take `count` seats off a flight. The availability floor is enforced
    /// here; callers no longer carry it as an unchecked precondition.
    pub fn decrement_availability(
        &mut self,
        flight_number: &str,
        count: u32,
    ) -> Result<(), InventoryError> {
        let flight = self.find_mut(flight_number)?;
        if flight.available_seats < count {
            return Err(InventoryError::InsufficientSeats {
                flight: flight_number.to_string(),
                requested: count,
                available: flight.available_seats,
            });
        }
        flight.available_seats -= count;
        Ok(())
    }

    /// Return `count` seats to a flight, never past its total.
    pub fn increment_availability(
        &mut self,
        flight_number: &str,
        count: u32,
    ) -> Result<(), InventoryError> {
        let flight = self.find_mut(flight_number)?;
        if flight.available_seats + count > flight.total_seats {
            return Err(InventoryError::ExceedsTotalSeats {
                flight: flight_number.to_string(),
                requested: count,
                total: flight.total_seats,
            });
        }
        flight.available_seats += count;
        Ok(())
    }

    fn find_mut(&mut self, flight_number: &str) -> Result<&mut Flight, InventoryError> {
        self.flights
            .iter_mut()
            .find(|f| f.flight_number == flight_number)
            .ok_or_else(|| InventoryError::NotFound(flight_number.to_string()))
    }

    /// Full-file rewrite of the flight list.
    pub fn save_to(&self, path: &Path) -> Result<(), InventoryError> {
        let text = serde_json::to_string_pretty(&self.flights)
            .unwrap_or_else(|_| "[]".to_string());
        fs::write(path, text).map_err(|source| InventoryError::Persistence {
            path: path.display().to_string(),
            source,
        })?;
        info!(count = self.flights.len(), path = %path.display(), "flights saved");
        Ok(())
    }

    /// Replace the contents with the persisted file. Missing, empty or
    /// garbled files leave the ledger empty; entries past the capacity are
    /// dropped with a warning. Returns whether the file could be read.
    pub fn load_from(&mut self, path: &Path) -> bool {
        self.flights.clear();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read flights file; starting empty");
                return false;
            }
        };
        if text.trim().is_empty() {
            return true;
        }

        let mut parsed: Vec<Flight> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(path = %path.display(), %err, "flights file did not parse; starting empty");
                return true;
            }
        };
        if parsed.len() > self.capacity {
            warn!(
                count = parsed.len(),
                capacity = self.capacity,
                "flights file holds more than the configured maximum; excess entries ignored"
            );
            parsed.truncate(self.capacity);
        }
        self.flights = parsed;
        info!(count = self.flights.len(), path = %path.display(), "flights loaded");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(number: &str, origin: &str, destination: &str, date: &str, seats: u32) -> Flight {
        Flight {
            airline_name: "Air India".to_string(),
            flight_number: number.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: date.to_string(),
            arrival_date: date.to_string(),
            departure_time: "08:30".to_string(),
            arrival_time: "22:45".to_string(),
            aircraft_type: "Boeing 787-8".to_string(),
            total_seats: seats,
            available_seats: seats,
            base_price: 299.99,
            duration: "14h 15m".to_string(),
        }
    }

    #[test]
    fn add_respects_capacity() {
        let mut ledger = FlightInventory::new(2);
        ledger.add(flight("AI101", "DEL", "JFK", "2026-09-08", 10)).unwrap();
        ledger.add(flight("AI103", "DEL", "JFK", "2026-09-08", 10)).unwrap();
        let err = ledger.add(flight("AI105", "DEL", "JFK", "2026-09-08", 10)).unwrap_err();
        assert!(matches!(err, InventoryError::CapacityExceeded(2)));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn lookups_are_bounds_checked() {
        let mut ledger = FlightInventory::new(10);
        ledger.add(flight("AI101", "DEL", "JFK", "2026-09-08", 10)).unwrap();
        assert!(ledger.find_by_number("AI101").is_some());
        assert!(ledger.find_by_number("ZZ999").is_none());
        assert!(ledger.find_by_index(0).is_some());
        assert!(ledger.find_by_index(1).is_none());
    }

    #[test]
    fn decrement_enforces_the_availability_floor() {
        let mut ledger = FlightInventory::new(10);
        ledger.add(flight("AI101", "DEL", "JFK", "2026-09-08", 2)).unwrap();

        ledger.decrement_availability("AI101", 2).unwrap();
        assert_eq!(ledger.find_by_number("AI101").unwrap().available_seats, 0);

        let err = ledger.decrement_availability("AI101", 1).unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientSeats { available: 0, .. }));
    }

    #[test]
    fn increment_never_exceeds_total_seats() {
        let mut ledger = FlightInventory::new(10);
        ledger.add(flight("AI101", "DEL", "JFK", "2026-09-08", 2)).unwrap();
        ledger.decrement_availability("AI101", 1).unwrap();
        ledger.increment_availability("AI101", 1).unwrap();

        let err = ledger.increment_availability("AI101", 1).unwrap_err();
        assert!(matches!(err, InventoryError::ExceedsTotalSeats { total: 2, .. }));
        assert_eq!(ledger.find_by_number("AI101").unwrap().available_seats, 2);
    }

    #[test]
    fn unknown_flight_reports_not_found() {
        let mut ledger = FlightInventory::new(10);
        let err = ledger.decrement_availability("ZZ999", 1).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn search_reloads_and_filters_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");

        let mut ledger = FlightInventory::new(10);
        ledger.add(flight("AI101", "DEL", "JFK", "2026-09-08", 10)).unwrap();
        ledger.add(flight("AI201", "JFK", "DEL", "2026-09-08", 10)).unwrap();
        ledger.add(flight("AI103", "DEL", "JFK", "2026-09-09", 10)).unwrap();
        ledger.save_to(&path).unwrap();

        let mut search = FlightInventory::new(10);
        let count = search.search_by_route("DEL", "JFK", "2026-09-08", &path);
        assert_eq!(count, 1);
        assert_eq!(search.flights()[0].flight_number, "AI101");

        // Case-sensitive: lowercase origin matches nothing.
        assert_eq!(search.search_by_route("del", "JFK", "2026-09-08", &path), 0);
    }

    #[test]
    fn missing_or_garbled_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = FlightInventory::new(10);

        assert!(!ledger.load_from(&dir.path().join("absent.json")));
        assert!(ledger.is_empty());

        let garbled = dir.path().join("garbled.json");
        fs::write(&garbled, "{ not json").unwrap();
        assert!(ledger.load_from(&garbled));
        assert!(ledger.is_empty());
    }

    #[test]
    fn load_caps_at_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");

        let mut big = FlightInventory::new(10);
        for i in 0..5 {
            big.add(flight(&format!("AI10{i}"), "DEL", "JFK", "2026-09-08", 10)).unwrap();
        }
        big.save_to(&path).unwrap();

        let mut small = FlightInventory::new(3);
        small.load_from(&path);
        assert_eq!(small.len(), 3);
    }
}
