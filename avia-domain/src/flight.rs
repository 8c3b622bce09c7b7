use serde::{Deserialize, Serialize};

/// A flight with a mutable available-seat counter. Persisted as a JSON
/// array; every field defaults so a partial object still decodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flight {
    pub airline_name: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub arrival_date: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub aircraft_type: String,
    pub total_seats: u32,
    pub available_seats: u32,
    pub base_price: f64,
    pub duration: String,
}

impl Flight {
    pub fn has_available_seats(&self) -> bool {
        self.available_seats > 0
    }

    pub fn is_available(&self) -> bool {
        self.has_available_seats()
    }

    /// Fraction of seats sold, 0.0 for an empty aircraft definition.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_seats == 0 {
            return 0.0;
        }
        f64::from(self.total_seats - self.available_seats) / f64::from(self.total_seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_rate_handles_zero_capacity() {
        let flight = Flight::default();
        assert_eq!(flight.occupancy_rate(), 0.0);
        assert!(!flight.is_available());
    }

    #[test]
    fn occupancy_rate_counts_sold_seats() {
        let flight = Flight {
            total_seats: 200,
            available_seats: 50,
            ..Flight::default()
        };
        assert!((flight.occupancy_rate() - 0.75).abs() < 1e-9);
        assert!(flight.is_available());
    }

    #[test]
    fn partial_json_decodes_with_defaults() {
        let flight: Flight =
            serde_json::from_str(r#"{"flightNumber":"AI101","totalSeats":248}"#).unwrap();
        assert_eq!(flight.flight_number, "AI101");
        assert_eq!(flight.total_seats, 248);
        assert_eq!(flight.available_seats, 0);
        assert_eq!(flight.base_price, 0.0);
        assert_eq!(flight.origin, "");
    }
}
