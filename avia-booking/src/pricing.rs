//! Demand- and time-based fare calculation.
//!
//! The quoted fare is the flight's base price plus an occupancy surge and a
//! departure-proximity surge, with flat taxes and fees added per ticket.

use avia_domain::Flight;
use chrono::NaiveDate;

/// Default flat taxes and fees added to every ticket.
pub const TAXES_AND_FEES: f64 = 45.50;

/// Fallback horizon when a departure date cannot be parsed.
pub const DEFAULT_DAYS_UNTIL_DEPARTURE: i64 = 15;

/// Per-ticket price components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub base_fare: f64,
    pub demand_surge: f64,
    pub time_surge: f64,
    pub taxes: f64,
}

impl PriceBreakdown {
    pub fn total(&self) -> f64 {
        self.base_fare + self.demand_surge + self.time_surge + self.taxes
    }
}

/// Quote one ticket on `flight` departing in `days_until_departure` days,
/// with `taxes` added flat per ticket.
pub fn quote(flight: &Flight, days_until_departure: i64, taxes: f64) -> PriceBreakdown {
    let base = flight.base_price;
    PriceBreakdown {
        base_fare: base,
        demand_surge: demand_surge(base, flight.occupancy_rate()),
        time_surge: time_surge(base, days_until_departure),
        taxes,
    }
}

/// Surge tier keyed on the fraction of seats already sold.
pub fn demand_surge(base_price: f64, occupancy_rate: f64) -> f64 {
    let factor = if occupancy_rate >= 0.9 {
        0.50
    } else if occupancy_rate >= 0.8 {
        0.35
    } else if occupancy_rate >= 0.7 {
        0.25
    } else if occupancy_rate >= 0.6 {
        0.15
    } else if occupancy_rate >= 0.5 {
        0.10
    } else {
        0.0
    };
    base_price * factor
}

/// Surge tier keyed on days until departure; no surge past 30 days out.
pub fn time_surge(base_price: f64, days_until_departure: i64) -> f64 {
    let factor = if days_until_departure <= 1 {
        0.75
    } else if days_until_departure <= 3 {
        0.50
    } else if days_until_departure <= 7 {
        0.30
    } else if days_until_departure <= 14 {
        0.20
    } else if days_until_departure <= 21 {
        0.10
    } else if days_until_departure <= 30 {
        0.05
    } else {
        0.0
    };
    base_price * factor
}

/// Whole days from `today` to a `YYYY-MM-DD` departure date, falling back to
/// the default horizon when the date does not parse.
pub fn days_until_departure(departure_date: &str, today: NaiveDate) -> i64 {
    match NaiveDate::parse_from_str(departure_date, "%Y-%m-%d") {
        Ok(date) => (date - today).num_days(),
        Err(_) => DEFAULT_DAYS_UNTIL_DEPARTURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(total: u32, available: u32, base: f64) -> Flight {
        Flight {
            flight_number: "AI101".to_string(),
            total_seats: total,
            available_seats: available,
            base_price: base,
            ..Flight::default()
        }
    }

    #[test]
    fn quiet_flight_far_out_carries_only_taxes() {
        let quote = quote(&flight(100, 100, 200.0), 45, TAXES_AND_FEES);
        assert_eq!(quote.demand_surge, 0.0);
        assert_eq!(quote.time_surge, 0.0);
        assert_eq!(quote.total(), 200.0 + TAXES_AND_FEES);
    }

    #[test]
    fn configured_taxes_flow_into_the_quote() {
        let quote = quote(&flight(100, 100, 200.0), 45, 10.0);
        assert_eq!(quote.taxes, 10.0);
        assert_eq!(quote.total(), 210.0);
    }

    #[test]
    fn demand_surge_tiers() {
        assert_eq!(demand_surge(100.0, 0.95), 50.0);
        assert_eq!(demand_surge(100.0, 0.85), 35.0);
        assert_eq!(demand_surge(100.0, 0.75), 25.0);
        assert_eq!(demand_surge(100.0, 0.65), 15.0);
        assert_eq!(demand_surge(100.0, 0.55), 10.0);
        assert_eq!(demand_surge(100.0, 0.45), 0.0);
    }

    #[test]
    fn time_surge_tiers() {
        assert_eq!(time_surge(100.0, 1), 75.0);
        assert_eq!(time_surge(100.0, 3), 50.0);
        assert_eq!(time_surge(100.0, 7), 30.0);
        assert_eq!(time_surge(100.0, 14), 20.0);
        assert_eq!(time_surge(100.0, 21), 10.0);
        assert_eq!(time_surge(100.0, 30), 5.0);
        assert_eq!(time_surge(100.0, 31), 0.0);
    }

    #[test]
    fn nearly_full_last_minute_flight_combines_both_surges() {
        // 95% sold, departing tomorrow: +50% demand, +75% time.
        let quote = quote(&flight(100, 5, 200.0), 1, TAXES_AND_FEES);
        assert_eq!(quote.demand_surge, 100.0);
        assert_eq!(quote.time_surge, 150.0);
        assert_eq!(quote.total(), 450.0 + TAXES_AND_FEES);
    }

    #[test]
    fn days_until_departure_parses_or_falls_back() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(days_until_departure("2026-09-08", today), 16);
        assert_eq!(days_until_departure("2026-08-22", today), -1);
        assert_eq!(days_until_departure("not-a-date", today), DEFAULT_DAYS_UNTIL_DEPARTURE);
    }
}
