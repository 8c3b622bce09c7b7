use serde::{Deserialize, Serialize};

/// A single reservation record. The `flight_number` is a denormalized
/// reference into the flight inventory; keeping the two collections
/// consistent is the workflow layer's job, not a structural guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u32,
    pub confirmation_code: String,
    pub passenger_name: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub departure_time: String,
    pub seat_number: String,
    pub cabin_class: String,
    pub total_price: f64,
    pub status: BookingStatus,
    pub booked_date: String,
    pub booked_time: String,
}

impl Booking {
    /// Confirmed and modified bookings count toward revenue and occupy seats.
    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Confirmed | BookingStatus::Modified)
    }

    pub fn can_be_modified(&self) -> bool {
        self.is_active()
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.is_active()
    }
}

/// Lifecycle: `Confirmed → Modified → {Modified, Cancelled}` or
/// `Confirmed → Cancelled`. Cancelled records are removed from the active
/// collection rather than kept as tombstones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Modified,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Modified => "modified",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Unknown labels fall back to `Confirmed` so a garbled status field in
    /// the persisted file never aborts a load.
    pub fn from_label(label: &str) -> Self {
        match label {
            "modified" => BookingStatus::Modified,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: BookingStatus) -> Booking {
        Booking {
            id: 1000,
            confirmation_code: "AB1000".to_string(),
            passenger_name: "Jane Doe".to_string(),
            flight_number: "AI101".to_string(),
            origin: "DEL".to_string(),
            destination: "JFK".to_string(),
            departure_date: "2026-09-08".to_string(),
            departure_time: "08:30".to_string(),
            seat_number: "12A".to_string(),
            cabin_class: "economy".to_string(),
            total_price: 345.49,
            status,
            booked_date: "2026-08-20".to_string(),
            booked_time: "14:05".to_string(),
        }
    }

    #[test]
    fn active_states() {
        assert!(sample(BookingStatus::Confirmed).is_active());
        assert!(sample(BookingStatus::Modified).is_active());
        assert!(!sample(BookingStatus::Cancelled).is_active());
    }

    #[test]
    fn cancelled_cannot_be_modified_or_cancelled_again() {
        let b = sample(BookingStatus::Cancelled);
        assert!(!b.can_be_modified());
        assert!(!b.can_be_cancelled());
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Modified,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_label(status.as_str()), status);
        }
        // Garbage degrades to confirmed instead of failing the decode.
        assert_eq!(BookingStatus::from_label("???"), BookingStatus::Confirmed);
    }
}
