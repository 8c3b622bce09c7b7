//! Hand-rolled codec for the bookings persistence file.
//!
//! The format is a JSON-shaped document with a `bookings` array and a
//! `nextId` counter. Fields are located by name, so their order inside an
//! object is irrelevant. Decoding is deliberately forgiving: a truncated or
//! empty document yields an empty collection, a missing numeric field reads
//! as zero and a missing string field as empty. String values are written
//! verbatim between quotes; embedded quotes are not escaped, a known
//! limitation of the format.

use avia_domain::{Booking, BookingStatus};
use tracing::warn;

use crate::booking_store::FIRST_BOOKING_ID;

/// Decoded contents of a bookings file.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingsDocument {
    pub bookings: Vec<Booking>,
    pub next_id: u32,
}

impl Default for BookingsDocument {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            next_id: FIRST_BOOKING_ID,
        }
    }
}

/// Render every booking plus the id counter as a full-file document.
pub fn encode_bookings(bookings: &[Booking], next_id: u32) -> String {
    let mut out = String::new();
    out.push_str("{\n");
    out.push_str("  \"bookings\": [\n");
    for (i, b) in bookings.iter().enumerate() {
        out.push_str("    {\n");
        out.push_str(&format!("      \"id\": {},\n", b.id));
        out.push_str(&format!("      \"confirmationCode\": \"{}\",\n", b.confirmation_code));
        out.push_str(&format!("      \"passengerName\": \"{}\",\n", b.passenger_name));
        out.push_str(&format!("      \"flightNumber\": \"{}\",\n", b.flight_number));
        out.push_str(&format!("      \"origin\": \"{}\",\n", b.origin));
        out.push_str(&format!("      \"destination\": \"{}\",\n", b.destination));
        out.push_str(&format!("      \"departureDate\": \"{}\",\n", b.departure_date));
        out.push_str(&format!("      \"departureTime\": \"{}\",\n", b.departure_time));
        out.push_str(&format!("      \"seatNumber\": \"{}\",\n", b.seat_number));
        out.push_str(&format!("      \"cabinClass\": \"{}\",\n", b.cabin_class));
        out.push_str(&format!("      \"totalPrice\": {},\n", b.total_price));
        out.push_str(&format!("      \"status\": \"{}\",\n", b.status));
        out.push_str(&format!("      \"bookedDate\": \"{}\",\n", b.booked_date));
        out.push_str(&format!("      \"bookedTime\": \"{}\"\n", b.booked_time));
        out.push_str("    }");
        if i + 1 < bookings.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("  ],\n");
    out.push_str(&format!("  \"nextId\": {}\n", next_id));
    out.push_str("}\n");
    out
}

/// Parse a bookings document. At most `max_records` entries are read;
/// anything beyond the cap is dropped with a warning.
pub fn decode_bookings(text: &str, max_records: usize) -> BookingsDocument {
    let text = text.trim();
    if text.is_empty() {
        return BookingsDocument::default();
    }

    let next_id = match int_field(text, "nextId") {
        0 => FIRST_BOOKING_ID,
        n => n,
    };

    let mut bookings = Vec::new();
    if let Some(array_start) = key_position(text, "bookings").and_then(|p| find_from(text, p, b'['))
    {
        let mut cursor = array_start + 1;
        while let Some(open) = find_from(text, cursor, b'{') {
            let Some(close) = matching_brace(text, open) else {
                // Truncated mid-object; keep what was parsed so far.
                break;
            };
            if bookings.len() == max_records {
                warn!(
                    max_records,
                    "bookings document holds more than the configured maximum; excess entries ignored"
                );
                break;
            }
            bookings.push(decode_booking_object(&text[open..=close]));
            cursor = close + 1;
        }
    }

    BookingsDocument { bookings, next_id }
}

fn decode_booking_object(obj: &str) -> Booking {
    Booking {
        id: int_field(obj, "id"),
        confirmation_code: string_field(obj, "confirmationCode"),
        passenger_name: string_field(obj, "passengerName"),
        flight_number: string_field(obj, "flightNumber"),
        origin: string_field(obj, "origin"),
        destination: string_field(obj, "destination"),
        departure_date: string_field(obj, "departureDate"),
        departure_time: string_field(obj, "departureTime"),
        seat_number: string_field(obj, "seatNumber"),
        cabin_class: string_field(obj, "cabinClass"),
        total_price: number_field(obj, "totalPrice"),
        status: BookingStatus::from_label(&string_field(obj, "status")),
        booked_date: string_field(obj, "bookedDate"),
        booked_time: string_field(obj, "bookedTime"),
    }
}

/// Byte offset just past the colon of `"key":`, or `None` when the key does
/// not occur.
fn key_position(text: &str, key: &str) -> Option<usize> {
    let pattern = format!("\"{key}\"");
    let at = text.find(&pattern)?;
    let after = at + pattern.len();
    let colon = find_from(text, after, b':')?;
    Some(colon + 1)
}

fn find_from(text: &str, from: usize, byte: u8) -> Option<usize> {
    text.as_bytes()
        .get(from..)?
        .iter()
        .position(|&b| b == byte)
        .map(|p| from + p)
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Value of a string field, empty when the field is absent or truncated.
fn string_field(obj: &str, key: &str) -> String {
    let Some(after_colon) = key_position(obj, key) else {
        return String::new();
    };
    let Some(open_quote) = find_from(obj, after_colon, b'"') else {
        return String::new();
    };
    match find_from(obj, open_quote + 1, b'"') {
        Some(close_quote) => obj[open_quote + 1..close_quote].to_string(),
        None => String::new(),
    }
}

/// Value of a numeric field, 0.0 when absent or unparseable.
fn number_field(obj: &str, key: &str) -> f64 {
    numeric_token(obj, key)
        .and_then(|t| t.parse().ok())
        .unwrap_or(0.0)
}

fn int_field(obj: &str, key: &str) -> u32 {
    numeric_token(obj, key)
        .and_then(|t| t.parse().ok())
        .unwrap_or(0)
}

fn numeric_token<'a>(obj: &'a str, key: &str) -> Option<&'a str> {
    let after_colon = key_position(obj, key)?;
    let rest = obj[after_colon..].trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}
