/// Cabin grid rendered by the seat map: rows 1..=10, columns A..=F. Seats
/// outside the grid can still be booked; they just have no map cell.
pub const SEAT_MAP_ROWS: usize = 10;
pub const SEAT_MAP_COLUMNS: usize = 6;

/// A parsed seat designator such as `12A`: one or two digits followed by a
/// column letter A..=F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRef {
    pub row: u8,
    pub column: char,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeatError {
    #[error("seat designator is malformed: {0:?}")]
    Malformed(String),
}

impl SeatRef {
    /// Parse a designator like `"3C"` or `"12A"`. Row zero is rejected;
    /// the column must be A..=F.
    pub fn parse(designator: &str) -> Result<Self, SeatError> {
        let designator = designator.trim();
        // ASCII-only keeps the byte split below on a char boundary.
        if !designator.is_ascii() || designator.len() < 2 || designator.len() > 3 {
            return Err(SeatError::Malformed(designator.to_string()));
        }

        let (digits, letter) = designator.split_at(designator.len() - 1);
        let column = letter.chars().next().unwrap_or(' ');
        if !digits.bytes().all(|b| b.is_ascii_digit()) || !('A'..='F').contains(&column) {
            return Err(SeatError::Malformed(designator.to_string()));
        }
        let row: u8 = digits
            .parse()
            .map_err(|_| SeatError::Malformed(designator.to_string()))?;
        if row == 0 {
            return Err(SeatError::Malformed(designator.to_string()));
        }
        Ok(SeatRef { row, column })
    }

    /// Zero-based (row, column) indices into the rendered seat map, or
    /// `None` when the seat falls outside the 10x6 grid.
    pub fn grid_index(&self) -> Option<(usize, usize)> {
        let row = usize::from(self.row);
        if row > SEAT_MAP_ROWS {
            return None;
        }
        Some((row - 1, (self.column as usize) - ('A' as usize)))
    }
}

impl std::fmt::Display for SeatRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_and_two_digit_rows() {
        assert_eq!(SeatRef::parse("5B"), Ok(SeatRef { row: 5, column: 'B' }));
        assert_eq!(SeatRef::parse("12A"), Ok(SeatRef { row: 12, column: 'A' }));
        assert_eq!(SeatRef::parse(" 10F "), Ok(SeatRef { row: 10, column: 'F' }));
    }

    #[test]
    fn rejects_malformed_designators() {
        for bad in ["", "A", "1234", "AA", "5G", "0A", "1a", "1é", "éA", "５A"] {
            assert!(SeatRef::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn grid_index_covers_only_the_rendered_rows() {
        assert_eq!(SeatRef::parse("1A").unwrap().grid_index(), Some((0, 0)));
        assert_eq!(SeatRef::parse("10F").unwrap().grid_index(), Some((9, 5)));
        assert_eq!(SeatRef::parse("12A").unwrap().grid_index(), None);
    }
}
