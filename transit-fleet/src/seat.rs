use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seats are laid out 4-across: A1..A4, B1..B4, and so on.
pub const SEATS_PER_ROW: i32 = 4;

const ROWS: i32 = 26;

/// Largest seat count the row-letter label scheme can express.
pub fn max_seat_count() -> i32 {
    ROWS * SEATS_PER_ROW
}

/// A single seat on a bus. Unique by `(bus_id, seat_number)`; the booked
/// flag is the reservation gate and only flips through the reservation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub seat_number: String,
    pub is_booked: bool,
}

/// Generate the seat labels for a bus of the given capacity, in cabin order.
pub fn seat_labels(count: i32) -> Vec<String> {
    (0..count)
        .map(|i| {
            let row = (b'A' + (i / SEATS_PER_ROW) as u8) as char;
            format!("{}{}", row, i % SEATS_PER_ROW + 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_start_at_a1() {
        assert_eq!(seat_labels(2), vec!["A1", "A2"]);
    }

    #[test]
    fn labels_roll_over_to_next_row() {
        assert_eq!(seat_labels(5), vec!["A1", "A2", "A3", "A4", "B1"]);
    }

    #[test]
    fn labels_are_unique_at_max_capacity() {
        let labels = seat_labels(max_seat_count());
        let unique: HashSet<_> = labels.iter().collect();
        assert_eq!(labels.len(), max_seat_count() as usize);
        assert_eq!(unique.len(), labels.len());
        assert_eq!(labels.last().map(String::as_str), Some("Z4"));
    }
}
