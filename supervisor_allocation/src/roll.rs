use std::cmp::Ordering;

/// The sort key of a roll number.
///
/// The letters of the roll (upper-cased) are compared first, then the number formed
/// by all its digits. A roll without digits has the number 0.
///
/// ```
/// use supervisor_allocation::roll_sort_key;
///
/// assert!(roll_sort_key("B12") < roll_sort_key("B100"));
/// assert!(roll_sort_key("B100") < roll_sort_key("C1"));
/// assert_eq!(roll_sort_key("2301cs01"), roll_sort_key("2301CS01"));
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RollKey {
    prefix: String,
    // Digits without the leading zeros. Kept as text so that rolls of any length compare exactly.
    number: String,
}

impl RollKey {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The numeric part, or None if it does not fit in a u128.
    pub fn number(&self) -> Option<u128> {
        if self.number.is_empty() {
            Some(0)
        } else {
            self.number.parse::<u128>().ok()
        }
    }
}

impl Ord for RollKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix
            .cmp(&other.prefix)
            .then_with(|| self.number.len().cmp(&other.number.len()))
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl PartialOrd for RollKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn roll_sort_key(roll: &str) -> RollKey {
    let prefix: String = roll
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_uppercase())
        .collect();
    let digits: String = roll.chars().filter(|c| c.is_ascii_digit()).collect();
    RollKey {
        prefix,
        number: digits.trim_start_matches('0').to_string(),
    }
}
