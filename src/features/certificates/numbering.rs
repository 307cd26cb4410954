//! Certificate numbers in the `SSNNNYY` format.
//!
//! `SS` is the semester (`01` for January to June, `02` for July to
//! December), `NNN` a sequence restarting at `001` every semester and `YY`
//! the last two digits of the year. Sequences past 999 keep growing in width.

use chrono::{Datelike, NaiveDate};

/// Half-year a certificate number sequence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingPeriod {
    pub year: i32,
    pub semester: i16,
}

impl NumberingPeriod {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            semester: if date.month() <= 6 { 1 } else { 2 },
        }
    }

    pub fn format(&self, sequence: i32) -> String {
        format!(
            "{:02}{:03}{:02}",
            self.semester,
            sequence,
            self.year.rem_euclid(100)
        )
    }
}
