//! Expiration status classification shared by every document type.
//!
//! A document is `expired` when its expiration date is strictly before the
//! reference date, `expiring` when it falls within the lookahead window
//! (reference date included), and `valid` otherwise. The status is always
//! derived on read and never stored.
//!
//! Note: a document expiring on the reference date itself is `expiring`, not
//! `expired`.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Days before expiration during which a document is flagged for renewal
pub const EXPIRING_WINDOW_DAYS: u32 = 30;

/// Derived status of an expiration-bearing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationStatus {
    Expired,
    Expiring,
    Valid,
}

impl ExpirationStatus {
    #[cfg(test)]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationStatus::Expired => "expired",
            ExpirationStatus::Expiring => "expiring",
            ExpirationStatus::Valid => "valid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpirationError {
    #[error("Expiration date is required")]
    Missing,

    #[error("Invalid expiration date '{0}'")]
    Invalid(String),
}

/// Any record that carries an expiration date
pub trait Expirable {
    fn expiration_date(&self) -> NaiveDate;
}

impl Expirable for NaiveDate {
    fn expiration_date(&self) -> NaiveDate {
        *self
    }
}

/// Classify an expiration date against a reference date.
pub fn classify(
    expiration: NaiveDate,
    reference: NaiveDate,
    lookahead_days: u32,
) -> ExpirationStatus {
    if expiration < reference {
        return ExpirationStatus::Expired;
    }

    match reference.checked_add_days(Days::new(lookahead_days as u64)) {
        Some(limit) if expiration > limit => ExpirationStatus::Valid,
        _ => ExpirationStatus::Expiring,
    }
}

/// Parse a raw expiration value.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the UTC date is used) and
/// `DD/MM/YYYY`. Blank input is `Missing`, anything else unparseable is
/// `Invalid`.
pub fn parse_expiration_date(raw: &str) -> Result<NaiveDate, ExpirationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ExpirationError::Missing);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc).date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return Ok(date);
    }

    Err(ExpirationError::Invalid(value.to_string()))
}

/// Classifier bound to a reference date and lookahead window
#[derive(Debug, Clone, Copy)]
pub struct ExpirationClassifier {
    reference_date: NaiveDate,
    lookahead_days: u32,
}

impl ExpirationClassifier {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            lookahead_days: EXPIRING_WINDOW_DAYS,
        }
    }

    /// Classifier for the current UTC date
    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    #[cfg(test)]
    pub fn with_lookahead(mut self, lookahead_days: u32) -> Self {
        self.lookahead_days = lookahead_days;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn status_of<T: Expirable + ?Sized>(&self, document: &T) -> ExpirationStatus {
        classify(
            document.expiration_date(),
            self.reference_date,
            self.lookahead_days,
        )
    }

    #[cfg(test)]
    pub fn status_of_raw(&self, raw: Option<&str>) -> Result<ExpirationStatus, ExpirationError> {
        let raw = raw.ok_or(ExpirationError::Missing)?;
        let date = parse_expiration_date(raw)?;
        Ok(classify(date, self.reference_date, self.lookahead_days))
    }

    /// Signed number of days from the reference date until expiration
    pub fn days_remaining<T: Expirable + ?Sized>(&self, document: &T) -> i64 {
        (document.expiration_date() - self.reference_date).num_days()
    }

    /// Date window (inclusive bounds) matching exactly the given status
    pub fn window(&self, status: ExpirationStatus) -> StatusWindow {
        let limit = self
            .reference_date
            .checked_add_days(Days::new(self.lookahead_days as u64));

        match status {
            ExpirationStatus::Expired => match self.reference_date.pred_opt() {
                Some(last_expired) => StatusWindow {
                    from: None,
                    to: Some(last_expired),
                },
                None => StatusWindow::empty(),
            },
            ExpirationStatus::Expiring => StatusWindow {
                from: Some(self.reference_date),
                to: limit,
            },
            ExpirationStatus::Valid => match limit.and_then(|d| d.succ_opt()) {
                Some(first_valid) => StatusWindow {
                    from: Some(first_valid),
                    to: None,
                },
                None => StatusWindow::empty(),
            },
        }
    }

    /// Combine an optional status filter with an optional expiration range
    pub fn bounds(
        &self,
        status: Option<ExpirationStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match status {
            Some(status) => self.window(status).intersect(from, to),
            None => (from, to),
        }
    }

    pub fn summarize<'a, T, I>(&self, documents: I) -> StatusSummary
    where
        T: Expirable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut summary = StatusSummary::default();
        for document in documents {
            summary.record(self.status_of(document));
        }
        summary
    }
}

/// Inclusive date bounds; `None` means unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl StatusWindow {
    /// Window no date can fall into
    fn empty() -> Self {
        Self {
            from: Some(NaiveDate::MAX),
            to: Some(NaiveDate::MIN),
        }
    }

    #[cfg(test)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// Narrow an optional user-supplied range to this window
    pub fn intersect(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let from = match (self.from, from) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let to = match (self.to, to) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        (from, to)
    }
}

/// Per-status counts over a set of documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusSummary {
    pub total: i64,
    pub expired: i64,
    pub expiring: i64,
    pub valid: i64,
}

impl StatusSummary {
    pub fn record(&mut self, status: ExpirationStatus) {
        self.total += 1;
        match status {
            ExpirationStatus::Expired => self.expired += 1,
            ExpirationStatus::Expiring => self.expiring += 1,
            ExpirationStatus::Valid => self.valid += 1,
        }
    }
}

impl FromIterator<ExpirationStatus> for StatusSummary {
    fn from_iter<I: IntoIterator<Item = ExpirationStatus>>(iter: I) -> Self {
        let mut summary = StatusSummary::default();
        for status in iter {
            summary.record(status);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reference() -> NaiveDate {
        date("2025-06-01")
    }

    #[test]
    fn test_classify_reference_scenarios() {
        let classifier = ExpirationClassifier::new(reference());

        assert_eq!(
            classifier.status_of(&date("2025-05-30")),
            ExpirationStatus::Expired
        );
        assert_eq!(
            classifier.status_of(&date("2025-06-01")),
            ExpirationStatus::Expiring
        );
        assert_eq!(
            classifier.status_of(&date("2025-06-15")),
            ExpirationStatus::Expiring
        );
        assert_eq!(
            classifier.status_of(&date("2025-07-05")),
            ExpirationStatus::Valid
        );
        assert_eq!(
            classifier.status_of(&date("2025-08-01")),
            ExpirationStatus::Valid
        );
    }

    #[test]
    fn test_classify_window_edges() {
        let r = reference();
        assert_eq!(classify(date("2025-05-31"), r, 30), ExpirationStatus::Expired);
        assert_eq!(classify(date("2025-07-01"), r, 30), ExpirationStatus::Expiring);
        assert_eq!(classify(date("2025-07-02"), r, 30), ExpirationStatus::Valid);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = ExpirationClassifier::new(reference());
        let d = date("2025-06-20");
        assert_eq!(classifier.status_of(&d), classifier.status_of(&d));
    }

    #[test]
    fn test_classify_near_max_date_does_not_overflow() {
        let r = NaiveDate::MAX.pred_opt().unwrap();
        assert_eq!(classify(NaiveDate::MAX, r, 30), ExpirationStatus::Expiring);
    }

    #[test]
    fn test_status_of_raw_rejects_bad_input() {
        let classifier = ExpirationClassifier::new(reference());

        assert_eq!(
            classifier.status_of_raw(Some("not-a-date")),
            Err(ExpirationError::Invalid("not-a-date".to_string()))
        );
        assert_eq!(classifier.status_of_raw(None), Err(ExpirationError::Missing));
        assert_eq!(
            classifier.status_of_raw(Some("   ")),
            Err(ExpirationError::Missing)
        );
        assert_eq!(
            classifier.status_of_raw(Some("2025-02-30")),
            Err(ExpirationError::Invalid("2025-02-30".to_string()))
        );
    }

    #[test]
    fn test_parse_expiration_date_formats() {
        assert_eq!(parse_expiration_date("2025-06-15"), Ok(date("2025-06-15")));
        assert_eq!(parse_expiration_date("15/06/2025"), Ok(date("2025-06-15")));
        assert_eq!(
            parse_expiration_date("2025-06-15T23:30:00-03:00"),
            Ok(date("2025-06-16"))
        );
        assert_eq!(
            parse_expiration_date("2025-06-15T10:00:00Z"),
            Ok(date("2025-06-15"))
        );
    }

    #[test]
    fn test_days_remaining() {
        let classifier = ExpirationClassifier::new(reference());
        assert_eq!(classifier.days_remaining(&date("2025-06-11")), 10);
        assert_eq!(classifier.days_remaining(&date("2025-05-29")), -3);
        assert_eq!(classifier.days_remaining(&reference()), 0);
    }

    #[test]
    fn test_windows_agree_with_classify() {
        let classifier = ExpirationClassifier::new(reference());
        let start = date("2025-04-01");

        for offset in 0..150 {
            let d = start + chrono::Duration::days(offset);
            let status = classifier.status_of(&d);
            for candidate in [
                ExpirationStatus::Expired,
                ExpirationStatus::Expiring,
                ExpirationStatus::Valid,
            ] {
                assert_eq!(
                    classifier.window(candidate).contains(d),
                    candidate == status,
                    "date {} candidate {:?}",
                    d,
                    candidate
                );
            }
        }
    }

    #[test]
    fn test_window_intersect_narrows_range() {
        let classifier = ExpirationClassifier::new(reference());
        let window = classifier.window(ExpirationStatus::Expiring);

        let (from, to) = window.intersect(Some(date("2025-06-10")), None);
        assert_eq!(from, Some(date("2025-06-10")));
        assert_eq!(to, Some(date("2025-07-01")));

        let (from, to) = window.intersect(None, Some(date("2025-12-31")));
        assert_eq!(from, Some(reference()));
        assert_eq!(to, Some(date("2025-07-01")));
    }

    #[test]
    fn test_bounds_without_status_passes_range_through() {
        let classifier = ExpirationClassifier::new(reference());
        let range = (Some(date("2025-01-01")), Some(date("2025-03-01")));

        assert_eq!(classifier.bounds(None, range.0, range.1), range);
        assert_eq!(
            classifier.bounds(Some(ExpirationStatus::Expired), None, None),
            (None, Some(date("2025-05-31")))
        );
        assert_eq!(
            classifier.bounds(Some(ExpirationStatus::Valid), None, None),
            (Some(date("2025-07-02")), None)
        );
    }

    #[test]
    fn test_summary_partitions_all_documents() {
        let classifier = ExpirationClassifier::new(reference());
        let dates = vec![
            date("2025-01-01"),
            date("2025-05-31"),
            date("2025-06-01"),
            date("2025-06-30"),
            date("2025-07-02"),
            date("2026-01-01"),
            date("2026-06-01"),
        ];

        let summary = classifier.summarize(&dates);

        assert_eq!(summary.total, dates.len() as i64);
        assert_eq!(summary.expired, 2);
        assert_eq!(summary.expiring, 2);
        assert_eq!(summary.valid, 3);
        assert_eq!(
            summary.expired + summary.expiring + summary.valid,
            summary.total
        );
    }

    #[test]
    fn test_summary_from_statuses() {
        let summary: StatusSummary = [
            ExpirationStatus::Valid,
            ExpirationStatus::Valid,
            ExpirationStatus::Expired,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            summary,
            StatusSummary {
                total: 3,
                expired: 1,
                expiring: 0,
                valid: 2
            }
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ExpirationStatus::Expiring).unwrap(),
            "\"expiring\""
        );
        assert_eq!(ExpirationStatus::Expired.as_str(), "expired");
    }
}
