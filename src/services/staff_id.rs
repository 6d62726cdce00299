//! Sequential, human-readable staff identifiers of the form `YYNNN`.
//!
//! `YY` is the two-digit year the record was created in, `NNN` a sequence
//! number that restarts at `001` every year. The sequence is derived from the
//! highest identifier already stored, so creation goes through
//! [`with_allocated_id`], which retries when a concurrent insert took the
//! same identifier first.

use std::future::Future;

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::{DatabaseError, StaffStore};

/// Minimum width of the sequence suffix.
pub const SEQUENCE_WIDTH: usize = 3;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("static pattern"));

/// Compute the identifier that follows `current_max` in year `year`.
///
/// The first digit run of `current_max` is read as `<issuing year><sequence>`;
/// the issuing year is discarded and the prefix rebuilt from `year`. Missing,
/// empty or digit-free input starts the year at `001`. A sequence past 999
/// widens the identifier instead of failing.
pub fn allocate(current_max: Option<&str>, year: &str) -> String {
    let first_of_year = format!("{year}{:0>width$}", 1, width = SEQUENCE_WIDTH);

    let Some(current) = current_max.filter(|s| !s.is_empty()) else {
        return first_of_year;
    };
    let Some(run) = DIGIT_RUN.find(current).map(|m| m.as_str()) else {
        return first_of_year;
    };

    let sequence = if run.len() > year.len() { &run[year.len()..] } else { run };
    let Some(next) = sequence.parse::<u64>().ok().and_then(|n| n.checked_add(1)) else {
        return first_of_year;
    };

    format!("{year}{next:0>width$}", width = SEQUENCE_WIDTH)
}

/// Source of the year prefix.
pub trait Clock: Send + Sync {
    fn current_year_two_digit(&self) -> String;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year_two_digit(&self) -> String {
        format!("{:02}", Local::now().year().rem_euclid(100))
    }
}

/// Allocate a fresh identifier and hand it to `insert`, retrying on conflict.
///
/// Each attempt reads the current maximum for this year's prefix, so an
/// identifier lost to a concurrent writer is replaced by the next free one.
/// Errors other than [`DatabaseError::Conflict`] end the loop immediately.
pub async fn with_allocated_id<S, C, T, F, Fut>(
    store: &S,
    clock: &C,
    max_attempts: u32,
    mut insert: F,
) -> Result<T, DatabaseError>
where
    S: StaffStore + ?Sized,
    C: Clock + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_conflict = String::new();

    for attempt in 1..=max_attempts {
        let year = clock.current_year_two_digit();
        let current_max = store.find_max_staff_id(&year).await?;
        let staff_id = allocate(current_max.as_deref(), &year);

        match insert(staff_id.clone()).await {
            Ok(value) => {
                tracing::debug!("Allocated staff id {} on attempt {}", staff_id, attempt);
                return Ok(value);
            }
            Err(DatabaseError::Conflict(msg)) => {
                tracing::warn!(
                    "Staff id {} already taken (attempt {}/{}): {}",
                    staff_id,
                    attempt,
                    max_attempts,
                    msg
                );
                last_conflict = msg;
            }
            Err(other) => return Err(other),
        }
    }

    Err(DatabaseError::Conflict(format!(
        "could not allocate a staff id after {} attempts: {}",
        max_attempts, last_conflict
    )))
}
