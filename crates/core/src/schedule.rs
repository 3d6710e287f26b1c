//! Delivery Schedule
//!
//! A delivery may be scheduled no sooner than [`LEAD_TIME`] after now, with now rounded
//! forward to the next five minute boundary. Times are wall-clock times without a zone; the
//! caller decides which zone "now" is read in.

use std::{fmt, str::FromStr};

use jiff::{
    SignedDuration, ToSpan,
    civil::{Date, DateTime, Time},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

/// Minimum interval between now and the earliest permissible delivery.
pub const LEAD_TIME: SignedDuration = SignedDuration::from_mins(45);

/// How often a displayed schedule is re-checked.
pub const RECHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

/// Remaining buffer below which a still-valid schedule is reported as expiring.
pub const WARNING_THRESHOLD: SignedDuration = SignedDuration::from_mins(45);

const SLOT_MINUTES: i8 = 5;

/// Whether the order is delivered or collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Delivered; every vendor's fee applies.
    Delivery,

    /// Collected by the customer; no fees.
    Pickup,
}

impl DeliveryMode {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::Delivery => "delivery",
            DeliveryMode::Pickup => "pickup",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery mode name that is not recognised.
#[derive(Debug, Error)]
#[error("unknown delivery mode \"{0}\"")]
pub struct UnknownDeliveryMode(pub String);

impl FromStr for DeliveryMode {
    type Err = UnknownDeliveryMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(DeliveryMode::Delivery),
            "pickup" => Ok(DeliveryMode::Pickup),
            other => Err(UnknownDeliveryMode(other.to_string())),
        }
    }
}

/// When and how the customer wants the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySchedule {
    /// Calendar date
    pub date: Date,

    /// Wall-clock time, `HH:MM`
    #[serde(with = "hh_mm")]
    pub time: Time,

    /// Delivery or pickup
    pub delivery_mode: DeliveryMode,
}

impl DeliverySchedule {
    /// The scheduled date and time.
    pub fn date_time(&self) -> DateTime {
        self.date.to_datetime(self.time)
    }
}

/// Errors raised while validating a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The schedule is earlier than the earliest permissible time.
    #[error("delivery must be scheduled for {earliest} or later")]
    TooSoon {
        /// Earliest permissible date and time
        earliest: DateTime,
    },

    /// Date arithmetic left the supported range.
    #[error("schedule is out of range: {0}")]
    OutOfRange(#[from] jiff::Error),
}

/// Result of re-checking a schedule against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// Comfortably ahead of the minimum.
    Valid,

    /// Still valid, but will go stale after `remaining`.
    ExpiringSoon {
        /// Buffer left before the schedule becomes invalid
        remaining: SignedDuration,
    },

    /// No longer valid; a new date and time must be picked.
    Stale,
}

/// The earliest date and time a delivery may be scheduled for.
///
/// # Errors
///
/// Returns an error if the result is outside the supported date range.
pub fn minimum_date_time(now: DateTime) -> Result<DateTime, ScheduleError> {
    let minute = now.minute();
    let floored = now
        .date()
        .at(now.hour(), minute - minute % SLOT_MINUTES, 0, 0);

    let on_boundary =
        minute % SLOT_MINUTES == 0 && now.second() == 0 && now.subsec_nanosecond() == 0;

    let slot = if on_boundary {
        floored
    } else {
        floored.checked_add(i64::from(SLOT_MINUTES).minutes())?
    };

    Ok(slot.checked_add(LEAD_TIME)?)
}

/// Check a schedule against the clock.
///
/// # Errors
///
/// Returns [`ScheduleError::TooSoon`] with the earliest permissible time when the schedule
/// is before it.
pub fn validate_schedule(schedule: &DeliverySchedule, now: DateTime) -> Result<(), ScheduleError> {
    let earliest = minimum_date_time(now)?;

    if schedule.date_time() < earliest {
        return Err(ScheduleError::TooSoon { earliest });
    }

    Ok(())
}

/// Whether a schedule is still permissible at `now`.
///
/// Any date before today is invalid. Otherwise the full scheduled date and time is compared
/// against [`minimum_date_time`], so the earliest slots of tomorrow are rejected when the lead
/// time crosses midnight.
pub fn is_schedule_valid(schedule: &DeliverySchedule, now: DateTime) -> bool {
    schedule.date >= now.date() && validate_schedule(schedule, now).is_ok()
}

/// Classify a schedule as valid, about to expire or stale.
pub fn check_schedule(schedule: &DeliverySchedule, now: DateTime) -> ScheduleStatus {
    let Ok(earliest) = minimum_date_time(now) else {
        return ScheduleStatus::Stale;
    };

    if !is_schedule_valid(schedule, now) {
        return ScheduleStatus::Stale;
    }

    let remaining = schedule.date_time().duration_since(earliest);

    if remaining < WARNING_THRESHOLD {
        ScheduleStatus::ExpiringSoon { remaining }
    } else {
        ScheduleStatus::Valid
    }
}

/// A schedule being re-checked in the background.
///
/// The check stops when the schedule goes stale or this handle is dropped.
#[derive(Debug)]
pub struct ScheduleWatch {
    status: watch::Receiver<ScheduleStatus>,
    task: JoinHandle<()>,
}

impl ScheduleWatch {
    /// The latest status.
    pub fn status(&self) -> ScheduleStatus {
        *self.status.borrow()
    }

    /// A receiver that is notified whenever the status changes.
    pub fn subscribe(&self) -> watch::Receiver<ScheduleStatus> {
        self.status.clone()
    }
}

impl Drop for ScheduleWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Re-check `schedule` every [`RECHECK_INTERVAL`], reading the time from `clock`.
///
/// Must be called from within a tokio runtime.
pub fn watch_schedule<C>(schedule: DeliverySchedule, clock: C) -> ScheduleWatch
where
    C: Fn() -> DateTime + Send + 'static,
{
    let (sender, status) = watch::channel(check_schedule(&schedule, clock()));

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(RECHECK_INTERVAL);

        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let next = check_schedule(&schedule, clock());

            sender.send_if_modified(|current| {
                if *current == next {
                    return false;
                }

                debug!(?next, "schedule.status_changed");

                *current = next;

                true
            });

            if next == ScheduleStatus::Stale || sender.is_closed() {
                break;
            }
        }
    });

    ScheduleWatch { status, task }
}

mod hh_mm {
    use jiff::civil::Time;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%H:%M";

    pub(super) fn serialize<S: Serializer>(time: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.strftime(FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Time::strptime(FORMAT, &raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use testresult::TestResult;

    use super::*;

    fn delivery_at(date: Date, time: Time) -> DeliverySchedule {
        DeliverySchedule {
            date,
            time,
            delivery_mode: DeliveryMode::Delivery,
        }
    }

    #[test]
    fn minimum_rolls_over_midnight() -> TestResult {
        let now = date(2024, 1, 1).at(23, 50, 0, 0);

        assert_eq!(minimum_date_time(now)?, date(2024, 1, 2).at(0, 35, 0, 0));

        Ok(())
    }

    #[test]
    fn minimum_rounds_forward_to_next_slot() -> TestResult {
        let cases = [
            (time(12, 0, 0, 0), time(12, 45, 0, 0)),
            (time(12, 1, 0, 0), time(12, 50, 0, 0)),
            (time(12, 4, 59, 0), time(12, 50, 0, 0)),
            (time(12, 5, 0, 1), time(12, 55, 0, 0)),
        ];

        for (now, expected) in cases {
            let now = date(2024, 3, 10).to_datetime(now);

            assert_eq!(
                minimum_date_time(now)?,
                date(2024, 3, 10).to_datetime(expected),
                "now {now}"
            );
        }

        Ok(())
    }

    #[test]
    fn rollover_example_schedules() {
        let now = date(2024, 1, 1).at(23, 50, 0, 0);

        assert!(!is_schedule_valid(
            &delivery_at(date(2024, 1, 1), time(23, 55, 0, 0)),
            now
        ));
        assert!(is_schedule_valid(
            &delivery_at(date(2024, 1, 2), time(0, 40, 0, 0)),
            now
        ));
        assert!(!is_schedule_valid(
            &delivery_at(date(2024, 1, 2), time(0, 30, 0, 0)),
            now
        ));
    }

    #[test]
    fn past_dates_are_invalid() {
        let now = date(2024, 6, 15).at(9, 0, 0, 0);

        assert!(!is_schedule_valid(
            &delivery_at(date(2024, 6, 14), time(23, 59, 0, 0)),
            now
        ));
    }

    #[test]
    fn later_days_are_valid_at_any_time() {
        let now = date(2024, 6, 15).at(23, 59, 0, 0);

        for hour in [0, 6, 12, 23] {
            assert!(is_schedule_valid(
                &delivery_at(date(2024, 6, 17), time(hour, 0, 0, 0)),
                now
            ));
        }

        assert!(is_schedule_valid(
            &delivery_at(date(2024, 6, 16), time(0, 0, 0, 0)),
            date(2024, 6, 15).at(12, 0, 0, 0)
        ));
    }

    #[test]
    fn today_matches_the_lead_time_boundary() {
        let now = date(2024, 6, 15).at(12, 2, 0, 0);
        let today = date(2024, 6, 15);

        assert!(!is_schedule_valid(&delivery_at(today, time(12, 49, 0, 0)), now));
        assert!(is_schedule_valid(&delivery_at(today, time(12, 50, 0, 0)), now));
    }

    #[test]
    fn too_soon_reports_earliest_slot() {
        let now = date(2024, 6, 15).at(12, 2, 0, 0);

        let result = validate_schedule(&delivery_at(date(2024, 6, 15), time(12, 30, 0, 0)), now);

        assert!(matches!(
            result,
            Err(ScheduleError::TooSoon { earliest }) if earliest == date(2024, 6, 15).at(12, 50, 0, 0)
        ));
    }

    #[test]
    fn check_warns_inside_threshold() {
        let today = date(2024, 6, 15);
        let now = today.at(12, 0, 0, 0);

        assert_eq!(
            check_schedule(&delivery_at(today, time(14, 0, 0, 0)), now),
            ScheduleStatus::Valid
        );
        assert_eq!(
            check_schedule(&delivery_at(today, time(13, 0, 0, 0)), now),
            ScheduleStatus::ExpiringSoon {
                remaining: SignedDuration::from_mins(15)
            }
        );
        assert_eq!(
            check_schedule(&delivery_at(today, time(12, 30, 0, 0)), now),
            ScheduleStatus::Stale
        );
    }

    #[test]
    fn schedule_serializes_time_as_hours_and_minutes() -> TestResult {
        let schedule = DeliverySchedule {
            date: date(2024, 1, 2),
            time: time(0, 40, 0, 0),
            delivery_mode: DeliveryMode::Pickup,
        };

        let json = serde_json::to_value(schedule)?;

        assert_eq!(
            json,
            serde_json::json!({"date": "2024-01-02", "time": "00:40", "delivery_mode": "pickup"})
        );
        assert_eq!(serde_json::from_value::<DeliverySchedule>(json)?, schedule);

        Ok(())
    }

    #[test]
    fn malformed_time_is_rejected() {
        let result = serde_json::from_value::<DeliverySchedule>(serde_json::json!({
            "date": "2024-01-02",
            "time": "25:99",
            "delivery_mode": "delivery"
        }));

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_reports_expiry_then_staleness() -> TestResult {
        let today = date(2024, 6, 15);
        let started = today.at(12, 0, 0, 0);
        let epoch = tokio::time::Instant::now();

        let clock = move || {
            SignedDuration::try_from(epoch.elapsed())
                .ok()
                .and_then(|elapsed| started.checked_add(elapsed).ok())
                .unwrap_or(started)
        };

        let watch = watch_schedule(delivery_at(today, time(14, 0, 0, 0)), clock);
        let mut status = watch.subscribe();
        let mut seen = vec![*status.borrow_and_update()];

        while status.changed().await.is_ok() {
            seen.push(*status.borrow_and_update());

            if seen.last() == Some(&ScheduleStatus::Stale) {
                break;
            }
        }

        assert_eq!(seen.first(), Some(&ScheduleStatus::Valid));
        assert!(
            seen.iter()
                .any(|status| matches!(status, ScheduleStatus::ExpiringSoon { .. }))
        );
        assert_eq!(seen.last(), Some(&ScheduleStatus::Stale));
        assert_eq!(watch.status(), ScheduleStatus::Stale);

        Ok(())
    }
}
