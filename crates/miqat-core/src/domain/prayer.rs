//! Prayer times and the start gate for work sessions.
//!
//! The gate is a pure decision over a timetable snapshot fetched for the
//! current start request. Fetching and the fail-open fallback live with the
//! caller; nothing here caches timetables across requests.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use super::{SessionConfig, SessionMode};

const DEFAULT_METHOD: u8 = 2;
const MAX_METHOD: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn all() -> &'static [PrayerName] {
        &[
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("calculation method must be a code between 1 and 14, got {0:?}")]
pub struct InvalidCalculationMethod(String);

/// Calculation method code understood by the prayer-times service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalculationMethod(u8);

impl CalculationMethod {
    pub fn new(code: u8) -> Result<Self, InvalidCalculationMethod> {
        if (1..=MAX_METHOD).contains(&code) {
            Ok(Self(code))
        } else {
            Err(InvalidCalculationMethod(code.to_string()))
        }
    }

    pub fn code(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CalculationMethod {
    fn default() -> Self {
        Self(DEFAULT_METHOD)
    }
}

impl FromStr for CalculationMethod {
    type Err = InvalidCalculationMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| InvalidCalculationMethod(s.to_string()))?;
        Self::new(code)
    }
}

impl TryFrom<String> for CalculationMethod {
    type Error = InvalidCalculationMethod;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalculationMethod> for String {
    fn from(method: CalculationMethod) -> Self {
        method.code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerLocation {
    pub city: String,
    pub country: String,
    pub method: CalculationMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTime {
    pub name: PrayerName,
    pub time: NaiveTime,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    #[error("missing time for {0}")]
    Missing(PrayerName),

    #[error("malformed time for {name}: {value:?}")]
    Malformed { name: PrayerName, value: String },
}

/// Same-day times of the five canonical prayers, local to the requested city.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrayerTimetable {
    times: Vec<PrayerTime>,
}

impl PrayerTimetable {
    pub fn new(mut times: Vec<PrayerTime>) -> Self {
        times.sort_by_key(|entry| entry.time);
        Self { times }
    }

    /// Builds a timetable from the service's `name -> "HH:MM"` map. Extra keys
    /// (Sunrise, Imsak, ...) are ignored; a trailing zone suffix is tolerated.
    pub fn from_clock_strings(timings: &HashMap<String, String>) -> Result<Self, TimetableError> {
        let mut times = Vec::with_capacity(PrayerName::all().len());

        for name in PrayerName::all() {
            let raw = timings
                .get(name.as_str())
                .ok_or(TimetableError::Missing(*name))?;
            let clock = raw.split_whitespace().next().unwrap_or_default();
            let time = NaiveTime::parse_from_str(clock, "%H:%M").map_err(|_| {
                TimetableError::Malformed {
                    name: *name,
                    value: raw.clone(),
                }
            })?;
            times.push(PrayerTime { name: *name, time });
        }

        Ok(Self::new(times))
    }

    pub fn times(&self) -> &[PrayerTime] {
        &self.times
    }

    /// Earliest prayer strictly after `now`, with its absolute time today.
    pub fn next_after(&self, now: NaiveDateTime) -> Option<(PrayerName, NaiveDateTime)> {
        let today = now.date();
        let mut upcoming: Vec<(PrayerName, NaiveDateTime)> = self
            .times
            .iter()
            .map(|entry| (entry.name, today.and_time(entry.time)))
            .filter(|(_, at)| *at > now)
            .collect();

        upcoming.sort_by_key(|(_, at)| *at);
        upcoming.into_iter().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    ApproveFull { minutes: u32 },
    ApprovePartial { minutes: u32, prayer: PrayerName },
    Deny { prayer: PrayerName, minutes_until: u32 },
}

impl GateOutcome {
    pub fn approve_full(config: &SessionConfig) -> Self {
        GateOutcome::ApproveFull {
            minutes: config.work_minutes,
        }
    }
}

/// Whether a start request for `mode` has to consult prayer times at all.
pub fn requires_lookup(config: &SessionConfig, mode: SessionMode) -> bool {
    mode == SessionMode::Work && config.salah_awareness && config.location().is_some()
}

pub fn decide(
    config: &SessionConfig,
    timetable: &PrayerTimetable,
    now: NaiveDateTime,
) -> GateOutcome {
    let Some((prayer, at)) = timetable.next_after(now) else {
        return GateOutcome::approve_full(config);
    };

    let minutes_until = u32::try_from((at - now).num_minutes()).unwrap_or(u32::MAX);

    if minutes_until <= config.buffer_minutes {
        GateOutcome::Deny {
            prayer,
            minutes_until,
        }
    } else if minutes_until < config.work_minutes {
        GateOutcome::ApprovePartial {
            minutes: minutes_until,
            prayer,
        }
    } else {
        GateOutcome::approve_full(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn timetable() -> PrayerTimetable {
        let timings: HashMap<String, String> = [
            ("Fajr", "04:50"),
            ("Sunrise", "06:10"),
            ("Dhuhr", "12:05"),
            ("Asr", "15:30"),
            ("Maghrib", "18:02"),
            ("Isha", "19:20 (EET)"),
        ]
        .into_iter()
        .map(|(name, time)| (name.to_string(), time.to_string()))
        .collect();

        PrayerTimetable::from_clock_strings(&timings).unwrap()
    }

    fn config(work_minutes: u32, buffer_minutes: u32) -> SessionConfig {
        SessionConfig {
            work_minutes,
            buffer_minutes,
            salah_awareness: true,
            city: "Cairo".to_string(),
            country: "Egypt".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn prayer_three_minutes_away_within_buffer_denies() {
        let outcome = decide(&config(25, 10), &timetable(), at(12, 2));

        assert_eq!(
            outcome,
            GateOutcome::Deny {
                prayer: PrayerName::Dhuhr,
                minutes_until: 3
            }
        );
    }

    #[test]
    fn prayer_twenty_minutes_away_offers_shortened_session() {
        let outcome = decide(&config(25, 5), &timetable(), at(11, 45));

        assert_eq!(
            outcome,
            GateOutcome::ApprovePartial {
                minutes: 20,
                prayer: PrayerName::Dhuhr
            }
        );
    }

    #[test]
    fn prayer_forty_minutes_away_approves_full_session() {
        let outcome = decide(&config(25, 5), &timetable(), at(11, 25));

        assert_eq!(outcome, GateOutcome::ApproveFull { minutes: 25 });
    }

    #[test]
    fn buffer_boundary_is_inclusive() {
        let outcome = decide(&config(25, 5), &timetable(), at(12, 0));

        assert!(matches!(outcome, GateOutcome::Deny { minutes_until: 5, .. }));
    }

    #[test]
    fn all_prayers_passed_approves_full_session() {
        let outcome = decide(&config(25, 5), &timetable(), at(22, 0));

        assert_eq!(outcome, GateOutcome::ApproveFull { minutes: 25 });
    }

    #[test]
    fn prayer_at_current_minute_is_not_upcoming() {
        let outcome = decide(&config(25, 5), &timetable(), at(12, 5));

        assert_eq!(outcome, GateOutcome::ApproveFull { minutes: 25 });
    }

    #[test]
    fn partial_minutes_are_floored() {
        let now = at(11, 44) + chrono::Duration::seconds(30);

        let outcome = decide(&config(25, 5), &timetable(), now);

        assert_eq!(
            outcome,
            GateOutcome::ApprovePartial {
                minutes: 20,
                prayer: PrayerName::Dhuhr
            }
        );
    }

    #[test]
    fn timetable_ignores_non_canonical_entries_and_sorts() {
        let table = timetable();

        let names: Vec<PrayerName> = table.times().iter().map(|entry| entry.name).collect();
        assert_eq!(names, PrayerName::all());
    }

    #[test]
    fn timetable_rejects_missing_or_malformed_entries() {
        let mut timings: HashMap<String, String> = PrayerName::all()
            .iter()
            .map(|name| (name.as_str().to_string(), "10:00".to_string()))
            .collect();

        timings.remove("Asr");
        assert_eq!(
            PrayerTimetable::from_clock_strings(&timings),
            Err(TimetableError::Missing(PrayerName::Asr))
        );

        timings.insert("Asr".to_string(), "late afternoon".to_string());
        assert!(matches!(
            PrayerTimetable::from_clock_strings(&timings),
            Err(TimetableError::Malformed {
                name: PrayerName::Asr,
                ..
            })
        ));
    }

    #[test]
    fn lookup_only_for_work_with_salah_awareness_and_location() {
        let mut config = config(25, 5);

        assert!(requires_lookup(&config, SessionMode::Work));
        assert!(!requires_lookup(&config, SessionMode::ShortBreak));

        config.salah_awareness = false;
        assert!(!requires_lookup(&config, SessionMode::Work));

        config.salah_awareness = true;
        config.city.clear();
        assert!(!requires_lookup(&config, SessionMode::Work));
    }

    #[test]
    fn calculation_method_serializes_as_string_code() {
        let method: CalculationMethod = "14".parse().unwrap();

        assert_eq!(serde_json::to_string(&method).unwrap(), r#""14""#);
        assert!(serde_json::from_str::<CalculationMethod>(r#""0""#).is_err());
        assert_eq!(CalculationMethod::default().code(), "2");
    }
}
