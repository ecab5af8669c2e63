use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::timeout;
use tracing::{debug, warn};

use miqat_core::domain::{decide_gate, gate_requires_lookup};
use miqat_core::ports::PrayerTimesGateway;
use miqat_core::{GateOutcome, SessionConfig, SessionMode};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Start gate for work sessions. Any lookup failure approves the full session.
pub struct PrayerGate {
    gateway: Arc<dyn PrayerTimesGateway>,
}

impl PrayerGate {
    pub fn new(gateway: Arc<dyn PrayerTimesGateway>) -> Self {
        Self { gateway }
    }

    pub async fn check(
        &self,
        config: &SessionConfig,
        mode: SessionMode,
        now: NaiveDateTime,
    ) -> GateOutcome {
        let location = config.location().filter(|_| gate_requires_lookup(config, mode));
        let Some(location) = location else {
            return GateOutcome::approve_full(config);
        };

        let service = self.gateway.service_name();
        let timetable = match timeout(LOOKUP_TIMEOUT, self.gateway.fetch_today(&location)).await {
            Ok(Ok(timetable)) => timetable,
            Ok(Err(error)) => {
                warn!(%error, service, "prayer times lookup failed, approving full session");
                return GateOutcome::approve_full(config);
            }
            Err(_) => {
                warn!(service, "prayer times lookup timed out, approving full session");
                return GateOutcome::approve_full(config);
            }
        };

        let outcome = decide_gate(config, &timetable, now);
        debug!(?outcome, city = %location.city, "gate decided");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use miqat_adapters::{
        FailingPrayerTimesGateway, HangingPrayerTimesGateway, StubPrayerTimesGateway,
    };
    use miqat_core::domain::{PrayerTime, PrayerTimetable};
    use miqat_core::PrayerName;

    fn aware_config() -> SessionConfig {
        SessionConfig {
            salah_awareness: true,
            buffer_minutes: 10,
            city: "Amman".to_string(),
            country: "Jordan".to_string(),
            ..Default::default()
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 13)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn asr_at_15_00() -> Arc<StubPrayerTimesGateway> {
        Arc::new(StubPrayerTimesGateway::with_timetable(PrayerTimetable::new(vec![
            PrayerTime {
                name: PrayerName::Dhuhr,
                time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
            PrayerTime {
                name: PrayerName::Asr,
                time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            },
        ])))
    }

    #[tokio::test]
    async fn prayer_close_by_denies() {
        let gate = PrayerGate::new(asr_at_15_00());

        let outcome = gate.check(&aware_config(), SessionMode::Work, at(14, 57)).await;

        assert_eq!(
            outcome,
            GateOutcome::Deny {
                prayer: PrayerName::Asr,
                minutes_until: 3
            }
        );
    }

    #[tokio::test]
    async fn prayer_within_session_offers_partial() {
        let gate = PrayerGate::new(asr_at_15_00());

        let outcome = gate.check(&aware_config(), SessionMode::Work, at(14, 40)).await;

        assert_eq!(
            outcome,
            GateOutcome::ApprovePartial {
                minutes: 20,
                prayer: PrayerName::Asr
            }
        );
    }

    #[tokio::test]
    async fn service_failure_fails_open() {
        let gate = PrayerGate::new(Arc::new(FailingPrayerTimesGateway::network_error()));

        let outcome = gate.check(&aware_config(), SessionMode::Work, at(14, 57)).await;

        assert_eq!(outcome, GateOutcome::ApproveFull { minutes: 25 });
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_lookup_fails_open() {
        let gate = PrayerGate::new(Arc::new(HangingPrayerTimesGateway));

        let outcome = gate.check(&aware_config(), SessionMode::Work, at(14, 57)).await;

        assert_eq!(outcome, GateOutcome::ApproveFull { minutes: 25 });
    }

    #[tokio::test]
    async fn breaks_and_unaware_settings_skip_lookup() {
        let gateway = asr_at_15_00();
        let gate = PrayerGate::new(gateway.clone());

        let break_outcome = gate
            .check(&aware_config(), SessionMode::ShortBreak, at(14, 57))
            .await;
        let unaware = SessionConfig {
            salah_awareness: false,
            ..aware_config()
        };
        let unaware_outcome = gate.check(&unaware, SessionMode::Work, at(14, 57)).await;

        assert_eq!(break_outcome, GateOutcome::ApproveFull { minutes: 25 });
        assert_eq!(unaware_outcome, GateOutcome::ApproveFull { minutes: 25 });
        assert!(gateway.requests().is_empty());
    }
}
