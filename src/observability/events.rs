// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution events published by the scheduler.
//!
//! Every dispatch, completion and skipped overlap produces one [`ProfileEvent`].
//! Events fan out over a `tokio::sync::broadcast` channel, so any number of
//! subscribers can watch without slowing the scheduler down. A subscriber that
//! falls behind by more than the channel capacity loses the oldest events and
//! sees `RecvError::Lagged`; the scheduler itself never blocks on delivery.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Kind of execution milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileEventType {
    Started,
    Succeeded,
    Failed,
    SkippedOverlap,
}

impl Display for ProfileEventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProfileEventType::Started => "STARTED",
            ProfileEventType::Succeeded => "SUCCEEDED",
            ProfileEventType::Failed => "FAILED",
            ProfileEventType::SkippedOverlap => "SKIPPED_OVERLAP",
        };
        f.write_str(label)
    }
}

/// A single execution milestone for one profile.
///
/// `timestamp` is monotonic and orders events within the process; `wall_time`
/// is what gets serialized for anything outside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEvent {
    pub profile_name: String,
    pub event_type: ProfileEventType,
    #[serde(skip)]
    pub timestamp: Instant,
    pub wall_time: DateTime<Utc>,
    /// Set only for [`ProfileEventType::Failed`].
    pub error_detail: Option<String>,
    /// Failure streak after this event was applied.
    pub consecutive_failures: u32,
    /// True once the streak has reached the retry policy's failure threshold.
    pub degraded: bool,
}

impl ProfileEvent {
    pub fn new(profile_name: impl Into<String>, event_type: ProfileEventType) -> Self {
        Self {
            profile_name: profile_name.into(),
            event_type,
            timestamp: Instant::now(),
            wall_time: Utc::now(),
            error_detail: None,
            consecutive_failures: 0,
            degraded: false,
        }
    }

    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn with_failures(mut self, consecutive_failures: u32, degraded: bool) -> Self {
        self.consecutive_failures = consecutive_failures;
        self.degraded = degraded;
        self
    }
}

/// Broadcast fan-out of [`ProfileEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ProfileEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ProfileEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.publish(ProfileEvent::new("PM_38", ProfileEventType::Started));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_each_event() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(
            ProfileEvent::new("NHM_03", ProfileEventType::Failed)
                .with_error("connection refused")
                .with_failures(3, true),
        );

        for receiver in [&mut first, &mut second] {
            let event = receiver.recv().await.unwrap();
            assert_eq!(event.profile_name, "NHM_03");
            assert_eq!(event.event_type, ProfileEventType::Failed);
            assert_eq!(event.error_detail.as_deref(), Some("connection refused"));
            assert_eq!(event.consecutive_failures, 3);
            assert!(event.degraded);
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_instead_of_blocking() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe();

        for _ in 0..5 {
            bus.publish(ProfileEvent::new("FM_01", ProfileEventType::Succeeded));
        }

        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }

    #[tokio::test]
    async fn test_event_serializes_with_wall_clock_stamp() {
        let before = Utc::now();
        let event = ProfileEvent::new("AP_01", ProfileEventType::Failed)
            .with_error("timeout")
            .with_failures(1, false);
        assert!(event.wall_time >= before && event.wall_time <= Utc::now());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["profile_name"], "AP_01");
        assert_eq!(json["event_type"], "FAILED");
        assert_eq!(json["error_detail"], "timeout");
        assert!(json.get("timestamp").is_none());

        let stamp: DateTime<Utc> = serde_json::from_value(json["wall_time"].clone()).unwrap();
        assert_eq!(stamp, event.wall_time);
    }

    #[test]
    fn test_event_type_labels() {
        assert_eq!(ProfileEventType::SkippedOverlap.to_string(), "SKIPPED_OVERLAP");
        assert_eq!(ProfileEventType::Started.to_string(), "STARTED");
    }
}
