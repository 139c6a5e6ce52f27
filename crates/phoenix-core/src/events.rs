use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State transitions reported back to the caller.
/// The CLI prints them as JSON; tests match on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SprintStarted {
        duration_min: u32,
        remaining_sec: u32,
        /// `false` when an interrupted sprint picked up where it left off.
        fresh: bool,
        at: DateTime<Utc>,
    },
    SprintStopped {
        remaining_sec: u32,
        reset: bool,
        at: DateTime<Utc>,
    },
    SprintCompleted {
        duration_min: u32,
        sprints: u32,
        active_minutes: u32,
        at: DateTime<Utc>,
    },
    DaySwitched {
        from: String,
        to: String,
        /// Whether the target day was loaded from the logbook.
        restored: bool,
        at: DateTime<Utc>,
    },
    StateImported {
        version: String,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_by_variant_name() {
        let event = Event::SprintStopped {
            remaining_sec: 12,
            reset: false,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SprintStopped");
        assert_eq!(json["remaining_sec"], 12);
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
