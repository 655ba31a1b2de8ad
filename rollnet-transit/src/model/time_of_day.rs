use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the eight fixed scheduling windows used to partition transit runs.
/// window 1 wraps midnight.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum TimeOfDay {
    Overnight,
    EarlyAm,
    AmPeak,
    AmShoulder,
    Midday,
    PmShoulder,
    PmPeak,
    Evening,
}

impl TimeOfDay {
    /// buckets a start time in seconds past midnight. times past 24:00
    /// (next-service-day trips) wrap into the overnight window.
    pub fn classify(start_seconds: u32) -> TimeOfDay {
        match start_seconds % 86400 {
            s if s < 21600 => TimeOfDay::Overnight,  // 00:00-06:00
            s if s < 25200 => TimeOfDay::EarlyAm,    // 06:00-07:00
            s if s < 32400 => TimeOfDay::AmPeak,     // 07:00-09:00
            s if s < 36000 => TimeOfDay::AmShoulder, // 09:00-10:00
            s if s < 50400 => TimeOfDay::Midday,     // 10:00-14:00
            s if s < 57600 => TimeOfDay::PmShoulder, // 14:00-16:00
            s if s < 64800 => TimeOfDay::PmPeak,     // 16:00-18:00
            s if s < 72000 => TimeOfDay::Evening,    // 18:00-20:00
            _ => TimeOfDay::Overnight,               // 20:00-24:00
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            TimeOfDay::Overnight => 1,
            TimeOfDay::EarlyAm => 2,
            TimeOfDay::AmPeak => 3,
            TimeOfDay::AmShoulder => 4,
            TimeOfDay::Midday => 5,
            TimeOfDay::PmShoulder => 6,
            TimeOfDay::PmPeak => 7,
            TimeOfDay::Evening => 8,
        }
    }

    /// the assumed headway when a window holds too few runs to average
    /// consecutive start gaps
    pub fn max_headway_minutes(&self) -> f64 {
        match self {
            TimeOfDay::AmPeak | TimeOfDay::PmPeak => 30.0,
            _ => 60.0,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<TimeOfDay, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        match value {
            1 => Ok(TimeOfDay::Overnight),
            2 => Ok(TimeOfDay::EarlyAm),
            3 => Ok(TimeOfDay::AmPeak),
            4 => Ok(TimeOfDay::AmShoulder),
            5 => Ok(TimeOfDay::Midday),
            6 => Ok(TimeOfDay::PmShoulder),
            7 => Ok(TimeOfDay::PmPeak),
            8 => Ok(TimeOfDay::Evening),
            _ => Err(serde::de::Error::custom(format!(
                "unknown time of day window {}",
                value
            ))),
        }
    }
}
