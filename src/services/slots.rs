use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::booking::TIME_FORMAT;

/// Fixed hourly grid of bookable times, `open_hour` inclusive to `close_hour`
/// exclusive. Identical for every date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    open_hour: u32,
    close_hour: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotLabel {
    pub time: String,
    pub label: String,
}

impl SlotGrid {
    pub fn new(open_hour: u32, close_hour: u32) -> Result<Self, AppError> {
        if close_hour > 24 || open_hour >= close_hour {
            return Err(AppError::Config(format!(
                "invalid business hours: open {open_hour}, close {close_hour}"
            )));
        }
        Ok(Self {
            open_hour,
            close_hour,
        })
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub fn slots(&self) -> Vec<NaiveTime> {
        (self.open_hour..self.close_hour)
            .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
            .collect()
    }

    pub fn contains(&self, time: &NaiveTime) -> bool {
        time.minute() == 0
            && time.second() == 0
            && time.nanosecond() == 0
            && (self.open_hour..self.close_hour).contains(&time.hour())
    }

    pub fn labels(&self) -> Vec<SlotLabel> {
        self.slots()
            .into_iter()
            .map(|t| {
                let time = t.format(TIME_FORMAT).to_string();
                let label = to_time_label(&time).unwrap_or_else(|| time.clone());
                SlotLabel { time, label }
            })
            .collect()
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 17,
        }
    }
}

/// Converts `HH:MM[:SS]` into a 12-hour label such as `9:00 AM`.
pub fn to_time_label(time: &str) -> Option<String> {
    let mut parts = time.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute = parts.next()?.trim();
    if hour > 23 || minute.len() != 2 || !minute.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour_12 = (hour + 11) % 12 + 1;
    Some(format!("{hour_12}:{minute} {suffix}"))
}
