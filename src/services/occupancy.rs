use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::models::booking::{slot_time, TIME_FORMAT};
use crate::models::Booking;
use crate::services::slots::{to_time_label, SlotGrid};

/// Slot time to booking for a single date. Built by folding the day's bookings
/// in store order, so a later booking at the same time replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    by_time: HashMap<NaiveTime, Booking>,
    shadowed: BTreeMap<NaiveTime, Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub label: String,
    pub booking: Option<Booking>,
}

/// A slot where more than one booking landed. `hidden` are the ids the slot
/// view does not show.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShadowedSlot {
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub visible: String,
    pub hidden: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub slots: Vec<SlotView>,
    pub shadowed: Vec<ShadowedSlot>,
    pub unaligned: Vec<Booking>,
}

impl OccupancyMap {
    pub fn build<'a, I>(bookings: I) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut map = Self::default();
        for booking in bookings {
            if let Some(previous) = map.by_time.insert(booking.scheduled_time, booking.clone()) {
                map.shadowed
                    .entry(booking.scheduled_time)
                    .or_default()
                    .push(previous.id);
            }
        }
        map
    }

    pub fn get(&self, slot: &NaiveTime) -> Option<&Booking> {
        self.by_time.get(slot)
    }

    pub fn is_occupied(&self, slot: &NaiveTime) -> bool {
        self.by_time.contains_key(slot)
    }

    pub fn shadowed(&self) -> Vec<ShadowedSlot> {
        self.shadowed
            .iter()
            .filter_map(|(time, hidden)| {
                let visible = self.by_time.get(time)?;
                Some(ShadowedSlot {
                    time: *time,
                    visible: visible.id.clone(),
                    hidden: hidden.clone(),
                })
            })
            .collect()
    }

    /// Bookings whose time is not on the grid, ordered by time.
    pub fn unaligned(&self, grid: &SlotGrid) -> Vec<Booking> {
        let mut off_grid: Vec<Booking> = self
            .by_time
            .values()
            .filter(|b| !grid.contains(&b.scheduled_time))
            .cloned()
            .collect();
        off_grid.sort_by_key(|b| b.scheduled_time);
        off_grid
    }

    pub fn day_view(&self, date: NaiveDate, grid: &SlotGrid) -> DayView {
        let slots = grid
            .slots()
            .into_iter()
            .map(|time| {
                let key = time.format(TIME_FORMAT).to_string();
                SlotView {
                    time,
                    label: to_time_label(&key).unwrap_or(key),
                    booking: self.get(&time).cloned(),
                }
            })
            .collect();

        DayView {
            date,
            slots,
            shadowed: self.shadowed(),
            unaligned: self.unaligned(grid),
        }
    }
}
