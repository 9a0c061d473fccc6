use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_database::{ClinicStore, StoreError};
use shared_models::entities::{Doctor, TimeRange};
use shared_utils::clock::Clock;
use shared_utils::state::AppState;

use crate::models::DoctorError;

/// Derives free time from declared working hours minus booked slots. Read-only.
pub struct AvailabilityService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
        }
    }

    /// Free ranges for `doctor_id` on `date`, earliest first and non-overlapping.
    pub fn available_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<TimeRange>, DoctorError> {
        let doctor = self.store.find_doctor_by_id(doctor_id).map_err(|e| match e {
            StoreError::NotFound { .. } => DoctorError::NotFound(doctor_id),
            other => DoctorError::Store(other),
        })?;

        if date < self.clock.today() {
            return Err(DoctorError::PastDate(date));
        }

        let slots = self.free_ranges_excluding(&doctor, date, None);
        debug!("Doctor {} has {} free range(s) on {}", doctor_id, slots.len(), date);

        Ok(slots)
    }

    /// Free ranges on `date`, ignoring the appointment `exclude` when given.
    pub fn free_ranges_excluding(&self, doctor: &Doctor, date: NaiveDate, exclude: Option<Uuid>) -> Vec<TimeRange> {
        let windows = doctor.windows_on(date);
        if windows.is_empty() {
            return Vec::new();
        }

        // A slot starting late on the previous day can spill past midnight.
        let mut days = vec![date];
        if let Some(previous) = date.checked_sub_days(Days::new(1)) {
            days.push(previous);
        }

        let busy: Vec<TimeRange> = days
            .into_iter()
            .flat_map(|day| self.store.list_appointments_for_doctor_on_date(doctor.id, day))
            .filter(|appointment| Some(appointment.id) != exclude)
            .map(|appointment| appointment.slot())
            .collect();

        free_ranges(windows, &busy)
    }
}

/// Merges overlapping or abutting windows, then cuts every busy range out of them.
pub fn free_ranges(mut windows: Vec<TimeRange>, busy: &[TimeRange]) -> Vec<TimeRange> {
    windows.retain(|w| !w.is_empty());
    windows.sort();

    let mut merged: Vec<TimeRange> = Vec::with_capacity(windows.len());
    for window in windows {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => {
                if window.end > last.end {
                    last.end = window.end;
                }
            }
            _ => merged.push(window),
        }
    }

    let mut busy: Vec<TimeRange> = busy.to_vec();
    busy.sort();

    let mut free = Vec::new();
    for window in merged {
        let mut cursor = window.start;
        for taken in busy.iter().filter(|b| b.overlaps(&window)) {
            if taken.start > cursor {
                free.push(TimeRange::new(cursor, taken.start));
            }
            if taken.end > cursor {
                cursor = taken.end;
            }
        }
        if cursor < window.end {
            free.push(TimeRange::new(cursor, window.end));
        }
    }

    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn range(sh: u32, sm: u32, eh: u32, em: u32) -> TimeRange {
        TimeRange::new(at(sh, sm), at(eh, em))
    }

    #[test]
    fn test_no_busy_returns_window() {
        let free = free_ranges(vec![range(9, 0, 17, 0)], &[]);
        assert_eq!(free, vec![range(9, 0, 17, 0)]);
    }

    #[test]
    fn test_busy_slot_splits_window() {
        let free = free_ranges(vec![range(9, 0, 17, 0)], &[range(10, 0, 11, 0)]);
        assert_eq!(free, vec![range(9, 0, 10, 0), range(11, 0, 17, 0)]);
    }

    #[test]
    fn test_abutting_windows_merge() {
        let free = free_ranges(vec![range(13, 0, 17, 0), range(9, 0, 13, 0)], &[]);
        assert_eq!(free, vec![range(9, 0, 17, 0)]);
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let free = free_ranges(vec![range(9, 0, 12, 0), range(11, 0, 14, 0), range(15, 0, 16, 0)], &[]);
        assert_eq!(free, vec![range(9, 0, 14, 0), range(15, 0, 16, 0)]);
    }

    #[test]
    fn test_back_to_back_bookings_leave_no_gap() {
        let busy = [range(9, 0, 10, 0), range(10, 0, 11, 0)];
        let free = free_ranges(vec![range(9, 0, 12, 0)], &busy);
        assert_eq!(free, vec![range(11, 0, 12, 0)]);
    }

    #[test]
    fn test_busy_outside_window_is_ignored() {
        let busy = [range(7, 0, 8, 0), range(16, 30, 17, 30)];
        let free = free_ranges(vec![range(9, 0, 17, 0)], &busy);
        assert_eq!(free, vec![range(9, 0, 16, 30)]);
    }

    #[test]
    fn test_free_plus_busy_reconstructs_window() {
        let window = range(9, 0, 17, 0);
        let busy = [range(9, 0, 10, 0), range(12, 0, 13, 0), range(16, 0, 17, 0)];
        let free = free_ranges(vec![window], &busy);

        let total: i64 = free
            .iter()
            .chain(busy.iter())
            .map(|r| r.duration().num_minutes())
            .sum();
        assert_eq!(total, window.duration().num_minutes());

        for pair in free.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }
}
