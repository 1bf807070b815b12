//! Daily pick rotation.
//!
//! One id is picked per calendar day. The user may spin for a different one,
//! and every same-day spin bumps a reroll counter that silently reads as zero
//! once the day has turned over.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::persist::{Persistence, StoreKey};
use crate::store::{lock, Stores};
use crate::utils::Clock;

/// Default upper bound for randomly drawn ids.
pub const DEFAULT_MAX_POKEMON_ID: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyState {
    pub daily_id: Option<u32>,
    /// Serialised as `YYYY-MM-DD`; compared only, never used as a timestamp.
    pub daily_date: Option<NaiveDate>,
    pub reroll_count: u32,
    pub reroll_date: Option<NaiveDate>,
}

impl DailyState {
    /// Return today's pick, drawing a new one when the stored pick is from
    /// another day (or missing). A fresh pick resets the reroll counter.
    pub fn get_or_create(&mut self, today: NaiveDate, draw: impl FnOnce() -> u32) -> u32 {
        if let (Some(id), Some(date)) = (self.daily_id, self.daily_date) {
            if date == today {
                return id;
            }
        }

        let id = draw();
        *self = DailyState {
            daily_id: Some(id),
            daily_date: Some(today),
            reroll_count: 0,
            reroll_date: Some(today),
        };
        id
    }

    /// Overwrite today's pick, counting it as a reroll.
    pub fn set(&mut self, id: u32, today: NaiveDate) {
        if self.reroll_date != Some(today) {
            self.reroll_count = 1;
            self.reroll_date = Some(today);
        } else {
            self.reroll_count += 1;
        }
        self.daily_id = Some(id);
        self.daily_date = Some(today);
    }

    /// Rerolls made today. A count stored on an earlier day reads as 0.
    pub fn reroll_count(&self, today: NaiveDate) -> u32 {
        if self.reroll_date == Some(today) {
            self.reroll_count
        } else {
            0
        }
    }
}

/// Owns the daily pick on behalf of the service, persisting after every change.
#[derive(Clone)]
pub struct DailyRotationTracker {
    stores: Arc<Stores>,
    persistence: Persistence,
    clock: Arc<dyn Clock>,
    max_id: u32,
}

impl DailyRotationTracker {
    pub fn new(
        stores: Arc<Stores>,
        persistence: Persistence,
        clock: Arc<dyn Clock>,
        max_id: u32,
    ) -> Self {
        Self {
            stores,
            persistence,
            clock,
            max_id: max_id.max(1),
        }
    }

    fn draw(&self) -> u32 {
        rand::thread_rng().gen_range(1..=self.max_id)
    }

    pub fn get_or_create_daily(&self) -> u32 {
        let today = self.clock.today();
        let (id, changed) = {
            let mut daily = lock(&self.stores.daily);
            let before = daily.clone();
            let id = daily.get_or_create(today, || self.draw());
            (id, *daily != before)
        };
        if changed {
            info!(id, %today, "New daily pick");
            self.persistence.persist(&self.stores, StoreKey::Daily);
        }
        id
    }

    pub fn set_daily(&self, id: u32) {
        let today = self.clock.today();
        let count = {
            let mut daily = lock(&self.stores.daily);
            daily.set(id, today);
            daily.reroll_count
        };
        debug!(id, reroll_count = count, "Daily pick overwritten");
        self.persistence.persist(&self.stores, StoreKey::Daily);
    }

    /// Draw a random id and apply it as a reroll.
    pub fn reroll(&self) -> u32 {
        let id = self.draw();
        self.set_daily(id);
        id
    }

    pub fn reroll_count(&self) -> u32 {
        lock(&self.stores.daily).reroll_count(self.clock.today())
    }

    pub fn state(&self) -> DailyState {
        lock(&self.stores.daily).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryBlobStore;
    use crate::utils::FixedClock;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
    }

    #[test]
    fn test_rollover_draws_new_pick_and_resets_rerolls() {
        let mut state = DailyState {
            daily_id: Some(10),
            daily_date: Some(day(1)),
            reroll_count: 4,
            reroll_date: Some(day(1)),
        };

        let id = state.get_or_create(day(2), || 77);

        assert_eq!(id, 77);
        assert_eq!(state.daily_date, Some(day(2)));
        assert_eq!(state.reroll_count, 0);
        assert_eq!(state.reroll_date, Some(day(2)));
    }

    #[test]
    fn test_same_day_pick_is_stable() {
        let mut state = DailyState::default();
        let first = state.get_or_create(day(3), || 5);
        let second = state.get_or_create(day(3), || panic!("must not redraw"));
        assert_eq!(first, 5);
        assert_eq!(second, 5);
    }

    #[test]
    fn test_missing_id_with_today_date_redraws() {
        let mut state = DailyState {
            daily_date: Some(day(3)),
            ..DailyState::default()
        };
        assert_eq!(state.get_or_create(day(3), || 9), 9);
    }

    #[test]
    fn test_reroll_counting_same_day() {
        let mut state = DailyState::default();
        state.get_or_create(day(4), || 1);
        state.set(100, day(4));
        state.set(200, day(4));

        assert_eq!(state.reroll_count(day(4)), 2);
        assert_eq!(state.daily_id, Some(200));
    }

    #[test]
    fn test_set_on_new_day_starts_count_at_one() {
        let mut state = DailyState {
            daily_id: Some(1),
            daily_date: Some(day(1)),
            reroll_count: 3,
            reroll_date: Some(day(1)),
        };
        state.set(42, day(2));
        assert_eq!(state.reroll_count, 1);
        assert_eq!(state.daily_date, Some(day(2)));
    }

    #[test]
    fn test_stale_reroll_count_reads_zero_without_mutation() {
        let state = DailyState {
            daily_id: Some(1),
            daily_date: Some(day(1)),
            reroll_count: 3,
            reroll_date: Some(day(1)),
        };
        assert_eq!(state.reroll_count(day(2)), 0);
        assert_eq!(state.reroll_count, 3);
    }

    #[test]
    fn test_dates_serialize_as_calendar_strings() {
        let state = DailyState {
            daily_id: Some(1),
            daily_date: Some(day(9)),
            reroll_count: 0,
            reroll_date: None,
        };
        let json = serde_json::to_string(&state).expect("serialize");
        assert!(json.contains("\"2024-05-09\""));
    }

    #[test]
    fn test_tracker_persists_and_follows_clock() {
        let stores = Arc::new(Stores::default());
        let blobs = Arc::new(MemoryBlobStore::new());
        let persistence = Persistence::new(blobs.clone());
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = DailyRotationTracker::new(stores, persistence.clone(), clock.clone(), 151);

        let first = tracker.get_or_create_daily();
        assert!((1..=151).contains(&first));
        assert_eq!(tracker.get_or_create_daily(), first);

        tracker.set_daily(25);
        assert_eq!(tracker.reroll_count(), 1);

        clock.set(day(2));
        assert_eq!(tracker.reroll_count(), 0);

        let stored = persistence.load().expect("load").expect("snapshot");
        assert_eq!(stored.daily.daily_id, Some(25));
        assert_eq!(stored.daily.reroll_count, 1);
    }

    #[test]
    fn test_reroll_stays_in_range() {
        let stores = Arc::new(Stores::default());
        let persistence = Persistence::new(Arc::new(MemoryBlobStore::new()));
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = DailyRotationTracker::new(stores, persistence, clock, 3);

        for _ in 0..20 {
            let id = tracker.reroll();
            assert!((1..=3).contains(&id));
        }
        assert_eq!(tracker.reroll_count(), 20);
    }
}
