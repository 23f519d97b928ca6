//! Year-by-year timeline playback.

use std::ops::RangeInclusive;
use std::time::Duration;

use foundation::time::Time;

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    pub first_year: i32,
    pub last_year: i32,
    pub step: Duration,
    /// Years skipped during playback; landing in the gap jumps past it.
    pub gap: Option<RangeInclusive<i32>>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            first_year: 1914,
            last_year: 1945,
            step: Duration::from_secs(2),
            gap: Some(1921..=1938),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    config: TimelineConfig,
    year: Option<i32>,
    next_step: Option<Time>,
}

impl Default for TimelinePlayer {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelinePlayer {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            year: None,
            next_step: None,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn is_playing(&self) -> bool {
        self.next_step.is_some()
    }

    /// Scrub to `year`, clamped to the configured range. Does not change play state.
    pub fn set_year(&mut self, year: i32) -> i32 {
        let y = year.clamp(self.config.first_year, self.config.last_year);
        self.year = Some(y);
        y
    }

    pub fn clear_year(&mut self) {
        self.year = None;
    }

    /// Start playback. Returns the year if starting had to pick one.
    pub fn play(&mut self, now: Time) -> Option<i32> {
        let started = match self.year {
            Some(_) => None,
            None => Some(self.set_year(self.config.first_year)),
        };
        self.next_step = Some(now.after(self.config.step));
        started
    }

    pub fn pause(&mut self) {
        self.next_step = None;
    }

    pub fn toggle(&mut self, now: Time) -> Option<i32> {
        if self.is_playing() {
            self.pause();
            None
        } else {
            self.play(now)
        }
    }

    /// Step one year forward. At the end of the range playback stops and
    /// the year stays put.
    pub fn advance(&mut self) -> Option<i32> {
        let current = self.year.unwrap_or(self.config.first_year - 1);
        let mut next = current + 1;
        if let Some(gap) = &self.config.gap
            && gap.contains(&next)
        {
            next = gap.end() + 1;
        }
        if next > self.config.last_year {
            self.pause();
            return None;
        }
        self.year = Some(next);
        Some(next)
    }

    /// Drive playback from the frame clock. Returns the new year when one step fires.
    pub fn tick(&mut self, now: Time) -> Option<i32> {
        let due = self.next_step?;
        if now < due {
            return None;
        }
        self.next_step = Some(due.after(self.config.step));
        self.advance()
    }
}
