//! Reference dates for the date-window filters and renewal counts.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Renewals due within this many days of today count as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO weeks
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// The day calculations are made against, plus the week convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub today: NaiveDate,
    pub week_start: WeekStart,
}

impl Calendar {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            week_start: WeekStart::default(),
        }
    }

    /// Uses the local date of the machine.
    pub fn local(week_start: WeekStart) -> Self {
        Self {
            today: Local::now().date_naive(),
            week_start,
        }
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.today
    }

    /// `[today, today + 7 days]`, both ends inclusive.
    pub fn is_upcoming(&self, date: NaiveDate) -> bool {
        is_upcoming(date, self.today)
    }

    /// First and last day of the calendar week containing today.
    pub fn week_bounds(&self) -> (NaiveDate, NaiveDate) {
        let offset = match self.week_start {
            WeekStart::Monday => self.today.weekday().num_days_from_monday(),
            WeekStart::Sunday => self.today.weekday().num_days_from_sunday(),
        };
        let start = self.today - Duration::days(i64::from(offset));
        (start, start + Duration::days(6))
    }

    pub fn is_this_week(&self, date: NaiveDate) -> bool {
        let (start, end) = self.week_bounds();
        start <= date && date <= end
    }

    pub fn is_this_month(&self, date: NaiveDate) -> bool {
        date.year() == self.today.year() && date.month() == self.today.month()
    }
}

pub fn is_upcoming(date: NaiveDate, today: NaiveDate) -> bool {
    let cutoff = today + Duration::days(UPCOMING_WINDOW_DAYS);
    today <= date && date <= cutoff
}
