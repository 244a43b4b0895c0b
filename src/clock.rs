use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Wall clock pinned to an explicitly configured UTC offset, so every
/// date-window computation (check-in day, daily report, job triggers) agrees
/// with the business timezone instead of whatever the host happens to run in.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        Self { offset }
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Half-open datetime window covering a single calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_hms_opt(0, 0, 0).unwrap();
    let end = (date + chrono::Duration::days(1)).and_hms_opt(0, 0, 0).unwrap();
    (start, end)
}

/// Half-open date window covering a calendar month. `None` for month
/// outside 1..=12.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next))
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}
