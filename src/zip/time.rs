//! MS-DOS timestamps as stored in ZIP headers.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// A packed MS-DOS date/time pair with 2-second resolution.
///
/// One value is captured per archive and shared by every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const MIN: DosDateTime = DosDateTime {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// 2107-12-31 23:59:58, the latest representable instant.
    pub const MAX: DosDateTime = DosDateTime {
        time: (23 << 11) | (59 << 5) | (58 / 2),
        date: (127 << 9) | (12 << 5) | 31,
    };

    /// Current local wall-clock time.
    pub fn now() -> Self {
        Self::from_naive(&Local::now().naive_local())
    }

    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self::from_parts(
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    }

    /// Pack calendar fields, clamping to the range DOS dates can express.
    ///
    /// Each field is clamped into its bit width (month 1-12, day 1-31,
    /// hour 0-23, minute and second 0-59), so no field spills into its
    /// neighbour. Day is not checked against the month. Seconds are
    /// truncated to an even value.
    pub fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Self {
        if year < 1980 {
            return Self::MIN;
        }
        if year > 2107 {
            return Self::MAX;
        }

        let (month, day) = (month.clamp(1, 12), day.clamp(1, 31));
        let (hour, minute, second) = (hour.min(23), minute.min(59), second.min(59));

        let time = (hour << 11) | (minute << 5) | (second / 2);
        let date = (((year - 1980) as u32) << 9) | (month << 5) | day;

        Self {
            time: time as u16,
            date: date as u16,
        }
    }

    /// Parse date to (year, month, day)
    pub fn ymd(&self) -> (u16, u8, u8) {
        let day = (self.date & 0x1F) as u8;
        let month = ((self.date >> 5) & 0x0F) as u8;
        let year = ((self.date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse time to (hour, minute, second)
    pub fn hms(&self) -> (u8, u8, u8) {
        let second = ((self.time & 0x1F) * 2) as u8;
        let minute = ((self.time >> 5) & 0x3F) as u8;
        let hour = ((self.time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn packs_fields() {
        let dt = DosDateTime::from_parts(2025, 2, 12, 13, 41, 29);
        assert_eq!(dt.time, (13 << 11) | (41 << 5) | 14);
        assert_eq!(dt.date, (45 << 9) | (2 << 5) | 12);
        assert_eq!(dt.ymd(), (2025, 2, 12));
        assert_eq!(dt.hms(), (13, 41, 28));
    }

    #[test]
    fn from_naive_matches_parts() {
        let naive = NaiveDate::from_ymd_opt(1999, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .expect("valid date");
        let dt = DosDateTime::from_naive(&naive);
        assert_eq!(dt.ymd(), (1999, 12, 31));
        assert_eq!(dt.hms(), (23, 59, 58));
    }

    #[test]
    fn clamps_out_of_range_years() {
        assert_eq!(DosDateTime::from_parts(1970, 1, 1, 0, 0, 0), DosDateTime::MIN);
        assert_eq!(DosDateTime::MIN.ymd(), (1980, 1, 1));
        assert_eq!(DosDateTime::from_parts(2200, 6, 1, 12, 0, 0), DosDateTime::MAX);
        assert_eq!(DosDateTime::MAX.ymd(), (2107, 12, 31));
        assert_eq!(DosDateTime::MAX.hms(), (23, 59, 58));
    }

    #[test]
    fn out_of_range_fields_stay_in_their_bits() {
        let dt = DosDateTime::from_parts(2024, 16, 40, 35, 75, 90);
        assert_eq!(dt.ymd(), (2024, 12, 31));
        assert_eq!(dt.hms(), (23, 59, 58));

        let dt = DosDateTime::from_parts(2024, 0, 0, 0, 0, 0);
        assert_eq!(dt.ymd(), (2024, 1, 1));
    }

    #[test]
    fn now_is_in_range() {
        let (year, month, day) = DosDateTime::now().ymd();
        assert!((year, month, day) >= (1980, 1, 1));
        assert!((1..=12).contains(&month));
        assert!((1..=31).contains(&day));
    }
}
