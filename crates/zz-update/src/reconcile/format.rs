use std::fmt;

use crate::TimeEntry;

/// A time entry rendered as a `zeiterfassung.txt` line.
///
/// `01.03.2024  3:15h ? abc Layout`: day, duration, the `?` placeholder for the
/// billing category, the shorthand of the person and the description.
pub struct LedgerLine<'a> {
    pub entry: &'a TimeEntry,
    pub shorthand: &'a str,
}

impl fmt::Display for LedgerLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry;
        write!(
            f,
            "{} {:>2}:{:02}h ? {:<3.3} {}",
            entry.day.format("%d.%m.%Y"),
            entry.hours,
            entry.minutes,
            self.shorthand,
            entry.description
        )
    }
}

pub fn format_entry(entry: &TimeEntry, shorthand: &str) -> String {
    LedgerLine { entry, shorthand }.to_string()
}
