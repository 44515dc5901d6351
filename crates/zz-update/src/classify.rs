//! Sorting time entries into the projects they are booked on.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::TimeEntry;

static PROJECT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([0-9]+)").unwrap());

/// Identifier of the ledger an entry belongs to.
///
/// Client projects are identified by their number, care activities by their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ProjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a client project number rather than an activity name.
    pub fn is_project_number(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    pub ignored_keys: HashSet<String>,
    pub impossible_keys: HashSet<String>,
    /// Project descriptions starting with this word (any case) are activities.
    pub care_keyword: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            // Arbeitsorganisation, IT-Infrastruktur, Organisieren, Qualifikation,
            // Buchhaltung, Büro, Menschen fördern, Unternehmen, Marketing
            ignored_keys: ["A", "w", "o", "Q", "B", "ü", "M", "u", "k"]
                .into_iter()
                .map(String::from)
                .collect(),
            // Akquise
            impossible_keys: ["q"].into_iter().map(String::from).collect(),
            care_keyword: "pflege".to_owned(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Classified {
    /// Entries that cannot be booked anywhere, keyed by project description.
    pub impossible: IndexMap<String, Vec<TimeEntry>>,
    /// Bookable entries per project, in first-seen order.
    pub projects: IndexMap<ProjectId, Vec<TimeEntry>>,
}

impl Classifier {
    pub fn classify(&self, entries: impl IntoIterator<Item = TimeEntry>) -> Classified {
        let mut classified = Classified::default();

        for entry in entries {
            if self.ignored_keys.contains(&entry.project_key) {
                continue;
            }
            if self.impossible_keys.contains(&entry.project_key) {
                classified
                    .impossible
                    .entry(entry.project_description.clone())
                    .or_default()
                    .push(entry);
                continue;
            }

            let id = self.project_id(&entry.project_description);
            classified.projects.entry(id).or_default().push(entry);
        }

        classified
    }

    /// Derive the ledger identifier from a getan project description.
    ///
    /// `Pflege Foo ...` becomes the activity `foo`, anything else the digits of the
    /// first `#<digits>`, or the empty identifier if there are none.
    pub fn project_id(&self, project_description: &str) -> ProjectId {
        if starts_with_ignore_case(project_description, &self.care_keyword) {
            let activity = project_description
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_lowercase();
            return ProjectId(activity);
        }

        let number = PROJECT_NUMBER
            .captures(project_description)
            .and_then(|captures| captures.get(1))
            .map_or("", |m| m.as_str());
        ProjectId(number.to_owned())
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(key: &str, project: &str, description: &str) -> TimeEntry {
        TimeEntry {
            day: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            hours: 1,
            minutes: 0,
            description: description.to_owned(),
            project_key: key.to_owned(),
            project_description: project.to_owned(),
        }
    }

    fn descriptions(entries: &[TimeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.description.as_str()).collect()
    }

    #[test]
    fn project_id_from_number() {
        let classifier = Classifier::default();
        assert_eq!(classifier.project_id("Relaunch #4711").as_str(), "4711");
        assert_eq!(classifier.project_id("#12 and #34").as_str(), "12");
        assert_eq!(classifier.project_id("ACME (#0815) Support").as_str(), "0815");
    }

    #[test]
    fn project_id_without_number_is_empty() {
        let classifier = Classifier::default();
        let id = classifier.project_id("Website # relaunch");
        assert_eq!(id.as_str(), "");
        assert!(!id.is_project_number());
    }

    #[test]
    fn project_id_for_care_activity() {
        let classifier = Classifier::default();
        assert_eq!(classifier.project_id("Pflege Server #12").as_str(), "server");
        assert_eq!(classifier.project_id("PFLEGE Wiki").as_str(), "wiki");
        assert_eq!(classifier.project_id("pflege").as_str(), "");
    }

    #[test]
    fn project_number_detection() {
        assert!(ProjectId::new("4711").is_project_number());
        assert!(!ProjectId::new("server").is_project_number());
        assert!(!ProjectId::new("").is_project_number());
    }

    #[test]
    fn ignored_entries_are_dropped() {
        let classified = Classifier::default().classify([
            entry("B", "Buchhaltung", "Belege"),
            entry("ü", "Büro", "Post"),
            entry("a", "Relaunch #4711", "Layout"),
        ]);

        assert!(classified.impossible.is_empty());
        assert_eq!(classified.projects.len(), 1);
        assert_eq!(
            descriptions(&classified.projects[&ProjectId::new("4711")]),
            ["Layout"]
        );
    }

    #[test]
    fn impossible_entries_are_reported_only_there() {
        let classified = Classifier::default().classify([
            entry("q", "Akquise #99", "Angebot"),
            entry("q", "Akquise #99", "Telefonat"),
            entry("a", "Relaunch #4711", "Layout"),
        ]);

        assert_eq!(classified.impossible.len(), 1);
        assert_eq!(
            descriptions(&classified.impossible["Akquise #99"]),
            ["Angebot", "Telefonat"]
        );
        assert!(!classified.projects.contains_key(&ProjectId::new("99")));
    }

    #[test]
    fn groups_keep_arrival_order() {
        let classified = Classifier::default().classify([
            entry("p", "Pflege Server", "Updates"),
            entry("a", "Relaunch #4711", "Layout"),
            entry("p", "Pflege Server", "Backups"),
            entry("a", "Relaunch #4711", "Review"),
        ]);

        let ids: Vec<_> = classified.projects.keys().map(ProjectId::as_str).collect();
        assert_eq!(ids, ["server", "4711"]);
        assert_eq!(
            descriptions(&classified.projects[&ProjectId::new("server")]),
            ["Updates", "Backups"]
        );
        assert_eq!(
            descriptions(&classified.projects[&ProjectId::new("4711")]),
            ["Layout", "Review"]
        );
    }
}
