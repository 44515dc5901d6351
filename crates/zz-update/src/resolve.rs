//! Finding the `zeiterfassung.txt` of a project on disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ProjectId;

/// Where project directories and their ledgers live.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Client directories, each containing one directory per project.
    pub clients: PathBuf,
    /// One directory per care activity.
    pub activities: PathBuf,
    pub activity_prefix: String,
    /// Subdirectories probed for the ledger, in order.
    pub ledger_dirs: Vec<String>,
    pub ledger_name: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            clients: PathBuf::from("/home/clients"),
            activities: PathBuf::from("/home/activities"),
            activity_prefix: "pflege".to_owned(),
            ledger_dirs: vec!["Management".to_owned(), "Projekt-Management".to_owned()],
            ledger_name: "zeiterfassung.txt".to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No directory found matching pattern {pattern}")]
    NoDirectory { pattern: String },
    #[error("Multiple directories found: {}", display_paths(.0))]
    MultipleDirectories(Vec<PathBuf>),
    #[error("No {ledger_name} found in {}", display_dirs(.ledger_dirs))]
    NoLedger {
        ledger_name: String,
        ledger_dirs: Vec<String>,
    },
}

/// `['a', 'b']`
fn display_paths(paths: &[PathBuf]) -> String {
    let paths: Vec<_> = paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect();
    format!("[{}]", paths.join(", "))
}

fn display_dirs(dirs: &[String]) -> String {
    let dirs: Vec<_> = dirs.iter().map(|dir| format!("{dir}/")).collect();
    dirs.join(" or ")
}

impl Layout {
    /// Find the single project directory belonging to `id`.
    pub fn find_directory(&self, id: &ProjectId) -> Result<PathBuf, ResolveError> {
        let (mut matches, pattern) = if id.is_project_number() {
            let matches = subdirectories(&self.clients)
                .into_iter()
                .flat_map(|client| subdirectories(&client))
                .filter(|dir| file_name(dir).contains(id.as_str()))
                .collect::<Vec<_>>();
            let pattern = format!("{}/*/*{id}*", self.clients.display());
            (matches, pattern)
        } else {
            let prefix = format!("{}-{id}", self.activity_prefix);
            let matches = subdirectories(&self.activities)
                .into_iter()
                .filter(|dir| file_name(dir).starts_with(&prefix))
                .collect::<Vec<_>>();
            let pattern = format!("{}/{prefix}*", self.activities.display());
            (matches, pattern)
        };
        matches.sort();
        tracing::debug!("{pattern} matched {matches:?}");

        match matches.len() {
            0 => Err(ResolveError::NoDirectory { pattern }),
            1 => Ok(matches.remove(0)),
            _ => Err(ResolveError::MultipleDirectories(matches)),
        }
    }

    /// Find the ledger in the first candidate subdirectory that has one.
    pub fn find_ledger(&self, directory: &Path) -> Result<PathBuf, ResolveError> {
        self.ledger_dirs
            .iter()
            .map(|dir| directory.join(dir).join(&self.ledger_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ResolveError::NoLedger {
                ledger_name: self.ledger_name.clone(),
                ledger_dirs: self.ledger_dirs.clone(),
            })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn subdirectories(path: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::debug!("Cannot list {}: {error}", path.display());
            return Vec::new();
        }
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        layout: Layout,
    }

    fn fixture(dirs: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        for path in dirs {
            fs::create_dir_all(dir.path().join(path)).unwrap();
        }
        let layout = Layout {
            clients: dir.path().join("clients"),
            activities: dir.path().join("activities"),
            ..Layout::default()
        };
        Fixture { _dir: dir, layout }
    }

    #[test]
    fn finds_single_project_directory() {
        let fixture = fixture(&["clients/acme/4711-relaunch", "clients/acme/4712-shop"]);
        let dir = fixture.layout.find_directory(&ProjectId::new("4711")).unwrap();
        assert_eq!(dir, fixture.layout.clients.join("acme/4711-relaunch"));
    }

    #[test]
    fn project_number_may_appear_anywhere_in_name() {
        let fixture = fixture(&["clients/acme/relaunch-4711"]);
        let dir = fixture.layout.find_directory(&ProjectId::new("4711")).unwrap();
        assert_eq!(dir, fixture.layout.clients.join("acme/relaunch-4711"));
    }

    #[test]
    fn project_directories_are_one_level_deep() {
        let fixture = fixture(&["clients/4711-misplaced", "clients/acme/archive/4711-old"]);
        let error = fixture
            .layout
            .find_directory(&ProjectId::new("4711"))
            .unwrap_err();
        assert!(matches!(error, ResolveError::NoDirectory { .. }));
    }

    #[test]
    fn no_match_is_an_error() {
        let fixture = fixture(&["clients/acme/4712-shop"]);
        let error = fixture
            .layout
            .find_directory(&ProjectId::new("4711"))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            format!(
                "No directory found matching pattern {}/*/*4711*",
                fixture.layout.clients.display()
            )
        );
    }

    #[test]
    fn multiple_matches_are_an_error() {
        let fixture = fixture(&["clients/acme/4711-relaunch", "clients/globex/4711-old"]);
        let error = fixture
            .layout
            .find_directory(&ProjectId::new("4711"))
            .unwrap_err();
        let ResolveError::MultipleDirectories(matches) = &error else {
            panic!("unexpected {error:?}");
        };
        assert_eq!(
            matches,
            &[
                fixture.layout.clients.join("acme/4711-relaunch"),
                fixture.layout.clients.join("globex/4711-old"),
            ]
        );
        assert_eq!(
            error.to_string(),
            format!(
                "Multiple directories found: ['{0}/acme/4711-relaunch', '{0}/globex/4711-old']",
                fixture.layout.clients.display()
            )
        );
    }

    #[test]
    fn finds_activity_directory_by_prefix() {
        let fixture = fixture(&["activities/pflege-server-2024", "activities/pflege-wiki"]);
        let dir = fixture
            .layout
            .find_directory(&ProjectId::new("server"))
            .unwrap();
        assert_eq!(dir, fixture.layout.activities.join("pflege-server-2024"));
    }

    #[test]
    fn activity_must_be_prefixed() {
        let fixture = fixture(&["activities/server-pflege"]);
        let error = fixture
            .layout
            .find_directory(&ProjectId::new("server"))
            .unwrap_err();
        assert!(matches!(error, ResolveError::NoDirectory { .. }));
    }

    #[test]
    fn missing_root_counts_as_no_match() {
        let fixture = fixture(&[]);
        let error = fixture
            .layout
            .find_directory(&ProjectId::new("4711"))
            .unwrap_err();
        assert!(matches!(error, ResolveError::NoDirectory { .. }));
    }

    #[test]
    fn ledger_prefers_management() {
        let fixture = fixture(&["project/Management", "project/Projekt-Management"]);
        let project = fixture.layout.clients.parent().unwrap().join("project");
        fs::write(project.join("Management/zeiterfassung.txt"), "").unwrap();
        fs::write(project.join("Projekt-Management/zeiterfassung.txt"), "").unwrap();

        let ledger = fixture.layout.find_ledger(&project).unwrap();
        assert_eq!(ledger, project.join("Management/zeiterfassung.txt"));
    }

    #[test]
    fn ledger_falls_back_to_projekt_management() {
        let fixture = fixture(&["project/Management", "project/Projekt-Management"]);
        let project = fixture.layout.clients.parent().unwrap().join("project");
        fs::write(project.join("Projekt-Management/zeiterfassung.txt"), "").unwrap();

        let ledger = fixture.layout.find_ledger(&project).unwrap();
        assert_eq!(ledger, project.join("Projekt-Management/zeiterfassung.txt"));
    }

    #[test]
    fn missing_ledger_is_an_error() {
        let fixture = fixture(&["project"]);
        let project = fixture.layout.clients.parent().unwrap().join("project");

        let error = fixture.layout.find_ledger(&project).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No zeiterfassung.txt found in Management/ or Projekt-Management/"
        );
    }
}
