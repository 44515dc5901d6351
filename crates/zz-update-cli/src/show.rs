use std::fmt::Display;
use std::io::Write;

use anstyle::{Effects, Style};
use anyhow::{Result, bail};
use zz_update::commit::{Commit, CommitOutcome, Confirm};
use zz_update::reconcile::reconcile;
use zz_update::{Classified, Ledger, ProjectId, TimeEntry, Timesheet};

use crate::Settings;

#[derive(Debug, Clone, Copy)]
pub struct Styles {
    pub heading: Style,
    pub file: Style,
}

impl Styles {
    pub fn ansi() -> Self {
        Styles {
            heading: Style::new().effects(Effects::BOLD),
            file: Style::new().effects(Effects::UNDERLINE),
        }
    }

    pub fn plain() -> Self {
        Styles {
            heading: Style::new(),
            file: Style::new(),
        }
    }

    /// Plain output if `NO_COLOR` is set.
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Styles::plain(),
            _ => Styles::ansi(),
        }
    }
}

/// Read the recent getan entries and report, per project, which lines are missing
/// from its ledger. With `automatic`, the missing lines are added and committed.
pub fn update(settings: &Settings, out: &mut dyn Write, confirm: &mut dyn Confirm) -> Result<()> {
    let entries = {
        let timesheet = Timesheet::open(&settings.database)?;
        timesheet.entries_since(settings.today, settings.days)?
    };

    let classified = settings.classifier.classify(entries);

    if !classified.impossible.is_empty() {
        show_impossible(settings, &classified, out)?;
    }

    for (id, entries) in &classified.projects {
        update_project(settings, id, entries, out, confirm)?;
    }

    Ok(())
}

fn show_impossible(
    settings: &Settings,
    classified: &Classified,
    out: &mut dyn Write,
) -> Result<()> {
    let impossible = &classified.impossible;
    if settings.verbose {
        writeln!(out, "Impossible to handle these entries:")?;
        for entry in impossible.values().flatten() {
            writeln!(
                out,
                "{} {:2}:{:02} {:15} {}",
                entry.day.format("%d.%m.%Y"),
                entry.hours,
                entry.minutes,
                entry.project_description,
                entry.description
            )?;
        }
    } else {
        let projects: Vec<&str> = impossible.keys().map(String::as_str).collect();
        writeln!(out, "Impossible to handle entries for {}", projects.join(", "))?;
    }
    Ok(())
}

fn update_project(
    settings: &Settings,
    id: &ProjectId,
    entries: &[TimeEntry],
    out: &mut dyn Write,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let heading = settings.styles.heading;
    if id.is_project_number() {
        writeln!(out, "{heading}Handle Project #{id}{heading:#}")?;
    } else {
        let activity = capitalize(&settings.classifier.care_keyword);
        writeln!(out, "{heading}Handle Activity {activity} {id}{heading:#}")?;
    }

    let directory = match settings.layout.find_directory(id) {
        Ok(directory) => directory,
        Err(error) => return report(out, "Warning", &error),
    };
    if settings.verbose {
        writeln!(out, "  Found directory: {}", directory.display())?;
    }

    let ledger_path = match settings.layout.find_ledger(&directory) {
        Ok(path) => path,
        Err(error) => return report(out, "Warning", &error),
    };
    let file = settings.styles.file;
    writeln!(
        out,
        "  {file}{}{file:#}: {}",
        settings.layout.ledger_name,
        ledger_path.display()
    )?;

    let ledger = match Ledger::read(&ledger_path) {
        Ok(ledger) => ledger,
        Err(error) => return report(out, "Error", &error),
    };
    if let Err(error) = ledger.open_block() {
        return report(out, "Error", &error);
    }

    let reconciliation = reconcile(&ledger, entries, &settings.shorthand);

    if settings.verbose && reconciliation.existing().next().is_some() {
        writeln!(out, "  Skipping already existing entries:")?;
        // indented, so that it is not copied along with the new ones
        for line in reconciliation.existing() {
            writeln!(out, "  {line}")?;
        }
    }

    if !reconciliation.has_new_lines() {
        return Ok(());
    }
    writeln!(out, "  New entries:")?;
    for line in reconciliation.new_lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    if settings.automatic {
        let commit = Commit {
            tools: &settings.tools,
            ledger: &ledger_path,
            shorthand: &settings.shorthand,
            today: settings.today,
        };
        match commit.run(reconciliation.new_lines(), confirm)? {
            CommitOutcome::Committed | CommitOutcome::Unversioned => {}
            CommitOutcome::Declined => bail!("Aborted, {} is not committed", ledger_path.display()),
        }
    }

    Ok(())
}

/// Print a skipped project's reason, one prefixed line per message line.
fn report(out: &mut dyn Write, level: &str, message: &dyn Display) -> Result<()> {
    for line in message.to_string().lines() {
        writeln!(out, "  {level}: {line}")?;
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
