//! Adding new lines to a ledger with the editor and committing them.
//!
//! The ledger is edited interactively: the editor opens with the new lines already
//! inserted in front of the last block separator, so they can be reviewed and
//! adjusted before saving. If the ledger is in a mercurial repository, the
//! working copy is brought up to date first and the result is committed after
//! confirmation.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, bail};
use chrono::NaiveDate;

use crate::Result;

/// External programs, each given as program and leading arguments.
#[derive(Debug, Clone)]
pub struct Tools {
    pub vcs: Vec<String>,
    pub editor: Vec<String>,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            vcs: vec!["hg".to_owned()],
            editor: vec!["vim".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The ledger was edited, but is not under version control.
    Unversioned,
    /// The user did not confirm the commit.
    Declined,
}

pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Asks on a line based terminal; only `y` confirms.
pub struct Prompt<R, W> {
    pub input: R,
    pub output: W,
}

impl Prompt<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Prompt {
            input: std::io::stdin().lock(),
            output: std::io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\n', '\r']) == "y")
    }
}

pub struct Commit<'a> {
    pub tools: &'a Tools,
    pub ledger: &'a Path,
    pub shorthand: &'a str,
    pub today: NaiveDate,
}

impl Commit<'_> {
    /// Insert `lines` before the last separator of the ledger and commit the change.
    pub fn run<'l>(
        &self,
        lines: impl IntoIterator<Item = &'l str>,
        confirm: &mut dyn Confirm,
    ) -> Result<CommitOutcome> {
        let ledger = std::path::absolute(self.ledger)
            .with_context(|| format!("Invalid ledger path {}", self.ledger.display()))?;
        let directory = ledger
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut scratch = tempfile::Builder::new()
            .prefix("zz-update-")
            .suffix(".txt")
            .tempfile()
            .context("Failed to create scratch file")?;
        for line in lines {
            writeln!(scratch, "{line}")?;
        }
        // the editor reads the file by name
        scratch.flush()?;

        let vcs = Vcs {
            argv: &self.tools.vcs,
            directory: &directory,
        };
        let versioned = vcs.is_repository()?;
        if versioned {
            vcs.run(&["update"])?;
            if vcs.has_remote()? {
                vcs.run(&["pull", "--update"])?;
            }
        }

        let mut editor = command(&self.tools.editor, &directory)?;
        editor
            .arg("-c")
            .arg(insert_command(scratch.path()))
            .arg(&ledger);
        tracing::info!("Running {editor:?}");
        let status = editor
            .status()
            .with_context(|| format!("Failed to start editor {:?}", self.tools.editor))?;
        tracing::debug!("Editor exited with {status}");

        if !versioned {
            return Ok(CommitOutcome::Unversioned);
        }

        vcs.run(&["diff"])?;
        if !confirm.confirm("Commit this (y)? Or (a)bort ")? {
            return Ok(CommitOutcome::Declined);
        }
        let message = commit_message(self.shorthand, self.today);
        // -e opens the editor on the prefilled message
        vcs.run(&["commit", "-e", "-m", &message])?;

        Ok(CommitOutcome::Committed)
    }
}

/// Ex command that reads `scratch` in above the last line starting with `=====`.
pub fn insert_command(scratch: &Path) -> String {
    format!("$?^=====?-1 read {}", scratch.display())
}

pub fn commit_message(shorthand: &str, today: NaiveDate) -> String {
    format!("{} {}", shorthand.to_uppercase(), today.format("%d.%m.%Y"))
}

fn command(argv: &[String], directory: &Path) -> Result<Command> {
    let Some((program, args)) = argv.split_first() else {
        bail!("Empty command");
    };
    let mut command = Command::new(program);
    command.args(args).current_dir(directory);
    Ok(command)
}

struct Vcs<'a> {
    argv: &'a [String],
    directory: &'a Path,
}

impl Vcs<'_> {
    fn is_repository(&self) -> Result<bool> {
        let mut root = command(self.argv, self.directory)?;
        root.arg("root");
        match root.output() {
            Ok(output) => Ok(output.status.success()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{:?} is not installed", self.argv);
                Ok(false)
            }
            Err(error) => Err(error).with_context(|| format!("Failed to run {root:?}")),
        }
    }

    fn has_remote(&self) -> Result<bool> {
        let mut paths = command(self.argv, self.directory)?;
        paths.arg("paths");
        let output = paths
            .output()
            .with_context(|| format!("Failed to run {paths:?}"))?;
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let mut command = command(self.argv, self.directory)?;
        command.args(args);
        tracing::info!("Running {command:?}");
        let status = command
            .status()
            .with_context(|| format!("Failed to run {command:?}"))?;
        check_status(&command, status)
    }
}

fn check_status(command: &Command, status: ExitStatus) -> Result<()> {
    if !status.success() {
        bail!("{command:?} failed with {status}");
    }
    Ok(())
}
