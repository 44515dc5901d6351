use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use zz_update::{BillingState, Ledger};

fn main() -> Result<()> {
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: check-ledger <zeiterfassung.txt>...");
    }

    check(&paths, &mut std::io::stdout().lock())
}

/// Print the billing state of every ledger, failing if any of them is closed.
fn check(paths: &[PathBuf], out: &mut dyn Write) -> Result<()> {
    let mut closed = 0;
    for path in paths {
        let state = Ledger::read(path).and_then(|ledger| ledger.open_block());
        match state {
            Ok(BillingState::NotYetBilled) => writeln!(out, "{}: not yet billed", path.display())?,
            Ok(BillingState::PartiallyBilled) => {
                writeln!(out, "{}: partially billed", path.display())?
            }
            Err(error) => {
                closed += 1;
                writeln!(out, "{}: {error}", path.display())?;
            }
        }
    }

    if closed > 0 {
        anyhow::bail!("{closed} of {} ledgers cannot be updated", paths.len());
    }
    Ok(())
}
