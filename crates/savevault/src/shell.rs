//! Interactive session that keeps a selection between commands

use std::io::Write;

use crate::{
    confirm::{Confirm, ReadLine},
    manager::{ManagerError, Outcome, SaveManager},
    output,
    registry::RegistryError,
};

const HELP: &str = "\
Commands:
  list                     show all saves
  create [NAME]            snapshot the live save (name defaults to the time)
  select <#|ID|KEY>        select a save by list number or id
  show                     show the selected save
  load                     restore the selected save over the live save
  remove                   delete the selected save
  help                     show this text
  quit                     leave";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<C, R, W> {
    manager: SaveManager<C>,
    input: R,
    output: W,
}

impl<C: Confirm, R: ReadLine, W: Write> Shell<C, R, W> {
    pub fn new(manager: SaveManager<C>, input: R, output: W) -> Self {
        Self {
            manager,
            input,
            output,
        }
    }

    /// Read and execute commands until `quit` or end of input.
    ///
    /// Mistakes such as an unknown save or a failed copy are reported and the
    /// session goes on. Registry file errors end it.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.list()?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();

            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }

            match self.execute(line.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(error) if is_recoverable(&error) => {
                    tracing::debug!(?error, "shell command failed");
                    writeln!(self.output, "error: {error:#}")?;
                }
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }

    fn execute(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "list" | "ls" => self.list()?,
            "create" | "new" => {
                let name = (!argument.is_empty()).then_some(argument);
                let entry = self.manager.create(name)?;
                writeln!(self.output, "created \"{}\" ({})", entry.name, entry.id)?;
            }
            "select" | "sel" => self.select(argument)?,
            "show" => self.show()?,
            "load" => match self.manager.load()? {
                Outcome::Done => writeln!(self.output, "Success")?,
                Outcome::Declined => writeln!(self.output, "Cancelled")?,
            },
            "remove" | "rm" => match self.manager.remove()? {
                Outcome::Done => {
                    writeln!(self.output, "Removed")?;
                    self.list()?;
                }
                Outcome::Declined => writeln!(self.output, "Cancelled")?,
            },
            "help" | "?" => writeln!(self.output, "{HELP}")?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => writeln!(self.output, "unknown command {other:?}, try `help`")?,
        }

        Ok(Flow::Continue)
    }

    fn list(&mut self) -> std::io::Result<()> {
        let selected = self.manager.selected().map(|entry| entry.id);
        output::write_table(&mut self.output, self.manager.entries(), selected)
    }

    /// A list number is turned into that row's display key; anything else is
    /// taken as a key or id.
    fn select(&mut self, argument: &str) -> anyhow::Result<()> {
        let key = match argument.parse::<usize>() {
            Ok(number) => match number
                .checked_sub(1)
                .and_then(|index| self.manager.entries().get(index))
            {
                Some(entry) => entry.display_key(),
                None => {
                    writeln!(self.output, "no save numbered {number}")?;
                    return Ok(());
                }
            },
            Err(_) => argument.to_string(),
        };

        self.manager.select(&key)?;
        self.show()?;

        Ok(())
    }

    fn show(&mut self) -> std::io::Result<()> {
        match self.manager.selected() {
            Some(entry) => writeln!(
                self.output,
                "\"{}\" ({})\nCreated at {}",
                entry.name, entry.id, entry.created_at
            ),
            None => writeln!(self.output, "no save selected"),
        }
    }
}

fn is_recoverable(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ManagerError>(),
        Some(
            ManagerError::NoSelection
                | ManagerError::InvalidName(_)
                | ManagerError::Copy { .. }
                | ManagerError::Delete { .. }
                | ManagerError::Registry(RegistryError::NotFound { .. })
        )
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::{confirm::AssumeYes, registry::Registry};

    struct Fixture {
        _root: TempDir,
        store: PathBuf,
        live_save: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("store");
        let live_save = root.path().join("ER0000.sl2");
        std::fs::write(&live_save, b"v1").unwrap();

        Fixture {
            _root: root,
            store,
            live_save,
        }
    }

    fn run(fixture: &Fixture, script: &str) -> (anyhow::Result<()>, String) {
        let manager = SaveManager::new(
            Registry::open(&fixture.store).unwrap(),
            fixture.live_save.clone(),
            AssumeYes,
        );
        let mut output = Vec::new();
        let result = Shell::new(manager, script.as_bytes(), &mut output).run();

        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn create_select_load_by_number() {
        let fixture = fixture();

        let (result, output) = run(&fixture, "create first\nselect 1\n");
        result.unwrap();
        assert!(output.contains("created \"first\""));
        assert!(output.contains("Created at "));

        std::fs::write(&fixture.live_save, b"v2").unwrap();

        let (result, output) = run(&fixture, "select 1\nload\nquit\n");
        result.unwrap();
        assert!(output.contains("Success"));
        assert_eq!(std::fs::read(&fixture.live_save).unwrap(), b"v1");
    }

    #[test]
    fn remove_clears_selection() {
        let fixture = fixture();

        let (result, output) = run(&fixture, "create a\ncreate b\nselect 1\nremove\nshow\n");
        result.unwrap();

        assert!(output.contains("Removed"));
        assert!(output.ends_with("no save selected\n> \n"));
        assert_eq!(Registry::open(&fixture.store).unwrap().entries()[0].name, "b");
    }

    #[test]
    fn mistakes_are_reported_and_session_continues() {
        let fixture = fixture();

        let (result, output) = run(
            &fixture,
            "load\nselect 9\nselect nonsense\nfrobnicate\ncreate after\n",
        );
        result.unwrap();

        assert!(output.contains("error: no save selected"));
        assert!(output.contains("no save numbered 9"));
        assert!(output.contains("error: sync problem"));
        assert!(output.contains("unknown command \"frobnicate\""));
        assert!(output.contains("created \"after\""));
    }

    #[test]
    fn unnamed_create_uses_timestamp() {
        let fixture = fixture();

        run(&fixture, "create\n").0.unwrap();

        let registry = Registry::open(&fixture.store).unwrap();
        let entry = &registry.entries()[0];
        assert_eq!(entry.name, entry.created_at);
    }

    #[test]
    fn registry_write_failure_is_fatal() {
        let fixture = fixture();

        let manager = SaveManager::new(
            Registry::open(&fixture.store).unwrap(),
            fixture.live_save.clone(),
            AssumeYes,
        );
        std::fs::create_dir(fixture.store.join("data_list.txt")).unwrap();

        let mut output = Vec::new();
        let result = Shell::new(manager, "create x\n".as_bytes(), &mut output).run();

        assert!(result.is_err());
    }
}
