//! Interactive line-oriented front end.
//!
//! The shell renders the controller's state and turns typed commands into
//! [`Intent`]s. In view mode it accepts `list`, `add`, `edit <row>`,
//! `delete <row>` and `refresh`; while a form is open it accepts
//! `name|email|age <value>`, `show`, `submit` and `cancel`. `help` and
//! `quit` work everywhere.
//!
//! Controller errors are shown as a one-line notice and the session
//! continues with the previous state intact.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::controller::{Intent, Mode, ViewController};
use crate::error::{Error, Result};
use crate::record::Candidate;
use crate::render;
use crate::validate::Field;

const VIEW_HELP: &str = "\
commands:
  list             show the record table
  add              open the add form
  edit <row>       open the edit form for a row
  delete <row>     delete a row
  refresh          reload records from the backend
  help             show this help
  quit             leave the shell
";

const FORM_HELP: &str = "\
form commands:
  name <value>     set the name field
  email <value>    set the email field
  age <value>      set the age field
  show             show the form
  submit           validate and save
  cancel           close the form without saving
  quit             leave the shell
";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the table.
    List,
    /// Forward an intent to the controller.
    Intent(Intent),
    /// Set one form field.
    Set(Field, String),
    /// Show the form.
    Show,
    /// Submit the form being edited.
    Submit,
    /// Print help for the current mode.
    Help,
    /// Leave the shell.
    Quit,
}

/// Parse one input line. Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns a message for unknown commands or malformed arguments.
pub fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let row = |rest: &str| {
        rest.parse::<usize>()
            .map_err(|_| format!("{word} needs a row number, got '{rest}'"))
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "add" => Command::Intent(Intent::Add),
        "edit" => Command::Intent(Intent::Edit(row(rest)?)),
        "delete" | "rm" => Command::Intent(Intent::Delete(row(rest)?)),
        "refresh" => Command::Intent(Intent::Refresh),
        "cancel" => Command::Intent(Intent::Cancel),
        "name" => Command::Set(Field::Name, rest.to_string()),
        "email" => Command::Set(Field::Email, rest.to_string()),
        "age" => Command::Set(Field::Age, rest.to_string()),
        "show" => Command::Show,
        "submit" | "save" => Command::Submit,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

/// Interactive session over a [`ViewController`].
#[derive(Debug)]
pub struct Shell<R, W> {
    controller: ViewController,
    input: R,
    output: W,
    draft: Candidate,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a shell reading commands from `input` and writing to `output`.
    pub fn new(controller: ViewController, input: R, output: W) -> Self {
        Self {
            controller,
            input,
            output,
            draft: Candidate::default(),
        }
    }

    /// The controller driven by this shell.
    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    /// Tear down the shell, returning the controller and output sink.
    pub fn into_parts(self) -> (ViewController, W) {
        (self.controller, self.output)
    }

    /// Run until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub async fn run(&mut self) -> Result<()> {
        self.write(&render::table(self.controller.records())).await?;
        let mut line = String::new();
        loop {
            self.write(&format!("{}> ", self.controller.mode())).await?;
            line.clear();
            if self.input.read_line(&mut line).await? == 0 {
                self.write("\n").await?;
                return Ok(());
            }
            if !self.execute(&line).await? {
                return Ok(());
            }
        }
    }

    /// Execute one line. Returns `false` when the session should end.
    async fn execute(&mut self, line: &str) -> Result<bool> {
        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                self.write(&format!("{message}\n")).await?;
                return Ok(true);
            }
        };
        debug!(?command, "Shell command");

        match command {
            Command::Quit => return Ok(false),
            Command::Help => {
                let help = if self.controller.mode().is_form() {
                    FORM_HELP
                } else {
                    VIEW_HELP
                };
                self.write(help).await?;
            }
            Command::List => {
                self.write(&render::table(self.controller.records())).await?;
            }
            Command::Show => self.show_form().await?,
            Command::Set(field, value) if self.controller.mode().is_form() => {
                match field {
                    Field::Name => self.draft.name = value,
                    Field::Email => self.draft.email = value,
                    Field::Age => self.draft.age = value,
                }
            }
            Command::Set(field, _) => {
                self.write(&format!("no form is open; cannot set {field}\n"))
                    .await?;
            }
            Command::Submit => {
                let candidate = self.draft.clone();
                self.dispatch(Intent::Submit(candidate)).await?;
            }
            Command::Intent(intent) => self.dispatch(intent).await?,
        }
        Ok(true)
    }

    async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        match self.controller.handle(intent).await {
            Ok(()) => {
                self.draft = self.controller.form().clone();
                if self.controller.mode().is_form() {
                    self.show_form().await
                } else {
                    self.write(&render::table(self.controller.records())).await
                }
            }
            Err(Error::Validation(_)) => {
                // Field errors are rendered with the form.
                self.draft = self.controller.form().clone();
                self.show_form().await
            }
            Err(e) => self.write(&format!("error: {e}\n")).await,
        }
    }

    async fn show_form(&mut self) -> Result<()> {
        let title = match self.controller.mode() {
            Mode::View => {
                return self.write("no form is open\n").await;
            }
            Mode::Add => "Add Details",
            Mode::Edit { .. } => "Edit Details",
        };
        let text = render::form(title, &self.draft, self.controller.field_errors());
        self.write(&text).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBackend, RecordStore};

    fn controller() -> ViewController {
        ViewController::new(RecordStore::new(Box::new(MemoryBackend::new())))
    }

    async fn run_script(script: &str) -> (ViewController, String) {
        let mut shell = Shell::new(controller(), script.as_bytes(), Vec::new());
        shell.run().await.unwrap();
        let (controller, output) = shell.into_parts();
        (controller, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("  "), Ok(None));
        assert_eq!(parse("list"), Ok(Some(Command::List)));
        assert_eq!(parse("ADD"), Ok(Some(Command::Intent(Intent::Add))));
        assert_eq!(
            parse("edit 2"),
            Ok(Some(Command::Intent(Intent::Edit(2))))
        );
        assert_eq!(
            parse("rm 0"),
            Ok(Some(Command::Intent(Intent::Delete(0))))
        );
        assert_eq!(
            parse("name  Ann  Lee "),
            Ok(Some(Command::Set(Field::Name, "Ann  Lee".to_string())))
        );
        assert_eq!(
            parse("age"),
            Ok(Some(Command::Set(Field::Age, String::new())))
        );
        assert_eq!(parse("quit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("edit").unwrap_err().contains("row number"));
        assert!(parse("delete x").unwrap_err().contains("row number"));
        assert!(parse("frobnicate").unwrap_err().contains("unknown command"));
    }

    #[tokio::test]
    async fn test_add_edit_delete_session() {
        let script = "\
add
name Ann
email ann@x.com
age 30
submit
edit 0
name Ann B
age 31
submit
delete 0
quit
";
        let (controller, output) = run_script(script).await;

        assert!(controller.records().is_empty());
        assert_eq!(controller.mode(), &Mode::View);
        assert!(output.contains("Add Details"));
        assert!(output.contains("Edit Details"));
        assert!(output.contains("Ann B"));
    }

    #[tokio::test]
    async fn test_validation_errors_are_shown_and_form_kept() {
        let script = "\
add
name Ann
email nope
submit
email ann@x.com
age 30
submit
";
        let (controller, output) = run_script(script).await;

        assert!(output.contains("! Invalid email address"));
        assert!(output.contains("! Age is required"));
        assert_eq!(controller.records().len(), 1);
        assert_eq!(controller.records()[0].name, "Ann");
    }

    #[tokio::test]
    async fn test_errors_do_not_end_session() {
        let script = "\
delete 4
submit
bogus
name Ann
add
cancel
list
";
        let (controller, output) = run_script(script).await;

        assert!(output.contains("error: record not found: #4"));
        assert!(output.contains("error: cannot submit while in view mode"));
        assert!(output.contains("unknown command 'bogus'"));
        assert!(output.contains("no form is open; cannot set name"));
        assert_eq!(controller.mode(), &Mode::View);
        assert!(controller.records().is_empty());
    }

    #[tokio::test]
    async fn test_help_depends_on_mode() {
        let (_, output) = run_script("help\nadd\nhelp\n").await;
        assert!(output.contains("open the add form"));
        assert!(output.contains("validate and save"));
    }

    #[tokio::test]
    async fn test_prompt_shows_mode() {
        let (_, output) = run_script("add\n").await;
        assert!(output.contains("view> "));
        assert!(output.contains("add> "));
    }
}
