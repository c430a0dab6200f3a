use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

use crate::controller::{Command, Controller, Outcome};
use crate::error::NotesError;
use crate::guard::LeavePrompt;
use crate::models::{Justification, View};
use crate::my_group::MemberField;
use crate::screen;
use crate::sheets::FieldEdit;

pub const HELP: &str = "\
Commands:
  go <view>                 home, notes, calendar, announcements, materials, my-group
  back                      previous view
  week <1-52>               select a week (notes)
  weeks                     back to the week picker
  done                      toggle the selected week completed
  open <sheet>              cell-dynamic, takers, services, leaders-meeting
  close                     back to the week detail
  set topic|date|notes <v>  edit the open sheet (notes replaces the body)
  append <text>             add text to the end of the notes
  row name|owner <n> <v>    edit follow-up row n
  row yes|no|unset <n>      justification of row n
  row date <n> <yyyy-mm-dd>
  add-row / remove-row      follow-up rows
  saved                     mark takers/services/leaders sheet saved locally
  save / share              cell dynamic placeholders
  format <tool>             bold, underline, red, green, yellow, highlight, clear
  member add|remove         my-group rows
  member <n> name|birthday|phone|status <v>
  member <n> contacted yes|no
  panel                     toggle the side panel
  resize <px>               viewport width
  show / help / quit";

/// What a line of input asks the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Show,
    Help,
    Quit,
}

/// Line-oriented prompt over any reader and writer.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns `None` at end of input.
    pub fn read_line(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn print(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> LeavePrompt for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        match self.read_line(&format!("{question} [y/N] ")) {
            Ok(Some(answer)) => matches!(answer.to_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                debug!(error = %err, "no answer, treating as no");
                false
            }
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(err) = writeln!(self.output, "! {message}") {
            debug!(error = %err, message, "notice not written");
        }
    }
}

fn row_index(raw: Option<&str>) -> Result<usize, NotesError> {
    let raw = raw.ok_or_else(|| NotesError::invalid_field("missing row number"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(NotesError::invalid_field(format!("`{raw}` is not a row number"))),
    }
}

fn date(raw: &str) -> Result<NaiveDate, NotesError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| NotesError::invalid_field(format!("`{raw}` is not a yyyy-mm-dd date")))
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, NotesError> {
    value.ok_or_else(|| NotesError::invalid_field(format!("missing {what}")))
}

pub fn parse_input(line: &str) -> Result<Option<Input>, NotesError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.splitn(2, ' ');
    let verb = words.next().unwrap_or_default();
    let rest = words.next().map(str::trim).unwrap_or_default();
    let mut args = rest.splitn(2, ' ');
    let first = args.next().filter(|arg| !arg.is_empty());
    let tail = args.next().map(str::trim);

    let command = match verb {
        "show" => return Ok(Some(Input::Show)),
        "help" => return Ok(Some(Input::Help)),
        "quit" | "exit" => return Ok(Some(Input::Quit)),
        "go" => Command::Navigate(required(first, "view")?.parse()?),
        "home" => Command::Navigate(View::Home),
        "back" => Command::GoBack,
        "week" => Command::SelectWeek(required(first, "week")?.parse()?),
        "weeks" => Command::BackToWeeks,
        "done" => Command::ToggleComplete,
        "open" => Command::OpenSheet(required(first, "sheet")?.parse()?),
        "close" => Command::CloseSheet,
        "set" => {
            let value = tail.unwrap_or_default().to_string();
            Command::Edit(match required(first, "field")? {
                "topic" => FieldEdit::Topic(value),
                "notes" => FieldEdit::Notes(value),
                "date" => FieldEdit::Date(date(&value)?),
                other => {
                    return Err(NotesError::invalid_field(format!("unknown field `{other}`")))
                }
            })
        }
        "append" => Command::Edit(FieldEdit::AppendNotes(rest.to_string())),
        "row" => {
            let mut parts = tail.unwrap_or_default().splitn(2, ' ');
            let row = row_index(parts.next().filter(|p| !p.is_empty()))?;
            let value = parts.next().map(str::trim).unwrap_or_default().to_string();
            Command::Edit(match required(first, "row field")? {
                "name" => FieldEdit::RowName { row, value },
                "owner" => FieldEdit::RowOwner { row, value },
                "date" => FieldEdit::RowDate {
                    row,
                    date: date(&value)?,
                },
                choice => FieldEdit::RowChoice {
                    row,
                    value: choice.parse::<Justification>()?,
                },
            })
        }
        "add-row" => Command::AddRow,
        "remove-row" => Command::RemoveRow,
        "saved" => Command::MarkSaved,
        "save" => Command::SaveSheet,
        "share" => Command::ShareSheet,
        "format" => Command::Format(required(first, "tool")?.parse()?),
        "panel" => Command::TogglePanel,
        "resize" => {
            let raw = required(first, "width")?;
            let width = raw
                .parse()
                .map_err(|_| NotesError::invalid_field(format!("`{raw}` is not a width")))?;
            Command::Resize(width)
        }
        "member" => match required(first, "member action")? {
            "add" => Command::AddMember,
            "remove" => Command::RemoveMember,
            raw_row => {
                let row = row_index(Some(raw_row))?;
                let mut parts = tail.unwrap_or_default().splitn(2, ' ');
                let field = required(parts.next().filter(|p| !p.is_empty()), "member field")?;
                let value = parts.next().map(str::trim).unwrap_or_default().to_string();
                let field = match field {
                    "name" => MemberField::Name(value),
                    "birthday" => MemberField::Birthday(value),
                    "phone" => MemberField::Phone(value),
                    "status" => MemberField::Status(value),
                    "contacted" => MemberField::Contacted(value == "yes"),
                    other => {
                        return Err(NotesError::invalid_field(format!(
                            "unknown member field `{other}`"
                        )))
                    }
                };
                Command::EditMember { row, field }
            }
        },
        other => return Err(NotesError::UnknownCommand(other.to_string())),
    };

    Ok(Some(Input::Command(command)))
}

/// Reads commands until `quit` or end of input, re-rendering after each
/// applied command.
pub fn run<R: BufRead, W: Write>(
    controller: &mut Controller,
    terminal: &mut TerminalPrompt<R, W>,
) -> anyhow::Result<()> {
    terminal.print(&screen::render(controller))?;
    terminal.print("Type `help` for commands.")?;

    while let Some(line) = terminal.read_line("> ")? {
        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                terminal.notify(&err.to_string());
                continue;
            }
        };

        match input {
            Input::Quit => {
                if controller.confirm_exit(terminal).is_cancel() {
                    terminal.print("Stayed on the sheet.")?;
                    continue;
                }
                break;
            }
            Input::Help => terminal.print(HELP)?,
            Input::Show => terminal.print(&screen::render(controller))?,
            Input::Command(command) => match controller.dispatch(command, terminal) {
                Ok(Outcome::Applied) => terminal.print(&screen::render(controller))?,
                Ok(Outcome::Cancelled) => terminal.print("Stayed on the sheet.")?,
                Ok(Outcome::Unchanged) => {}
                Err(err) => terminal.notify(&err.to_string()),
            },
        }
    }

    Ok(())
}
