use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::debug;

use crate::error::{FormatError, NotesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleCommand {
    Bold,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColor {
    Red,
    Green,
    Yellow,
}

impl TextColor {
    pub fn hex(self) -> &'static str {
        match self {
            TextColor::Red => "#ef4444",
            TextColor::Green => "#22c55e",
            TextColor::Yellow => "#facc15",
        }
    }
}

/// A toolbar button of the notes editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTool {
    Style(StyleCommand),
    Color(TextColor),
    Highlight(TextColor),
    Clear,
}

impl FromStr for FormatTool {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bold" => FormatTool::Style(StyleCommand::Bold),
            "underline" => FormatTool::Style(StyleCommand::Underline),
            "red" => FormatTool::Color(TextColor::Red),
            "green" => FormatTool::Color(TextColor::Green),
            "yellow" => FormatTool::Color(TextColor::Yellow),
            "highlight" => FormatTool::Highlight(TextColor::Yellow),
            "clear" => FormatTool::Clear,
            other => {
                return Err(NotesError::invalid_field(format!(
                    "unknown format tool `{other}`"
                )))
            }
        })
    }
}

pub trait RichTextEditor {
    fn apply_style(&mut self, cmd: StyleCommand) -> Result<(), FormatError>;
    fn set_color(&mut self, color: TextColor) -> Result<(), FormatError>;
    fn set_highlight(&mut self, color: TextColor) -> Result<(), FormatError>;
    fn clear_formatting(&mut self) -> Result<(), FormatError>;

    /// Fallback for editors without a highlight command.
    fn set_background(&mut self, _color: TextColor) -> Result<(), FormatError> {
        Err(FormatError("background"))
    }
}

/// Runs one toolbar tool. Editor failures are swallowed; the return value
/// says whether anything was applied.
pub fn apply_tool(editor: &mut dyn RichTextEditor, tool: FormatTool) -> bool {
    let result = match tool {
        FormatTool::Style(cmd) => editor.apply_style(cmd),
        FormatTool::Color(color) => editor.set_color(color),
        FormatTool::Highlight(color) => editor
            .set_highlight(color)
            .or_else(|_| editor.set_background(color)),
        FormatTool::Clear => editor.clear_formatting(),
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, ?tool, "format tool ignored");
            false
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFormat {
    pub styles: BTreeSet<StyleCommand>,
    pub color: Option<TextColor>,
    pub highlight: Option<TextColor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub format: TextFormat,
}

/// Notes body made of styled runs. Formatting applies to text typed after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichNotes {
    runs: Vec<StyledRun>,
    pending: TextFormat,
}

impl RichNotes {
    pub fn type_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(run) if run.format == self.pending => run.text.push_str(text),
            _ => self.runs.push(StyledRun {
                text: text.to_string(),
                format: self.pending.clone(),
            }),
        }
    }

    /// Replaces the whole body with `text` in the pending format. An empty
    /// `text` clears the notes.
    pub fn set_text(&mut self, text: &str) {
        self.runs.clear();
        self.type_text(text);
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn pending_format(&self) -> &TextFormat {
        &self.pending
    }
}

impl RichTextEditor for RichNotes {
    fn apply_style(&mut self, cmd: StyleCommand) -> Result<(), FormatError> {
        if !self.pending.styles.remove(&cmd) {
            self.pending.styles.insert(cmd);
        }
        Ok(())
    }

    fn set_color(&mut self, color: TextColor) -> Result<(), FormatError> {
        self.pending.color = Some(color);
        Ok(())
    }

    fn set_highlight(&mut self, color: TextColor) -> Result<(), FormatError> {
        self.pending.highlight = Some(color);
        Ok(())
    }

    fn clear_formatting(&mut self) -> Result<(), FormatError> {
        self.pending = TextFormat::default();
        Ok(())
    }
}
