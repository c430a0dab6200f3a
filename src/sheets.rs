use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

use crate::error::NotesError;
use crate::guard::{DirtyGuard, LeaveDecision, LeavePrompt};
use crate::models::{Justification, SheetKind, Week};
use crate::rich_text::{apply_tool, FormatTool, RichNotes};
use crate::rows::RepeatingRowForm;

pub const SELECT_WEEK_FIRST: &str = "Select a week first.";

/// The one pane of the notes area currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesPane {
    WeekPicker,
    WeekDetail,
    Sheet(SheetKind),
}

impl NotesPane {
    pub const ALL: [NotesPane; 6] = [
        NotesPane::WeekPicker,
        NotesPane::WeekDetail,
        NotesPane::Sheet(SheetKind::CellDynamic),
        NotesPane::Sheet(SheetKind::Takers),
        NotesPane::Sheet(SheetKind::Services),
        NotesPane::Sheet(SheetKind::LeadersMeeting),
    ];
}

/// A single edit inside the open sheet. Row indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Topic(String),
    Date(NaiveDate),
    Notes(String),
    AppendNotes(String),
    RowName { row: usize, value: String },
    RowOwner { row: usize, value: String },
    RowChoice { row: usize, value: Justification },
    RowDate { row: usize, date: NaiveDate },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellDynamicSheet {
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub follow_up: RepeatingRowForm,
}

/// Takers, services and leaders meeting share this layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSheet {
    pub topic: String,
    pub date: Option<NaiveDate>,
    pub notes: RichNotes,
    pub status: String,
}

pub fn saved_locally_status(at: DateTime<Local>) -> String {
    format!(
        "Saved locally: {} (remote sync pending)",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Week selection and sheet visibility for the notes view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOverlayManager {
    pane: NotesPane,
    selected_week: Option<Week>,
    guard: DirtyGuard,
    cell_dynamic: CellDynamicSheet,
    takers: NoteSheet,
    services: NoteSheet,
    leaders: NoteSheet,
}

impl Default for SheetOverlayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetOverlayManager {
    pub fn new() -> Self {
        Self {
            pane: NotesPane::WeekPicker,
            selected_week: None,
            guard: DirtyGuard::new(),
            cell_dynamic: CellDynamicSheet::default(),
            takers: NoteSheet::default(),
            services: NoteSheet::default(),
            leaders: NoteSheet::default(),
        }
    }

    pub fn pane(&self) -> NotesPane {
        self.pane
    }

    pub fn is_visible(&self, pane: NotesPane) -> bool {
        self.pane == pane
    }

    pub fn visible_panes(&self) -> Vec<NotesPane> {
        NotesPane::ALL
            .into_iter()
            .filter(|pane| self.is_visible(*pane))
            .collect()
    }

    pub fn active_sheet(&self) -> Option<SheetKind> {
        match self.pane {
            NotesPane::Sheet(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn selected_week(&self) -> Option<Week> {
        self.selected_week
    }

    pub fn guard(&self) -> &DirtyGuard {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut DirtyGuard {
        &mut self.guard
    }

    pub fn cell_dynamic(&self) -> &CellDynamicSheet {
        &self.cell_dynamic
    }

    pub fn note_sheet(&self, kind: SheetKind) -> Option<&NoteSheet> {
        match kind {
            SheetKind::CellDynamic => None,
            SheetKind::Takers => Some(&self.takers),
            SheetKind::Services => Some(&self.services),
            SheetKind::LeadersMeeting => Some(&self.leaders),
        }
    }

    fn note_sheet_mut(&mut self, kind: SheetKind) -> Option<&mut NoteSheet> {
        match kind {
            SheetKind::CellDynamic => None,
            SheetKind::Takers => Some(&mut self.takers),
            SheetKind::Services => Some(&mut self.services),
            SheetKind::LeadersMeeting => Some(&mut self.leaders),
        }
    }

    pub fn hint(&self) -> &'static str {
        match self.pane {
            NotesPane::WeekPicker => "Select a week.",
            _ => "Week selected: choose an activity.",
        }
    }

    pub fn sheet_title(&self, kind: SheetKind) -> Option<String> {
        self.selected_week
            .map(|week| format!("{} • Week {}", kind.label(), week))
    }

    /// Asks before leaving a dirty guarded sheet that is on screen.
    fn leave_current(&mut self, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        if self.active_sheet().is_some_and(SheetKind::is_guarded) {
            self.guard.confirm_leave(prompt)
        } else {
            LeaveDecision::Proceed
        }
    }

    pub fn select_week(&mut self, week: Week, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        if self.leave_current(prompt).is_cancel() {
            return LeaveDecision::Cancel;
        }
        self.selected_week = Some(week);
        self.show_detail();
        debug!(%week, "week selected");
        LeaveDecision::Proceed
    }

    pub fn back_to_weeks(&mut self, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        if self.leave_current(prompt).is_cancel() {
            return LeaveDecision::Cancel;
        }
        self.selected_week = None;
        self.guard.exit();
        self.pane = NotesPane::WeekPicker;
        LeaveDecision::Proceed
    }

    /// Shows `kind` and nothing else. Leaving a dirty cell dynamic sheet for
    /// another sheet goes through the same confirmation as closing it.
    pub fn open_sheet(
        &mut self,
        kind: SheetKind,
        today: NaiveDate,
        prompt: &mut dyn LeavePrompt,
    ) -> Result<LeaveDecision, NotesError> {
        if self.selected_week.is_none() {
            return Err(NotesError::precondition(SELECT_WEEK_FIRST));
        }
        if self.leave_current(prompt).is_cancel() {
            return Ok(LeaveDecision::Cancel);
        }

        if kind.is_guarded() {
            self.cell_dynamic.date = Some(today);
            self.cell_dynamic.follow_up.fill_missing_dates(today);
            self.cell_dynamic.follow_up.regroup();
            self.guard.enter();
        } else {
            if let Some(sheet) = self.note_sheet_mut(kind) {
                sheet.status.clear();
                sheet.date.get_or_insert(today);
            }
            self.guard.exit();
        }
        self.pane = NotesPane::Sheet(kind);
        debug!(sheet = %kind, "sheet opened");
        Ok(LeaveDecision::Proceed)
    }

    pub fn close_sheet(&mut self, prompt: &mut dyn LeavePrompt) -> Result<LeaveDecision, NotesError> {
        if self.active_sheet().is_none() {
            return Err(NotesError::precondition("No sheet is open."));
        }
        if self.leave_current(prompt).is_cancel() {
            return Ok(LeaveDecision::Cancel);
        }
        self.show_detail();
        Ok(LeaveDecision::Proceed)
    }

    fn show_detail(&mut self) {
        self.guard.exit();
        self.pane = NotesPane::WeekDetail;
    }

    fn require_sheet(&self) -> Result<SheetKind, NotesError> {
        self.active_sheet()
            .ok_or_else(|| NotesError::precondition("Open a sheet first."))
    }

    pub fn edit(&mut self, edit: FieldEdit) -> Result<(), NotesError> {
        let kind = self.require_sheet()?;

        if kind.is_guarded() {
            let sheet = &mut self.cell_dynamic;
            match edit {
                FieldEdit::Date(date) => sheet.date = Some(date),
                FieldEdit::Notes(text) => sheet.notes = text,
                FieldEdit::AppendNotes(text) => sheet.notes.push_str(&text),
                FieldEdit::RowName { row, value } => sheet.follow_up.set_name(row, value)?,
                FieldEdit::RowOwner { row, value } => sheet.follow_up.set_owner(row, value)?,
                FieldEdit::RowChoice { row, value } => sheet.follow_up.select(row, value)?,
                FieldEdit::RowDate { row, date } => sheet.follow_up.set_date(row, date)?,
                FieldEdit::Topic(_) => {
                    return Err(NotesError::invalid_field(format!(
                        "{} has no topic field",
                        kind.label()
                    )))
                }
            }
            self.guard.mark_dirty();
            return Ok(());
        }

        let Some(sheet) = self.note_sheet_mut(kind) else {
            return Err(NotesError::invalid_field("sheet has no editable fields"));
        };
        match edit {
            FieldEdit::Topic(topic) => sheet.topic = topic,
            FieldEdit::Date(date) => sheet.date = Some(date),
            FieldEdit::Notes(text) => sheet.notes.set_text(&text),
            FieldEdit::AppendNotes(text) => sheet.notes.type_text(&text),
            _ => {
                return Err(NotesError::invalid_field(format!(
                    "{} has no follow-up table",
                    kind.label()
                )))
            }
        }
        Ok(())
    }

    pub fn add_row(&mut self, today: NaiveDate) -> Result<(), NotesError> {
        self.require_cell_dynamic()?;
        self.cell_dynamic.follow_up.add_row(today);
        self.guard.mark_dirty();
        Ok(())
    }

    pub fn remove_row(&mut self) -> Result<bool, NotesError> {
        self.require_cell_dynamic()?;
        let removed = self.cell_dynamic.follow_up.remove_row();
        if removed {
            self.guard.mark_dirty();
        }
        Ok(removed)
    }

    fn require_cell_dynamic(&self) -> Result<(), NotesError> {
        match self.require_sheet()? {
            SheetKind::CellDynamic => Ok(()),
            kind => Err(NotesError::invalid_field(format!(
                "{} has no follow-up table",
                kind.label()
            ))),
        }
    }

    /// Stamps the open unguarded sheet's status. Nothing leaves the process.
    pub fn mark_saved(&mut self, at: DateTime<Local>) -> Result<&str, NotesError> {
        let kind = self.require_sheet()?;
        let sheet = self.note_sheet_mut(kind).ok_or_else(|| {
            NotesError::invalid_field("the cell dynamic sheet is saved through its own prompt")
        })?;
        sheet.status = saved_locally_status(at);
        Ok(&sheet.status)
    }

    pub fn format(&mut self, tool: FormatTool) -> Result<bool, NotesError> {
        let kind = self.require_sheet()?;
        let sheet = self.note_sheet_mut(kind).ok_or_else(|| {
            NotesError::invalid_field(format!("{} has no formatting toolbar", kind.label()))
        })?;
        Ok(apply_tool(&mut sheet.notes, tool))
    }
}
