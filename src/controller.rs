use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, info};

use crate::completion::CompletionStore;
use crate::error::NotesError;
use crate::guard::{LeaveDecision, LeavePrompt};
use crate::models::{SheetKind, View, Week};
use crate::my_group::{MemberField, MyGroupTable};
use crate::navigator::{Viewport, ViewNavigator};
use crate::rich_text::FormatTool;
use crate::sheets::{FieldEdit, SheetOverlayManager, SELECT_WEEK_FIRST};
use crate::storage::KeyValueStore;

pub const SAVE_PLACEHOLDER: &str = "Save: placeholder, the remote insert/update is not connected yet.";
pub const SHARE_PLACEHOLDER: &str = "Share: placeholder.";

/// Every user intent the member application reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(View),
    GoBack,
    SelectWeek(Week),
    BackToWeeks,
    OpenSheet(SheetKind),
    CloseSheet,
    Edit(FieldEdit),
    AddRow,
    RemoveRow,
    /// Flips the completed flag of the selected week.
    ToggleComplete,
    MarkSaved,
    SaveSheet,
    ShareSheet,
    Format(FormatTool),
    TogglePanel,
    Resize(u32),
    AddMember,
    RemoveMember,
    EditMember { row: usize, field: MemberField },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The user chose to stay on a sheet with unsaved changes.
    Cancelled,
    /// Accepted but nothing changed, e.g. removing the last row.
    Unchanged,
}

impl From<LeaveDecision> for Outcome {
    fn from(decision: LeaveDecision) -> Self {
        match decision {
            LeaveDecision::Proceed => Outcome::Applied,
            LeaveDecision::Cancel => Outcome::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekTile {
    pub week: Week,
    pub completed: bool,
    pub selected: bool,
}

/// Whole session state of the member application.
pub struct Controller {
    navigator: ViewNavigator,
    notes: SheetOverlayManager,
    completion: CompletionStore,
    my_group: MyGroupTable,
    clock: fn() -> DateTime<Local>,
}

impl Controller {
    pub fn new(store: Box<dyn KeyValueStore>, viewport: Viewport) -> Self {
        Self {
            navigator: ViewNavigator::new(viewport),
            notes: SheetOverlayManager::new(),
            completion: CompletionStore::load(store),
            my_group: MyGroupTable::new(),
            clock: Local::now,
        }
    }

    pub fn navigator(&self) -> &ViewNavigator {
        &self.navigator
    }

    pub fn notes(&self) -> &SheetOverlayManager {
        &self.notes
    }

    pub fn completion(&self) -> &CompletionStore {
        &self.completion
    }

    pub fn my_group(&self) -> &MyGroupTable {
        &self.my_group
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    pub fn week_tiles(&self) -> Vec<WeekTile> {
        let selected = self.notes.selected_week();
        Week::all()
            .map(|week| WeekTile {
                week,
                completed: self.completion.is_complete(week),
                selected: selected == Some(week),
            })
            .collect()
    }

    pub fn week_meta(&self) -> String {
        match self.notes.selected_week() {
            None => String::new(),
            Some(week) if self.completion.is_complete(week) => {
                format!("Week {week} • Completed")
            }
            Some(week) => format!("Week {week}"),
        }
    }

    fn require_view(&self, view: View) -> Result<(), NotesError> {
        if self.navigator.current() == view {
            Ok(())
        } else {
            Err(NotesError::precondition(format!(
                "Open {} first.",
                view.label()
            )))
        }
    }

    /// Leaving the application is one more exit from the guarded sheet.
    pub fn confirm_exit(&mut self, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        self.notes.guard_mut().confirm_leave(prompt)
    }

    fn placeholder(
        &self,
        message: &str,
        prompt: &mut dyn LeavePrompt,
    ) -> Result<Outcome, NotesError> {
        self.require_view(View::Notes)?;
        if self.notes.active_sheet() != Some(SheetKind::CellDynamic) {
            return Err(NotesError::precondition("Open the cell dynamic sheet first."));
        }
        prompt.notify(message);
        Ok(Outcome::Unchanged)
    }

    /// Applies one command. Errors and cancellations leave the state as it
    /// was before the call.
    pub fn dispatch(
        &mut self,
        command: Command,
        prompt: &mut dyn LeavePrompt,
    ) -> Result<Outcome, NotesError> {
        debug!(?command, "dispatch");
        let outcome: Outcome = match command {
            Command::Navigate(view) => self
                .navigator
                .navigate(view, self.notes.guard_mut(), prompt)
                .into(),
            Command::GoBack => self.navigator.go_back(self.notes.guard_mut(), prompt).into(),
            Command::SelectWeek(week) => {
                self.require_view(View::Notes)?;
                self.notes.select_week(week, prompt).into()
            }
            Command::BackToWeeks => {
                self.require_view(View::Notes)?;
                self.notes.back_to_weeks(prompt).into()
            }
            Command::OpenSheet(kind) => {
                self.require_view(View::Notes)?;
                let today = self.today();
                self.notes.open_sheet(kind, today, prompt)?.into()
            }
            Command::CloseSheet => {
                self.require_view(View::Notes)?;
                self.notes.close_sheet(prompt)?.into()
            }
            Command::Edit(edit) => {
                self.require_view(View::Notes)?;
                self.notes.edit(edit)?;
                Outcome::Applied
            }
            Command::AddRow => {
                self.require_view(View::Notes)?;
                let today = self.today();
                self.notes.add_row(today)?;
                Outcome::Applied
            }
            Command::RemoveRow => {
                self.require_view(View::Notes)?;
                if self.notes.remove_row()? {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            Command::ToggleComplete => {
                self.require_view(View::Notes)?;
                let week = self
                    .notes
                    .selected_week()
                    .ok_or_else(|| NotesError::precondition(SELECT_WEEK_FIRST))?;
                let done = self.completion.toggle(week);
                info!(%week, done, "week completion toggled");
                Outcome::Applied
            }
            Command::MarkSaved => {
                self.require_view(View::Notes)?;
                let now = (self.clock)();
                self.notes.mark_saved(now)?;
                Outcome::Applied
            }
            Command::SaveSheet => self.placeholder(SAVE_PLACEHOLDER, prompt)?,
            Command::ShareSheet => self.placeholder(SHARE_PLACEHOLDER, prompt)?,
            Command::Format(tool) => {
                self.require_view(View::Notes)?;
                if self.notes.format(tool)? {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            Command::TogglePanel => {
                self.navigator.toggle_panel();
                Outcome::Applied
            }
            Command::Resize(width) => {
                self.navigator.resize(width);
                Outcome::Applied
            }
            Command::AddMember => {
                self.require_view(View::MyGroup)?;
                self.my_group.add_row();
                Outcome::Applied
            }
            Command::RemoveMember => {
                self.require_view(View::MyGroup)?;
                if self.my_group.remove_row() {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            Command::EditMember { row, field } => {
                self.require_view(View::MyGroup)?;
                self.my_group.edit(row, field)?;
                Outcome::Applied
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
impl Controller {
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.completion.into_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{ScriptedPrompt, AUTOSAVE_NOTICE};
    use crate::models::Justification;
    use crate::sheets::NotesPane;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 16, 20, 0, 0).unwrap()
    }

    fn controller() -> Controller {
        Controller::new(Box::new(MemoryStore::new()), Viewport::Wide).with_clock(fixed_now)
    }

    fn week(n: i64) -> Week {
        Week::new(n).unwrap()
    }

    fn run(ctl: &mut Controller, prompt: &mut ScriptedPrompt, commands: Vec<Command>) {
        for command in commands {
            ctl.dispatch(command, prompt).unwrap();
        }
    }

    #[test]
    fn dirty_cell_dynamic_guards_top_level_navigation() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::answering(&[true]);
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(12)),
                Command::OpenSheet(SheetKind::CellDynamic),
                Command::Edit(FieldEdit::RowName {
                    row: 0,
                    value: "Marta".to_string(),
                }),
            ],
        );
        assert!(ctl.notes().guard().is_dirty());

        let outcome = ctl.dispatch(Command::Navigate(View::Home), &mut prompt).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(prompt.questions.len(), 1);
        assert_eq!(prompt.notices, vec![AUTOSAVE_NOTICE.to_string()]);
        assert!(!ctl.notes().guard().is_dirty());
        assert_eq!(ctl.navigator().current(), View::Home);
        assert_eq!(ctl.navigator().history(), &[View::Home, View::Notes]);
        assert_ne!(ctl.navigator().stack_top(), Some(View::Home));
    }

    #[test]
    fn declined_prompt_leaves_state_untouched() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::answering(&[false, false, false]);
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(12)),
                Command::OpenSheet(SheetKind::CellDynamic),
                Command::AddRow,
            ],
        );
        let navigator = ctl.navigator().clone();
        let notes = ctl.notes().clone();

        for command in [
            Command::Navigate(View::Calendar),
            Command::GoBack,
            Command::CloseSheet,
        ] {
            assert_eq!(ctl.dispatch(command, &mut prompt).unwrap(), Outcome::Cancelled);
        }
        assert_eq!(ctl.navigator(), &navigator);
        assert_eq!(ctl.notes(), &notes);
        assert_eq!(prompt.questions.len(), 3);
    }

    #[test]
    fn unguarded_sheet_switch_needs_no_prompt_when_clean() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(1)),
                Command::OpenSheet(SheetKind::CellDynamic),
                Command::OpenSheet(SheetKind::Takers),
            ],
        );
        assert_eq!(
            ctl.notes().visible_panes(),
            vec![NotesPane::Sheet(SheetKind::Takers)]
        );
        assert!(prompt.questions.is_empty());
    }

    #[test]
    fn sheet_commands_need_a_week() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        ctl.dispatch(Command::Navigate(View::Notes), &mut prompt).unwrap();

        let err = ctl
            .dispatch(Command::OpenSheet(SheetKind::Services), &mut prompt)
            .unwrap_err();
        assert_eq!(err, NotesError::Precondition(SELECT_WEEK_FIRST.to_string()));
        assert_eq!(ctl.notes().visible_panes(), vec![NotesPane::WeekPicker]);
    }

    #[test]
    fn notes_commands_need_the_notes_view() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        let err = ctl
            .dispatch(Command::SelectWeek(week(3)), &mut prompt)
            .unwrap_err();
        assert!(matches!(err, NotesError::Precondition(_)));
        assert_eq!(ctl.notes().selected_week(), None);
    }

    #[test]
    fn row_commands_track_dirty_state() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(8)),
                Command::OpenSheet(SheetKind::CellDynamic),
                Command::AddRow,
                Command::AddRow,
                Command::RemoveRow,
                Command::AddRow,
                Command::Edit(FieldEdit::RowChoice {
                    row: 2,
                    value: Justification::Yes,
                }),
            ],
        );
        let form = &ctl.notes().cell_dynamic().follow_up;
        assert_eq!(form.group_ids(), vec![1, 2, 3, 4]);
        assert_eq!(form.rows()[3].date, Some(fixed_now().date_naive()));
        assert!(ctl.notes().guard().is_dirty());
    }

    #[test]
    fn completion_toggle_updates_tiles_and_meta() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(5)),
                Command::ToggleComplete,
            ],
        );
        assert_eq!(ctl.week_meta(), "Week 5 • Completed");
        let tiles = ctl.week_tiles();
        assert_eq!(tiles.len(), 52);
        assert!(tiles[4].completed && tiles[4].selected);
        assert!(!tiles[5].completed && !tiles[5].selected);

        let reloaded = Controller::new(ctl.into_store(), Viewport::Wide);
        assert!(reloaded.completion().is_complete(week(5)));
    }

    #[test]
    fn completion_toggle_needs_a_selected_week() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();

        let err = ctl.dispatch(Command::ToggleComplete, &mut prompt).unwrap_err();
        assert!(matches!(err, NotesError::Precondition(_)));

        ctl.dispatch(Command::Navigate(View::Notes), &mut prompt).unwrap();
        let err = ctl.dispatch(Command::ToggleComplete, &mut prompt).unwrap_err();
        assert_eq!(err, NotesError::Precondition(SELECT_WEEK_FIRST.to_string()));
        assert!(ctl.completion().completed_weeks().is_empty());

        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::SelectWeek(week(7)),
                Command::ToggleComplete,
                Command::BackToWeeks,
            ],
        );
        assert_eq!(ctl.completion().completed_weeks(), vec![week(7)]);
        assert_eq!(ctl.week_meta(), "");
    }

    #[test]
    fn save_and_share_only_notify() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(2)),
                Command::OpenSheet(SheetKind::CellDynamic),
                Command::Edit(FieldEdit::Notes("prayer list".to_string())),
                Command::SaveSheet,
                Command::ShareSheet,
            ],
        );
        assert_eq!(
            prompt.notices,
            vec![SAVE_PLACEHOLDER.to_string(), SHARE_PLACEHOLDER.to_string()]
        );
        assert!(ctl.notes().guard().is_dirty());
    }

    #[test]
    fn formatting_does_not_dirty_unguarded_sheets() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::Notes),
                Command::SelectWeek(week(2)),
                Command::OpenSheet(SheetKind::LeadersMeeting),
                Command::Format("bold".parse().unwrap()),
                Command::Edit(FieldEdit::Notes("agenda".to_string())),
                Command::MarkSaved,
            ],
        );
        let sheet = ctl.notes().note_sheet(SheetKind::LeadersMeeting).unwrap();
        assert_eq!(sheet.notes.plain_text(), "agenda");
        assert!(sheet.status.starts_with("Saved locally: 2026-03-16 20:00:00"));
        assert!(!ctl.notes().guard().is_dirty());
    }

    #[test]
    fn my_group_edits_need_the_view() {
        let mut ctl = controller();
        let mut prompt = ScriptedPrompt::default();
        assert!(ctl.dispatch(Command::AddMember, &mut prompt).is_err());

        run(
            &mut ctl,
            &mut prompt,
            vec![
                Command::Navigate(View::MyGroup),
                Command::AddMember,
                Command::EditMember {
                    row: 4,
                    field: MemberField::Birthday("2412".to_string()),
                },
            ],
        );
        assert_eq!(ctl.my_group().rows().len(), 5);
        assert_eq!(ctl.my_group().rows()[4].birthday, "24/12");
    }
}
