use chrono::NaiveDate;

use crate::error::NotesError;
use crate::models::Justification;

pub const INITIAL_FOLLOW_UP_ROWS: usize = 2;

/// One radio control. Exclusivity is resolved by `group`, not by the row
/// that owns the control, so group ids must stay unique per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceControl {
    group: usize,
    value: Justification,
    checked: bool,
}

impl ChoiceControl {
    fn new(group: usize, value: Justification) -> Self {
        Self {
            group,
            value,
            checked: false,
        }
    }

    pub fn group(&self) -> usize {
        self.group
    }

    pub fn value(&self) -> Justification {
        self.value
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpRow {
    pub name: String,
    pub owner: String,
    pub date: Option<NaiveDate>,
    controls: [ChoiceControl; 2],
}

impl FollowUpRow {
    fn blank(group: usize, date: Option<NaiveDate>) -> Self {
        Self {
            name: String::new(),
            owner: String::new(),
            date,
            controls: [
                ChoiceControl::new(group, Justification::Yes),
                ChoiceControl::new(group, Justification::No),
            ],
        }
    }

    pub fn group(&self) -> usize {
        self.controls[0].group()
    }

    pub fn group_name(&self) -> String {
        format!("follow-up-{}", self.group())
    }

    pub fn controls(&self) -> &[ChoiceControl] {
        &self.controls
    }

    pub fn justification(&self) -> Justification {
        self.controls
            .iter()
            .find(|control| control.is_checked())
            .map(ChoiceControl::value)
            .unwrap_or_default()
    }
}

/// Follow-up table of the cell dynamic sheet. Never holds fewer than one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingRowForm {
    rows: Vec<FollowUpRow>,
}

impl Default for RepeatingRowForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RepeatingRowForm {
    pub fn new() -> Self {
        let mut form = Self {
            rows: (0..INITIAL_FOLLOW_UP_ROWS)
                .map(|_| FollowUpRow::blank(0, None))
                .collect(),
        };
        form.regroup();
        form
    }

    pub fn rows(&self) -> &[FollowUpRow] {
        &self.rows
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self, today: NaiveDate) {
        self.rows.push(FollowUpRow::blank(0, Some(today)));
        self.regroup();
    }

    /// Drops the last row. Returns false, leaving the form untouched, when
    /// only one row is left.
    pub fn remove_row(&mut self) -> bool {
        if self.len() <= 1 {
            return false;
        }
        self.rows.pop();
        self.regroup();
        true
    }

    pub fn select(&mut self, row: usize, value: Justification) -> Result<(), NotesError> {
        let group = self.row(row)?.group();

        if value == Justification::Unset {
            for control in self.rows[row].controls.iter_mut() {
                control.checked = false;
            }
            return Ok(());
        }

        for control in self
            .rows
            .iter_mut()
            .flat_map(|r| r.controls.iter_mut())
            .filter(|control| control.group() == group)
        {
            control.checked = false;
        }

        if let Some(control) = self.rows[row]
            .controls
            .iter_mut()
            .find(|control| control.value == value)
        {
            control.checked = true;
        }
        Ok(())
    }

    pub fn set_name(&mut self, row: usize, name: String) -> Result<(), NotesError> {
        self.row_mut(row)?.name = name;
        Ok(())
    }

    pub fn set_owner(&mut self, row: usize, owner: String) -> Result<(), NotesError> {
        self.row_mut(row)?.owner = owner;
        Ok(())
    }

    pub fn set_date(&mut self, row: usize, date: NaiveDate) -> Result<(), NotesError> {
        self.row_mut(row)?.date = Some(date);
        Ok(())
    }

    pub fn fill_missing_dates(&mut self, today: NaiveDate) {
        for row in self.rows.iter_mut().filter(|row| row.date.is_none()) {
            row.date = Some(today);
        }
    }

    pub fn group_ids(&self) -> Vec<usize> {
        self.rows.iter().map(FollowUpRow::group).collect()
    }

    /// Re-derives every row's group from its position, 1-based. Runs after
    /// any insertion or removal so no row keeps a stale id.
    pub fn regroup(&mut self) {
        for (idx, row) in self.rows.iter_mut().enumerate() {
            for control in row.controls.iter_mut() {
                control.group = idx + 1;
            }
        }
    }

    fn row(&self, row: usize) -> Result<&FollowUpRow, NotesError> {
        let count = self.len();
        self.rows
            .get(row)
            .ok_or_else(|| out_of_range(row, count))
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut FollowUpRow, NotesError> {
        let count = self.len();
        self.rows
            .get_mut(row)
            .ok_or_else(|| out_of_range(row, count))
    }
}

fn out_of_range(row: usize, count: usize) -> NotesError {
    NotesError::invalid_field(format!(
        "follow-up row {} does not exist ({count} rows)",
        row + 1
    ))
}
