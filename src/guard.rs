use tracing::info;

pub const UNSAVED_STATUS: &str = "Unsaved changes.";
pub const LEAVE_QUESTION: &str =
    "You have unsaved changes (auto-save is not connected yet). Leave the sheet?";
/// Shown when the user leaves a dirty sheet. Nothing is written anywhere;
/// the edits stay in memory for the rest of the session and the sheet is
/// no longer marked dirty.
pub const AUTOSAVE_NOTICE: &str = "Auto-save: placeholder until the remote save is connected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    Proceed,
    Cancel,
}

impl LeaveDecision {
    pub fn is_cancel(self) -> bool {
        self == LeaveDecision::Cancel
    }
}

/// Blocking user interaction: a yes/no question and a plain alert.
pub trait LeavePrompt {
    fn confirm(&mut self, question: &str) -> bool;
    fn notify(&mut self, message: &str);
}

/// Dirty tracking for the guarded sheet. `dirty` can only be set while the
/// guarded context is active, and leaving the context clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyGuard {
    guarded: bool,
    dirty: bool,
    status: String,
}

impl DirtyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.guarded = true;
        self.dirty = false;
        self.status.clear();
    }

    pub fn exit(&mut self) {
        self.guarded = false;
        self.dirty = false;
        self.status.clear();
    }

    pub fn mark_dirty(&mut self) {
        if !self.guarded {
            return;
        }
        self.dirty = true;
        self.status = UNSAVED_STATUS.to_string();
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Single decision point for every exit from the guarded sheet.
    pub fn confirm_leave(&mut self, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        if !self.is_guarded() || !self.is_dirty() {
            return LeaveDecision::Proceed;
        }

        if !prompt.confirm(LEAVE_QUESTION) {
            info!("leave cancelled, unsaved changes kept");
            return LeaveDecision::Cancel;
        }

        prompt.notify(AUTOSAVE_NOTICE);
        info!("leaving guarded sheet, unsaved changes discarded");
        self.dirty = false;
        self.status.clear();
        LeaveDecision::Proceed
    }
}

/// Prompt double that answers from a queue and records what it was shown.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<bool>,
    pub questions: Vec<String>,
    pub notices: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl LeavePrompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .expect("prompt asked more questions than scripted")
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
