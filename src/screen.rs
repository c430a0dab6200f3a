use std::fmt::Write;

use crate::admin::format_money;
use crate::controller::Controller;
use crate::models::{CalendarActivity, SheetKind, View};
use crate::navigator::Viewport;
use crate::rich_text::{RichNotes, StyleCommand, TextFormat};
use crate::sheets::NotesPane;

const TILES_PER_LINE: usize = 13;

pub fn render(controller: &Controller) -> String {
    let nav = controller.navigator();
    let mut output = String::new();

    let _ = writeln!(output, "== {} ==", nav.breadcrumb());
    let nav_bar: Vec<String> = View::ALL
        .iter()
        .map(|view| {
            if *view == nav.active_nav() {
                format!("[{}]", view.id())
            } else {
                view.id().to_string()
            }
        })
        .collect();
    let _ = writeln!(output, "{}", nav_bar.join(" "));
    let panel = nav.panel();
    let (layout, panel_state) = match nav.viewport() {
        Viewport::Narrow => ("narrow", if panel.open { "open" } else { "closed" }),
        Viewport::Wide => ("wide", if panel.collapsed { "collapsed" } else { "docked" }),
    };
    let _ = writeln!(output, "Layout: {layout}, side panel {panel_state}");
    if let Some(previous) = nav.stack_top() {
        let _ = writeln!(output, "Back: {}", previous.label());
    }
    let _ = writeln!(output);

    match nav.current() {
        View::Notes => render_notes(controller, &mut output),
        View::MyGroup => render_my_group(controller, &mut output),
        view => {
            let _ = writeln!(output, "{}", view.label());
        }
    }

    output
}

fn render_notes(controller: &Controller, output: &mut String) {
    let notes = controller.notes();
    let meta = controller.week_meta();
    if !meta.is_empty() {
        let _ = writeln!(output, "{meta}");
    }

    match notes.pane() {
        NotesPane::WeekPicker => {
            let _ = writeln!(output, "{}", notes.hint());
            let done = controller.completion().completed_weeks().len();
            let _ = writeln!(output, "Completed weeks: {done}/52");
            for chunk in controller.week_tiles().chunks(TILES_PER_LINE) {
                let line: Vec<String> = chunk
                    .iter()
                    .map(|tile| {
                        let mark = if tile.completed { "*" } else { " " };
                        format!("{:>2}{mark}", tile.week.number())
                    })
                    .collect();
                let _ = writeln!(output, "{}", line.join(" "));
            }
        }
        NotesPane::WeekDetail => {
            if let Some(week) = notes.selected_week() {
                let _ = writeln!(output, "Week {week}");
                let done = controller.completion().is_complete(week);
                let _ = writeln!(output, "[{}] week completed", if done { "x" } else { " " });
            }
            let _ = writeln!(output, "{}", notes.hint());
            let sheets: Vec<&str> = SheetKind::ALL.iter().map(|kind| kind.id()).collect();
            let _ = writeln!(output, "Sheets: {}", sheets.join(", "));
        }
        NotesPane::Sheet(kind) => render_sheet(controller, kind, output),
    }
}

fn render_sheet(controller: &Controller, kind: SheetKind, output: &mut String) {
    let notes = controller.notes();
    if let Some(title) = notes.sheet_title(kind) {
        let _ = writeln!(output, "## {title}");
    }

    if let Some(sheet) = notes.note_sheet(kind) {
        let date = sheet.date.map(|d| d.to_string()).unwrap_or_default();
        let _ = writeln!(output, "Topic: {}", sheet.topic);
        let _ = writeln!(output, "Date: {date}");
        let _ = writeln!(output, "Notes: {}", markup(&sheet.notes));
        let pending = sheet.notes.pending_format();
        if *pending != TextFormat::default() {
            let _ = writeln!(output, "Next text: {}", describe_format(pending));
        }
        if !sheet.status.is_empty() {
            let _ = writeln!(output, "{}", sheet.status);
        }
        return;
    }

    let sheet = notes.cell_dynamic();
    let date = sheet.date.map(|d| d.to_string()).unwrap_or_default();
    let _ = writeln!(output, "Date: {date}");
    let _ = writeln!(output, "Notes: {}", sheet.notes);
    let _ = writeln!(output, "Follow-up:");
    for (idx, row) in sheet.follow_up.rows().iter().enumerate() {
        let row_date = row.date.map(|d| d.to_string()).unwrap_or_default();
        let choices: Vec<String> = row
            .controls()
            .iter()
            .map(|control| {
                let mark = if control.is_checked() { "x" } else { " " };
                format!("({mark}) {}", control.value())
            })
            .collect();
        let _ = writeln!(
            output,
            "  {}. {} / {} justified: {} [{}] {}",
            idx + 1,
            row.name,
            row.owner,
            choices.join(" "),
            row.group_name(),
            row_date
        );
    }
    let status = notes.guard().status();
    if !status.is_empty() {
        let _ = writeln!(output, "{status}");
    }
}

/// Bold as `**..**`, underline as `__..__`, colors as `[color=#hex]` and
/// highlights as `[bg=#hex]` tags.
fn markup(notes: &RichNotes) -> String {
    notes
        .runs()
        .iter()
        .map(|run| {
            let mut text = run.text.clone();
            if let Some(color) = run.format.highlight {
                text = format!("[bg={}]{text}[/bg]", color.hex());
            }
            if let Some(color) = run.format.color {
                text = format!("[color={}]{text}[/color]", color.hex());
            }
            for style in &run.format.styles {
                text = match style {
                    StyleCommand::Bold => format!("**{text}**"),
                    StyleCommand::Underline => format!("__{text}__"),
                };
            }
            text
        })
        .collect()
}

fn describe_format(format: &TextFormat) -> String {
    let mut parts: Vec<String> = format
        .styles
        .iter()
        .map(|style| match style {
            StyleCommand::Bold => "bold".to_string(),
            StyleCommand::Underline => "underline".to_string(),
        })
        .collect();
    if let Some(color) = format.color {
        parts.push(format!("color {}", color.hex()));
    }
    if let Some(color) = format.highlight {
        parts.push(format!("highlight {}", color.hex()));
    }
    parts.join(", ")
}

fn render_my_group(controller: &Controller, output: &mut String) {
    for (idx, row) in controller.my_group().rows().iter().enumerate() {
        let _ = writeln!(
            output,
            "  {}. {} | {} | {} | contacted: {} | {}",
            idx + 1,
            row.name,
            row.birthday,
            row.phone,
            if row.contacted { "yes" } else { "no" },
            row.status
        );
    }
}

pub fn render_activities(activities: &[CalendarActivity]) -> String {
    let mut output = String::new();

    if activities.is_empty() {
        let _ = writeln!(output, "No activities.");
        return output;
    }

    for activity in activities {
        let _ = writeln!(
            output,
            "- {} on {} | owner: {} | phone: {} | investment: {} ({})",
            activity.activity,
            activity.event_date,
            activity.owner_name.as_deref().unwrap_or(""),
            activity.contact_phone.as_deref().unwrap_or(""),
            format_money(activity.investment),
            activity.id
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Command;
    use crate::guard::ScriptedPrompt;
    use crate::models::{Justification, Week};
    use crate::sheets::FieldEdit;
    use crate::navigator::Viewport;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn home_screen_marks_active_nav() {
        let controller = Controller::new(Box::new(MemoryStore::new()), Viewport::Wide);
        let screen = render(&controller);
        assert!(screen.starts_with("== Home =="));
        assert!(screen.contains("[home] notes"));
        assert!(screen.contains("Layout: wide, side panel docked"));
        assert!(!screen.contains("Back:"));
    }

    #[test]
    fn sheet_shows_formatting_and_row_choices() {
        let mut controller = Controller::new(Box::new(MemoryStore::new()), Viewport::Narrow);
        let mut prompt = ScriptedPrompt::default();
        for command in [
            Command::Navigate(View::Notes),
            Command::SelectWeek(Week::new(6).unwrap()),
            Command::OpenSheet(SheetKind::LeadersMeeting),
            Command::Edit(FieldEdit::Notes("plan ".to_string())),
            Command::Format("bold".parse().unwrap()),
            Command::Format("red".parse().unwrap()),
            Command::Edit(FieldEdit::AppendNotes("agenda".to_string())),
        ] {
            controller.dispatch(command, &mut prompt).unwrap();
        }

        let screen = render(&controller);
        assert!(screen.contains("Layout: narrow, side panel closed"));
        assert!(screen.contains("Back: Home"));
        assert!(screen.contains("Notes: plan **[color=#ef4444]agenda[/color]**"));
        assert!(screen.contains("Next text: bold, color #ef4444"));

        for command in [
            Command::OpenSheet(SheetKind::CellDynamic),
            Command::Edit(FieldEdit::RowChoice {
                row: 1,
                value: Justification::No,
            }),
        ] {
            controller.dispatch(command, &mut prompt).unwrap();
        }
        let screen = render(&controller);
        assert!(screen.contains("1.  /  justified: ( ) yes ( ) no [follow-up-1]"));
        assert!(screen.contains("2.  /  justified: ( ) yes (x) no [follow-up-2]"));
    }

    #[test]
    fn picker_lists_all_weeks_with_completion_marks() {
        let mut controller = Controller::new(Box::new(MemoryStore::new()), Viewport::Wide);
        let mut prompt = ScriptedPrompt::default();
        controller
            .dispatch(Command::Navigate(View::Notes), &mut prompt)
            .unwrap();
        for command in [
            Command::SelectWeek(Week::new(3).unwrap()),
            Command::ToggleComplete,
            Command::BackToWeeks,
        ] {
            controller.dispatch(command, &mut prompt).unwrap();
        }

        let screen = render(&controller);
        assert!(screen.contains("Select a week."));
        assert!(screen.contains(" 3*"));
        assert!(screen.contains("52 "));
    }

    #[test]
    fn activities_render_money_and_placeholders() {
        assert_eq!(render_activities(&[]), "No activities.\n");

        let activity = CalendarActivity {
            id: Uuid::nil(),
            activity: "Retreat".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            owner_name: Some("Ana".to_string()),
            contact_phone: None,
            investment: Some(25000.0),
        };
        let rendered = render_activities(&[activity]);
        assert!(rendered.contains("Retreat on 2026-05-02"));
        assert!(rendered.contains("investment: 25,000"));
    }
}
