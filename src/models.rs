use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::NotesError;

/// Full-screen sections of the member application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Notes,
    Calendar,
    Announcements,
    Materials,
    MyGroup,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Home,
        View::Notes,
        View::Calendar,
        View::Announcements,
        View::Materials,
        View::MyGroup,
    ];

    pub fn id(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Notes => "notes",
            View::Calendar => "calendar",
            View::Announcements => "announcements",
            View::Materials => "materials",
            View::MyGroup => "my-group",
        }
    }

    /// Breadcrumb label shown in the top bar.
    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Notes => "Notes",
            View::Calendar => "Calendar",
            View::Announcements => "Announcements",
            View::Materials => "Support material",
            View::MyGroup => "My group",
        }
    }
}

impl FromStr for View {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|view| view.id() == s)
            .ok_or_else(|| NotesError::InvalidView(s.to_string()))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Weekly note forms that can be layered over the week detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKind {
    CellDynamic,
    Takers,
    Services,
    LeadersMeeting,
}

impl SheetKind {
    pub const ALL: [SheetKind; 4] = [
        SheetKind::CellDynamic,
        SheetKind::Takers,
        SheetKind::Services,
        SheetKind::LeadersMeeting,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SheetKind::CellDynamic => "cell-dynamic",
            SheetKind::Takers => "takers",
            SheetKind::Services => "services",
            SheetKind::LeadersMeeting => "leaders-meeting",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SheetKind::CellDynamic => "Cell dynamic",
            SheetKind::Takers => "Takers",
            SheetKind::Services => "Services",
            SheetKind::LeadersMeeting => "Leaders/Ministries meeting",
        }
    }

    /// Only the cell dynamic sheet tracks unsaved edits and confirms exits.
    pub fn is_guarded(self) -> bool {
        matches!(self, SheetKind::CellDynamic)
    }
}

impl FromStr for SheetKind {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SheetKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| NotesError::InvalidSheet(s.to_string()))
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Week of the year, always within 1..=52.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week(u8);

impl Week {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 52;

    pub fn new(number: i64) -> Result<Self, NotesError> {
        if (Self::FIRST as i64..=Self::LAST as i64).contains(&number) {
            Ok(Week(number as u8))
        } else {
            Err(NotesError::InvalidWeek(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Week> {
        (Self::FIRST..=Self::LAST).map(Week)
    }
}

impl FromStr for Week {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: i64 = s
            .trim()
            .parse()
            .map_err(|_| NotesError::invalid_field(format!("`{s}` is not a week number")))?;
        Week::new(number)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answer of a follow-up row's yes/no choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Unset,
    Yes,
    No,
}

impl FromStr for Justification {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Justification::Yes),
            "no" => Ok(Justification::No),
            "unset" => Ok(Justification::Unset),
            other => Err(NotesError::invalid_field(format!(
                "`{other}` is not one of yes, no, unset"
            ))),
        }
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Justification::Unset => "-",
            Justification::Yes => "yes",
            Justification::No => "no",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarActivity {
    pub id: Uuid,
    pub activity: String,
    pub event_date: NaiveDate,
    pub owner_name: Option<String>,
    pub contact_phone: Option<String>,
    pub investment: Option<f64>,
}

/// Validated calendar payload, ready for insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub activity: String,
    pub event_date: NaiveDate,
    pub owner_name: Option<String>,
    pub contact_phone: Option<String>,
    pub investment: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub division: Option<String>,
    pub squad_code: Option<String>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_identifiers_round_trip() {
        for view in View::ALL {
            assert_eq!(view.id().parse::<View>().unwrap(), view);
        }
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert_eq!(
            "dashboard".parse::<View>(),
            Err(NotesError::InvalidView("dashboard".to_string()))
        );
    }

    #[test]
    fn weeks_are_bounded() {
        assert!(Week::new(0).is_err());
        assert!(Week::new(53).is_err());
        assert_eq!(Week::new(52).unwrap().number(), 52);
        assert_eq!(Week::all().count(), 52);
    }

    #[test]
    fn only_cell_dynamic_is_guarded() {
        let guarded: Vec<SheetKind> = SheetKind::ALL
            .into_iter()
            .filter(|kind| kind.is_guarded())
            .collect();
        assert_eq!(guarded, vec![SheetKind::CellDynamic]);
    }
}
