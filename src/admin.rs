use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AdminError;
use crate::models::NewActivity;

pub const DEFAULT_ROLE: &str = "user";

/// Body of an invitation request. The singular `division` and `squad_code`
/// mirror the first list entry for consumers that predate the lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationPayload {
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub divisions: Vec<String>,
    pub squads: Vec<String>,
    pub division: Option<String>,
    pub squad_code: Option<String>,
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

pub fn build_invitation(
    email: &str,
    full_name: &str,
    role: Option<&str>,
    divisions: &[String],
    squads: &[String],
) -> Result<InvitationPayload, AdminError> {
    let email = email.trim().to_lowercase();
    let full_name = full_name.trim().to_string();

    if email.is_empty() {
        return Err(AdminError::Validation("Missing email."));
    }
    if full_name.is_empty() {
        return Err(AdminError::Validation("Missing full name."));
    }

    let role = role
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .unwrap_or(DEFAULT_ROLE)
        .to_string();
    let divisions = clean_list(divisions);
    let squads = clean_list(squads);

    Ok(InvitationPayload {
        division: divisions.first().cloned(),
        squad_code: squads.first().cloned(),
        email,
        full_name,
        role,
        divisions,
        squads,
    })
}

/// Raw calendar form input, as typed.
#[derive(Debug, Clone, Default)]
pub struct ActivityDraft {
    pub activity: String,
    pub event_date: String,
    pub owner_name: String,
    pub contact_phone: String,
    pub investment: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ActivityDraft {
    pub fn validate(&self) -> Result<NewActivity, AdminError> {
        let activity = self.activity.trim();
        if activity.is_empty() {
            return Err(AdminError::Validation("Missing activity."));
        }

        let raw_date = self.event_date.trim();
        if raw_date.is_empty() {
            return Err(AdminError::Validation("Missing date."));
        }
        let event_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| AdminError::Validation("Invalid date."))?;

        let investment = match self.investment.trim() {
            "" => None,
            raw => Some(
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or(AdminError::Validation("Invalid investment."))?,
            ),
        };

        Ok(NewActivity {
            activity: activity.to_string(),
            event_date,
            owner_name: non_empty(&self.owner_name),
            contact_phone: non_empty(&self.contact_phone),
            investment,
        })
    }
}

/// Groups thousands and keeps at most two decimals: `1234.5` → `1,234.5`.
pub fn format_money(value: Option<f64>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let rendered = format!("{:.2}", value.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::new();
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && rendered != "0.00" { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}
