use anyhow::Context;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::admin::{ActivityDraft, InvitationPayload};
use crate::models::{CalendarActivity, NewActivity, Profile};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let profiles = vec![
        (
            Uuid::parse_str("7b1e4c2a-5d90-4f3e-a6c8-1f2d3b4a5c6e")?,
            "Marta Solís",
            "admin",
            "central",
            "C-12",
        ),
        (
            Uuid::parse_str("e4a9b0d7-3c21-4b6f-9e58-6a7d8c9b0f12")?,
            "Daniel Rojas",
            "user",
            "central",
            "C-07",
        ),
        (
            Uuid::parse_str("2f6c8e1b-9a4d-4c73-b5e0-d1c2b3a49587")?,
            "Lucía Fernández",
            "user",
            "east",
            "E-03",
        ),
    ];

    for (id, name, role, division, squad_code) in profiles {
        sqlx::query(
            r#"
            INSERT INTO weekly_notes.profiles (id, full_name, role, division, squad_code, active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            ON CONFLICT (id) DO UPDATE
            SET full_name = EXCLUDED.full_name, role = EXCLUDED.role
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(role)
        .bind(division)
        .bind(squad_code)
        .execute(pool)
        .await?;
    }

    let activities = vec![
        (
            "calendar-2026-cell-leaders-breakfast",
            "Cell leaders breakfast",
            NaiveDate::from_ymd_opt(2026, 3, 7).context("invalid date")?,
            Some("Marta Solís"),
            Some("8712-4406"),
            Some(45000.0),
        ),
        (
            "calendar-2026-easter-outreach",
            "Easter outreach",
            NaiveDate::from_ymd_opt(2026, 4, 4).context("invalid date")?,
            Some("Daniel Rojas"),
            Some("6130-2291"),
            Some(120000.0),
        ),
        (
            "calendar-2026-prayer-vigil",
            "Prayer vigil",
            NaiveDate::from_ymd_opt(2026, 4, 24).context("invalid date")?,
            Some("Lucía Fernández"),
            None,
            None,
        ),
    ];

    for (source_key, activity, event_date, owner, phone, investment) in activities {
        sqlx::query(
            r#"
            INSERT INTO weekly_notes.calendar_activities
            (id, activity, event_date, owner_name, contact_phone, investment, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(activity)
        .bind(event_date)
        .bind(owner)
        .bind(phone)
        .bind(investment)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

fn activity_from_row(row: &PgRow) -> CalendarActivity {
    CalendarActivity {
        id: row.get("id"),
        activity: row.get("activity"),
        event_date: row.get("event_date"),
        owner_name: row.get("owner_name"),
        contact_phone: row.get("contact_phone"),
        investment: row.get("investment"),
    }
}

pub async fn list_activities(pool: &PgPool) -> anyhow::Result<Vec<CalendarActivity>> {
    let rows = sqlx::query(
        "SELECT id, activity, event_date, owner_name, contact_phone, investment \
         FROM weekly_notes.calendar_activities \
         ORDER BY event_date ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(activity_from_row).collect())
}

pub async fn insert_activity(pool: &PgPool, activity: &NewActivity) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO weekly_notes.calendar_activities
        (id, activity, event_date, owner_name, contact_phone, investment, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&activity.activity)
    .bind(activity.event_date)
    .bind(&activity.owner_name)
    .bind(&activity.contact_phone)
    .bind(activity.investment)
    .bind(format!("manual-{}", Uuid::new_v4()))
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

/// Returns false when no activity has that id.
pub async fn update_activity(
    pool: &PgPool,
    id: Uuid,
    activity: &NewActivity,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE weekly_notes.calendar_activities
        SET activity = $2, event_date = $3, owner_name = $4, contact_phone = $5, investment = $6
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&activity.activity)
    .bind(activity.event_date)
    .bind(&activity.owner_name)
    .bind(&activity.contact_phone)
    .bind(activity.investment)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_activity(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM weekly_notes.calendar_activities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        activity: String,
        event_date: String,
        #[serde(default)]
        owner_name: String,
        #[serde(default)]
        contact_phone: String,
        #[serde(default)]
        investment: String,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let draft = ActivityDraft {
            activity: row.activity,
            event_date: row.event_date,
            owner_name: row.owner_name,
            contact_phone: row.contact_phone,
            investment: row.investment,
        };
        let activity = draft
            .validate()
            .with_context(|| format!("row {} of {}", line + 1, csv_path.display()))?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO weekly_notes.calendar_activities
            (id, activity, event_date, owner_name, contact_phone, investment, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&activity.activity)
        .bind(activity.event_date)
        .bind(&activity.owner_name)
        .bind(&activity.contact_phone)
        .bind(activity.investment)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Duplicate profile rows are tolerated; the first one wins.
pub async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let row = sqlx::query(
        "SELECT id, full_name, role, division, squad_code, active \
         FROM weekly_notes.profiles WHERE id = $1 LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Profile {
        id: row.get("id"),
        full_name: row.get("full_name"),
        role: row.get("role"),
        division: row.get("division"),
        squad_code: row.get("squad_code"),
        active: row.get("active"),
    }))
}

/// Queues an invitation for the mailer and returns the request id.
pub async fn queue_invitation(pool: &PgPool, payload: &InvitationPayload) -> anyhow::Result<Uuid> {
    let body = serde_json::to_value(payload)?;
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO weekly_notes.invitation_requests (id, email, payload)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.email)
    .bind(body)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}
