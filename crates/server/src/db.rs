use poll_render::{Poll, PollOption, PollPayload, Template};
use sqlx::PgPool;

use crate::models::{OptionRow, PollRow, TemplateRow};

pub async fn fetch_templates(db: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
    let rows: Vec<TemplateRow> = sqlx::query_as(
        "SELECT id, name, style_name, layout_type, colors, features
         FROM templates
         ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Template::from).collect())
}

pub async fn fetch_template(db: &PgPool, template_id: &str) -> Result<Option<Template>, sqlx::Error> {
    let row: Option<TemplateRow> = sqlx::query_as(
        "SELECT id, name, style_name, layout_type, colors, features
         FROM templates
         WHERE id = $1",
    )
    .bind(template_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Template::from))
}

/// A poll with live counts and its template. Polls without a template (or
/// pointing at a deleted one) get the default card template.
pub async fn fetch_payload(db: &PgPool, poll_id: &str) -> Result<Option<PollPayload>, sqlx::Error> {
    let poll: Option<PollRow> = sqlx::query_as(
        "SELECT id, title, description, expires_at, region, template_id
         FROM polls
         WHERE id = $1",
    )
    .bind(poll_id)
    .fetch_optional(db)
    .await?;

    let Some(poll) = poll else {
        return Ok(None);
    };

    let options: Vec<OptionRow> = sqlx::query_as(
        "SELECT o.id, o.text, o.emoji, o.image_url, COUNT(v.id) AS vote_count
         FROM poll_options o
         LEFT JOIN poll_votes v ON v.poll_id = o.poll_id AND v.option_id = o.id
         WHERE o.poll_id = $1
         GROUP BY o.poll_id, o.id
         ORDER BY o.position, o.id",
    )
    .bind(poll_id)
    .fetch_all(db)
    .await?;

    let options: Vec<PollOption> = options.into_iter().map(PollOption::from).collect();
    let total_votes: u64 = options.iter().filter_map(|o| o.vote_count).sum();

    let template = match &poll.template_id {
        Some(template_id) => fetch_template(db, template_id).await?.unwrap_or_else(|| {
            tracing::warn!("Poll {} references missing template {template_id}", poll.id);
            Template::default()
        }),
        None => Template::default(),
    };

    Ok(Some(PollPayload {
        poll: Poll {
            id: poll.id,
            title: poll.title,
            description: poll.description,
            options,
            total_votes: Some(total_votes),
            expires_at: poll.expires_at,
            region: poll.region,
        },
        template,
    }))
}

pub async fn voter_choice(db: &PgPool, poll_id: &str, voter_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT option_id FROM poll_votes WHERE poll_id = $1 AND voter_id = $2")
        .bind(poll_id)
        .bind(voter_id)
        .fetch_optional(db)
        .await
}

/// Returns false when the voter already has a vote on this poll.
pub async fn record_vote(
    db: &PgPool,
    poll_id: &str,
    option_id: &str,
    voter_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO poll_votes (poll_id, option_id, voter_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (poll_id, voter_id) DO NOTHING",
    )
    .bind(poll_id)
    .bind(option_id)
    .bind(voter_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() == 1)
}
