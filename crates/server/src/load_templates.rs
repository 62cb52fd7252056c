use anyhow::Context;
use poll_render::{LayoutType, Template};
use sqlx::{postgres::PgPoolOptions, types::Json};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    println!("Connected to database!");

    // Read the template catalog
    let path = env::args().nth(1).unwrap_or_else(|| "templates.json".to_string());
    let catalog = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {path} - make sure it exists!"))?;
    let templates: Vec<Template> =
        serde_json::from_str(&catalog).with_context(|| format!("{path} is not a template list"))?;

    let mut count = 0;
    let mut skipped = 0;

    for template in templates {
        // Check if template already exists
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM templates WHERE id = $1)")
                .bind(&template.id)
                .fetch_one(&db)
                .await?;

        if exists {
            println!("⊘ Skipped (duplicate): {}", template.name);
            skipped += 1;
            continue;
        }

        let layout = LayoutType::resolve(&template.layout_type);
        if layout.as_str() != template.layout_type {
            println!(
                "  note: layout {:?} of {} renders as {}",
                template.layout_type, template.name, layout
            );
        }

        sqlx::query(
            "INSERT INTO templates (id, name, style_name, layout_type, colors, features)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(&template.style_name)
        .bind(&template.layout_type)
        .bind(Json(&template.colors))
        .bind(Json(&template.features))
        .execute(&db)
        .await?;

        count += 1;
        println!("✓ Loaded: {} ({})", template.name, layout);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Successfully loaded {} new templates!", count);
    if skipped > 0 {
        println!("⊘ Skipped {} duplicate templates", skipped);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}
