use chrono::Utc;
use chrono_tz::Tz;
use ledger::{Bucket, Ledger, Money, TransactionKind, Window, grand_total};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finly={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let tz: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;
    let initial_balance: Money = settings.app.initial_balance.parse()?;

    let db = parse_database(&settings.database).await?;
    let mut builder = Ledger::builder().database(db);
    if let Some(pin) = settings.default_pin {
        builder = builder.default_pin(pin);
    }
    let ledger = builder.build().await?;
    ledger.initialize().await?;
    tracing::info!("ledger initialized");

    let now = Utc::now().with_timezone(&tz);
    let balance = ledger.get_balance(initial_balance).await?;
    let summary = ledger.monthly_summary(initial_balance, &now).await?;
    tracing::info!(
        %balance,
        income = %summary.income,
        expense = %summary.expense,
        savings = %summary.savings,
        "dashboard"
    );

    let expense = ledger.taxonomy(TransactionKind::Expense);
    let slices = ledger
        .get_statistics(TransactionKind::Expense, Window::Month, expense, &now)
        .await?;
    let total = grand_total(&slices);
    for slice in &slices {
        tracing::info!(
            category = expense.label(&slice.category).unwrap_or(&slice.category),
            total = %slice.total,
            share = %format!("{:.1}%", slice.share(total)),
            "expenses this month"
        );
    }

    for period in ledger.period_totals(Bucket::Month, &tz).await? {
        tracing::debug!(
            month = %period.start.format("%Y-%m"),
            income = %period.income,
            expense = %period.expense,
            "monthly totals"
        );
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    Ok(sea_orm::Database::connect(url).await?)
}
