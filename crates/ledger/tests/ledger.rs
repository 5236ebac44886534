use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use ledger::{
    Bucket, Category, CategoryTotal, DEFAULT_PIN, ErrorKind, InitState, Ledger, LedgerError,
    Money, NewTransaction, Taxonomy, TransactionKind, Window,
};

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    ledger.initialize().await.unwrap();
    ledger
}

async fn file_db() -> (DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let nanos = Utc::now().timestamp_nanos_opt().unwrap();
    let path = root.join(format!("ledger_{}_{nanos}.db", std::process::id()));
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let db = Database::connect(&url).await.unwrap();
    (db, url, path)
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[tokio::test]
async fn initialize_is_explicit_and_idempotent() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    assert_eq!(ledger.state(), InitState::Uninitialized);

    ledger.initialize().await.unwrap();
    assert_eq!(ledger.state(), InitState::Ready);
    assert_eq!(ledger.credential().await.unwrap(), DEFAULT_PIN);

    ledger.set_pin("4321").await.unwrap();
    ledger.initialize().await.unwrap();
    assert_eq!(ledger.credential().await.unwrap(), "4321");
}

#[tokio::test]
async fn building_without_a_database_is_a_storage_error() {
    let err = Ledger::builder().build().await.unwrap_err();
    assert!(matches!(err, LedgerError::Database(_)));
    assert!(err.is_storage());
}

#[tokio::test]
async fn operations_wait_for_initialization() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();

    let txs = ledger.list_transactions(None).await.unwrap();
    assert!(txs.is_empty());
    assert_eq!(ledger.state(), InitState::Ready);
}

#[tokio::test]
async fn salary_and_food_scenario() {
    let ledger = ledger_with_db().await;
    let initial = Money::new(1_000_000);

    ledger
        .add_transaction(NewTransaction::income(Money::new(500_000), "salary"))
        .await
        .unwrap();
    ledger
        .add_transaction(NewTransaction::expense(Money::new(200_000), "food"))
        .await
        .unwrap();

    assert_eq!(
        ledger.get_balance(initial).await.unwrap(),
        Money::new(1_300_000)
    );

    let now = Utc::now();
    let stats = ledger
        .get_statistics(
            TransactionKind::Expense,
            Window::Month,
            &Taxonomy::expense(),
            &now,
        )
        .await
        .unwrap();
    assert_eq!(
        stats,
        vec![CategoryTotal {
            category: "food".to_string(),
            total: Money::new(200_000),
        }]
    );

    let summary = ledger.monthly_summary(initial, &now).await.unwrap();
    assert_eq!(summary.income, Money::new(500_000));
    assert_eq!(summary.expense, Money::new(200_000));
    assert_eq!(summary.savings, Money::new(1_300_000));
}

#[tokio::test]
async fn negative_amount_is_rejected_and_nothing_is_stored() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .add_transaction(NewTransaction::expense(Money::new(-100), "food"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = ledger
        .add_transaction(NewTransaction::expense(Money::ZERO, "food"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(ledger.list_transactions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn category_must_match_kind() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .add_transaction(NewTransaction::income(Money::new(100), "food"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCategory(_)));

    let err = ledger
        .add_transaction(NewTransaction::expense(Money::new(100), "salary"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = ledger
        .add_transaction(NewTransaction::expense(Money::new(100), "gambling"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(ledger.list_all_transactions().await.unwrap().is_empty());
}

#[tokio::test]
async fn stored_record_matches_input() {
    let ledger = ledger_with_db().await;
    let date = at(2024, 2, 29, 8, 30, 0);
    let input = NewTransaction::expense(Money::new(45_500), "bills")
        .description("Electricity")
        .date(date);

    let stored = ledger.add_transaction(input.clone()).await.unwrap();
    let listed = ledger.list_transactions(None).await.unwrap();
    assert_eq!(listed, vec![stored.clone()]);

    let tx = &listed[0];
    assert_eq!(tx.amount, input.amount);
    assert_eq!(tx.description.as_deref(), Some("Electricity"));
    assert_eq!(tx.category, input.category);
    assert_eq!(tx.kind, input.kind);
    assert_eq!(tx.date, date);

    assert_eq!(ledger.transaction(stored.id).await.unwrap(), stored);
}

#[tokio::test]
async fn missing_date_defaults_to_now() {
    let ledger = ledger_with_db().await;
    let before = Utc::now() - Duration::seconds(1);
    let tx = ledger
        .add_transaction(NewTransaction::income(Money::new(1), "bonus"))
        .await
        .unwrap();
    assert!(tx.date >= before);
    assert!(tx.date <= Utc::now() + Duration::seconds(1));
}

#[tokio::test]
async fn listing_is_newest_first_with_id_tie_break() {
    let ledger = ledger_with_db().await;
    let same = at(2024, 6, 1, 12, 0, 0);
    let dates = [
        at(2024, 5, 1, 0, 0, 0),
        same,
        at(2024, 7, 1, 0, 0, 0),
        same,
        at(2023, 12, 31, 23, 59, 59),
    ];
    for date in dates {
        ledger
            .add_transaction(NewTransaction::expense(Money::new(10), "food").date(date))
            .await
            .unwrap();
    }

    let listed = ledger.list_transactions(None).await.unwrap();
    assert_eq!(listed.len(), 5);
    for pair in listed.windows(2) {
        assert!(
            (pair[0].date, pair[0].id) > (pair[1].date, pair[1].id),
            "{pair:?}"
        );
    }
    assert_eq!(listed[0].date, at(2024, 7, 1, 0, 0, 0));
    assert_eq!(listed[1].date, same);
    assert_eq!(listed[2].date, same);
    assert!(listed[1].id > listed[2].id);
}

#[tokio::test]
async fn list_limit_defaults_to_one_hundred() {
    let ledger = ledger_with_db().await;
    for i in 0..105 {
        ledger
            .add_transaction(NewTransaction::income(Money::new(i + 1), "salary"))
            .await
            .unwrap();
    }
    assert_eq!(ledger.list_transactions(None).await.unwrap().len(), 100);
    assert_eq!(ledger.list_transactions(Some(3)).await.unwrap().len(), 3);
    assert!(ledger.list_transactions(Some(0)).await.unwrap().is_empty());
    assert_eq!(ledger.list_all_transactions().await.unwrap().len(), 105);
    assert_eq!(ledger.count().await.unwrap(), 105);
}

#[tokio::test]
async fn unbounded_limit_lists_everything() {
    let ledger = ledger_with_db().await;
    for i in 0..3 {
        ledger
            .add_transaction(NewTransaction::expense(Money::new(10 + i), "food"))
            .await
            .unwrap();
    }
    let everything = ledger.list_transactions(Some(u64::MAX)).await.unwrap();
    assert_eq!(everything, ledger.list_all_transactions().await.unwrap());
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn storage_failures_are_reported_as_storage_errors() {
    let (db, _url, path) = file_db().await;
    let ledger = Ledger::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    ledger
        .add_transaction(NewTransaction::income(Money::new(1_000), "salary"))
        .await
        .unwrap();

    db.execute_unprepared(
        "CREATE TRIGGER refuse_inserts BEFORE INSERT ON transactions \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END",
    )
    .await
    .unwrap();

    let err = ledger
        .add_transaction(NewTransaction::expense(Money::new(400), "food"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!err.is_validation());
    assert_eq!(ledger.count().await.unwrap(), 1);
    assert_eq!(
        ledger.get_balance(Money::ZERO).await.unwrap(),
        Money::new(1_000)
    );

    // Bad input is still classified as such while storage is broken.
    let err = ledger
        .add_transaction(NewTransaction::expense(Money::new(-400), "food"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    db.execute_unprepared("DROP TABLE transactions")
        .await
        .unwrap();
    assert!(ledger.list_all_transactions().await.unwrap_err().is_storage());
    assert!(ledger.delete_transaction(1).await.unwrap_err().is_storage());

    drop(ledger);
    drop(db);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn deleting_unknown_id_changes_nothing() {
    let ledger = ledger_with_db().await;
    let initial = Money::new(5_000);
    let tx = ledger
        .add_transaction(NewTransaction::expense(Money::new(1_250), "shopping"))
        .await
        .unwrap();

    let before = ledger.list_transactions(None).await.unwrap();
    let balance = ledger.get_balance(initial).await.unwrap();

    ledger.delete_transaction(tx.id + 1_000).await.unwrap();

    assert_eq!(ledger.list_transactions(None).await.unwrap(), before);
    assert_eq!(ledger.get_balance(initial).await.unwrap(), balance);

    ledger.delete_transaction(tx.id).await.unwrap();
    ledger.delete_transaction(tx.id).await.unwrap();
    assert_eq!(ledger.get_balance(initial).await.unwrap(), initial);
}

#[tokio::test]
async fn read_by_unknown_id_is_not_found() {
    let ledger = ledger_with_db().await;
    let err = ledger.transaction(42).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn ids_are_never_reused() {
    let ledger = ledger_with_db().await;
    let first = ledger
        .add_transaction(NewTransaction::income(Money::new(10), "salary"))
        .await
        .unwrap();
    ledger.delete_all_transactions().await.unwrap();
    ledger.delete_all_transactions().await.unwrap();

    let second = ledger
        .add_transaction(NewTransaction::income(Money::new(10), "salary"))
        .await
        .unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn reset_all_clears_transactions_and_restores_default_pin() {
    let ledger = ledger_with_db().await;
    ledger
        .add_transaction(NewTransaction::income(Money::new(10), "salary"))
        .await
        .unwrap();
    ledger.set_pin("9876").await.unwrap();

    ledger.reset_all().await.unwrap();

    assert!(ledger.list_all_transactions().await.unwrap().is_empty());
    assert_eq!(ledger.credential().await.unwrap(), DEFAULT_PIN);
    assert!(ledger.verify_pin(DEFAULT_PIN).await.unwrap());
}

#[tokio::test]
async fn pin_management() {
    let ledger = ledger_with_db().await;

    assert!(ledger.verify_pin("1234").await.unwrap());
    assert!(!ledger.verify_pin("0000").await.unwrap());

    let err = ledger.change_pin("5555", Some("0000")).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPin(_)));
    assert_eq!(ledger.credential().await.unwrap(), "1234");

    ledger.change_pin("5555", Some("1234")).await.unwrap();
    assert!(ledger.verify_pin("5555").await.unwrap());

    ledger.change_pin("6666", None).await.unwrap();
    assert_eq!(ledger.credential().await.unwrap(), "6666");

    assert!(ledger.set_pin("12").await.unwrap_err().is_validation());
    assert!(ledger.change_pin("abcd", None).await.unwrap_err().is_validation());

    ledger.reset_pin().await.unwrap();
    assert_eq!(ledger.credential().await.unwrap(), "1234");
}

#[tokio::test]
async fn custom_default_pin_is_seeded() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let ledger = Ledger::builder()
        .database(db)
        .default_pin("0007")
        .build()
        .await
        .unwrap();
    assert_eq!(ledger.credential().await.unwrap(), "0007");

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let err = Ledger::builder()
        .database(db)
        .default_pin("7")
        .build()
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn windows_on_stored_transactions() {
    let ledger = ledger_with_db().await;
    // Wednesday.
    let now = at(2024, 5, 15, 12, 0, 0);
    let week_start = at(2024, 5, 12, 0, 0, 0);

    ledger
        .add_transaction(NewTransaction::expense(Money::new(100), "food").date(now))
        .await
        .unwrap();
    ledger
        .add_transaction(
            NewTransaction::expense(Money::new(10), "health")
                .date(week_start - Duration::milliseconds(1)),
        )
        .await
        .unwrap();
    ledger
        .add_transaction(
            NewTransaction::expense(Money::new(1), "education").date(at(2023, 5, 15, 12, 0, 0)),
        )
        .await
        .unwrap();

    let expense = Taxonomy::expense();
    let stats = |window: Window| {
        let ledger = &ledger;
        let expense = &expense;
        async move {
            ledger
                .get_statistics(TransactionKind::Expense, window, expense, &now)
                .await
                .unwrap()
                .into_iter()
                .map(|t| t.category)
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(stats(Window::Day).await, ["food"]);
    assert_eq!(stats(Window::Week).await, ["food"]);
    assert_eq!(stats(Window::Month).await, ["health", "food"]);
    assert_eq!(stats(Window::Year).await, ["health", "food"]);
    assert_eq!(stats(Window::All).await, ["health", "food", "education"]);

    let custom = Window::custom(at(2023, 1, 1, 0, 0, 0), at(2023, 12, 31, 0, 0, 0)).unwrap();
    assert_eq!(stats(custom).await, ["education"]);

    let open = Window::Custom {
        start: None,
        end: Some(at(2000, 1, 1, 0, 0, 0)),
    };
    assert_eq!(stats(open).await, ["health", "food", "education"]);

    let income = ledger
        .get_statistics(TransactionKind::Income, Window::All, &Taxonomy::income(), &now)
        .await
        .unwrap();
    assert!(income.is_empty());
}

#[tokio::test]
async fn categories_outside_the_taxonomy_are_dropped() {
    let ledger = ledger_with_db().await;
    ledger
        .add_transaction(NewTransaction::expense(Money::new(300), "food"))
        .await
        .unwrap();
    ledger
        .add_transaction(NewTransaction::expense(Money::new(700), "bills"))
        .await
        .unwrap();

    let narrow = Taxonomy::new(
        TransactionKind::Expense,
        vec![Category::new("food", "Food")],
    )
    .unwrap();
    let stats = ledger
        .get_statistics(TransactionKind::Expense, Window::All, &narrow, &Utc::now())
        .await
        .unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, Money::new(300));
}

#[tokio::test]
async fn custom_taxonomies_drive_validation() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let side_jobs = Taxonomy::new(
        TransactionKind::Income,
        vec![Category::new("tutoring", "Tutoring")],
    )
    .unwrap();
    let ledger = Ledger::builder()
        .database(db)
        .taxonomy(side_jobs)
        .build()
        .await
        .unwrap();

    ledger
        .add_transaction(NewTransaction::income(Money::new(10), "tutoring"))
        .await
        .unwrap();
    assert!(
        ledger
            .add_transaction(NewTransaction::income(Money::new(10), "salary"))
            .await
            .unwrap_err()
            .is_validation()
    );

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let overlapping = Taxonomy::new(
        TransactionKind::Income,
        vec![Category::new("food", "Food")],
    )
    .unwrap();
    let err = Ledger::builder()
        .database(db)
        .taxonomy(overlapping)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTaxonomy(_)));
}

#[tokio::test]
async fn totals_and_period_buckets() {
    let ledger = ledger_with_db().await;
    ledger
        .add_transaction(
            NewTransaction::income(Money::new(1_000), "salary").date(at(2024, 1, 31, 10, 0, 0)),
        )
        .await
        .unwrap();
    ledger
        .add_transaction(
            NewTransaction::expense(Money::new(300), "food").date(at(2024, 2, 1, 10, 0, 0)),
        )
        .await
        .unwrap();
    ledger
        .add_transaction(
            NewTransaction::expense(Money::new(200), "bills").date(at(2024, 2, 20, 10, 0, 0)),
        )
        .await
        .unwrap();

    let totals = ledger.totals().await.unwrap();
    assert_eq!(totals.income, Money::new(1_000));
    assert_eq!(totals.expense, Money::new(500));

    let months = ledger.period_totals(Bucket::Month, &Utc).await.unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].income, Money::new(1_000));
    assert_eq!(months[0].expense, Money::ZERO);
    assert_eq!(months[1].expense, Money::new(500));

    let years = ledger.period_totals(Bucket::Year, &Utc).await.unwrap();
    assert_eq!(years.len(), 1);
}

#[tokio::test]
async fn windows_follow_the_local_calendar() {
    let ledger = ledger_with_db().await;
    // 2024-06-01 01:00 in Jakarta.
    ledger
        .add_transaction(
            NewTransaction::expense(Money::new(50), "food").date(at(2024, 5, 31, 18, 0, 0)),
        )
        .await
        .unwrap();

    let expense = Taxonomy::expense();
    let jakarta = chrono_tz::Asia::Jakarta;
    let local_now = jakarta.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
    let utc_now = at(2024, 6, 10, 9, 0, 0);

    let local = ledger
        .get_statistics(TransactionKind::Expense, Window::Month, &expense, &local_now)
        .await
        .unwrap();
    assert_eq!(local.len(), 1);

    let utc = ledger
        .get_statistics(TransactionKind::Expense, Window::Month, &expense, &utc_now)
        .await
        .unwrap();
    assert!(utc.is_empty());

    let months = ledger.period_totals(Bucket::Month, &jakarta).await.unwrap();
    assert_eq!(
        months[0].start,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_keep_the_balance_consistent() {
    let ledger = Arc::new(ledger_with_db().await);
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..40i64 {
        let ledger = Arc::clone(&ledger);
        tasks.spawn(async move {
            let input = if i % 2 == 0 {
                NewTransaction::income(Money::new(100 + i), "salary")
            } else {
                NewTransaction::expense(Money::new(50 + i), "food")
            };
            ledger.add_transaction(input).await.unwrap()
        });
    }
    let mut ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        ids.push(result.unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 40);

    let expected: i64 = (0..40i64)
        .map(|i| if i % 2 == 0 { 100 + i } else { -(50 + i) })
        .sum();
    assert_eq!(
        ledger.get_balance(Money::ZERO).await.unwrap(),
        Money::new(expected)
    );
}

#[tokio::test]
async fn data_survives_reopening_the_database() {
    let (db, url, path) = file_db().await;
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    let stored = ledger
        .add_transaction(
            NewTransaction::income(Money::new(750_000), "freelance").description("Logo design"),
        )
        .await
        .unwrap();
    ledger.set_pin("2468").await.unwrap();
    drop(ledger);

    let db = Database::connect(&url).await.unwrap();
    let reopened = Ledger::builder().database(db).build().await.unwrap();
    reopened.initialize().await.unwrap();

    assert_eq!(reopened.list_all_transactions().await.unwrap(), vec![stored]);
    assert_eq!(reopened.credential().await.unwrap(), "2468");
    assert_eq!(
        reopened.get_balance(Money::new(250_000)).await.unwrap(),
        Money::new(1_000_000)
    );

    drop(reopened);
    let _ = std::fs::remove_file(path);
}
