use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    AccountNew, AccountType, Currency, Engine, EngineError, EntryType, JournalFilter,
    LedgerFilter, Money, StateFilter, TrialBalanceFilter, VoucherHeader, VoucherLine,
};
use migration::MigratorTrait;
use uuid::Uuid;

const COMPANY: i64 = 7;

async fn engine_with_chart() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    for cmd in [
        AccountNew::new("1", "Activo", AccountType::Asset).transactional(false),
        AccountNew::new("111001001", "Caja general", AccountType::Asset),
        AccountNew::new("111002001", "Banco Unión", AccountType::Asset),
        AccountNew::new("311001001", "Capital", AccountType::Equity),
        AccountNew::new("411001001", "Ventas", AccountType::Income),
        AccountNew::new("511001001", "Sueldos", AccountType::Expense),
    ] {
        engine.create_account(COMPANY, cmd).await.unwrap();
    }
    engine
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

async fn posted(
    engine: &Engine,
    header: VoucherHeader,
    debit: &str,
    credit: &str,
    bs: i64,
    usd: i64,
) -> Uuid {
    let draft = engine
        .create_voucher(
            COMPANY,
            header,
            vec![
                VoucherLine::new(debit)
                    .debit_bs(Money::new(bs))
                    .debit_usd(Money::new(usd)),
                VoucherLine::new(credit)
                    .credit_bs(Money::new(bs))
                    .credit_usd(Money::new(usd)),
            ],
        )
        .await
        .unwrap();
    engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap();
    draft.voucher.id
}

async fn draft(engine: &Engine, header: VoucherHeader, debit: &str, credit: &str, bs: i64) -> Uuid {
    engine
        .create_voucher(
            COMPANY,
            header,
            vec![
                VoucherLine::new(debit).debit_bs(Money::new(bs)),
                VoucherLine::new(credit).credit_bs(Money::new(bs)),
            ],
        )
        .await
        .unwrap()
        .voucher
        .id
}

#[tokio::test]
async fn journal_lists_approved_vouchers_in_date_order() {
    let engine = engine_with_chart().await;
    let opening = posted(
        &engine,
        VoucherHeader::new(date(1, 1), 1, 2024).entry_type(EntryType::Apertura),
        "111001001",
        "311001001",
        10_000_00,
        1_436_78,
    )
    .await;
    let sale = posted(
        &engine,
        VoucherHeader::new(date(1, 15), 1, 2024).concept("Venta contado"),
        "111001001",
        "411001001",
        500_00,
        0,
    )
    .await;
    draft(&engine, VoucherHeader::new(date(1, 10), 1, 2024), "511001001", "111001001", 1_00).await;

    let journal = engine
        .journal(COMPANY, &JournalFilter::default())
        .await
        .unwrap();
    let ids: Vec<Uuid> = journal.entries.iter().map(|e| e.voucher.id).collect();
    assert_eq!(ids, vec![opening, sale]);
    assert_eq!(journal.entries[1].lines[0].account_description, "Caja general");
    assert_eq!(journal.totals.debit_bs, Money::new(10_500_00));
    assert_eq!(journal.totals.debit_bs, journal.totals.credit_bs);

    let everything = engine
        .journal(
            COMPANY,
            &JournalFilter {
                state: StateFilter::All,
                ..JournalFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(everything.entries.len(), 3);
    // The draft has no number but sorts by its date.
    assert_eq!(everything.entries[1].voucher.number, None);

    let openings = engine
        .journal(
            COMPANY,
            &JournalFilter {
                entry_type: Some(EntryType::Apertura),
                ..JournalFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(openings.entries.len(), 1);
    assert_eq!(openings.entries[0].voucher.id, opening);
}

#[tokio::test]
async fn journal_rejects_inverted_date_ranges() {
    let engine = engine_with_chart().await;

    let err = engine
        .journal(
            COMPANY,
            &JournalFilter {
                date_from: Some(date(2, 1)),
                date_to: Some(date(1, 1)),
                ..JournalFilter::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
}

#[tokio::test]
async fn ledger_groups_by_account_with_running_balance() {
    let engine = engine_with_chart().await;
    posted(
        &engine,
        VoucherHeader::new(date(1, 1), 1, 2024),
        "111001001",
        "311001001",
        1_000_00,
        143_68,
    )
    .await;
    posted(
        &engine,
        VoucherHeader::new(date(1, 20), 1, 2024),
        "511001001",
        "111001001",
        300_00,
        43_10,
    )
    .await;
    posted(
        &engine,
        VoucherHeader::new(date(1, 5), 1, 2024),
        "111001001",
        "411001001",
        200_00,
        28_74,
    )
    .await;

    let rows = engine
        .general_ledger(
            COMPANY,
            &LedgerFilter {
                account_from: Some("111000000".to_string()),
                account_to: Some("111999999".to_string()),
                ..LedgerFilter::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.account_code == "111001001"));
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(1, 1), date(1, 5), date(1, 20)]);
    let balances: Vec<Money> = rows.iter().map(|r| r.running_balance).collect();
    assert_eq!(
        balances,
        vec![Money::new(1_000_00), Money::new(1_200_00), Money::new(900_00)]
    );
    assert_eq!(rows[0].account_description, "Caja general");

    let usd = engine
        .general_ledger(
            COMPANY,
            &LedgerFilter {
                account_from: Some("111001001".to_string()),
                account_to: Some("111001001".to_string()),
                currency: Currency::Usd,
                ..LedgerFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(usd.last().unwrap().running_balance, Money::new(129_32));

    let whole = engine
        .general_ledger(COMPANY, &LedgerFilter::default())
        .await
        .unwrap();
    let codes: Vec<&str> = whole.iter().map(|r| r.account_code.as_str()).collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
    assert_eq!(whole.len(), 6);
}

#[tokio::test]
async fn trial_balance_nets_to_zero_for_the_period() {
    let engine = engine_with_chart().await;
    posted(
        &engine,
        VoucherHeader::new(date(1, 1), 1, 2024),
        "111001001",
        "311001001",
        5_000_00,
        718_39,
    )
    .await;
    posted(
        &engine,
        VoucherHeader::new(date(1, 9), 1, 2024),
        "111002001",
        "111001001",
        1_500_00,
        215_52,
    )
    .await;
    // Other period and a draft: neither counts.
    posted(
        &engine,
        VoucherHeader::new(date(2, 3), 2, 2024),
        "511001001",
        "111001001",
        100_00,
        0,
    )
    .await;
    draft(&engine, VoucherHeader::new(date(1, 30), 1, 2024), "511001001", "111002001", 9_00).await;

    let balance = engine
        .trial_balance(COMPANY, &TrialBalanceFilter::new(2024, 1).include_totals(true))
        .await
        .unwrap();

    assert_eq!(balance.rows.len(), 6);
    let totals = balance.totals.unwrap();
    assert_eq!(totals.debit_bs, totals.credit_bs);
    assert_eq!(totals.balance_bs, Money::ZERO);
    assert_eq!(totals.balance_usd, Money::ZERO);

    let caja = balance
        .rows
        .iter()
        .find(|r| r.account_code == "111001001")
        .unwrap();
    assert_eq!(caja.amounts.debit_bs, Money::new(5_000_00));
    assert_eq!(caja.amounts.credit_bs, Money::new(1_500_00));
    assert_eq!(caja.amounts.balance_bs, Money::new(3_500_00));

    let moving = engine
        .trial_balance(
            COMPANY,
            &TrialBalanceFilter::new(2024, 1).include_zero(false),
        )
        .await
        .unwrap();
    let codes: Vec<&str> = moving.rows.iter().map(|r| r.account_code.as_str()).collect();
    assert_eq!(codes, vec!["111001001", "111002001", "311001001"]);
    assert!(moving.totals.is_none());

    let with_drafts = engine
        .trial_balance(
            COMPANY,
            &TrialBalanceFilter::new(2024, 1)
                .state(StateFilter::All)
                .include_zero(false),
        )
        .await
        .unwrap();
    assert_eq!(with_drafts.rows.len(), 4);
}

#[tokio::test]
async fn trial_balance_filters_the_chart() {
    let engine = engine_with_chart().await;

    let top = engine
        .trial_balance(
            COMPANY,
            &TrialBalanceFilter {
                max_level: Some(1),
                ..TrialBalanceFilter::new(2024, 3)
            },
        )
        .await
        .unwrap();
    let codes: Vec<&str> = top.rows.iter().map(|r| r.account_code.as_str()).collect();
    assert_eq!(codes, vec!["1"]);

    let expenses = engine
        .trial_balance(
            COMPANY,
            &TrialBalanceFilter {
                account_type: Some(AccountType::Expense),
                ..TrialBalanceFilter::new(2024, 3)
            },
        )
        .await
        .unwrap();
    assert_eq!(expenses.rows.len(), 1);
    assert_eq!(expenses.rows[0].description, "Sueldos");

    let err = engine
        .trial_balance(COMPANY, &TrialBalanceFilter::new(2024, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
}
