use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use engine::{
    AccountNew, AccountType, AuxiliaryInput, AuxiliaryType, Engine, EngineError, EntryType,
    ErrorKind, Money, OpeningNew, Page, Side, TemplateLineNew, TemplateNew, VoucherHeader,
    VoucherLine, VoucherListFilter, VoucherState, VoucherType,
};
use migration::MigratorTrait;
use uuid::Uuid;

const COMPANY: i64 = 1;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    (engine, path)
}

async fn seed_chart(engine: &Engine) {
    for cmd in [
        AccountNew::new("111001003", "Caja moneda nacional", AccountType::Asset),
        AccountNew::new("113001001", "IVA crédito fiscal", AccountType::Asset),
        AccountNew::new("210001001", "Proveedores", AccountType::Liability)
            .allows_auxiliary(true),
        AccountNew::new("511001001", "Compras", AccountType::Expense),
    ] {
        engine.create_account(COMPANY, cmd).await.unwrap();
    }
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn header(day: u32) -> VoucherHeader {
    VoucherHeader::new(jan(day), 1, 2024).concept("Compra de material")
}

fn balanced_lines(amount: i64) -> Vec<VoucherLine> {
    vec![
        VoucherLine::new("511001001").debit_bs(Money::new(amount)),
        VoucherLine::new("111001003").credit_bs(Money::new(amount)),
    ]
}

#[tokio::test]
async fn approval_assigns_sequential_numbers_and_freezes_the_voucher() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let first = engine
        .create_voucher(COMPANY, header(5), balanced_lines(100_00))
        .await
        .unwrap();
    let second = engine
        .create_voucher(COMPANY, header(6), balanced_lines(50_00))
        .await
        .unwrap();
    assert_eq!(first.voucher.state, VoucherState::Borrador);
    assert_eq!(first.voucher.number, None);

    let approved = engine
        .approve_voucher(COMPANY, first.voucher.id)
        .await
        .unwrap();
    assert_eq!(approved.voucher.number, Some(1));
    assert_eq!(approved.voucher.state, VoucherState::Aprobado);
    assert!(approved.voucher.approved_at.is_some());

    let approved = engine
        .approve_voucher(COMPANY, second.voucher.id)
        .await
        .unwrap();
    assert_eq!(approved.voucher.number, Some(2));

    let err = engine
        .approve_voucher(COMPANY, first.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::VoucherApproved(_)));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err = engine
        .update_voucher(COMPANY, first.voucher.id, header(7), balanced_lines(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::VoucherApproved(_)));

    let err = engine
        .delete_voucher(COMPANY, first.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::VoucherApproved(_)));

    let stored = engine.voucher(COMPANY, first.voucher.id).await.unwrap();
    assert_eq!(stored.voucher.number, Some(1));
    assert_eq!(stored.lines.len(), 2);
    assert_eq!(stored.voucher.header.date, jan(5));
}

#[tokio::test]
async fn amounts_whose_sum_leaves_the_i64_range_are_refused() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let wrapping = vec![
        VoucherLine::new("511001001").debit_bs(Money::new(i64::MAX)),
        VoucherLine::new("511001001").debit_bs(Money::new(i64::MAX)),
        VoucherLine::new("511001001").debit_bs(Money::new(2)),
    ];
    let err = engine
        .create_voucher(COMPANY, header(3), wrapping.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let listed = engine
        .list_vouchers(COMPANY, &VoucherListFilter::default(), Page::new(None, None))
        .await
        .unwrap();
    assert_eq!(listed.total, 0);

    let draft = engine
        .create_voucher(COMPANY, header(3), balanced_lines(10_00))
        .await
        .unwrap();
    let err = engine
        .update_voucher(COMPANY, draft.voucher.id, header(3), wrapping)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
    let stored = engine.voucher(COMPANY, draft.voucher.id).await.unwrap();
    assert_eq!(stored.lines.len(), 2);
}

#[tokio::test]
async fn approval_refuses_stored_totals_that_would_wrap() {
    let (engine, db) = engine_with_db().await;
    seed_chart(&engine).await;

    let draft = engine
        .create_voucher(
            COMPANY,
            header(3),
            vec![
                VoucherLine::new("511001001").debit_bs(Money::new(1)),
                VoucherLine::new("511001001").debit_bs(Money::new(1)),
                VoucherLine::new("511001001").debit_bs(Money::new(2)),
                VoucherLine::new("111001003"),
            ],
        )
        .await
        .unwrap();
    // Debits of MAX + MAX + 2 wrap to 0 and would match the zero credit.
    db.execute_unprepared(&format!(
        "UPDATE voucher_lines SET debit_bs_minor = {} WHERE voucher_id = '{}' AND line_order IN (1, 2)",
        i64::MAX,
        draft.voucher.id
    ))
    .await
    .unwrap();

    let err = engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
    let listed = engine
        .list_vouchers(COMPANY, &VoucherListFilter::default(), Page::new(None, None))
        .await
        .unwrap();
    assert_eq!(listed.items[0].state, VoucherState::Borrador);
    assert_eq!(listed.items[0].number, None);

    let other = engine
        .create_voucher(COMPANY, header(4), balanced_lines(5_00))
        .await
        .unwrap();
    let approved = engine
        .approve_voucher(COMPANY, other.voucher.id)
        .await
        .unwrap();
    assert_eq!(approved.voucher.number, Some(1));
}

#[tokio::test]
async fn unbalanced_voucher_is_refused_without_consuming_a_number() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let draft = engine
        .create_voucher(
            COMPANY,
            header(3),
            vec![
                VoucherLine::new("511001001").debit_bs(Money::new(100_00)),
                VoucherLine::new("111001003").credit_bs(Money::new(90_00)),
            ],
        )
        .await
        .unwrap();
    assert!(!draft.totals.is_balanced());

    let err = engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unbalanced(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Balanced in BS but not in USD.
    engine
        .update_voucher(
            COMPANY,
            draft.voucher.id,
            header(3),
            vec![
                VoucherLine::new("511001001")
                    .debit_bs(Money::new(696_00))
                    .debit_usd(Money::new(100_00)),
                VoucherLine::new("111001003").credit_bs(Money::new(696_00)),
            ],
        )
        .await
        .unwrap();
    let err = engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unbalanced(_)));

    engine
        .update_voucher(COMPANY, draft.voucher.id, header(3), balanced_lines(100_00))
        .await
        .unwrap();
    let approved = engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap();
    assert_eq!(approved.voucher.number, Some(1));
}

#[tokio::test]
async fn approval_needs_at_least_one_line() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let draft = engine
        .create_voucher(COMPANY, header(2), Vec::new())
        .await
        .unwrap();
    let err = engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
}

#[tokio::test]
async fn lines_are_validated_and_renumbered() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let err = engine
        .create_voucher(
            COMPANY,
            header(2),
            vec![
                VoucherLine::new("511001001").debit_bs(Money::new(10)),
                VoucherLine::new("  ").credit_bs(Money::new(10)),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::LineMissingAccount(ref line) if line == "2"));

    let err = engine
        .create_voucher(
            COMPANY,
            header(2),
            vec![VoucherLine::new("999999999").debit_bs(Money::new(10))],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccount(_)));

    let err = engine
        .create_voucher(
            COMPANY,
            header(2),
            vec![
                VoucherLine::new("511001001")
                    .auxiliary("PROACM")
                    .debit_bs(Money::new(10)),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccountLink(_)));

    let err = engine
        .create_voucher(COMPANY, VoucherHeader::new(jan(2), 13, 2024), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));

    // Nothing was written by the failed attempts.
    let listed = engine
        .list_vouchers(COMPANY, &VoucherListFilter::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);

    let created = engine
        .create_voucher(
            COMPANY,
            header(2),
            vec![
                VoucherLine {
                    order: 40,
                    ..VoucherLine::new(" 511001001 ").debit_bs(Money::new(10))
                },
                VoucherLine {
                    order: 7,
                    ..VoucherLine::new("111001003").credit_bs(Money::new(10))
                },
            ],
        )
        .await
        .unwrap();
    let orders: Vec<i32> = created.lines.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(created.lines[0].account_code, "511001001");
}

#[tokio::test]
async fn deleting_a_draft_removes_it() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let draft = engine
        .create_voucher(COMPANY, header(2), balanced_lines(10))
        .await
        .unwrap();
    engine.delete_voucher(COMPANY, draft.voucher.id).await.unwrap();

    let err = engine.voucher(COMPANY, draft.voucher.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn vouchers_are_scoped_by_company() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let draft = engine
        .create_voucher(COMPANY, header(2), balanced_lines(10))
        .await
        .unwrap();

    let err = engine.voucher(2, draft.voucher.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.approve_voucher(2, draft.voucher.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_vouchers_filters_and_paginates() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    for day in 1..=5 {
        engine
            .create_voucher(COMPANY, header(day), balanced_lines(10))
            .await
            .unwrap();
    }
    engine
        .create_voucher(
            COMPANY,
            header(9).voucher_type(VoucherType::Egreso),
            balanced_lines(10),
        )
        .await
        .unwrap();

    let page = engine
        .list_vouchers(COMPANY, &VoucherListFilter::default(), Page::new(Some(2), Some(4)))
        .await
        .unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].header.date, jan(2));

    let egresos = engine
        .list_vouchers(
            COMPANY,
            &VoucherListFilter {
                voucher_type: Some(VoucherType::Egreso),
                ..VoucherListFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(egresos.total, 1);
    assert_eq!(egresos.items[0].header.date, jan(9));
}

#[tokio::test]
async fn concurrent_approvals_get_distinct_contiguous_numbers() {
    let (engine, path) = engine_with_file_db().await;
    seed_chart(&engine).await;

    let mut ids = Vec::new();
    for day in 1..=8 {
        let draft = engine
            .create_voucher(COMPANY, header(day), balanced_lines(i64::from(day) * 100))
            .await
            .unwrap();
        ids.push(draft.voucher.id);
    }

    let engine = Arc::new(engine);
    let mut handles = Vec::new();
    for id in ids {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.approve_voucher(COMPANY, id).await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let detail = handle.await.unwrap().unwrap();
        numbers.push(detail.voucher.number.unwrap());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<i64>>());

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn numbering_is_independent_per_company() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;
    engine
        .create_account(2, AccountNew::new("111001003", "Caja", AccountType::Asset))
        .await
        .unwrap();
    engine
        .create_account(2, AccountNew::new("511001001", "Compras", AccountType::Expense))
        .await
        .unwrap();

    let a = engine
        .create_voucher(COMPANY, header(1), balanced_lines(10))
        .await
        .unwrap();
    let b = engine
        .create_voucher(2, header(1), balanced_lines(10))
        .await
        .unwrap();

    let a = engine.approve_voucher(COMPANY, a.voucher.id).await.unwrap();
    let b = engine.approve_voucher(2, b.voucher.id).await.unwrap();
    assert_eq!(a.voucher.number, Some(1));
    assert_eq!(b.voucher.number, Some(1));
}

fn compra_template() -> TemplateNew {
    TemplateNew::new("COMPRA_CF", "Compra con factura", VoucherType::Egreso)
        .line(
            TemplateLineNew::new(Side::Debit)
                .fixed_account("511001001")
                .percentage(Decimal::new(87, 0))
                .role("gasto"),
        )
        .line(
            TemplateLineNew::new(Side::Debit)
                .fixed_account("113001001")
                .percentage(Decimal::new(13, 0))
                .locked(true)
                .role("iva"),
        )
        .line(
            TemplateLineNew::new(Side::Credit)
                .suggested_account("210001001")
                .percentage(Decimal::new(100, 0))
                .allows_auxiliary(true),
        )
}

#[tokio::test]
async fn applying_a_template_replaces_lines_with_a_zero_skeleton() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;
    engine
        .create_template(COMPANY, compra_template())
        .await
        .unwrap();

    let draft = engine
        .create_voucher(COMPANY, header(4), balanced_lines(10))
        .await
        .unwrap();
    let applied = engine
        .apply_template(COMPANY, draft.voucher.id, "COMPRA_CF")
        .await
        .unwrap();

    assert_eq!(applied.template_code, "COMPRA_CF");
    assert_eq!(applied.voucher_type, VoucherType::Egreso);
    assert_eq!(applied.lines.len(), 3);
    assert_eq!(applied.lines[0].line.account_code, "511001001");
    assert_eq!(applied.lines[1].line.account_code, "113001001");
    assert!(applied.lines[1].is_locked);
    assert_eq!(applied.lines[2].line.account_code, "");
    assert_eq!(applied.lines[2].suggested_account.as_deref(), Some("210001001"));
    assert_eq!(applied.lines[2].side, Side::Credit);
    assert!(applied.lines.iter().all(|s| s.line.debit_bs.is_zero()
        && s.line.credit_bs.is_zero()
        && s.line.debit_usd.is_zero()
        && s.line.credit_usd.is_zero()));

    let stored = engine.voucher(COMPANY, draft.voucher.id).await.unwrap();
    let orders: Vec<i32> = stored.lines.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(stored.totals.is_balanced());
}

#[tokio::test]
async fn applying_a_template_checks_voucher_and_template() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;
    engine
        .create_template(COMPANY, compra_template())
        .await
        .unwrap();
    let empty = engine
        .create_template(
            COMPANY,
            TemplateNew::new("VACIA", "Sin líneas", VoucherType::Diario),
        )
        .await
        .unwrap();
    assert!(empty.lines.is_empty());

    let draft = engine
        .create_voucher(COMPANY, header(4), balanced_lines(10))
        .await
        .unwrap();

    let err = engine
        .apply_template(COMPANY, draft.voucher.id, "NOPE")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TemplateNotFound(_)));

    let err = engine
        .apply_template(COMPANY, draft.voucher.id, "VACIA")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyTemplate(_)));

    let err = engine
        .create_template(COMPANY, compra_template())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateTemplateCode(_)));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    engine
        .approve_voucher(COMPANY, draft.voucher.id)
        .await
        .unwrap();
    let err = engine
        .apply_template(COMPANY, draft.voucher.id, "COMPRA_CF")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::VoucherNotDraft(_)));

    // The approved voucher kept its lines.
    let stored = engine.voucher(COMPANY, draft.voucher.id).await.unwrap();
    assert_eq!(stored.lines, balanced_lines(10)
        .into_iter()
        .zip(1..)
        .map(|(line, order)| VoucherLine { order, ..line })
        .collect::<Vec<_>>());
}

#[tokio::test]
async fn template_lines_are_edited_in_place_and_renumbered() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;
    let template = engine
        .create_template(COMPANY, compra_template())
        .await
        .unwrap();

    let err = engine
        .create_template(
            COMPANY,
            TemplateNew::new("MALA", "Cuenta inexistente", VoucherType::Diario)
                .line(TemplateLineNew::new(Side::Debit).fixed_account("999")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccount(_)));

    let first = template.lines[0].id;
    let updated = engine
        .delete_template_line(COMPANY, template.id, first)
        .await
        .unwrap();
    let orders: Vec<i32> = updated.lines.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(updated.lines[0].account_code.as_deref(), Some("113001001"));

    let updated = engine
        .add_template_line(
            COMPANY,
            template.id,
            TemplateLineNew::new(Side::Credit).fixed_account("111001003"),
        )
        .await
        .unwrap();
    assert_eq!(updated.lines.len(), 3);
    assert_eq!(updated.lines[2].order, 3);

    let err = engine.delete_template(COMPANY, template.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));
}

#[tokio::test]
async fn auxiliaries_need_an_auxiliary_account_and_get_generated_codes() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let err = engine
        .create_auxiliary(
            COMPANY,
            AuxiliaryInput::new(AuxiliaryType::Proveedor, "Acme SRL").linked_account("111001003"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccountLink(_)));

    let first = engine
        .create_auxiliary(
            COMPANY,
            AuxiliaryInput::new(AuxiliaryType::Proveedor, "Acme SRL").linked_account("210001001"),
        )
        .await
        .unwrap();
    assert_eq!(first.code, "PROACM");
    assert!(!first.is_bank_or_cash);

    let second = engine
        .create_auxiliary(
            COMPANY,
            AuxiliaryInput::new(AuxiliaryType::Proveedor, "Acme Bolivia"),
        )
        .await
        .unwrap();
    assert_eq!(second.code, "PROACM2");

    let bank = engine
        .create_auxiliary(COMPANY, AuxiliaryInput::new(AuxiliaryType::Banco, "Banco Unión"))
        .await
        .unwrap();
    assert!(bank.is_bank_or_cash);
}

#[tokio::test]
async fn referenced_auxiliaries_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let used = engine
        .create_auxiliary(
            COMPANY,
            AuxiliaryInput::new(AuxiliaryType::Proveedor, "Acme SRL").linked_account("210001001"),
        )
        .await
        .unwrap();
    let unused = engine
        .create_auxiliary(COMPANY, AuxiliaryInput::new(AuxiliaryType::Cliente, "Juan Pérez"))
        .await
        .unwrap();

    engine
        .create_voucher(
            COMPANY,
            header(8),
            vec![
                VoucherLine::new("511001001").debit_bs(Money::new(10)),
                VoucherLine::new("210001001")
                    .auxiliary(used.code.clone())
                    .credit_bs(Money::new(10)),
            ],
        )
        .await
        .unwrap();

    let err = engine.delete_auxiliary(COMPANY, used.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    engine.delete_auxiliary(COMPANY, unused.id).await.unwrap();
    let err = engine.auxiliary(COMPANY, unused.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn opening_voucher_is_unique_per_fiscal_year() {
    let (engine, _db) = engine_with_db().await;
    seed_chart(&engine).await;

    let opening = engine
        .create_opening_voucher(
            COMPANY,
            OpeningNew {
                fiscal_year: 2024,
                date: jan(1),
                exchange_rate: "6.96".parse().unwrap(),
                concept: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(opening.voucher.header.entry_type, EntryType::Apertura);
    assert_eq!(opening.voucher.header.voucher_type, VoucherType::Diario);
    assert_eq!(opening.voucher.header.period, 1);
    assert_eq!(
        opening.voucher.header.concept.as_deref(),
        Some("Asiento de apertura gestión 2024")
    );
    assert!(opening.voucher.is_draft());

    let err = engine
        .create_opening_voucher(
            COMPANY,
            OpeningNew {
                fiscal_year: 2024,
                date: jan(2),
                exchange_rate: "6.96".parse().unwrap(),
                concept: Some("Otra apertura".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
}

fn opening(fiscal_year: i32) -> OpeningNew {
    OpeningNew {
        fiscal_year,
        date: NaiveDate::from_ymd_opt(fiscal_year, 1, 1).unwrap(),
        exchange_rate: "6.96".parse().unwrap(),
        concept: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_openings_leave_a_single_voucher() {
    let (engine, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for _ in 0..6 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.create_opening_voucher(COMPANY, opening(2024)).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, EngineError::InvalidField(_))),
        }
    }
    assert_eq!(created, 1);

    let page = engine
        .list_vouchers(
            COMPANY,
            &VoucherListFilter {
                fiscal_year: Some(2024),
                ..Default::default()
            },
            Page::new(None, None),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    engine
        .create_opening_voucher(COMPANY, opening(2025))
        .await
        .unwrap();
    engine
        .create_opening_voucher(COMPANY + 1, opening(2024))
        .await
        .unwrap();

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn storage_rejects_a_second_opening_for_the_same_year() {
    let (engine, db) = engine_with_db().await;
    seed_chart(&engine).await;

    engine
        .create_opening_voucher(COMPANY, opening(2024))
        .await
        .unwrap();
    let draft = engine
        .create_voucher(COMPANY, header(3), balanced_lines(100))
        .await
        .unwrap();

    let result = db
        .execute_unprepared(&format!(
            "UPDATE vouchers SET entry_type = 'Apertura' WHERE id = '{}'",
            draft.voucher.id
        ))
        .await;
    assert!(result.is_err());

    let stored = engine.voucher(COMPANY, draft.voucher.id).await.unwrap();
    assert_eq!(stored.voucher.header.entry_type, EntryType::default());
}
