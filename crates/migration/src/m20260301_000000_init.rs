//! Initial ledger schema.
//!
//! - `accounts`: chart of accounts, unique by company and code
//! - `auxiliaries`: subsidiary entities (customers, suppliers, banks...)
//! - `voucher_templates` / `voucher_template_lines`: reusable line skeletons
//! - `vouchers` / `voucher_lines`: journal entries and their movements
//! - `voucher_sequences`: last approved number per company

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    CompanyId,
    Code,
    Description,
    ParentCode,
    Level,
    AccountType,
    Currency,
    Classifier,
    AllowsAuxiliary,
    IsTransactional,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Auxiliaries {
    Table,
    Id,
    CompanyId,
    TypeTag,
    Code,
    Name,
    LinkedAccountCode,
    Currency,
    IsBankOrCash,
    TaxId,
    Address,
    Phone,
    Email,
    Department,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum VoucherTemplates {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    Description,
    VoucherType,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum VoucherTemplateLines {
    Table,
    Id,
    TemplateId,
    LineOrder,
    Side,
    AccountCode,
    AccountIsFixed,
    Percentage,
    IsLocked,
    AllowsAuxiliary,
    Role,
}

#[derive(Iden)]
enum Vouchers {
    Table,
    Id,
    CompanyId,
    Number,
    State,
    Origin,
    VoucherType,
    EntryType,
    Date,
    Period,
    FiscalYear,
    Currency,
    ExchangeRate,
    Concept,
    Beneficiary,
    CheckNumber,
    CreatedAt,
    UpdatedAt,
    ApprovedAt,
}

#[derive(Iden)]
enum VoucherLines {
    Table,
    Id,
    VoucherId,
    LineOrder,
    AccountCode,
    AuxiliaryCode,
    Memo,
    DebitBsMinor,
    CreditBsMinor,
    DebitUsdMinor,
    CreditUsdMinor,
}

#[derive(Iden)]
enum VoucherSequences {
    Table,
    CompanyId,
    LastNumber,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::Code).string().not_null())
                    .col(ColumnDef::new(Accounts::Description).string().not_null())
                    .col(ColumnDef::new(Accounts::ParentCode).string())
                    .col(ColumnDef::new(Accounts::Level).integer().not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("BS"),
                    )
                    .col(ColumnDef::new(Accounts::Classifier).string())
                    .col(
                        ColumnDef::new(Accounts::AllowsAuxiliary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsTransactional)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-company_id-code-unique")
                    .table(Accounts::Table)
                    .col(Accounts::CompanyId)
                    .col(Accounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Auxiliaries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Auxiliaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Auxiliaries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Auxiliaries::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Auxiliaries::TypeTag).string().not_null())
                    .col(ColumnDef::new(Auxiliaries::Code).string().not_null())
                    .col(ColumnDef::new(Auxiliaries::Name).string().not_null())
                    .col(ColumnDef::new(Auxiliaries::LinkedAccountCode).string())
                    .col(
                        ColumnDef::new(Auxiliaries::Currency)
                            .string()
                            .not_null()
                            .default("BS"),
                    )
                    .col(
                        ColumnDef::new(Auxiliaries::IsBankOrCash)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Auxiliaries::TaxId).string())
                    .col(ColumnDef::new(Auxiliaries::Address).string())
                    .col(ColumnDef::new(Auxiliaries::Phone).string())
                    .col(ColumnDef::new(Auxiliaries::Email).string())
                    .col(ColumnDef::new(Auxiliaries::Department).string())
                    .col(
                        ColumnDef::new(Auxiliaries::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Auxiliaries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Auxiliaries::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-auxiliaries-company_id-code-unique")
                    .table(Auxiliaries::Table)
                    .col(Auxiliaries::CompanyId)
                    .col(Auxiliaries::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Voucher templates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(VoucherTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoucherTemplates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplates::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VoucherTemplates::Code).string().not_null())
                    .col(ColumnDef::new(VoucherTemplates::Name).string().not_null())
                    .col(ColumnDef::new(VoucherTemplates::Description).string())
                    .col(
                        ColumnDef::new(VoucherTemplates::VoucherType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplates::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplates::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voucher_templates-company_id-code-unique")
                    .table(VoucherTemplates::Table)
                    .col(VoucherTemplates::CompanyId)
                    .col(VoucherTemplates::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoucherTemplateLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoucherTemplateLines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplateLines::TemplateId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplateLines::LineOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VoucherTemplateLines::Side).string().not_null())
                    .col(ColumnDef::new(VoucherTemplateLines::AccountCode).string())
                    .col(
                        ColumnDef::new(VoucherTemplateLines::AccountIsFixed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(VoucherTemplateLines::Percentage).string())
                    .col(
                        ColumnDef::new(VoucherTemplateLines::IsLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VoucherTemplateLines::AllowsAuxiliary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(VoucherTemplateLines::Role).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-voucher_template_lines-template_id")
                            .from(VoucherTemplateLines::Table, VoucherTemplateLines::TemplateId)
                            .to(VoucherTemplates::Table, VoucherTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voucher_template_lines-template_id")
                    .table(VoucherTemplateLines::Table)
                    .col(VoucherTemplateLines::TemplateId)
                    .col(VoucherTemplateLines::LineOrder)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Vouchers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vouchers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vouchers::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::Number).big_integer())
                    .col(
                        ColumnDef::new(Vouchers::State)
                            .string()
                            .not_null()
                            .default("BORRADOR"),
                    )
                    .col(ColumnDef::new(Vouchers::Origin).string().not_null())
                    .col(ColumnDef::new(Vouchers::VoucherType).string().not_null())
                    .col(ColumnDef::new(Vouchers::EntryType).string().not_null())
                    .col(ColumnDef::new(Vouchers::Date).date().not_null())
                    .col(ColumnDef::new(Vouchers::Period).integer().not_null())
                    .col(ColumnDef::new(Vouchers::FiscalYear).integer().not_null())
                    .col(
                        ColumnDef::new(Vouchers::Currency)
                            .string()
                            .not_null()
                            .default("BS"),
                    )
                    .col(
                        ColumnDef::new(Vouchers::ExchangeRate)
                            .string()
                            .not_null()
                            .default("1"),
                    )
                    .col(ColumnDef::new(Vouchers::Concept).string())
                    .col(ColumnDef::new(Vouchers::Beneficiary).string())
                    .col(ColumnDef::new(Vouchers::CheckNumber).string())
                    .col(ColumnDef::new(Vouchers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Vouchers::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Vouchers::ApprovedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // Approved numbers never repeat within a company. NULLs (drafts) are
        // distinct for the unique index.
        manager
            .create_index(
                Index::create()
                    .name("idx-vouchers-company_id-number-unique")
                    .table(Vouchers::Table)
                    .col(Vouchers::CompanyId)
                    .col(Vouchers::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vouchers-company_id-date")
                    .table(Vouchers::Table)
                    .col(Vouchers::CompanyId)
                    .col(Vouchers::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vouchers-company_id-fiscal_year-period")
                    .table(Vouchers::Table)
                    .col(Vouchers::CompanyId)
                    .col(Vouchers::FiscalYear)
                    .col(Vouchers::Period)
                    .to_owned(),
            )
            .await?;

        // One opening entry per company and fiscal year.
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "idx-vouchers-company_id-fiscal_year-opening"
                   ON "vouchers" ("company_id", "fiscal_year")
                   WHERE "entry_type" = 'Apertura'"#,
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Voucher lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(VoucherLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoucherLines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoucherLines::VoucherId).string().not_null())
                    .col(ColumnDef::new(VoucherLines::LineOrder).integer().not_null())
                    .col(ColumnDef::new(VoucherLines::AccountCode).string().not_null())
                    .col(ColumnDef::new(VoucherLines::AuxiliaryCode).string())
                    .col(ColumnDef::new(VoucherLines::Memo).string())
                    .col(
                        ColumnDef::new(VoucherLines::DebitBsMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VoucherLines::CreditBsMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VoucherLines::DebitUsdMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VoucherLines::CreditUsdMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-voucher_lines-voucher_id")
                            .from(VoucherLines::Table, VoucherLines::VoucherId)
                            .to(Vouchers::Table, Vouchers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voucher_lines-voucher_id")
                    .table(VoucherLines::Table)
                    .col(VoucherLines::VoucherId)
                    .col(VoucherLines::LineOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voucher_lines-account_code")
                    .table(VoucherLines::Table)
                    .col(VoucherLines::AccountCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voucher_lines-auxiliary_code")
                    .table(VoucherLines::Table)
                    .col(VoucherLines::AuxiliaryCode)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Voucher sequences
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(VoucherSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoucherSequences::CompanyId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VoucherSequences::LastNumber)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order to respect foreign keys.
        manager
            .drop_table(Table::drop().table(VoucherSequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoucherLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoucherTemplateLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoucherTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Auxiliaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
