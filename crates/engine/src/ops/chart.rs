use chrono::Utc;
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountNew, AccountType, AccountUpdate, EngineError, Page, Paged, ResultEngine,
    accounts::{self, derive_level, validate_code},
};

use super::{Engine, find_account, normalize_optional_text, normalize_required, with_tx};

/// Filters for listing the chart of accounts. Bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct AccountListFilter {
    pub code_from: Option<String>,
    pub code_to: Option<String>,
    pub account_type: Option<AccountType>,
    pub level: Option<i32>,
    pub active: Option<bool>,
}

trait ApplyAccountFilters: QueryFilter + Sized {
    fn apply_account_filters(self, filter: &AccountListFilter) -> Self;
}

impl<T> ApplyAccountFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_account_filters(mut self, filter: &AccountListFilter) -> Self {
        if let Some(from) = normalize_optional_text(filter.code_from.as_deref()) {
            self = self.filter(accounts::Column::Code.gte(from));
        }
        if let Some(to) = normalize_optional_text(filter.code_to.as_deref()) {
            self = self.filter(accounts::Column::Code.lte(to));
        }
        if let Some(account_type) = &filter.account_type {
            self = self.filter(accounts::Column::AccountType.eq(account_type.as_str()));
        }
        if let Some(level) = filter.level {
            self = self.filter(accounts::Column::Level.eq(level));
        }
        if let Some(active) = filter.active {
            self = self.filter(accounts::Column::IsActive.eq(active));
        }
        self
    }
}

impl Engine {
    /// Adds an account to the company chart.
    ///
    /// The level is derived from the code unless given. A parent, when set,
    /// must exist one level above.
    pub async fn create_account(&self, company_id: i64, cmd: AccountNew) -> ResultEngine<Account> {
        let code = validate_code(&cmd.code)?;
        let description = normalize_required(&cmd.description, "description")?;
        if cmd.account_type.as_str().trim().is_empty() {
            return Err(EngineError::InvalidField(
                "account type must not be empty".to_string(),
            ));
        }
        let level = match cmd.level {
            Some(level) if level >= 1 => level,
            Some(level) => {
                return Err(EngineError::InvalidField(format!(
                    "level must be positive, got {level}"
                )));
            }
            None => derive_level(&code),
        };
        let parent_code = normalize_optional_text(cmd.parent_code.as_deref());

        with_tx!(self, |db_tx| {
            if find_account(&db_tx, company_id, &code).await?.is_some() {
                return Err(EngineError::DuplicateAccount(code));
            }

            if let Some(parent) = &parent_code {
                let parent_model = find_account(&db_tx, company_id, parent)
                    .await?
                    .ok_or_else(|| {
                        EngineError::InvalidField(format!("parent account {parent} not found"))
                    })?;
                if parent_model.level != level - 1 {
                    return Err(EngineError::InvalidField(format!(
                        "parent account {parent} has level {}, expected {}",
                        parent_model.level,
                        level - 1
                    )));
                }
            }

            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4(),
                company_id,
                code: code.clone(),
                description,
                parent_code,
                level,
                account_type: cmd.account_type,
                currency: cmd.currency,
                classifier: normalize_optional_text(cmd.classifier.as_deref()),
                allows_auxiliary: cmd.allows_auxiliary,
                is_transactional: cmd.is_transactional,
                is_active: cmd.is_active,
                created_at: now,
                updated_at: now,
            };
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            tracing::info!(company_id, code = %account.code, "account created");
            Ok(account)
        })
    }

    /// Lists accounts ordered by code.
    pub async fn list_accounts(
        &self,
        company_id: i64,
        filter: &AccountListFilter,
        page: Page,
    ) -> ResultEngine<Paged<Account>> {
        let paginator = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .apply_account_filters(filter)
            .order_by_asc(accounts::Column::Code)
            .paginate(&self.database, page.limit);

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.page - 1)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Paged {
            items,
            page: page.page,
            limit: page.limit,
            total,
            total_pages: total.div_ceil(page.limit),
        })
    }

    pub async fn account(&self, company_id: i64, code: &str) -> ResultEngine<Account> {
        let model = find_account(&self.database, company_id, code.trim())
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {code}")))?;
        Account::try_from(model)
    }

    /// Updates descriptive fields and flags. Accounts are never deleted; set
    /// `is_active = false` instead.
    pub async fn update_account(
        &self,
        company_id: i64,
        code: &str,
        cmd: AccountUpdate,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = find_account(&db_tx, company_id, code.trim())
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("account {code}")))?;
            let mut active: accounts::ActiveModel = model.into();

            if let Some(description) = cmd.description.as_deref() {
                active.description = ActiveValue::Set(normalize_required(description, "description")?);
            }
            if let Some(account_type) = &cmd.account_type {
                active.account_type = ActiveValue::Set(account_type.as_str().to_string());
            }
            if let Some(classifier) = cmd.classifier.as_deref() {
                active.classifier = ActiveValue::Set(normalize_optional_text(Some(classifier)));
            }
            if let Some(value) = cmd.allows_auxiliary {
                active.allows_auxiliary = ActiveValue::Set(value);
            }
            if let Some(value) = cmd.is_transactional {
                active.is_transactional = ActiveValue::Set(value);
            }
            if let Some(value) = cmd.is_active {
                active.is_active = ActiveValue::Set(value);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }
}
