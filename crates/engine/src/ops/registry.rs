use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Auxiliary, AuxiliaryInput, AuxiliaryType, EngineError, ResultEngine,
    auxiliaries::{self, base_code},
    voucher_lines, vouchers,
};

use super::{Engine, find_account, normalize_optional_text, normalize_required, with_tx};

#[derive(Clone, Debug, Default)]
pub struct AuxiliaryListFilter {
    pub type_tag: Option<AuxiliaryType>,
    pub account_code: Option<String>,
}

async fn require_auxiliary<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    id: Uuid,
) -> ResultEngine<auxiliaries::Model> {
    auxiliaries::Entity::find_by_id(id.to_string())
        .filter(auxiliaries::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("auxiliary {id}")))
}

/// The linked account must exist and accept auxiliaries.
async fn check_account_link(
    db_tx: &DatabaseTransaction,
    company_id: i64,
    account_code: Option<&str>,
) -> ResultEngine<()> {
    let Some(code) = account_code else {
        return Ok(());
    };
    let account = find_account(db_tx, company_id, code)
        .await?
        .ok_or_else(|| EngineError::InvalidAccountLink(format!("account {code} not found")))?;
    if !account.allows_auxiliary {
        return Err(EngineError::InvalidAccountLink(format!(
            "account {code} does not allow auxiliaries"
        )));
    }
    Ok(())
}

async fn code_taken(
    db_tx: &DatabaseTransaction,
    company_id: i64,
    code: &str,
    except: Option<Uuid>,
) -> ResultEngine<bool> {
    let mut query = auxiliaries::Entity::find()
        .filter(auxiliaries::Column::CompanyId.eq(company_id))
        .filter(auxiliaries::Column::Code.eq(code));
    if let Some(id) = except {
        query = query.filter(auxiliaries::Column::Id.ne(id.to_string()));
    }
    Ok(query.one(db_tx).await?.is_some())
}

/// Auxiliary codes are unique per company. Picks the first free code among `BASE`, `BASE2`, `BASE3`, ...
async fn generate_code(
    db_tx: &DatabaseTransaction,
    company_id: i64,
    type_tag: AuxiliaryType,
    name: &str,
) -> ResultEngine<String> {
    let base = base_code(type_tag, name);
    if !code_taken(db_tx, company_id, &base, None).await? {
        return Ok(base);
    }
    let mut suffix = 2u32;
    loop {
        let candidate = format!("{base}{suffix}");
        if !code_taken(db_tx, company_id, &candidate, None).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

impl Engine {
    /// Registers an auxiliary. A missing code is generated from type and name.
    pub async fn create_auxiliary(
        &self,
        company_id: i64,
        input: AuxiliaryInput,
    ) -> ResultEngine<Auxiliary> {
        let name = normalize_required(&input.name, "auxiliary name")?;
        let linked = normalize_optional_text(input.linked_account_code.as_deref());

        with_tx!(self, |db_tx| {
            check_account_link(&db_tx, company_id, linked.as_deref()).await?;

            let code = match normalize_optional_text(input.code.as_deref()) {
                Some(code) => {
                    if code_taken(&db_tx, company_id, &code, None).await? {
                        return Err(EngineError::InvalidField(format!(
                            "auxiliary code {code} already exists"
                        )));
                    }
                    code
                }
                None => generate_code(&db_tx, company_id, input.type_tag, &name).await?,
            };

            let now = Utc::now();
            let auxiliary = Auxiliary {
                id: Uuid::new_v4(),
                company_id,
                type_tag: input.type_tag,
                code,
                name,
                linked_account_code: linked,
                currency: input.currency,
                is_bank_or_cash: input.type_tag.is_bank_or_cash(),
                contact: input.contact,
                is_active: input.is_active,
                created_at: now,
                updated_at: now,
            };
            auxiliaries::ActiveModel::from(&auxiliary)
                .insert(&db_tx)
                .await?;
            Ok(auxiliary)
        })
    }

    /// Replaces every field of an auxiliary. Without a code the stored one is
    /// kept.
    pub async fn update_auxiliary(
        &self,
        company_id: i64,
        id: Uuid,
        input: AuxiliaryInput,
    ) -> ResultEngine<Auxiliary> {
        let name = normalize_required(&input.name, "auxiliary name")?;
        let linked = normalize_optional_text(input.linked_account_code.as_deref());

        with_tx!(self, |db_tx| {
            let current = Auxiliary::try_from(require_auxiliary(&db_tx, company_id, id).await?)?;
            check_account_link(&db_tx, company_id, linked.as_deref()).await?;

            let code = normalize_optional_text(input.code.as_deref())
                .unwrap_or_else(|| current.code.clone());
            if code_taken(&db_tx, company_id, &code, Some(id)).await? {
                return Err(EngineError::InvalidField(format!(
                    "auxiliary code {code} already exists"
                )));
            }

            let auxiliary = Auxiliary {
                type_tag: input.type_tag,
                code,
                name,
                linked_account_code: linked,
                currency: input.currency,
                is_bank_or_cash: input.type_tag.is_bank_or_cash(),
                contact: input.contact,
                is_active: input.is_active,
                updated_at: Utc::now(),
                ..current
            };
            let mut active = auxiliaries::ActiveModel::from(&auxiliary);
            active.id = ActiveValue::Unchanged(auxiliary.id.to_string());
            active.update(&db_tx).await?;
            Ok(auxiliary)
        })
    }

    /// Deletes an auxiliary no voucher line refers to.
    pub async fn delete_auxiliary(&self, company_id: i64, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_auxiliary(&db_tx, company_id, id).await?;

            let referenced = voucher_lines::Entity::find()
                .inner_join(vouchers::Entity)
                .filter(vouchers::Column::CompanyId.eq(company_id))
                .filter(voucher_lines::Column::AuxiliaryCode.eq(model.code.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if referenced {
                return Err(EngineError::InUse(format!("auxiliary {}", model.code)));
            }

            auxiliaries::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn auxiliary(&self, company_id: i64, id: Uuid) -> ResultEngine<Auxiliary> {
        Auxiliary::try_from(require_auxiliary(&self.database, company_id, id).await?)
    }

    /// Lists auxiliaries ordered by type then code.
    pub async fn list_auxiliaries(
        &self,
        company_id: i64,
        filter: &AuxiliaryListFilter,
    ) -> ResultEngine<Vec<Auxiliary>> {
        let mut query =
            auxiliaries::Entity::find().filter(auxiliaries::Column::CompanyId.eq(company_id));
        if let Some(type_tag) = filter.type_tag {
            query = query.filter(auxiliaries::Column::TypeTag.eq(type_tag.as_str()));
        }
        if let Some(code) = normalize_optional_text(filter.account_code.as_deref()) {
            query = query.filter(auxiliaries::Column::LinkedAccountCode.eq(code));
        }

        query
            .order_by_asc(auxiliaries::Column::TypeTag)
            .order_by_asc(auxiliaries::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Auxiliary::try_from)
            .collect()
    }
}
