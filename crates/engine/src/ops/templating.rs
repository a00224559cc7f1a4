use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, SkeletonLine, TemplateLine, TemplateLineNew, TemplateNew,
    TemplateUpdate, Voucher, VoucherTemplate, VoucherType, skeleton_lines, template_lines,
    templates, vouchers,
};

use super::{
    Engine, find_account, normalize_optional_text, normalize_required, replace_lines,
    require_voucher, with_tx,
};

/// Result of applying a template: the voucher now holds exactly these lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTemplate {
    pub voucher_id: Uuid,
    pub template_code: String,
    pub template_name: String,
    pub voucher_type: VoucherType,
    pub lines: Vec<SkeletonLine>,
}

async fn require_template<C: ConnectionTrait>(
    db: &C,
    company_id: i64,
    id: Uuid,
) -> ResultEngine<templates::Model> {
    templates::Entity::find_by_id(id.to_string())
        .filter(templates::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("template {id}")))
}

async fn template_lines_of<C: ConnectionTrait>(
    db: &C,
    template_id: &str,
) -> ResultEngine<Vec<TemplateLine>> {
    template_lines::Entity::find()
        .filter(template_lines::Column::TemplateId.eq(template_id))
        .order_by_asc(template_lines::Column::LineOrder)
        .all(db)
        .await?
        .into_iter()
        .map(TemplateLine::try_from)
        .collect()
}

async fn load_template<C: ConnectionTrait>(
    db: &C,
    model: templates::Model,
) -> ResultEngine<VoucherTemplate> {
    let lines = template_lines_of(db, &model.id).await?;
    VoucherTemplate::from_parts(model, lines)
}

/// Fixed lines need an account of the chart; percentages are never negative.
async fn validate_template_line(
    db_tx: &DatabaseTransaction,
    company_id: i64,
    line: &TemplateLineNew,
) -> ResultEngine<Option<String>> {
    let account_code = normalize_optional_text(line.account_code.as_deref());
    if line.account_is_fixed {
        let Some(code) = &account_code else {
            return Err(EngineError::InvalidField(
                "a fixed-account line needs an account code".to_string(),
            ));
        };
        if find_account(db_tx, company_id, code).await?.is_none() {
            return Err(EngineError::InvalidAccount(format!("{code} not found")));
        }
    }
    if line.percentage.is_some_and(|p| p < Decimal::ZERO) {
        return Err(EngineError::InvalidField(
            "percentage must not be negative".to_string(),
        ));
    }
    Ok(account_code)
}

fn build_line(line: TemplateLineNew, account_code: Option<String>, order: i32) -> TemplateLine {
    TemplateLine {
        id: Uuid::new_v4(),
        order,
        side: line.side,
        account_code,
        account_is_fixed: line.account_is_fixed,
        percentage: line.percentage.map(|p| p.normalize()),
        is_locked: line.is_locked,
        allows_auxiliary: line.allows_auxiliary,
        role: normalize_optional_text(line.role.as_deref()),
    }
}

impl Engine {
    /// Creates a template and its lines, numbered in the given order.
    pub async fn create_template(
        &self,
        company_id: i64,
        cmd: TemplateNew,
    ) -> ResultEngine<VoucherTemplate> {
        let code = normalize_required(&cmd.code, "template code")?;
        let name = normalize_required(&cmd.name, "template name")?;

        with_tx!(self, |db_tx| {
            let exists = templates::Entity::find()
                .filter(templates::Column::CompanyId.eq(company_id))
                .filter(templates::Column::Code.eq(code.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::DuplicateTemplateCode(code));
            }

            let mut lines = Vec::with_capacity(cmd.lines.len());
            for (line, order) in cmd.lines.into_iter().zip(1..) {
                let account_code = validate_template_line(&db_tx, company_id, &line).await?;
                lines.push(build_line(line, account_code, order));
            }

            let now = Utc::now();
            let template = VoucherTemplate {
                id: Uuid::new_v4(),
                company_id,
                code,
                name,
                description: normalize_optional_text(cmd.description.as_deref()),
                voucher_type: cmd.voucher_type,
                is_active: true,
                lines,
                created_at: now,
                updated_at: now,
            };
            templates::ActiveModel::from(&template).insert(&db_tx).await?;
            for line in &template.lines {
                template_lines::ActiveModel::for_template(template.id, line)
                    .insert(&db_tx)
                    .await?;
            }
            tracing::info!(company_id, code = %template.code, "template created");
            Ok(template)
        })
    }

    pub async fn template(&self, company_id: i64, id: Uuid) -> ResultEngine<VoucherTemplate> {
        let model = require_template(&self.database, company_id, id).await?;
        load_template(&self.database, model).await
    }

    /// Lists templates ordered by code, optionally only the active ones.
    pub async fn list_templates(
        &self,
        company_id: i64,
        only_active: bool,
    ) -> ResultEngine<Vec<VoucherTemplate>> {
        let mut query =
            templates::Entity::find().filter(templates::Column::CompanyId.eq(company_id));
        if only_active {
            query = query.filter(templates::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(templates::Column::Code)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(load_template(&self.database, model).await?);
        }
        Ok(out)
    }

    pub async fn update_template(
        &self,
        company_id: i64,
        id: Uuid,
        cmd: TemplateUpdate,
    ) -> ResultEngine<VoucherTemplate> {
        with_tx!(self, |db_tx| {
            let model = require_template(&db_tx, company_id, id).await?;
            let mut active: templates::ActiveModel = model.into();
            if let Some(name) = cmd.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required(name, "template name")?);
            }
            if let Some(description) = cmd.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(voucher_type) = cmd.voucher_type {
                active.voucher_type = ActiveValue::Set(voucher_type.as_str().to_string());
            }
            if let Some(is_active) = cmd.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;
            load_template(&db_tx, updated).await
        })
    }

    /// Deletes an empty template. Lines must be removed first.
    pub async fn delete_template(&self, company_id: i64, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_template(&db_tx, company_id, id).await?;
            let has_lines = template_lines::Entity::find()
                .filter(template_lines::Column::TemplateId.eq(model.id.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if has_lines {
                return Err(EngineError::InUse(format!("template {}", model.code)));
            }
            templates::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Appends a line at the end of the template.
    pub async fn add_template_line(
        &self,
        company_id: i64,
        template_id: Uuid,
        line: TemplateLineNew,
    ) -> ResultEngine<VoucherTemplate> {
        with_tx!(self, |db_tx| {
            let model = require_template(&db_tx, company_id, template_id).await?;
            let account_code = validate_template_line(&db_tx, company_id, &line).await?;
            let next_order = template_lines_of(&db_tx, &model.id)
                .await?
                .last()
                .map_or(1, |l| l.order + 1);
            let line = build_line(line, account_code, next_order);
            template_lines::ActiveModel::for_template(template_id, &line)
                .insert(&db_tx)
                .await?;
            load_template(&db_tx, model).await
        })
    }

    /// Replaces the content of one line, keeping its position.
    pub async fn update_template_line(
        &self,
        company_id: i64,
        template_id: Uuid,
        line_id: Uuid,
        line: TemplateLineNew,
    ) -> ResultEngine<VoucherTemplate> {
        with_tx!(self, |db_tx| {
            let model = require_template(&db_tx, company_id, template_id).await?;
            let current = template_lines::Entity::find_by_id(line_id.to_string())
                .filter(template_lines::Column::TemplateId.eq(model.id.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("template line {line_id}")))?;
            let account_code = validate_template_line(&db_tx, company_id, &line).await?;

            let mut updated = build_line(line, account_code, current.line_order);
            updated.id = line_id;
            let mut active = template_lines::ActiveModel::for_template(template_id, &updated);
            active.id = ActiveValue::Unchanged(line_id.to_string());
            active.update(&db_tx).await?;
            load_template(&db_tx, model).await
        })
    }

    /// Removes a line and renumbers the remaining ones `1..n`.
    pub async fn delete_template_line(
        &self,
        company_id: i64,
        template_id: Uuid,
        line_id: Uuid,
    ) -> ResultEngine<VoucherTemplate> {
        with_tx!(self, |db_tx| {
            let model = require_template(&db_tx, company_id, template_id).await?;
            let deleted = template_lines::Entity::delete_many()
                .filter(template_lines::Column::Id.eq(line_id.to_string()))
                .filter(template_lines::Column::TemplateId.eq(model.id.as_str()))
                .exec(&db_tx)
                .await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(format!("template line {line_id}")));
            }

            for (line, order) in template_lines_of(&db_tx, &model.id).await?.into_iter().zip(1..) {
                if line.order != order {
                    template_lines::ActiveModel {
                        id: ActiveValue::Unchanged(line.id.to_string()),
                        line_order: ActiveValue::Set(order),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
            }
            load_template(&db_tx, model).await
        })
    }

    /// Replaces every line of a draft voucher with the zero-amount skeleton of
    /// the active template `template_code`.
    pub async fn apply_template(
        &self,
        company_id: i64,
        voucher_id: Uuid,
        template_code: &str,
    ) -> ResultEngine<AppliedTemplate> {
        let template_code = template_code.trim();

        with_tx!(self, |db_tx| {
            let voucher_model = require_voucher(&db_tx, company_id, voucher_id).await?;
            let voucher = Voucher::try_from(voucher_model)?;
            if !voucher.is_draft() {
                return Err(EngineError::VoucherNotDraft(voucher_id.to_string()));
            }

            let template_model = templates::Entity::find()
                .filter(templates::Column::CompanyId.eq(company_id))
                .filter(templates::Column::Code.eq(template_code))
                .filter(templates::Column::IsActive.eq(true))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::TemplateNotFound(template_code.to_string()))?;
            let template = load_template(&db_tx, template_model).await?;
            if template.lines.is_empty() {
                return Err(EngineError::EmptyTemplate(template.code));
            }

            let skeleton = skeleton_lines(&template.lines);
            let lines: Vec<_> = skeleton.iter().map(|s| s.line.clone()).collect();
            replace_lines(&db_tx, voucher_id, &lines).await?;

            vouchers::ActiveModel {
                id: ActiveValue::Unchanged(voucher_id.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(
                company_id,
                %voucher_id,
                template = %template.code,
                lines = lines.len(),
                "template applied"
            );
            Ok(AppliedTemplate {
                voucher_id,
                template_code: template.code,
                template_name: template.name,
                voucher_type: template.voucher_type,
                lines: skeleton,
            })
        })
    }
}
