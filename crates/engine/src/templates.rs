//! Voucher templates (plantillas contables).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, VoucherType, template_lines::TemplateLine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTemplate {
    pub id: Uuid,
    pub company_id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub voucher_type: VoucherType,
    pub is_active: bool,
    /// Ordered by `order`.
    pub lines: Vec<TemplateLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "voucher_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub voucher_type: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_lines::Entity")]
    TemplateLines,
}

impl Related<super::template_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&VoucherTemplate> for ActiveModel {
    fn from(template: &VoucherTemplate) -> Self {
        Self {
            id: ActiveValue::Set(template.id.to_string()),
            company_id: ActiveValue::Set(template.company_id),
            code: ActiveValue::Set(template.code.clone()),
            name: ActiveValue::Set(template.name.clone()),
            description: ActiveValue::Set(template.description.clone()),
            voucher_type: ActiveValue::Set(template.voucher_type.as_str().to_string()),
            is_active: ActiveValue::Set(template.is_active),
            created_at: ActiveValue::Set(template.created_at),
            updated_at: ActiveValue::Set(template.updated_at),
        }
    }
}

impl VoucherTemplate {
    pub(crate) fn from_parts(model: Model, lines: Vec<TemplateLine>) -> Result<Self, EngineError> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidField("invalid template id".to_string()))?,
            company_id: model.company_id,
            code: model.code,
            name: model.name,
            description: model.description,
            voucher_type: VoucherType::try_from(model.voucher_type.as_str())?,
            is_active: model.is_active,
            lines,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
