//! Template lines and the skeleton transform used by `apply_template`.
//!
//! A template line never carries an amount. It tells the client on which side
//! the line goes, which share of the total it usually takes and whether the
//! account is fixed or left for the user.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, VoucherLine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "DEBE", alias = "debit")]
    Debit,
    #[serde(rename = "HABER", alias = "credit")]
    Credit,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBE",
            Self::Credit => "HABER",
        }
    }
}

impl TryFrom<&str> for Side {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBE" | "DEBIT" => Ok(Self::Debit),
            "HABER" | "CREDIT" => Ok(Self::Credit),
            other => Err(EngineError::InvalidField(format!(
                "side must be DEBE or HABER, got {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLine {
    pub id: Uuid,
    pub order: i32,
    pub side: Side,
    pub account_code: Option<String>,
    pub account_is_fixed: bool,
    pub percentage: Option<Decimal>,
    pub is_locked: bool,
    pub allows_auxiliary: bool,
    /// Free-form role hint such as `BASE` or `IVA_CF`.
    pub role: Option<String>,
}

/// A zero-amount voucher line plus the template metadata the client needs to
/// fill it in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonLine {
    pub line: VoucherLine,
    pub side: Side,
    pub percentage: Option<Decimal>,
    pub is_locked: bool,
    pub account_is_fixed: bool,
    pub allows_auxiliary: bool,
    pub role: Option<String>,
    pub suggested_account: Option<String>,
}

/// Turns template lines into zero-amount voucher lines, preserving order.
///
/// Only fixed accounts are copied onto the voucher line; variable ones stay
/// empty and surface as `suggested_account`.
#[must_use]
pub fn skeleton_lines(template_lines: &[TemplateLine]) -> Vec<SkeletonLine> {
    let mut ordered: Vec<&TemplateLine> = template_lines.iter().collect();
    ordered.sort_by_key(|l| l.order);

    ordered
        .into_iter()
        .zip(1..)
        .map(|(tl, order)| {
            let account_code = if tl.account_is_fixed {
                tl.account_code.clone().unwrap_or_default()
            } else {
                String::new()
            };
            SkeletonLine {
                line: VoucherLine {
                    order,
                    account_code,
                    ..VoucherLine::default()
                },
                side: tl.side,
                percentage: tl.percentage,
                is_locked: tl.is_locked,
                account_is_fixed: tl.account_is_fixed,
                allows_auxiliary: tl.allows_auxiliary,
                role: tl.role.clone(),
                suggested_account: tl.account_code.clone(),
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "voucher_template_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub template_id: String,
    pub line_order: i32,
    pub side: String,
    pub account_code: Option<String>,
    pub account_is_fixed: bool,
    pub percentage: Option<String>,
    pub is_locked: bool,
    pub allows_auxiliary: bool,
    pub role: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::templates::Entity",
        from = "Column::TemplateId",
        to = "super::templates::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Templates,
}

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_template(template_id: Uuid, line: &TemplateLine) -> Self {
        Self {
            id: ActiveValue::Set(line.id.to_string()),
            template_id: ActiveValue::Set(template_id.to_string()),
            line_order: ActiveValue::Set(line.order),
            side: ActiveValue::Set(line.side.as_str().to_string()),
            account_code: ActiveValue::Set(line.account_code.clone()),
            account_is_fixed: ActiveValue::Set(line.account_is_fixed),
            percentage: ActiveValue::Set(line.percentage.map(|p| p.to_string())),
            is_locked: ActiveValue::Set(line.is_locked),
            allows_auxiliary: ActiveValue::Set(line.allows_auxiliary),
            role: ActiveValue::Set(line.role.clone()),
        }
    }
}

impl TryFrom<Model> for TemplateLine {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let percentage = model
            .percentage
            .as_deref()
            .map(str::parse::<Decimal>)
            .transpose()
            .map_err(|_| EngineError::InvalidField("invalid template percentage".to_string()))?;
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidField("invalid template line id".to_string()))?,
            order: model.line_order,
            side: Side::try_from(model.side.as_str())?,
            account_code: model.account_code,
            account_is_fixed: model.account_is_fixed,
            percentage,
            is_locked: model.is_locked,
            allows_auxiliary: model.allows_auxiliary,
            role: model.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(order: i32, side: Side, account: Option<&str>, fixed: bool) -> TemplateLine {
        TemplateLine {
            id: Uuid::new_v4(),
            order,
            side,
            account_code: account.map(ToString::to_string),
            account_is_fixed: fixed,
            percentage: None,
            is_locked: false,
            allows_auxiliary: false,
            role: None,
        }
    }

    #[test]
    fn skeleton_keeps_order_and_zero_amounts() {
        let template = vec![
            line(2, Side::Debit, Some("114001001"), true),
            line(1, Side::Debit, Some("511001001"), false),
            line(3, Side::Credit, None, false),
        ];

        let skeleton = skeleton_lines(&template);

        assert_eq!(skeleton.len(), 3);
        let orders: Vec<i32> = skeleton.iter().map(|s| s.line.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(skeleton.iter().all(|s| s.line.debit_bs.is_zero()
            && s.line.credit_bs.is_zero()
            && s.line.debit_usd.is_zero()
            && s.line.credit_usd.is_zero()));
        assert_eq!(skeleton[0].line.account_code, "");
        assert_eq!(skeleton[0].suggested_account.as_deref(), Some("511001001"));
        assert_eq!(skeleton[1].line.account_code, "114001001");
        assert_eq!(skeleton[2].side, Side::Credit);
    }

    #[test]
    fn side_accepts_both_vocabularies() {
        assert_eq!(Side::try_from("debe").unwrap(), Side::Debit);
        assert_eq!(Side::try_from("credit").unwrap(), Side::Credit);
        assert!(Side::try_from("left").is_err());
    }
}
