//! Auxiliary registry: sub-ledger entities attached to voucher lines.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxiliaryType {
    Cliente,
    Proveedor,
    Banco,
    Caja,
    Empleado,
    Otro,
}

impl AuxiliaryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cliente => "Cliente",
            Self::Proveedor => "Proveedor",
            Self::Banco => "Banco",
            Self::Caja => "Caja",
            Self::Empleado => "Empleado",
            Self::Otro => "Otro",
        }
    }

    /// Three-letter prefix used for generated codes.
    fn code_prefix(self) -> &'static str {
        match self {
            Self::Cliente => "CLI",
            Self::Proveedor => "PRO",
            Self::Banco => "BAN",
            Self::Caja => "CAJ",
            Self::Empleado => "EMP",
            Self::Otro => "OTR",
        }
    }

    /// Banks and cash boxes carry their own bank/cash flag.
    pub fn is_bank_or_cash(self) -> bool {
        matches!(self, Self::Banco | Self::Caja)
    }
}

impl TryFrom<&str> for AuxiliaryType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "cliente" => Ok(Self::Cliente),
            "proveedor" => Ok(Self::Proveedor),
            "banco" => Ok(Self::Banco),
            "caja" => Ok(Self::Caja),
            "empleado" => Ok(Self::Empleado),
            "otro" => Ok(Self::Otro),
            other => Err(EngineError::InvalidField(format!(
                "invalid auxiliary type: {other}"
            ))),
        }
    }
}

/// Base code for an auxiliary without one: type prefix plus the first three
/// alphanumerics of the name, upper-cased (`Proveedor`, `Acme SRL` -> `PROACM`).
#[must_use]
pub fn base_code(type_tag: AuxiliaryType, name: &str) -> String {
    let stem: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("{}{stem}", type_tag.code_prefix())
}

/// Contact details kept alongside an auxiliary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auxiliary {
    pub id: Uuid,
    pub company_id: i64,
    pub type_tag: AuxiliaryType,
    pub code: String,
    pub name: String,
    pub linked_account_code: Option<String>,
    pub currency: Currency,
    pub is_bank_or_cash: bool,
    pub contact: Contact,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "auxiliaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: i64,
    pub type_tag: String,
    pub code: String,
    pub name: String,
    pub linked_account_code: Option<String>,
    pub currency: String,
    pub is_bank_or_cash: bool,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Auxiliary> for ActiveModel {
    fn from(aux: &Auxiliary) -> Self {
        Self {
            id: ActiveValue::Set(aux.id.to_string()),
            company_id: ActiveValue::Set(aux.company_id),
            type_tag: ActiveValue::Set(aux.type_tag.as_str().to_string()),
            code: ActiveValue::Set(aux.code.clone()),
            name: ActiveValue::Set(aux.name.clone()),
            linked_account_code: ActiveValue::Set(aux.linked_account_code.clone()),
            currency: ActiveValue::Set(aux.currency.code().to_string()),
            is_bank_or_cash: ActiveValue::Set(aux.is_bank_or_cash),
            tax_id: ActiveValue::Set(aux.contact.tax_id.clone()),
            address: ActiveValue::Set(aux.contact.address.clone()),
            phone: ActiveValue::Set(aux.contact.phone.clone()),
            email: ActiveValue::Set(aux.contact.email.clone()),
            department: ActiveValue::Set(aux.contact.department.clone()),
            is_active: ActiveValue::Set(aux.is_active),
            created_at: ActiveValue::Set(aux.created_at),
            updated_at: ActiveValue::Set(aux.updated_at),
        }
    }
}

impl TryFrom<Model> for Auxiliary {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidField("invalid auxiliary id".to_string()))?,
            company_id: model.company_id,
            type_tag: AuxiliaryType::try_from(model.type_tag.as_str())?,
            code: model.code,
            name: model.name,
            linked_account_code: model.linked_account_code,
            currency: Currency::try_from(model.currency.as_str())?,
            is_bank_or_cash: model.is_bank_or_cash,
            contact: Contact {
                tax_id: model.tax_id,
                address: model.address,
                phone: model.phone,
                email: model.email,
                department: model.department,
            },
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_code_uses_prefix_and_name() {
        assert_eq!(base_code(AuxiliaryType::Proveedor, "Acme SRL"), "PROACM");
        assert_eq!(base_code(AuxiliaryType::Banco, "B.N.B."), "BANBNB");
        assert_eq!(base_code(AuxiliaryType::Otro, ""), "OTR");
    }
}
