//! Vouchers (comprobantes): the journal entry header.
//!
//! A voucher is born as [`VoucherState::Borrador`] with no number. Approval is
//! the only transition: it assigns the next number of the company and freezes
//! the header and its lines for good.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ExchangeRate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoucherState {
    #[default]
    Borrador,
    Aprobado,
}

impl VoucherState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Borrador => "BORRADOR",
            Self::Aprobado => "APROBADO",
        }
    }
}

impl TryFrom<&str> for VoucherState {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BORRADOR" => Ok(Self::Borrador),
            "APROBADO" => Ok(Self::Aprobado),
            other => Err(EngineError::InvalidField(format!(
                "invalid voucher state: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    #[default]
    Diario,
    Ingreso,
    Egreso,
    Traspaso,
    #[serde(rename = "Ctas por Pagar", alias = "CtasPorPagar")]
    CtasPorPagar,
}

impl VoucherType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diario => "Diario",
            Self::Ingreso => "Ingreso",
            Self::Egreso => "Egreso",
            Self::Traspaso => "Traspaso",
            Self::CtasPorPagar => "Ctas por Pagar",
        }
    }
}

impl TryFrom<&str> for VoucherType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Diario" => Ok(Self::Diario),
            "Ingreso" => Ok(Self::Ingreso),
            "Egreso" => Ok(Self::Egreso),
            "Traspaso" => Ok(Self::Traspaso),
            "Ctas por Pagar" | "CtasPorPagar" => Ok(Self::CtasPorPagar),
            other => Err(EngineError::InvalidField(format!(
                "invalid voucher type: {other}"
            ))),
        }
    }
}

/// Nature of the entry: regular, fiscal year opening, closing or adjustment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[default]
    Normal,
    Apertura,
    Cierre,
    Ajuste,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Apertura => "Apertura",
            Self::Cierre => "Cierre",
            Self::Ajuste => "Ajuste",
        }
    }
}

impl TryFrom<&str> for EntryType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Normal" => Ok(Self::Normal),
            "Apertura" => Ok(Self::Apertura),
            "Cierre" => Ok(Self::Cierre),
            "Ajuste" => Ok(Self::Ajuste),
            other => Err(EngineError::InvalidField(format!(
                "invalid entry type: {other}"
            ))),
        }
    }
}

/// Module that produced the voucher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Contabilidad,
    Ventas,
    #[serde(rename = "Tesorería", alias = "Tesoreria")]
    Tesoreria,
    Activos,
    Planillas,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contabilidad => "Contabilidad",
            Self::Ventas => "Ventas",
            Self::Tesoreria => "Tesorería",
            Self::Activos => "Activos",
            Self::Planillas => "Planillas",
        }
    }
}

impl TryFrom<&str> for Origin {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Contabilidad" => Ok(Self::Contabilidad),
            "Ventas" => Ok(Self::Ventas),
            "Tesorería" | "Tesoreria" => Ok(Self::Tesoreria),
            "Activos" => Ok(Self::Activos),
            "Planillas" => Ok(Self::Planillas),
            other => Err(EngineError::InvalidField(format!("invalid origin: {other}"))),
        }
    }
}

/// Editable part of a voucher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherHeader {
    pub origin: Origin,
    pub voucher_type: VoucherType,
    pub entry_type: EntryType,
    pub date: NaiveDate,
    pub period: i32,
    pub fiscal_year: i32,
    pub currency: Currency,
    pub exchange_rate: ExchangeRate,
    pub concept: Option<String>,
    pub beneficiary: Option<String>,
    pub check_number: Option<String>,
}

impl VoucherHeader {
    #[must_use]
    pub fn new(date: NaiveDate, period: i32, fiscal_year: i32) -> Self {
        Self {
            origin: Origin::default(),
            voucher_type: VoucherType::default(),
            entry_type: EntryType::default(),
            date,
            period,
            fiscal_year,
            currency: Currency::default(),
            exchange_rate: ExchangeRate::default(),
            concept: None,
            beneficiary: None,
            check_number: None,
        }
    }

    #[must_use]
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn voucher_type(mut self, voucher_type: VoucherType) -> Self {
        self.voucher_type = voucher_type;
        self
    }

    #[must_use]
    pub fn entry_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn exchange_rate(mut self, exchange_rate: ExchangeRate) -> Self {
        self.exchange_rate = exchange_rate;
        self
    }

    #[must_use]
    pub fn concept(mut self, concept: impl Into<String>) -> Self {
        self.concept = Some(concept.into());
        self
    }

    #[must_use]
    pub fn beneficiary(mut self, beneficiary: impl Into<String>) -> Self {
        self.beneficiary = Some(beneficiary.into());
        self
    }

    #[must_use]
    pub fn check_number(mut self, check_number: impl Into<String>) -> Self {
        self.check_number = Some(check_number.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if !(1..=12).contains(&self.period) {
            return Err(EngineError::InvalidField(format!(
                "period must be between 1 and 12, got {}",
                self.period
            )));
        }
        if self.fiscal_year <= 0 {
            return Err(EngineError::InvalidField(format!(
                "invalid fiscal year: {}",
                self.fiscal_year
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Uuid,
    pub company_id: i64,
    pub number: Option<i64>,
    pub state: VoucherState,
    pub header: VoucherHeader,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Voucher {
    pub(crate) fn draft(company_id: i64, header: VoucherHeader, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            number: None,
            state: VoucherState::Borrador,
            header,
            created_at: now,
            updated_at: now,
            approved_at: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.state == VoucherState::Borrador
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: i64,
    pub number: Option<i64>,
    pub state: String,
    pub origin: String,
    pub voucher_type: String,
    pub entry_type: String,
    pub date: Date,
    pub period: i32,
    pub fiscal_year: i32,
    pub currency: String,
    pub exchange_rate: String,
    pub concept: Option<String>,
    pub beneficiary: Option<String>,
    pub check_number: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub approved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::voucher_lines::Entity")]
    VoucherLines,
}

impl Related<super::voucher_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Voucher> for ActiveModel {
    fn from(voucher: &Voucher) -> Self {
        let header = &voucher.header;
        Self {
            id: ActiveValue::Set(voucher.id.to_string()),
            company_id: ActiveValue::Set(voucher.company_id),
            number: ActiveValue::Set(voucher.number),
            state: ActiveValue::Set(voucher.state.as_str().to_string()),
            origin: ActiveValue::Set(header.origin.as_str().to_string()),
            voucher_type: ActiveValue::Set(header.voucher_type.as_str().to_string()),
            entry_type: ActiveValue::Set(header.entry_type.as_str().to_string()),
            date: ActiveValue::Set(header.date),
            period: ActiveValue::Set(header.period),
            fiscal_year: ActiveValue::Set(header.fiscal_year),
            currency: ActiveValue::Set(header.currency.code().to_string()),
            exchange_rate: ActiveValue::Set(header.exchange_rate.to_string()),
            concept: ActiveValue::Set(header.concept.clone()),
            beneficiary: ActiveValue::Set(header.beneficiary.clone()),
            check_number: ActiveValue::Set(header.check_number.clone()),
            created_at: ActiveValue::Set(voucher.created_at),
            updated_at: ActiveValue::Set(voucher.updated_at),
            approved_at: ActiveValue::Set(voucher.approved_at),
        }
    }
}

impl TryFrom<Model> for Voucher {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidField("invalid voucher id".to_string()))?,
            company_id: model.company_id,
            number: model.number,
            state: VoucherState::try_from(model.state.as_str())?,
            header: VoucherHeader {
                origin: Origin::try_from(model.origin.as_str())?,
                voucher_type: VoucherType::try_from(model.voucher_type.as_str())?,
                entry_type: EntryType::try_from(model.entry_type.as_str())?,
                date: model.date,
                period: model.period,
                fiscal_year: model.fiscal_year,
                currency: Currency::try_from(model.currency.as_str())?,
                exchange_rate: model.exchange_rate.parse()?,
                concept: model.concept,
                beneficiary: model.beneficiary,
                check_number: model.check_number,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
            approved_at: model.approved_at,
        })
    }
}
