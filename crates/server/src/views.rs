//! Conversions between engine types and the wire DTOs.

use api_types::{
    PagedResponse,
    account::AccountView,
    auxiliary::AuxiliaryView,
    template::{AppliedTemplateView, SkeletonLineView, TemplateLineView, TemplateView},
    voucher::{TotalsView, VoucherDetailView, VoucherLineInput, VoucherLineView, VoucherView},
};
use engine::{
    Account, AppliedTemplate, Auxiliary, EngineError, Money, Paged, Voucher, VoucherDetail,
    VoucherLine, VoucherTemplate, VoucherTotals,
};

pub(crate) fn currency_in(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Bs => engine::Currency::Bs,
        api_types::Currency::Usd => engine::Currency::Usd,
    }
}

pub(crate) fn currency_out(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Bs => api_types::Currency::Bs,
        engine::Currency::Usd => api_types::Currency::Usd,
    }
}

/// Parses an optional tag with the engine's own vocabulary.
pub(crate) fn parse_tag<T>(value: Option<&str>) -> Result<Option<T>, EngineError>
where
    T: for<'a> TryFrom<&'a str, Error = EngineError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(T::try_from)
        .transpose()
}

pub(crate) fn paged<T, U>(page: Paged<T>, view: impl Fn(T) -> U) -> PagedResponse<U> {
    PagedResponse {
        items: page.items.into_iter().map(view).collect(),
        page: page.page,
        limit: page.limit,
        total: page.total,
        total_pages: page.total_pages,
    }
}

pub(crate) fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        code: account.code,
        description: account.description,
        parent_code: account.parent_code,
        level: account.level,
        account_type: account.account_type.as_str().to_string(),
        currency: currency_out(account.currency),
        classifier: account.classifier,
        allows_auxiliary: account.allows_auxiliary,
        is_transactional: account.is_transactional,
        is_active: account.is_active,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub(crate) fn auxiliary_view(auxiliary: Auxiliary) -> AuxiliaryView {
    AuxiliaryView {
        id: auxiliary.id,
        type_tag: auxiliary.type_tag.as_str().to_string(),
        code: auxiliary.code,
        name: auxiliary.name,
        linked_account_code: auxiliary.linked_account_code,
        currency: currency_out(auxiliary.currency),
        is_bank_or_cash: auxiliary.is_bank_or_cash,
        tax_id: auxiliary.contact.tax_id,
        address: auxiliary.contact.address,
        phone: auxiliary.contact.phone,
        email: auxiliary.contact.email,
        department: auxiliary.contact.department,
        is_active: auxiliary.is_active,
        created_at: auxiliary.created_at,
        updated_at: auxiliary.updated_at,
    }
}

pub(crate) fn template_view(template: VoucherTemplate) -> TemplateView {
    TemplateView {
        id: template.id,
        code: template.code,
        name: template.name,
        description: template.description,
        voucher_type: template.voucher_type.as_str().to_string(),
        is_active: template.is_active,
        lines: template
            .lines
            .into_iter()
            .map(|line| TemplateLineView {
                id: line.id,
                order: line.order,
                side: line.side.as_str().to_string(),
                account_code: line.account_code,
                account_is_fixed: line.account_is_fixed,
                percentage: line.percentage,
                is_locked: line.is_locked,
                allows_auxiliary: line.allows_auxiliary,
                role: line.role,
            })
            .collect(),
        created_at: template.created_at,
        updated_at: template.updated_at,
    }
}

pub(crate) fn applied_view(applied: AppliedTemplate) -> AppliedTemplateView {
    AppliedTemplateView {
        voucher_id: applied.voucher_id,
        template_code: applied.template_code,
        template_name: applied.template_name,
        voucher_type: applied.voucher_type.as_str().to_string(),
        lines: applied
            .lines
            .into_iter()
            .map(|skeleton| SkeletonLineView {
                order: skeleton.line.order,
                account_code: skeleton.line.account_code,
                side: skeleton.side.as_str().to_string(),
                percentage: skeleton.percentage,
                is_locked: skeleton.is_locked,
                account_is_fixed: skeleton.account_is_fixed,
                allows_auxiliary: skeleton.allows_auxiliary,
                role: skeleton.role,
                suggested_account: skeleton.suggested_account,
            })
            .collect(),
    }
}

pub(crate) fn line_in(input: VoucherLineInput) -> VoucherLine {
    VoucherLine {
        order: 0,
        account_code: input.account_code,
        auxiliary_code: input.auxiliary_code,
        memo: input.memo,
        debit_bs: Money::new(input.debit_bs_minor),
        credit_bs: Money::new(input.credit_bs_minor),
        debit_usd: Money::new(input.debit_usd_minor),
        credit_usd: Money::new(input.credit_usd_minor),
    }
}

pub(crate) fn line_view(line: VoucherLine) -> VoucherLineView {
    VoucherLineView {
        order: line.order,
        account_code: line.account_code,
        auxiliary_code: line.auxiliary_code,
        memo: line.memo,
        debit_bs_minor: line.debit_bs.minor(),
        credit_bs_minor: line.credit_bs.minor(),
        debit_usd_minor: line.debit_usd.minor(),
        credit_usd_minor: line.credit_usd.minor(),
    }
}

pub(crate) fn totals_view(totals: &VoucherTotals) -> TotalsView {
    TotalsView {
        debit_bs_minor: totals.debit_bs.minor(),
        credit_bs_minor: totals.credit_bs.minor(),
        debit_usd_minor: totals.debit_usd.minor(),
        credit_usd_minor: totals.credit_usd.minor(),
        balanced: totals.is_balanced(),
    }
}

pub(crate) fn voucher_view(voucher: Voucher) -> VoucherView {
    let header = voucher.header;
    VoucherView {
        id: voucher.id,
        number: voucher.number,
        state: voucher.state.as_str().to_string(),
        origin: header.origin.as_str().to_string(),
        voucher_type: header.voucher_type.as_str().to_string(),
        entry_type: header.entry_type.as_str().to_string(),
        date: header.date,
        period: header.period,
        fiscal_year: header.fiscal_year,
        currency: currency_out(header.currency),
        exchange_rate: header.exchange_rate.value(),
        concept: header.concept,
        beneficiary: header.beneficiary,
        check_number: header.check_number,
        created_at: voucher.created_at,
        updated_at: voucher.updated_at,
        approved_at: voucher.approved_at,
    }
}

pub(crate) fn detail_view(detail: VoucherDetail) -> VoucherDetailView {
    VoucherDetailView {
        totals: totals_view(&detail.totals),
        voucher: voucher_view(detail.voucher),
        lines: detail.lines.into_iter().map(line_view).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tags_are_absent() {
        let parsed: Option<engine::VoucherType> = parse_tag(Some("  ")).unwrap();
        assert!(parsed.is_none());
        let parsed: Option<engine::VoucherType> = parse_tag(Some("Egreso")).unwrap();
        assert_eq!(parsed, Some(engine::VoucherType::Egreso));
        assert!(parse_tag::<engine::VoucherType>(Some("nope")).is_err());
    }
}
