//! Subtotal and total computation.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::ExpenseItem;

/// Computed amounts for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of quantity times rate.
    pub sub_total: Decimal,
    /// `(sub_total - discount) * (1 + vat / 100)`.
    pub total: Decimal,
}

/// Computes totals from line items, a flat discount, and a VAT percentage.
///
/// Nothing is rounded; amounts stay exact decimals. Returns `None` when any
/// intermediate amount leaves the range of [`Decimal`].
#[must_use]
pub fn compute_totals(items: &[ExpenseItem], discount: Decimal, vat: Decimal) -> Option<Totals> {
    let sub_total = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        Decimal::from(item.quantity)
            .checked_mul(item.rate)
            .and_then(|line| acc.checked_add(line))
    })?;

    let after_discount = sub_total.checked_sub(discount)?;
    let tax = after_discount
        .checked_mul(vat)?
        .checked_div(Decimal::ONE_HUNDRED)?;
    let total = after_discount.checked_add(tax)?;

    Some(Totals { sub_total, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, rate: Decimal) -> ExpenseItem {
        ExpenseItem {
            name: "x".into(),
            quantity,
            rate,
        }
    }

    #[test]
    fn test_worked_example() {
        let totals = compute_totals(
            &[item(2, dec!(10)), item(1, dec!(5))],
            dec!(5),
            dec!(10),
        )
        .unwrap();
        assert_eq!(totals.sub_total, dec!(25));
        assert_eq!(totals.total, dec!(22));
    }

    #[test]
    fn test_no_vat_no_discount() {
        let totals = compute_totals(&[item(3, dec!(1.25))], Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.sub_total, dec!(3.75));
        assert_eq!(totals.total, dec!(3.75));
    }

    #[test]
    fn test_line_overflow_is_reported() {
        assert_eq!(compute_totals(&[item(2, Decimal::MAX)], Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn test_sum_overflow_is_reported() {
        let large = dec!(40000000000000000000000000000);
        assert_eq!(compute_totals(&[item(1, large), item(1, large)], Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn test_vat_overflow_is_reported() {
        assert_eq!(compute_totals(&[item(1, Decimal::MAX)], Decimal::ZERO, dec!(10)), None);
    }

    proptest! {
        #[test]
        fn test_subtotal_is_sum_of_lines(
            lines in prop::collection::vec((1i32..1000, 0i64..100_000), 1..20),
        ) {
            let items: Vec<_> = lines
                .iter()
                .map(|(q, cents)| item(*q, Decimal::new(*cents, 2)))
                .collect();
            let expected: Decimal = lines
                .iter()
                .map(|(q, cents)| Decimal::from(*q) * Decimal::new(*cents, 2))
                .sum();

            let totals = compute_totals(&items, Decimal::ZERO, Decimal::ZERO).unwrap();
            prop_assert_eq!(totals.sub_total, expected);
            prop_assert_eq!(totals.total, expected);
        }

        #[test]
        fn test_vat_scales_discounted_amount(
            cents in 0i64..1_000_000,
            discount_cents in 0i64..1_000_000,
            vat in 0i64..100,
        ) {
            let rate = Decimal::new(cents, 2);
            let discount = Decimal::new(discount_cents, 2);
            let totals = compute_totals(&[item(1, rate)], discount, Decimal::from(vat)).unwrap();

            let after = rate - discount;
            prop_assert_eq!(totals.total, after * (Decimal::ONE + Decimal::from(vat) / Decimal::ONE_HUNDRED));
        }
    }
}
