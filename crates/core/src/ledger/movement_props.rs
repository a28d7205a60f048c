//! Property-based tests for sale/return planning.
//!
//! - Final quantity equals the starting quantity minus accepted sales plus returns
//! - Quantity never goes negative at any prefix
//! - Refused sales change nothing
//! - Log totals net out to sales minus returned amounts

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::movement::{
    ItemSnapshot, StockMovement, TransactionAction, apply_delta, plan_return, plan_sale,
};

/// Strategy to generate prices (0.01 to 1,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a sequence of (is_sale, qty) operations.
fn operations() -> impl Strategy<Value = Vec<(bool, i64)>> {
    prop::collection::vec((any::<bool>(), 1i64..20), 0..40)
}

/// Runs operations the way the store does: plan, then apply the delta.
fn replay(
    start: i64,
    cost_price: Decimal,
    sell_price: Decimal,
    ops: &[(bool, i64)],
) -> (i64, Vec<StockMovement>) {
    let mut snapshot = ItemSnapshot {
        item: "Fern".to_string(),
        quantity: start,
        cost_price,
        sell_price,
    };
    let mut log = Vec::new();

    for &(is_sale, qty) in ops {
        let planned = if is_sale {
            plan_sale(&snapshot, qty)
        } else {
            plan_return(&snapshot, qty)
        };
        let Ok(movement) = planned else {
            continue;
        };
        let Ok(next) = apply_delta(&snapshot.item, snapshot.quantity, movement.delta) else {
            continue;
        };
        snapshot.quantity = next;
        log.push(movement);
    }

    (snapshot.quantity, log)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Final quantity is Q0 - sum(sold) + sum(returned) and never dips below zero.
    #[test]
    fn prop_quantity_conservation(
        start in 0i64..50,
        cost in price(),
        sell in price(),
        ops in operations(),
    ) {
        let (final_qty, log) = replay(start, cost, sell, &ops);

        let sold: i64 = log
            .iter()
            .filter(|m| m.action == TransactionAction::Sale)
            .map(|m| m.quantity)
            .sum();
        let returned: i64 = log
            .iter()
            .filter(|m| m.action == TransactionAction::Return)
            .map(|m| m.quantity)
            .sum();
        prop_assert_eq!(final_qty, start - sold + returned);

        let mut running = start;
        for movement in &log {
            running += movement.delta;
            prop_assert!(running >= 0);
        }
    }

    /// A refused sale leaves nothing to apply.
    #[test]
    fn prop_oversell_refused(available in 0i64..50, extra in 1i64..50, sell in price()) {
        let snapshot = ItemSnapshot {
            item: "Fern".to_string(),
            quantity: available,
            cost_price: Decimal::ONE,
            sell_price: sell,
        };
        let result = plan_sale(&snapshot, available + extra);
        let is_insufficient = matches!(result, Err(LedgerError::InsufficientStock { .. }));
        prop_assert!(is_insufficient);
    }

    /// Sum of totals equals sale totals minus the magnitude of return totals,
    /// and profit is sum(total) - sum(cost).
    #[test]
    fn prop_signed_totals_net_out(
        start in 0i64..50,
        cost in price(),
        sell in price(),
        ops in operations(),
    ) {
        let (_, log) = replay(start, cost, sell, &ops);

        let net: Decimal = log.iter().map(|m| m.total).sum();
        let sales: Decimal = log
            .iter()
            .filter(|m| m.action == TransactionAction::Sale)
            .map(|m| m.total)
            .sum();
        let returns: Decimal = log
            .iter()
            .filter(|m| m.action == TransactionAction::Return)
            .map(|m| m.total.abs())
            .sum();
        prop_assert_eq!(net, sales - returns);

        let profit: Decimal = log.iter().map(StockMovement::profit).sum();
        let cost_sum: Decimal = log.iter().map(|m| m.cost).sum();
        prop_assert_eq!(profit, net - cost_sum);
    }
}
