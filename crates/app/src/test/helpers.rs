//! Test Helpers

use rusty_money::{
    Money,
    iso::{Currency, USD},
};

use crate::domain::products::Snapshot;

pub(crate) fn usd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, USD)
}

pub(crate) fn snapshot(price: i64, discount_price: Option<i64>, stock: u32) -> Snapshot {
    let snapshot = Snapshot::new(usd(price), stock);

    match discount_price {
        Some(discount_price) => snapshot.with_discount(usd(discount_price)),
        None => snapshot,
    }
}
