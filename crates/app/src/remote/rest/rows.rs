//! Wire rows and their validation.

use std::str::FromStr;

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use serde_json::Number;
use storefront::{products::ProductSnapshot, quantity::Quantity};
use uuid::Uuid;

use crate::{
    domain::{
        carts::models::{CartLine, CartLineUuid},
        products::{ProductUuid, Snapshot},
    },
    remote::BackendError,
};

/// Columns selected for a cart line, with the product embedded.
pub(super) const CART_LINE_COLUMNS: &str =
    "id,product_id,quantity,created_at,products(price,discount_price,stock)";

/// Columns selected for a product snapshot.
pub(super) const PRODUCT_COLUMNS: &str = "price,discount_price,stock";

#[derive(Debug, Deserialize)]
pub(super) struct CartLineRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i64,
    created_at: Timestamp,
    #[serde(default)]
    products: Option<Embedded<ProductRow>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductRow {
    price: Number,
    #[serde(default)]
    discount_price: Option<Number>,
    stock: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct IdRow {
    pub(super) id: Uuid,
}

/// An embedded resource arrives as an object or as an array depending on how
/// the relationship is declared upstream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Embedded<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Embedded<T> {
    fn into_single(self) -> Result<Option<T>, BackendError> {
        match self {
            Self::One(row) => Ok(Some(row)),
            Self::Many(rows) => single(rows),
        }
    }
}

/// Zero or one row, anything more is malformed.
pub(super) fn single<T>(rows: Vec<T>) -> Result<Option<T>, BackendError> {
    if rows.len() > 1 {
        return Err(BackendError::Malformed(format!(
            "expected at most one row, got {}",
            rows.len()
        )));
    }

    Ok(rows.into_iter().next())
}

impl CartLineRow {
    pub(super) fn into_line(self, currency: &'static Currency) -> Result<CartLine, BackendError> {
        let quantity = Quantity::new(self.quantity).map_err(|error| {
            BackendError::Malformed(format!("cart line {}: {error}", self.id))
        })?;

        let product = self
            .products
            .map(Embedded::into_single)
            .transpose()?
            .flatten()
            .map(|row| row.into_snapshot(currency))
            .transpose()?;

        Ok(CartLine {
            uuid: CartLineUuid::from_uuid(self.id),
            product_uuid: ProductUuid::from_uuid(self.product_id),
            quantity,
            product,
            created_at: self.created_at,
        })
    }
}

impl ProductRow {
    pub(super) fn into_snapshot(self, currency: &'static Currency) -> Result<Snapshot, BackendError> {
        let stock = u32::try_from(self.stock)
            .map_err(|error| BackendError::Malformed(format!("stock {}: {error}", self.stock)))?;

        let price = to_money(&self.price, currency)?;

        let discount_price = self
            .discount_price
            .as_ref()
            .map(|amount| to_money(amount, currency))
            .transpose()?;

        Ok(ProductSnapshot {
            price,
            discount_price,
            stock,
        })
    }
}

/// Convert a decimal amount in major units into money of `currency`.
fn to_money(
    amount: &Number,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, BackendError> {
    let text = amount.to_string();

    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|error| BackendError::Malformed(format!("amount {text}: {error}")))?;

    if value.is_sign_negative() {
        return Err(BackendError::Malformed(format!("amount {text} is negative")));
    }

    let minor = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|scale| value.checked_mul(scale))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| BackendError::Malformed(format!("amount {text} is out of range")))?;

    Ok(Money::from_minor(minor, currency))
}
