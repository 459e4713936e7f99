//! # Cart Arithmetic
//!
//! Prices are `Decimal` end to end. The payment flow charges exactly the
//! sum of the cart's item prices. Prices carry at most two decimal places
//! so the total never needs rounding.

use rust_decimal::Decimal;

use crate::error::CoreError;

/// Decimal places a price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Integer digits a stored car price may carry (`NUMERIC(14, 2)`).
pub const PRICE_INTEGER_DIGITS: u32 = 12;

fn has_sub_cent_precision(price: Decimal) -> bool {
    price.normalize().scale() > PRICE_SCALE
}

/// Check a catalogue price: non-negative, at most two decimal places and
/// below `10^12`.
pub fn validate_price(price: Decimal) -> Result<Decimal, CoreError> {
    let limit = Decimal::from(10i64.pow(PRICE_INTEGER_DIGITS));
    if (price.is_sign_negative() && !price.is_zero())
        || has_sub_cent_precision(price)
        || price >= limit
    {
        return Err(CoreError::InvalidPrice(price));
    }
    Ok(price)
}

/// Sum a cart's prices.
///
/// Rejects empty carts, negative prices and prices with more than two
/// decimal places. The result is what gets sent to the gateway as the sale
/// amount.
pub fn cart_total<I>(prices: I) -> Result<Decimal, CoreError>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total = Decimal::ZERO;
    let mut count = 0usize;
    for (index, price) in prices.into_iter().enumerate() {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CoreError::NegativePrice { index, price });
        }
        if has_sub_cent_precision(price) {
            return Err(CoreError::PricePrecision { index, price });
        }
        total = total.checked_add(price).ok_or(CoreError::TotalOverflow)?;
        count += 1;
    }
    if count == 0 {
        return Err(CoreError::EmptyCart);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn sums_prices_exactly() {
        let total = cart_total([d("19.99"), d("0.01"), d("1250000")]).unwrap();
        assert_eq!(total, d("1250020.00"));
    }

    #[test]
    fn single_item_total_is_its_price() {
        assert_eq!(cart_total([d("899000")]).unwrap(), d("899000"));
    }

    #[test]
    fn zero_priced_items_are_allowed() {
        assert_eq!(cart_total([d("0"), d("5")]).unwrap(), d("5"));
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert_eq!(cart_total(Vec::new()).unwrap_err(), CoreError::EmptyCart);
    }

    #[test]
    fn negative_price_is_rejected_with_position() {
        let err = cart_total([d("10"), d("-1")]).unwrap_err();
        assert_eq!(
            err,
            CoreError::NegativePrice {
                index: 1,
                price: d("-1")
            }
        );
    }

    #[test]
    fn sub_cent_price_is_rejected_with_position() {
        let err = cart_total([d("10"), d("0.125")]).unwrap_err();
        assert_eq!(
            err,
            CoreError::PricePrecision {
                index: 1,
                price: d("0.125")
            }
        );
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert_eq!(cart_total([d("10.1200")]).unwrap(), d("10.12"));
    }

    #[test]
    fn catalogue_price_bounds() {
        assert!(validate_price(d("19.99")).is_ok());
        assert!(validate_price(d("0")).is_ok());
        assert!(validate_price(d("999999999999.99")).is_ok());
        assert_eq!(
            validate_price(d("19.999")).unwrap_err(),
            CoreError::InvalidPrice(d("19.999"))
        );
        assert!(validate_price(d("1000000000000")).is_err());
        assert!(validate_price(d("-1")).is_err());
    }

    #[test]
    fn overflow_is_reported() {
        let err = cart_total([Decimal::MAX, Decimal::MAX]).unwrap_err();
        assert_eq!(err, CoreError::TotalOverflow);
    }
}
