//! Uniswap V3 pool state as read from `slot0()`
//!
//! Only the first two return words are used: `sqrtPriceX96` (uint160) and
//! `tick` (int24). The remaining observation/fee fields are ignored.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::errors::ValidationError;

/// Hex characters in one ABI word.
const WORD_HEX: usize = 64;

const INT24_MIN: i32 = -(1 << 23);
const INT24_MAX: i32 = (1 << 23) - 1;

/// Decoded `slot0()` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot0 {
    /// Q64.96 square root of the token1/token0 price
    pub sqrt_price_x96: BigUint,
    pub tick: i32,
}

impl Slot0 {
    /// Decode the ABI-encoded return data of `slot0()` (`0x`-prefixed hex).
    pub fn from_abi_hex(data: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidSlot0 {
            reason: reason.to_string(),
        };

        let hex = data.strip_prefix("0x").unwrap_or(data);
        if hex.len() < 2 * WORD_HEX {
            return Err(invalid("return data shorter than two words"));
        }
        if !hex.is_ascii() {
            return Err(invalid("non-hex return data"));
        }

        let sqrt_word = &hex[..WORD_HEX];
        let tick_word = &hex[WORD_HEX..2 * WORD_HEX];

        let sqrt_price_x96 = BigUint::parse_bytes(sqrt_word.as_bytes(), 16)
            .ok_or_else(|| invalid("sqrtPriceX96 is not hex"))?;
        if sqrt_price_x96.bits() > 160 {
            return Err(invalid("sqrtPriceX96 exceeds uint160"));
        }

        // int24 is sign-extended to 256 bits; the low 32 bits carry the value
        // and every bit above bit 23 must repeat the sign.
        let not_int24 = || invalid("tick is not a sign-extended int24");
        let (high, low) = tick_word.split_at(WORD_HEX - 8);
        let negative = if high.bytes().all(|b| b == b'0') {
            false
        } else if high.bytes().all(|b| b == b'f' || b == b'F') {
            true
        } else {
            return Err(not_int24());
        };
        if !low.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("tick is not hex"));
        }
        let tick = u32::from_str_radix(low, 16).map_err(|_| invalid("tick is not hex"))? as i32;
        if !(INT24_MIN..=INT24_MAX).contains(&tick) || (tick < 0) != negative {
            return Err(not_int24());
        }

        Ok(Self { sqrt_price_x96, tick })
    }

    /// token1/token0 price ratio: `sqrtPriceX96^2 / 2^192`.
    ///
    /// The square is exact; only the final ratio is rounded to `f64`.
    pub fn price(&self) -> f64 {
        sqrt_price_x96_to_price(&self.sqrt_price_x96)
    }
}

/// Convert a Q64.96 square-root price into a plain price ratio.
pub fn sqrt_price_x96_to_price(sqrt_price_x96: &BigUint) -> f64 {
    let price_x192 = sqrt_price_x96 * sqrt_price_x96;
    // Dividing by a power of two is exact in f64, so all rounding happens
    // in this single conversion.
    price_x192.to_f64().unwrap_or(f64::INFINITY) / 2f64.powi(192)
}
