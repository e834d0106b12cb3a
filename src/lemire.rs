//! Correctly rounded decimal to `f64` conversion.
//!
//! The decimal is reduced to a 64-bit significand `w` and a power of ten `q`.
//! Exact cases go through Clinger's fast path. Everything else goes through
//! the Eisel-Lemire algorithm, which multiplies `w` by a 128-bit truncation
//! of `5^q` and can prove from the product alone whether the rounding is
//! unambiguous. When it cannot (inputs with more than 19 significant digits
//! whose last digits matter, or products too close to a halfway point) the
//! text is handed to `lexical-parse-float`, which is exact for all inputs.

use std::sync::OnceLock;

use lexical_parse_float::FromLexical;
use log::debug;

const MANTISSA_EXPLICIT_BITS: i32 = 52;
const MINIMUM_EXPONENT: i32 = -1023;
const INFINITE_POWER: i32 = 0x7FF;
const MIN_EXPONENT_ROUND_TO_EVEN: i64 = -4;
const MAX_EXPONENT_ROUND_TO_EVEN: i64 = 23;
const SMALLEST_POWER_OF_TEN: i64 = -342;
const LARGEST_POWER_OF_TEN: i64 = 308;
const MAX_MANTISSA_FAST_PATH: u64 = 2 << MANTISSA_EXPLICIT_BITS;

const POW10_EXACT: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// A decimal reduced to at most 19 significant digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decimal {
    pub(crate) negative: bool,
    pub(crate) mantissa: u64,
    pub(crate) exponent: i64,
    /// Nonzero digits were dropped from `mantissa`
    pub(crate) many_digits: bool,
}

/// Parse `[-]INT[.FRAC][(e|E)[+|-]EXP]` with correct rounding.
///
/// Returns `None` when the text does not match the grammar. Out-of-range
/// magnitudes round to zero or infinity like the standard library does.
pub fn parse_f64(text: &[u8]) -> Option<f64> {
    let dec = parse_decimal(text)?;
    let magnitude = if let Some(v) = clinger(&dec) {
        v
    } else {
        let mut fp = compute_float(dec.exponent, dec.mantissa);
        if dec.many_digits && fp.e >= 0 && fp != compute_float(dec.exponent, dec.mantissa + 1) {
            fp.e = -1;
        }
        if fp.e < 0 {
            debug!("Eisel-Lemire could not decide the rounding, using the generic parser");
            return f64::from_lexical(text).ok();
        }
        fp.to_f64()
    };
    Some(if dec.negative { -magnitude } else { magnitude })
}

/// `10^e` correctly rounded, for `e` up to 308.
pub(crate) fn pow10(e: u32) -> f64 {
    match POW10_EXACT.get(e as usize) {
        Some(&p) => p,
        None => compute_float(i64::from(e.min(309)), 1).to_f64(),
    }
}

/// Split `[-]INT[.FRAC][(e|E)[+|-]EXP]` into sign, significand and power of
/// ten. Digits past the 19th are dropped and counted into the exponent.
pub(crate) fn parse_decimal(text: &[u8]) -> Option<Decimal> {
    let (negative, s) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, text),
    };
    let int_len = count_digits(s);
    if int_len == 0 {
        return None;
    }
    let int_digits = &s[..int_len];
    let mut rest = &s[int_len..];

    let mut frac_digits: &[u8] = &[];
    if let Some((b'.', after)) = rest.split_first() {
        let n = count_digits(after);
        if n == 0 {
            return None;
        }
        frac_digits = &after[..n];
        rest = &after[n..];
    }

    let mut exp_number: i64 = 0;
    if let Some((b'e' | b'E', after)) = rest.split_first() {
        let (negative_exp, after) = match after.split_first() {
            Some((b'-', r)) => (true, r),
            Some((b'+', r)) => (false, r),
            _ => (false, after),
        };
        let n = count_digits(after);
        if n == 0 {
            return None;
        }
        for &d in &after[..n] {
            if exp_number < 0x10000 {
                exp_number = 10 * exp_number + i64::from(d - b'0');
            }
        }
        if negative_exp {
            exp_number = -exp_number;
        }
        rest = &after[n..];
    }
    if !rest.is_empty() {
        return None;
    }

    let mut mantissa: u64 = 0;
    let mut significant = 0;
    let mut exponent = exp_number - frac_digits.len() as i64;
    let mut many_digits = false;
    for &d in int_digits.iter().chain(frac_digits) {
        if significant == 0 && d == b'0' {
            continue;
        }
        if significant < 19 {
            mantissa = mantissa * 10 + u64::from(d - b'0');
            significant += 1;
        } else {
            exponent += 1;
            many_digits |= d != b'0';
        }
    }

    Some(Decimal {
        negative,
        mantissa,
        exponent,
        many_digits,
    })
}

fn count_digits(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Exact when both the significand and the power of ten are exactly
/// representable, since IEEE multiplication and division round correctly.
fn clinger(dec: &Decimal) -> Option<f64> {
    if dec.many_digits {
        return None;
    }
    if dec.mantissa == 0 {
        return Some(0.0);
    }
    if dec.mantissa > MAX_MANTISSA_FAST_PATH {
        return None;
    }
    match dec.exponent {
        -22..=-1 => Some(dec.mantissa as f64 / POW10_EXACT[(-dec.exponent) as usize]),
        0..=22 => Some(dec.mantissa as f64 * POW10_EXACT[dec.exponent as usize]),
        23..=37 => {
            // "disguised" fast path: move part of the exponent into the mantissa
            let shift = (dec.exponent - 22) as u32;
            let m = dec.mantissa.checked_mul(10u64.checked_pow(shift)?)?;
            (m <= MAX_MANTISSA_FAST_PATH).then(|| m as f64 * POW10_EXACT[22])
        }
        _ => None,
    }
}

/// A biased binary exponent and explicit mantissa bits. `e < 0` means the
/// computation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BiasedFp {
    f: u64,
    e: i32,
}

impl BiasedFp {
    const fn zero_pow2(e: i32) -> Self {
        BiasedFp { f: 0, e }
    }

    fn to_f64(self) -> f64 {
        f64::from_bits(self.f | ((self.e as u64) << MANTISSA_EXPLICIT_BITS))
    }
}

/// `floor(log2(10^q)) + 63` for `q` in the table range.
#[inline]
fn power(q: i32) -> i32 {
    (q.wrapping_mul(152_170 + 65536) >> 16) + 63
}

fn compute_float(q: i64, mut w: u64) -> BiasedFp {
    let fp_zero = BiasedFp::zero_pow2(0);
    let fp_inf = BiasedFp::zero_pow2(INFINITE_POWER);
    let fp_error = BiasedFp::zero_pow2(-1);

    if w == 0 || q < SMALLEST_POWER_OF_TEN {
        return fp_zero;
    } else if q > LARGEST_POWER_OF_TEN {
        return fp_inf;
    }
    let lz = w.leading_zeros() as i32;
    w <<= lz;
    let (lo, hi) = compute_product_approx(q, w, (MANTISSA_EXPLICIT_BITS + 3) as u32);
    if lo == u64::MAX {
        // the truncated table entry may be one short of the rounding boundary;
        // outside this range a product this close cannot be exact
        let inside_safe_exponent = (-27..=55).contains(&q);
        if !inside_safe_exponent {
            return fp_error;
        }
    }
    let upperbit = (hi >> 63) as i32;
    let shift = upperbit + 64 - MANTISSA_EXPLICIT_BITS - 3;
    let mut mantissa = hi >> shift;
    let mut power2 = power(q as i32) + upperbit - lz - MINIMUM_EXPONENT;
    if power2 <= 0 {
        if -power2 + 1 >= 64 {
            return fp_zero;
        }
        // subnormal
        mantissa >>= -power2 + 1;
        mantissa += mantissa & 1;
        mantissa >>= 1;
        power2 = (mantissa >= (1_u64 << MANTISSA_EXPLICIT_BITS)) as i32;
        return BiasedFp { f: mantissa, e: power2 };
    }
    // exactly halfway between two floats: round to even instead of up
    if lo <= 1
        && (MIN_EXPONENT_ROUND_TO_EVEN..=MAX_EXPONENT_ROUND_TO_EVEN).contains(&q)
        && mantissa & 3 == 1
        && (mantissa << shift) == hi
    {
        mantissa &= !1_u64;
    }
    mantissa += mantissa & 1;
    mantissa >>= 1;
    if mantissa >= (2_u64 << MANTISSA_EXPLICIT_BITS) {
        mantissa = 1_u64 << MANTISSA_EXPLICIT_BITS;
        power2 += 1;
    }
    mantissa &= !(1_u64 << MANTISSA_EXPLICIT_BITS);
    if power2 >= INFINITE_POWER {
        return fp_inf;
    }
    BiasedFp { f: mantissa, e: power2 }
}

#[inline]
fn full_multiplication(a: u64, b: u64) -> (u64, u64) {
    let r = u128::from(a) * u128::from(b);
    (r as u64, (r >> 64) as u64)
}

/// High 128 bits of `w * 5^q`, computing the lower half only when the
/// upper `precision` bits could still change.
fn compute_product_approx(q: i64, w: u64, precision: u32) -> (u64, u64) {
    let mask = u64::MAX >> precision;
    let (hi5, lo5) = power_of_five_128(q);
    let (mut first_lo, mut first_hi) = full_multiplication(w, hi5);
    if first_hi & mask == mask {
        let (_, second_hi) = full_multiplication(w, lo5);
        first_lo = first_lo.wrapping_add(second_hi);
        if second_hi > first_lo {
            first_hi += 1;
        }
    }
    (first_lo, first_hi)
}

/// 128-bit normalized truncation of `5^q` as `(high, low)` words.
fn power_of_five_128(q: i64) -> (u64, u64) {
    static TABLE: OnceLock<Vec<(u64, u64)>> = OnceLock::new();
    let table = TABLE.get_or_init(build_power_of_five_table);
    table[(q - SMALLEST_POWER_OF_TEN) as usize]
}

/// For `q >= 0` the entry is `5^q` shifted so its top bit is bit 127 and
/// truncated. For `q < 0` it is `floor(2^b / 5^-q) + 1` truncated to 128
/// bits, with `b` chosen so the quotient has enough bits.
fn build_power_of_five_table() -> Vec<(u64, u64)> {
    let mut table = Vec::with_capacity((LARGEST_POWER_OF_TEN - SMALLEST_POWER_OF_TEN + 1) as usize);
    let mut powers = Vec::with_capacity(-SMALLEST_POWER_OF_TEN as usize + 1);
    let mut p = Big::one();
    for _ in 0..=LARGEST_POWER_OF_TEN.max(-SMALLEST_POWER_OF_TEN) {
        powers.push(p.clone());
        p.mul_small(5);
    }

    for q in SMALLEST_POWER_OF_TEN..0 {
        let power5 = &powers[(-q) as usize];
        let z = power5.bit_len();
        let b = if q >= -27 { z + 127 } else { 2 * z + 128 };
        let mut c = Big::pow2_div(b, power5);
        c.add_one();
        table.push(c.top_128());
    }
    for q in 0..=LARGEST_POWER_OF_TEN {
        table.push(powers[q as usize].top_128());
    }
    table
}

/// Minimal unsigned big integer, little-endian 64-bit limbs.
#[derive(Debug, Clone)]
struct Big {
    limbs: Vec<u64>,
}

impl Big {
    fn one() -> Self {
        Big { limbs: vec![1] }
    }

    fn zero() -> Self {
        Big { limbs: Vec::new() }
    }

    fn mul_small(&mut self, m: u64) {
        let mut carry = 0u64;
        for limb in &mut self.limbs {
            let r = u128::from(*limb) * u128::from(m) + u128::from(carry);
            *limb = r as u64;
            carry = (r >> 64) as u64;
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
    }

    fn trim(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    fn bit_len(&self) -> usize {
        match self.limbs.last() {
            Some(&top) => self.limbs.len() * 64 - top.leading_zeros() as usize,
            None => 0,
        }
    }

    fn bit(&self, i: usize) -> bool {
        self.limbs
            .get(i / 64)
            .is_some_and(|limb| (limb >> (i % 64)) & 1 == 1)
    }

    fn set_bit(&mut self, i: usize) {
        if self.limbs.len() <= i / 64 {
            self.limbs.resize(i / 64 + 1, 0);
        }
        self.limbs[i / 64] |= 1 << (i % 64);
    }

    fn shl1(&mut self) {
        let mut carry = 0;
        for limb in &mut self.limbs {
            let next = *limb >> 63;
            *limb = (*limb << 1) | carry;
            carry = next;
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
    }

    fn ge(&self, other: &Big) -> bool {
        if self.limbs.len() != other.limbs.len() {
            return self.limbs.len() > other.limbs.len();
        }
        for (a, b) in self.limbs.iter().rev().zip(other.limbs.iter().rev()) {
            if a != b {
                return a > b;
            }
        }
        true
    }

    /// `self -= other`, requires `self >= other`.
    fn sub_assign(&mut self, other: &Big) {
        let mut borrow = false;
        for (i, limb) in self.limbs.iter_mut().enumerate() {
            let rhs = other.limbs.get(i).copied().unwrap_or(0);
            let (d1, b1) = limb.overflowing_sub(rhs);
            let (d2, b2) = d1.overflowing_sub(u64::from(borrow));
            *limb = d2;
            borrow = b1 || b2;
        }
        self.trim();
    }

    fn add_one(&mut self) {
        for limb in &mut self.limbs {
            let (v, overflow) = limb.overflowing_add(1);
            *limb = v;
            if !overflow {
                return;
            }
        }
        self.limbs.push(1);
    }

    /// `floor(2^b / d)` by restoring division.
    fn pow2_div(b: usize, d: &Big) -> Big {
        let mut quotient = Big::zero();
        let mut rem = Big::zero();
        for i in (0..=b).rev() {
            rem.shl1();
            if i == b {
                rem.add_one();
            }
            if rem.ge(d) {
                rem.sub_assign(d);
                quotient.set_bit(i);
            }
        }
        quotient.trim();
        quotient
    }

    /// The 128 most significant bits, with the top bit at position 127.
    fn top_128(&self) -> (u64, u64) {
        let len = self.bit_len();
        let mut out = 0u128;
        for k in 0..128 {
            // bit 127 - k of the result is bit len - 1 - k of self
            if k < len && self.bit(len - 1 - k) {
                out |= 1 << (127 - k);
            }
        }
        ((out >> 64) as u64, out as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_known_entries() {
        assert_eq!(power_of_five_128(-342), (0xeef453d6923bd65a, 0x113faa2906a13b3f));
        assert_eq!(power_of_five_128(-28), (0xfd87b5f28300ca0d, 0x8bca9d6e188853fc));
        assert_eq!(power_of_five_128(-27), (0x9e74d1b791e07e48, 0x775ea264cf55347e));
        assert_eq!(power_of_five_128(-1), (0xcccccccccccccccc, 0xcccccccccccccccd));
        assert_eq!(power_of_five_128(0), (0x8000000000000000, 0));
        assert_eq!(power_of_five_128(1), (0xa000000000000000, 0));
        assert_eq!(power_of_five_128(28), (0x813f3978f8940984, 0x4000000000000000));
        assert_eq!(power_of_five_128(55), (0xd0cf4b50cfe20765, 0xfff4b4e3f741cf6d));
        assert_eq!(power_of_five_128(308), (0x8e679c2f5e44ff8f, 0x570f09eaa7ea7648));
    }

    fn check(s: &str) {
        let expected: f64 = s.parse().unwrap();
        let got = parse_f64(s.as_bytes()).unwrap();
        assert_eq!(got.to_bits(), expected.to_bits(), "{s}: got {got:e}, expected {expected:e}");
    }

    #[test]
    fn powers_of_ten_are_correctly_rounded() {
        for e in [0u32, 22, 23, 100, 256, 308] {
            let expected: f64 = format!("1e{e}").parse().unwrap();
            assert_eq!(pow10(e).to_bits(), expected.to_bits(), "1e{e}");
        }
        assert!(pow10(309).is_infinite());
    }

    #[test]
    fn simple_values() {
        for s in ["0", "-0", "1", "0.1", "3.14159", "-2.5e-3", "1e22", "1e23", "123456789012345678"] {
            check(s);
        }
    }

    #[test]
    fn halfway_cases_round_to_even() {
        check("9007199254740993");
        check("9007199254740995");
        check("1.00000000000000011102230246251565404236316680908203125");
        check("1.00000000000000011102230246251565404236316680908203126");
        check("1.00000000000000011102230246251565404236316680908203124");
    }

    #[test]
    fn subnormals_and_extremes() {
        for s in [
            "2.2250738585072014e-308",
            "2.2250738585072011e-308",
            "4.9406564584124654e-324",
            "2.4703282292062327e-324",
            "2.4703282292062328e-324",
            "1e-400",
            "1.7976931348623157e308",
            "1.7976931348623158e308",
            "1.7976931348623159e308",
            "1e400",
        ] {
            check(s);
        }
    }

    #[test]
    fn long_mantissas() {
        check("0.30000000000000001665334536938138");
        check("123456789012345678901234567890");
        check("7.2057594037927933e16");
        check("2.225073858507201136057409796709131975934819546351645648e-308");
    }

    #[test]
    fn rejects_bad_grammar() {
        for s in ["", "-", ".5", "1.", "1e", "1e+", "1x", "--1", "+1"] {
            assert_eq!(parse_f64(s.as_bytes()), None, "{s:?}");
        }
    }
}
