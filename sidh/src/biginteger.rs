//! Fixed-width 768-bit little-endian big integers: the raw limb storage
//! underneath `Fp751` and the scratch type used by its Montgomery
//! reduction and inversion.

use byteorder::{ByteOrder, LittleEndian};
use std::cmp::Ordering;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

pub const NUM_LIMBS: usize = 12;

/// A 768-bit integer stored as 12 little-endian 64-bit limbs.
#[derive(Copy, Clone, Eq, Debug)]
pub struct BigInteger768(pub [u64; NUM_LIMBS]);

impl BigInteger768 {
    pub const fn zero() -> Self {
        BigInteger768([0u64; NUM_LIMBS])
    }

    pub const fn from_u64(x: u64) -> Self {
        let mut limbs = [0u64; NUM_LIMBS];
        limbs[0] = x;
        BigInteger768(limbs)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    pub fn is_even(&self) -> bool {
        self.0[0] & 1 == 0
    }

    pub fn is_odd(&self) -> bool {
        self.0[0] & 1 == 1
    }

    /// `self += other`, returning the carry out of the top limb.
    pub fn add_nocarry(&mut self, other: &Self) -> u64 {
        let mut carry = 0u128;
        for i in 0..NUM_LIMBS {
            let sum = self.0[i] as u128 + other.0[i] as u128 + carry;
            self.0[i] = sum as u64;
            carry = sum >> 64;
        }
        carry as u64
    }

    /// `self -= other`, returning 1 if a borrow occurred (i.e. `self < other`
    /// prior to the call), else 0.
    pub fn sub_noborrow(&mut self, other: &Self) -> u64 {
        let mut borrow = 0i128;
        for i in 0..NUM_LIMBS {
            let diff = self.0[i] as i128 - other.0[i] as i128 - borrow;
            if diff < 0 {
                self.0[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                self.0[i] = diff as u64;
                borrow = 0;
            }
        }
        borrow as u64
    }

    /// Right shift by one bit.
    pub fn shr1(&mut self) {
        let mut carry = 0u64;
        for i in (0..NUM_LIMBS).rev() {
            let next_carry = self.0[i] << 63;
            self.0[i] = (self.0[i] >> 1) | carry;
            carry = next_carry;
        }
    }

    /// Left shift by one bit. Returns the bit shifted out of the top limb.
    pub fn shl1(&mut self) -> u64 {
        let mut carry = 0u64;
        for i in 0..NUM_LIMBS {
            let next_carry = self.0[i] >> 63;
            self.0[i] = (self.0[i] << 1) | carry;
            carry = next_carry;
        }
        carry
    }

    pub fn bit(&self, i: usize) -> bool {
        let limb = i / 64;
        let off = i % 64;
        if limb >= NUM_LIMBS {
            return false;
        }
        (self.0[limb] >> off) & 1 == 1
    }

    pub fn num_bits() -> usize {
        NUM_LIMBS * 64
    }

    pub fn from_bytes_le(bytes: &[u8]) -> Self {
        let mut limbs = [0u64; NUM_LIMBS];
        let mut buf = [0u8; 8];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = i * 8;
            let end = core::cmp::min(start + 8, bytes.len());
            if start < bytes.len() {
                buf = [0u8; 8];
                buf[..end - start].copy_from_slice(&bytes[start..end]);
                *limb = LittleEndian::read_u64(&buf);
            }
        }
        BigInteger768(limbs)
    }

    pub fn to_bytes_le(&self) -> [u8; NUM_LIMBS * 8] {
        let mut out = [0u8; NUM_LIMBS * 8];
        for i in 0..NUM_LIMBS {
            LittleEndian::write_u64(&mut out[i * 8..(i + 1) * 8], self.0[i]);
        }
        out
    }
}

impl PartialEq for BigInteger768 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Ord for BigInteger768 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..NUM_LIMBS).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for BigInteger768 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for BigInteger768 {
    fn default() -> Self {
        Self::zero()
    }
}

impl ConditionallySelectable for BigInteger768 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = [0u64; NUM_LIMBS];
        for i in 0..NUM_LIMBS {
            out[i] = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        BigInteger768(out)
    }
}

impl ConstantTimeEq for BigInteger768 {
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut acc = Choice::from(1u8);
        for i in 0..NUM_LIMBS {
            acc &= self.0[i].ct_eq(&other.0[i]);
        }
        acc
    }
}

/// A 13-limb (832-bit) scratch integer used only inside the almost-inverse
/// binary GCD, where the cofactors transiently exceed 768 bits.
#[derive(Copy, Clone, Debug)]
pub(crate) struct WideBigInteger(pub [u64; 13]);

impl WideBigInteger {
    pub fn from_narrow(x: &BigInteger768) -> Self {
        let mut limbs = [0u64; 13];
        limbs[..12].copy_from_slice(&x.0);
        WideBigInteger(limbs)
    }

    pub fn zero() -> Self {
        WideBigInteger([0u64; 13])
    }

    pub fn from_u64(x: u64) -> Self {
        let mut limbs = [0u64; 13];
        limbs[0] = x;
        WideBigInteger(limbs)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    pub fn is_even(&self) -> bool {
        self.0[0] & 1 == 0
    }

    pub fn add_assign(&mut self, other: &Self) {
        let mut carry = 0u128;
        for i in 0..13 {
            let sum = self.0[i] as u128 + other.0[i] as u128 + carry;
            self.0[i] = sum as u64;
            carry = sum >> 64;
        }
    }

    /// `self -= other`, assuming `self >= other`.
    pub fn sub_assign(&mut self, other: &Self) {
        let mut borrow = 0i128;
        for i in 0..13 {
            let diff = self.0[i] as i128 - other.0[i] as i128 - borrow;
            if diff < 0 {
                self.0[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                self.0[i] = diff as u64;
                borrow = 0;
            }
        }
    }

    pub fn shr1(&mut self) {
        let mut carry = 0u64;
        for i in (0..13).rev() {
            let next_carry = self.0[i] << 63;
            self.0[i] = (self.0[i] >> 1) | carry;
            carry = next_carry;
        }
    }

    pub fn shl1(&mut self) {
        let mut carry = 0u64;
        for i in 0..13 {
            let next_carry = self.0[i] >> 63;
            self.0[i] = (self.0[i] << 1) | carry;
            carry = next_carry;
        }
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..13).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Truncate back down to 768 bits. The caller is responsible for having
    /// reduced the value below 2^768 first (true for every use site in
    /// `fp::invert`, where this only ever holds a value in `[0, p)`).
    pub fn to_narrow(&self) -> BigInteger768 {
        let mut limbs = [0u64; 12];
        limbs.copy_from_slice(&self.0[..12]);
        debug_assert_eq!(self.0[12], 0);
        BigInteger768(limbs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let a = BigInteger768([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let b = BigInteger768([12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
        let mut sum = a;
        let carry = sum.add_nocarry(&b);
        assert_eq!(carry, 0);
        let mut back = sum;
        back.sub_noborrow(&b);
        assert_eq!(back, a);
    }

    #[test]
    fn shifts_roundtrip() {
        let mut a = BigInteger768([u64::MAX; NUM_LIMBS]);
        let bit_out = a.shl1();
        assert_eq!(bit_out, 1);
        a.shr1();
        assert_eq!(a.0[NUM_LIMBS - 1] >> 62, 0b01);
    }

    #[test]
    fn bytes_roundtrip() {
        let a = BigInteger768([
            0x1111111111111111,
            0x2222222222222222,
            0x3333333333333333,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
        ]);
        let bytes = a.to_bytes_le();
        let b = BigInteger768::from_bytes_le(&bytes);
        assert_eq!(a, b);
    }

    #[test]
    fn ordering() {
        let a = BigInteger768::from_u64(5);
        let b = BigInteger768::from_u64(10);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a, BigInteger768::from_u64(5));
    }
}
