//! Bit helpers for the flag words carried in OpenFlow records.

/// Set bit `bit` of `x` on if `toggle` is true, otherwise off.
pub fn bit(bit: u32, x: u32, toggle: bool) -> u32 {
    if toggle {
        x | (1 << bit)
    } else {
        x & !(1 << bit)
    }
}

/// Test whether bit `bit` of `x` is set.
pub fn test_bit(bit: u32, x: u32) -> bool {
    (x >> bit) & 1 == 1
}

/// Extract the `width`-bit field starting at bit `shift` of `x`.
pub fn get_field(x: u32, shift: u32, width: u32) -> u32 {
    (x >> shift) & ((1 << width) - 1)
}

/// Replace the `width`-bit field starting at bit `shift` of `x` with `v`.
/// Bits of `v` above `width` are dropped.
pub fn set_field(x: u32, shift: u32, width: u32, v: u32) -> u32 {
    let mask = ((1 << width) - 1) << shift;
    (x & !mask) | ((v << shift) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bits() {
        let x = bit(3, 0, true);
        assert_eq!(x, 0b1000);
        assert!(test_bit(3, x));
        assert!(!test_bit(2, x));
        assert_eq!(bit(3, x, false), 0);
    }

    #[test]
    fn multi_bit_fields() {
        let x = set_field(0xffff_ffff, 8, 6, 0);
        assert_eq!(x, 0xffff_c0ff);
        assert_eq!(get_field(set_field(x, 8, 6, 32), 8, 6), 32);
        assert_eq!(get_field(set_field(0, 8, 6, 0x7f), 8, 6), 0x3f);
    }
}
