//! Common tools

/// The state of a bit,
/// It's either [`BitState::Clear`] to represent a 0
/// or [`BitState::Set`] to represent a 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitState {
    /// Bit is 0
    Clear,
    /// Bit is 1
    Set,
}

/// Simple bit ops
///
/// Bit positions are taken modulo 8, so `pos` is always inside the byte
pub trait BitOps {
    /// Set bit at `pos` to 1, return the new value
    fn set_bit(&mut self, pos: u8) -> Self;
    /// Set bit at `pos` to 0, return the new value
    fn clear_bit(&mut self, pos: u8) -> Self;
    /// Set bit at `pos` to 1 or 0, depends on `state`
    fn put_bit(&mut self, pos: u8, state: BitState) -> Self;
    #[allow(missing_docs)]
    fn check_bit(&self, pos: u8) -> BitState;
}

impl BitOps for u8 {
    fn set_bit(&mut self, pos: u8) -> Self {
        *self |= 1u8 << (pos & 0b111);
        *self
    }

    fn clear_bit(&mut self, pos: u8) -> Self {
        *self &= !(1u8 << (pos & 0b111));
        *self
    }

    fn put_bit(&mut self, pos: u8, state: BitState) -> Self {
        match state {
            BitState::Set => self.set_bit(pos),
            BitState::Clear => self.clear_bit(pos),
        }
    }

    fn check_bit(&self, pos: u8) -> BitState {
        match (*self >> (pos & 0b111)) & 1 == 1 {
            true => BitState::Set,
            false => BitState::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_bits() {
        let mut v = 0u8;
        assert_eq!(v.set_bit(3), 0b0000_1000);
        assert_eq!(v.set_bit(7), 0b1000_1000);
        assert_eq!(v.clear_bit(3), 0b1000_0000);
        assert_eq!(v.check_bit(7), BitState::Set);
        assert_eq!(v.check_bit(0), BitState::Clear);
    }

    #[test]
    fn put_bit_follows_state() {
        let mut v = 0b1111_0000u8;
        v.put_bit(0, BitState::Set);
        v.put_bit(7, BitState::Clear);
        assert_eq!(v, 0b0111_0001);
    }
}
