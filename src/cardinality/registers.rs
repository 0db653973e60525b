/// Bits per register. Ranks of a 32-bit hash never exceed 29 for precision >= 4.
pub(crate) const REGISTER_WIDTH: usize = 5;

const MASK: u16 = (1 << REGISTER_WIDTH) - 1;

/// Fixed number of 5-bit registers packed little-endian into bytes.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Registers {
    buf: Vec<u8>,
    len: usize,
}

impl Registers {
    pub fn new(len: usize) -> Self {
        // One spare byte so every register can be read through a two-byte window.
        let num_bytes = (REGISTER_WIDTH * len).div_ceil(8) + 1;
        Self {
            buf: vec![0; num_bytes],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, index: usize) -> u8 {
        assert!(index < self.len, "index out of bounds");
        let (byte, shift) = Self::locate(index);
        ((self.window(byte) >> shift) & MASK) as u8
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |index| self.get(index))
    }

    /// Raises register `index` to `value`. Returns whether the register changed.
    pub fn update_max(&mut self, index: usize, value: u8) -> bool {
        debug_assert!(u16::from(value) <= MASK);
        if value <= self.get(index) {
            return false;
        }
        let (byte, shift) = Self::locate(index);
        let window = (self.window(byte) & !(MASK << shift)) | (u16::from(value) & MASK) << shift;
        self.buf[byte..byte + 2].copy_from_slice(&window.to_le_bytes());
        true
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    fn window(&self, byte: usize) -> u16 {
        u16::from_le_bytes([self.buf[byte], self.buf[byte + 1]])
    }

    fn locate(index: usize) -> (usize, usize) {
        let bit = REGISTER_WIDTH * index;
        (bit / 8, bit % 8)
    }
}

#[cfg(test)]
#[allow(clippy::unusual_byte_groupings)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size() {
        assert_eq!(Registers::new(1).buf.len(), 2);
        assert_eq!(Registers::new(8).buf.len(), 6);
        assert_eq!(Registers::new(16).buf.len(), 11);
        assert_eq!(Registers::new(1 << 14).buf.len(), 10241);
    }

    #[test]
    fn test_update_max_packs_across_bytes() {
        let mut registers = Registers::new(3);

        assert!(registers.update_max(0, 0b10110));
        assert!(registers.update_max(1, 0b11001));
        assert!(registers.update_max(2, 0b00111));

        assert_eq!(registers.buf, vec![0b001_10110, 0b0_00111_11, 0]);
        assert_eq!(registers.iter().collect::<Vec<_>>(), vec![0b10110, 0b11001, 0b00111]);
    }

    #[test]
    fn test_update_max_keeps_larger() {
        let mut registers = Registers::new(3);
        registers.update_max(1, 12);

        assert!(!registers.update_max(1, 3));
        assert!(!registers.update_max(1, 12));
        assert_eq!(registers.get(1), 12);
        assert_eq!(registers.get(0), 0);
        assert_eq!(registers.get(2), 0);
    }

    #[test]
    fn test_clear() {
        let mut registers = Registers::new(10);
        for index in 0..10 {
            registers.update_max(index, 31);
        }

        registers.clear();

        assert!(registers.iter().all(|r| r == 0));
        assert_eq!(registers.len(), 10);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_get_out_of_bounds() {
        Registers::new(4).get(4);
    }
}
