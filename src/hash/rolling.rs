// Weak rolling checksum (rsync `rsum` family).
//
// Two component sums over a byte window:
//   s1 = Σ bytes            (truncated to 16 bits)
//   s2 = Σ running prefix sums  (truncated to 16 bits)
// combined into a 32-bit value as `(s2 << 16) | s1`.
//
// Truncation to 16 bits per component stands in for the historical 65521
// modulus; what matters is that signature generation and target matching
// share it. The state supports three updates:
//   - `seed`     — one-shot accumulation over a fresh window
//   - `roll`     — O(1) slide by one byte (remove front, append back)
//   - `roll_out` — O(1) shrink by one byte from the front (tail scan)
//
// Wrapping u32 arithmetic is exact here: 2^16 divides 2^32, so masking the
// low 16 bits after wrapping operations yields the same residues as
// reducing every step.

const MASK: u32 = 0xFFFF;

/// Rolling weak checksum accumulator.
///
/// Owned exclusively by the active scan; a `seed` call establishes the
/// window, after which `roll`/`roll_out` keep the state bit-identical to a
/// fresh `seed` over the current window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rolling32 {
    s1: u32,
    s2: u32,
    len: usize,
}

impl Rolling32 {
    /// Create an empty accumulator.
    pub const fn new() -> Self {
        Self { s1: 0, s2: 0, len: 0 }
    }

    /// One-shot checksum of an arbitrary byte window.
    pub fn compute(window: &[u8]) -> u32 {
        let mut state = Self::new();
        state.seed(window);
        state.digest()
    }

    /// Reset and accumulate a fresh window.
    pub fn seed(&mut self, window: &[u8]) {
        let mut s1: u32 = 0;
        let mut s2: u32 = 0;
        for &byte in window {
            s1 = s1.wrapping_add(u32::from(byte));
            s2 = s2.wrapping_add(s1);
        }
        self.s1 = s1 & MASK;
        self.s2 = s2 & MASK;
        self.len = window.len();
    }

    /// Slide the window by one byte: remove `outgoing` from the front and
    /// append `incoming` at the back. Window length is unchanged.
    #[inline(always)]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) {
        debug_assert!(self.len > 0, "roll on an empty window");
        let out = u32::from(outgoing);
        let inn = u32::from(incoming);
        let len = self.len as u32;

        let s1 = self.s1.wrapping_sub(out).wrapping_add(inn) & MASK;
        let s2 = self
            .s2
            .wrapping_sub(len.wrapping_mul(out))
            .wrapping_add(s1)
            & MASK;

        self.s1 = s1;
        self.s2 = s2;
    }

    /// Shrink the window by one byte from the front without appending.
    ///
    /// Used while scanning the short tail of the target, where the window
    /// ends at end-of-input and only loses bytes.
    #[inline(always)]
    pub fn roll_out(&mut self, outgoing: u8) {
        debug_assert!(self.len > 0, "roll_out on an empty window");
        let out = u32::from(outgoing);
        let len = self.len as u32;

        self.s1 = self.s1.wrapping_sub(out) & MASK;
        self.s2 = self.s2.wrapping_sub(len.wrapping_mul(out)) & MASK;
        self.len -= 1;
    }

    /// The combined 32-bit checksum for the current window.
    #[inline(always)]
    pub fn digest(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }

    /// Number of bytes in the current window.
    pub fn window_len(&self) -> usize {
        self.len
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
