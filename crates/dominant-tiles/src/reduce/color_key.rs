use super::error::ReduceError;

/// Largest band count a [`ColorKey`] can hold: one byte per band in a `u32`.
pub const MAX_BANDS: usize = 4;

/// All bands of one pixel packed into a single integer, first band in the
/// most significant position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorKey(u32);

impl ColorKey {
    /// Check that pixels with `bands` bands can be packed.
    pub fn check_bands(bands: usize) -> Result<(), ReduceError> {
        match bands {
            0 => Err(ReduceError::NoBands),
            1..=MAX_BANDS => Ok(()),
            _ => Err(ReduceError::TooManyBands { bands }),
        }
    }

    /// Pack one pixel. `pixel.len()` must not exceed [`MAX_BANDS`].
    #[inline]
    pub fn pack(pixel: &[u8]) -> Self {
        debug_assert!(pixel.len() <= MAX_BANDS);
        Self(pixel.iter().fold(0u32, |key, &band| (key << 8) | band as u32))
    }

    /// Unpack into `out`, using `out.len()` as the band count.
    #[inline]
    pub fn unpack_into(self, out: &mut [u8]) {
        let bands = out.len();
        for (b, slot) in out.iter_mut().enumerate() {
            *slot = (self.0 >> ((bands - 1 - b) * 8)) as u8;
        }
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}
