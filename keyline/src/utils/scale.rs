/// Trait for mapping a value from one scale to another.
pub trait Scalable: Sized {
    /// Map a value from one scale to another.
    ///
    /// # Parameters
    /// * `self`:  the value to map
    /// * `from_low`:  the low end of the originating range
    /// * `from_high`:  the high end of the originating range
    /// * `to_low`:  the low end of the target range
    /// * `to_high`:  the high end of the target range
    ///
    /// # Returns
    /// The mapped value. An empty originating range maps everything to `to_high`.
    fn scale(self, from_low: Self, from_high: Self, to_low: Self, to_high: Self) -> Self;

    /// Map a value to its clamped progress within `[from_low, from_high]` (0 to 1).
    fn progress(self, from_low: Self, from_high: Self) -> Self;
}

macro_rules! impl_from_scalable {
    ($($variant:ty),*) => {
        $(
            impl Scalable for $variant {
                fn scale(self, from_low: Self, from_high: Self, to_low: Self, to_high: Self) -> Self {
                    if from_high == from_low {
                        return to_high;
                    }
                    (self - from_low) * (to_high - to_low) / (from_high - from_low) + to_low
                }

                fn progress(self, from_low: Self, from_high: Self) -> Self {
                    self.scale(from_low, from_high, 0.0, 1.0).clamp(0.0, 1.0)
                }
            }
        )*
    };
}

impl_from_scalable!(f32, f64);

#[cfg(test)]
mod tests {
    use super::Scalable;

    #[test]
    fn test_scale_f32() {
        assert!((0.5f32.scale(0.0, 1.0, 0.0, 100.0) - 50.0).abs() < f32::EPSILON);
        assert!((0.0f32.scale(0.0, 1.0, 0.0, 100.0) - 0.0).abs() < f32::EPSILON);
        assert!((1.0f32.scale(0.0, 1.0, 0.0, 100.0) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scale_f64() {
        assert!((0.5f64.scale(0.0, 1.0, 0.0, 100.0) - 50.0).abs() < f64::EPSILON);
        assert!((300f64.scale(100.0, 500.0, 0.0, 1.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(7f64.scale(3.0, 3.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(1300f64.progress(1000.0, 2000.0), 0.3);
        assert_eq!(500f64.progress(1000.0, 2000.0), 0.0);
        assert_eq!(2500f64.progress(1000.0, 2000.0), 1.0);
        assert_eq!(0.25f32.progress(0.0, 0.5), 0.5);
    }
}
