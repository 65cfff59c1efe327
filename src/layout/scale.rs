use crate::config::SizingConfig;

/// Map a word count onto a font size with a power curve.
///
/// When every word shares one count there is nothing to rank, so all of them
/// take the full size. A single word therefore renders at `max_font_size`, but
/// uniform input such as raw transcript counts (every word seen once) also
/// lays out at full size and only a handful of labels fit the canvas. Lower
/// `max_font_size` for that kind of input.
pub fn scale_size(count: u32, min_count: u32, max_count: u32, sizing: &SizingConfig) -> f32 {
    let min_size = sizing.min_font_size;
    let max_size = sizing.max_font_size.max(min_size);
    let range = max_count.saturating_sub(min_count);
    let normalized = if range == 0 {
        1.0
    } else {
        (count.saturating_sub(min_count) as f32 / range as f32).clamp(0.0, 1.0)
    };
    let powered = normalized.powf(sizing.size_exponent);
    let size = min_size + powered * (max_size - min_size);
    if size.is_finite() {
        size.clamp(min_size, max_size)
    } else {
        min_size
    }
}

/// Font size used by the last-resort search tier.
pub fn reduced_size(font_size: f32, sizing: &SizingConfig) -> f32 {
    (font_size * sizing.reduced_size_factor).max(sizing.min_font_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn endpoints_hit_the_size_range() {
        let sizing = SizingConfig::default();
        assert_eq!(scale_size(1, 1, 100, &sizing), 10.0);
        assert_eq!(scale_size(100, 1, 100, &sizing), 80.0);
    }

    #[test]
    fn curve_favours_the_high_end() {
        let sizing = SizingConfig::default();
        let mid = scale_size(50, 0, 100, &sizing);
        // 0.5^0.7 ~= 0.6156
        assert!((mid - (10.0 + 0.6156 * 70.0)).abs() < 0.05);
        assert!(mid > 45.0);
    }

    #[test]
    fn uniform_counts_get_the_same_size() {
        let sizing = SizingConfig::default();
        assert_eq!(scale_size(42, 42, 42, &sizing), 80.0);
        assert_eq!(
            scale_size(7, 7, 7, &sizing),
            scale_size(42, 42, 42, &sizing)
        );
    }

    #[test]
    fn reduced_size_has_a_floor() {
        let sizing = SizingConfig::default();
        assert!((reduced_size(80.0, &sizing) - 56.0).abs() < 1e-4);
        assert_eq!(reduced_size(12.0, &sizing), 10.0);
    }

    proptest! {
        #[test]
        fn size_stays_in_range(min in 1u32..500, spread in 0u32..500, offset in 0u32..500) {
            let sizing = SizingConfig::default();
            let max = min + spread;
            let count = min + offset.min(spread);
            let size = scale_size(count, min, max, &sizing);
            prop_assert!(size >= sizing.min_font_size);
            prop_assert!(size <= sizing.max_font_size);
        }

        #[test]
        fn size_is_monotonic(min in 1u32..500, spread in 1u32..500, a in 0u32..500, b in 0u32..500) {
            let sizing = SizingConfig::default();
            let max = min + spread;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let small = scale_size(min + lo.min(spread), min, max, &sizing);
            let large = scale_size(min + hi.min(spread), min, max, &sizing);
            prop_assert!(large >= small);
        }
    }
}
