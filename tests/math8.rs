mod tests {
    use myrtio_strip_engine::buffer::{PixelBuffer, PlainBuffer};
    use myrtio_strip_engine::math8::{merge8, merge16, permille, scale8_nd, scale16_nd};
    use proptest::prelude::*;

    #[test]
    fn test_permille() {
        assert_eq!(permille(0.0), 0);
        assert_eq!(permille(0.25), 250);
        assert_eq!(permille(0.5), 500);
        assert_eq!(permille(1.0), 1000);
    }

    #[test]
    fn test_permille_clamps() {
        assert_eq!(permille(1.5), 1000);
        assert_eq!(permille(-0.5), 0);
        assert_eq!(permille(f32::NAN), 0);
    }

    #[test]
    fn test_scale8_nd() {
        assert_eq!(scale8_nd(200, 900, 1000), 180);
        assert_eq!(scale8_nd(255, 1, 2), 127);
        assert_eq!(scale8_nd(1, 999, 1000), 0);
        assert_eq!(scale8_nd(10, 5, 0), 0);
    }

    #[test]
    fn test_scale16_nd() {
        assert_eq!(scale16_nd(65535, 500, 1000), 32767);
        assert_eq!(scale16_nd(1000, 1000, 1000), 1000);
    }

    #[test]
    fn test_merge_saturates() {
        assert_eq!(merge8(200, 100, 255), 255);
        assert_eq!(merge8(0, 1, 1), 1);
        assert_eq!(merge8(1, 1, 1), 1);
        assert_eq!(merge16(60000, 10000, u16::MAX), u16::MAX);
        assert_eq!(merge16(100, 200, u16::MAX), 300);
    }

    proptest! {
        #[test]
        fn fade_to_zero_clears(values in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut buffer = PlainBuffer::<u8, 64>::new(values.len(), u8::MAX).unwrap();
            for (index, value) in values.iter().enumerate() {
                buffer.set(index, *value);
            }
            buffer.fade(0.0);
            prop_assert!(buffer.as_slice().iter().all(|&value| value == 0));
        }

        #[test]
        fn merge_is_capped_sum(a in any::<u8>(), b in any::<u8>(), max in any::<u8>()) {
            let expected = (u16::from(a) + u16::from(b)).min(u16::from(max));
            prop_assert_eq!(u16::from(merge8(a, b, max)), expected);
        }

        #[test]
        fn fade_never_brightens(value in any::<u16>(), factor in 0.0f32..=1.0) {
            prop_assert!(scale16_nd(value, permille(factor), 1000) <= value);
        }
    }
}
