mod tests {
    use myrtio_strip_engine::color::{
        OFF, PixelValue, Rgb, channels, from_channels, from_rgb, rgb, rgbw,
    };

    #[test]
    fn test_rgb_has_dark_white_channel() {
        assert_eq!(channels(rgb(1, 2, 3)), [1, 2, 3, 0]);
        assert_eq!(from_rgb(Rgb::new(4, 5, 6)), rgb(4, 5, 6));
    }

    #[test]
    fn test_channels_order() {
        assert_eq!(channels(rgbw(1, 2, 3, 4)), [1, 2, 3, 4]);
        assert_eq!(from_channels([9, 8, 7, 6]), rgbw(9, 8, 7, 6));
    }

    #[test]
    fn test_rgbw_scale() {
        assert_eq!(rgbw(200, 100, 50, 10).scale_nd(1, 2), rgbw(100, 50, 25, 5));
        assert_eq!(rgbw(200, 100, 50, 10).scale_nd(0, 1000), OFF);
    }

    #[test]
    fn test_rgbw_merge_per_channel() {
        let merged = rgbw(200, 10, 0, 0).saturating_merge(rgbw(100, 10, 0, 5), rgb(255, 255, 255));
        assert_eq!(merged, rgbw(255, 20, 0, 0));
    }

    #[test]
    fn test_rgbw_clamp() {
        assert_eq!(rgbw(9, 9, 9, 9).clamp_to(rgb(255, 255, 255)), rgb(9, 9, 9));
        assert_eq!(7u8.clamp_to(1), 1);
        assert_eq!(500u16.clamp_to(u16::MAX), 500);
    }
}
