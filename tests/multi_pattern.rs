mod tests {
    use myrtio_strip_engine::buffer::{BitBuffer, PixelBuffer, PlainBuffer};
    use myrtio_strip_engine::error::BufferError;
    use myrtio_strip_engine::pattern::{
        Blink, BlinkConfig, Clear, Kit, KitConfig, MorseCode, MorseCodeConfig, MultiPattern, Pattern,
        PatternId, PatternSelector, PatternSlot, SelectConfig, SelectPattern,
    };

    fn blink(on_time_ms: u32, off_time_ms: u32) -> PatternSlot<u8> {
        PatternSlot::Blink(Blink::new(BlinkConfig {
            on_time_ms,
            off_time_ms,
            ..BlinkConfig::default()
        }))
    }

    #[test]
    fn test_outer_schedule_is_union_of_segments() {
        let mut buffer = BitBuffer::<4>::binary(4).unwrap();
        let mut multi = MultiPattern::<u8, 2>::new([(2, blink(10, 10)), (2, blink(15, 15))]).unwrap();

        assert_eq!(multi.next_frame(&mut buffer), Some(10));
        assert_eq!(buffer.as_slice(), &[1, 1, 1, 1]);
        assert_eq!(multi.next_frame(&mut buffer), Some(5));
        assert_eq!(buffer.as_slice(), &[0, 0, 1, 1]);
        assert_eq!(multi.next_frame(&mut buffer), Some(5));
        assert_eq!(buffer.as_slice(), &[0, 0, 0, 0]);
        assert_eq!(multi.next_frame(&mut buffer), Some(10));
        assert_eq!(buffer.as_slice(), &[1, 1, 0, 0]);
        assert_eq!(multi.elapsed_ms(), 30);
    }

    #[test]
    fn test_segments_match_standalone_runs() {
        let kit = PatternSlot::Kit(Kit::new(KitConfig {
            fade: 0.5,
            freq: 66,
            cycle_length: 4,
            ..KitConfig::default()
        }));
        let mut multi = MultiPattern::<u8, 2>::new([(2, blink(10, 10)), (3, kit.clone())]).unwrap();
        let mut shared = PlainBuffer::<u8, 5>::new(5, u8::MAX).unwrap();

        let mut alone = [
            (blink(10, 10), PlainBuffer::<u8, 5>::new(2, u8::MAX).unwrap(), 0u64),
            (kit, PlainBuffer::<u8, 5>::new(3, u8::MAX).unwrap(), 0u64),
        ];
        let mut now = 0u64;
        for _ in 0..40 {
            for (pattern, buffer, due) in &mut alone {
                if *due <= now {
                    *due += u64::from(pattern.next_frame(buffer).unwrap());
                }
            }
            let delay = multi.next_frame(&mut shared).unwrap();
            assert_eq!(&shared.as_slice()[..2], alone[0].1.as_slice());
            assert_eq!(&shared.as_slice()[2..], alone[1].1.as_slice());
            now += u64::from(delay);
        }
        assert_eq!(multi.elapsed_ms(), now);
    }

    #[test]
    fn test_zero_sized_segment_gets_one_pixel() {
        let mut buffer = BitBuffer::<3>::binary(3).unwrap();
        let mut multi = MultiPattern::<u8, 2>::new([(0, blink(10, 10)), (2, PatternSlot::Clear(Clear::default()))]).unwrap();
        buffer.fill(1);
        multi.next_frame(&mut buffer);
        assert_eq!(buffer.as_slice(), &[1, 0, 0]);
    }

    #[test]
    fn test_too_many_segments() {
        let parts = [(1, blink(1, 1)), (1, blink(1, 1))];
        assert_eq!(
            MultiPattern::<u8, 1>::new(parts).unwrap_err(),
            BufferError::Capacity {
                requested: 2,
                capacity: 1
            }
        );
    }

    #[test]
    fn test_finishes_when_every_segment_finished() {
        let morse = PatternSlot::MorseCode(MorseCode::new(MorseCodeConfig {
            looping: false,
            dit: 10,
            ..MorseCodeConfig::new("e")
        }));
        let mut buffer = BitBuffer::<2>::binary(2).unwrap();
        let mut multi = MultiPattern::<u8, 2>::new([(1, morse.clone()), (1, morse)]).unwrap();
        let mut frames = 0;
        while multi.next_frame(&mut buffer).is_some() {
            frames += 1;
        }
        assert_eq!(frames, 8);

        multi.reset();
        assert_eq!(multi.next_frame(&mut buffer), Some(10));
    }

    #[test]
    fn test_select_follows_selector() {
        let selector = PatternSelector::new(PatternId::Kit);
        let choices = heapless::Vec::<PatternSlot<u8>, 2>::from_slice(&[
            blink(100, 100),
            PatternId::Clear.to_slot(None),
        ])
        .unwrap();
        let mut buffer = BitBuffer::<2>::binary(2).unwrap();
        let mut select = SelectPattern::new(&selector, choices, SelectConfig::default());

        // unknown selection falls back to the first choice
        assert_eq!(selector.get(), PatternId::Blink);
        assert_eq!(select.active_id(), None);

        // long frames are split so the selection is checked at 30 Hz
        let delays: Vec<_> = (0..4).map(|_| select.next_frame(&mut buffer).unwrap()).collect();
        assert_eq!(delays, vec![33, 33, 33, 1]);
        assert_eq!(select.active_id(), Some(PatternId::Blink));
        assert_eq!(buffer.as_slice(), &[1, 1]);

        selector.set(PatternId::Clear);
        assert_eq!(select.next_frame(&mut buffer), Some(0));
        assert_eq!(select.active_id(), Some(PatternId::Clear));
        assert_eq!(buffer.as_slice(), &[0, 0]);
        assert_eq!(select.next_frame(&mut buffer), Some(33));
    }

    #[test]
    fn test_select_restarts_pattern_from_template() {
        let selector = PatternSelector::new(PatternId::Blink);
        let choices = heapless::Vec::<PatternSlot<u8>, 2>::from_slice(&[
            blink(10, 10),
            PatternId::Clear.to_slot(None),
        ])
        .unwrap();
        let mut buffer = BitBuffer::<1>::binary(1).unwrap();
        let mut select = SelectPattern::new(&selector, choices, SelectConfig::default());

        select.next_frame(&mut buffer);
        select.next_frame(&mut buffer);
        assert_eq!(buffer.get(0), 0);

        selector.set(PatternId::Clear);
        select.next_frame(&mut buffer);
        selector.set(PatternId::Blink);
        assert_eq!(select.next_frame(&mut buffer), Some(10));
        assert_eq!(buffer.get(0), 1);
    }
}
