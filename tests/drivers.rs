mod tests {
    use std::cell::{Cell, RefCell};
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{self, OutputPin};
    use embedded_hal::pwm::{self, SetDutyCycle};
    use myrtio_strip_engine::color::{Rgbw, rgb, rgbw};
    use myrtio_strip_engine::driver::{
        BitTiming, BitstreamDriver, DmaDriver, LedDriverConfig, PinDriver, PioDriver, PwmConfig,
        PwmDriver,
    };
    use myrtio_strip_engine::error::{BufferError, DriverError, TaskError};
    use myrtio_strip_engine::hw::dma::{ChannelRegisters, DmaCtrl, DmaRegisters, Transfer};
    use myrtio_strip_engine::hw::pio::{PioBlock, SK6812_PROGRAM, StateMachineConfig, WS2812_PROGRAM};
    use myrtio_strip_engine::hw::{PwmOutput, ResourcePool, ResourceUsage};
    use myrtio_strip_engine::pattern::{Blink, BlinkConfig, MorseCode, MorseCodeConfig};
    use myrtio_strip_engine::scheduler::{Clock, Scheduler, SchedulerConfig, Task, Tick};
    use myrtio_strip_engine::Instant;

    struct SimClock {
        time: Rc<Cell<u64>>,
    }

    impl Clock for SimClock {
        fn now(&self) -> Instant {
            Instant::from_millis(self.time.get())
        }

        fn sleep_until(&mut self, deadline: Instant) {
            self.time.set(self.time.get().max(deadline.as_millis()));
        }
    }

    /// Records `(time, level)` for every write
    struct RecordingPin {
        time: Rc<Cell<u64>>,
        writes: Rc<RefCell<Vec<(u64, bool)>>>,
    }

    impl digital::ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push((self.time.get(), false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push((self.time.get(), true));
            Ok(())
        }
    }

    struct BrokenPin;

    impl digital::ErrorType for BrokenPin {
        type Error = digital::ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(digital::ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(digital::ErrorKind::Other)
        }
    }

    #[derive(Default)]
    struct LevelLog {
        levels: Vec<bool>,
    }

    impl digital::ErrorType for LevelLog {
        type Error = Infallible;
    }

    impl OutputPin for LevelLog {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[derive(Default)]
    struct DelayLog {
        delays: Vec<u32>,
    }

    impl DelayNs for DelayLog {
        fn delay_ns(&mut self, ns: u32) {
            self.delays.push(ns);
        }
    }

    struct MockPwm {
        frequency: Option<u32>,
        duties: Vec<u16>,
        reject_frequency: bool,
    }

    impl MockPwm {
        fn new() -> Self {
            Self {
                frequency: None,
                duties: Vec::new(),
                reject_frequency: false,
            }
        }
    }

    impl pwm::ErrorType for MockPwm {
        type Error = pwm::ErrorKind;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duties.push(duty);
            Ok(())
        }
    }

    impl PwmOutput for MockPwm {
        fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
            if self.reject_frequency {
                return Err(pwm::ErrorKind::Other);
            }
            self.frequency = Some(hz);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPio {
        installed: Vec<(u8, Option<&'static [u16]>, StateMachineConfig)>,
        pushed: Vec<(u8, u32)>,
        reject_install: bool,
    }

    impl PioBlock for MockPio {
        type Error = ();

        fn install(
            &mut self,
            state_machine: u8,
            program: Option<&'static [u16]>,
            config: &StateMachineConfig,
        ) -> Result<(), Self::Error> {
            if self.reject_install {
                return Err(());
            }
            self.installed.push((state_machine, program, *config));
            Ok(())
        }

        fn push_tx(&mut self, state_machine: u8, word: u32) {
            self.pushed.push((state_machine, word));
        }
    }

    #[derive(Default)]
    struct MockDma {
        /// Status reads left that report a transfer in flight
        busy_reads: Cell<u32>,
        fault: bool,
        started: Vec<(u8, ChannelRegisters, Vec<u32>)>,
    }

    impl DmaRegisters for MockDma {
        fn start(&mut self, channel: u8, transfer: Transfer<'_>) {
            self.started
                .push((channel, transfer.registers(), transfer.source.to_vec()));
        }

        fn ctrl(&self, _channel: u8) -> DmaCtrl {
            let busy = self.busy_reads.get();
            self.busy_reads.set(busy.saturating_sub(1));
            DmaCtrl(if self.fault { 1 << 30 } else { 0 }).with_busy(busy > 0)
        }

        fn abort(&mut self, _channel: u8) {
            self.busy_reads.set(0);
        }
    }

    /// Stays busy once a transfer starts, until it is aborted
    struct LatchedDma<'p> {
        pool: &'p ResourcePool,
        busy: Cell<bool>,
        /// Aborted channel and the claimed DMA mask at that moment
        aborts: Vec<(u8, u16)>,
    }

    impl<'p> LatchedDma<'p> {
        fn new(pool: &'p ResourcePool) -> Self {
            Self {
                pool,
                busy: Cell::new(false),
                aborts: Vec::new(),
            }
        }
    }

    impl DmaRegisters for LatchedDma<'_> {
        fn start(&mut self, _channel: u8, _transfer: Transfer<'_>) {
            self.busy.set(true);
        }

        fn ctrl(&self, _channel: u8) -> DmaCtrl {
            DmaCtrl(0).with_busy(self.busy.get())
        }

        fn abort(&mut self, channel: u8) {
            self.aborts.push((channel, self.pool.in_use().dma_channels));
            self.busy.set(false);
        }
    }

    fn lit(pixel: Rgbw) -> Blink<Rgbw> {
        Blink::new(BlinkConfig {
            pixel: Some(pixel),
            ..BlinkConfig::default()
        })
    }

    #[test]
    fn test_blink_on_a_pin() {
        let time = Rc::new(Cell::new(0));
        let writes = Rc::new(RefCell::new(Vec::new()));
        let pin = RecordingPin {
            time: time.clone(),
            writes: writes.clone(),
        };
        let mut driver = PinDriver::new([pin], Blink::default()).unwrap();
        {
            let clock = SimClock { time: time.clone() };
            let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
            scheduler.register(&mut driver).unwrap();
            scheduler.run_until(Instant::from_millis(2000)).unwrap();
        }
        assert_eq!(
            *writes.borrow(),
            vec![(0, true), (200, false), (1000, true), (1200, false), (2000, true)]
        );
        assert_eq!(driver.buffer().as_slice(), &[1]);
    }

    #[test]
    fn test_pin_driver_finishes_with_pattern() {
        let time = Rc::new(Cell::new(0));
        let writes = Rc::new(RefCell::new(Vec::new()));
        let pins = [0, 1].map(|_| RecordingPin {
            time: time.clone(),
            writes: writes.clone(),
        });
        let morse = MorseCode::new(MorseCodeConfig {
            looping: false,
            ..MorseCodeConfig::new("e")
        });
        let mut driver = PinDriver::new(pins, morse).unwrap();
        let mut frames = 0;
        while let Tick::Delay(_) = driver.resume().unwrap() {
            frames += 1;
        }
        assert_eq!(frames, 8);
        assert!(matches!(driver.resume(), Ok(Tick::Done)));
    }

    #[test]
    fn test_pin_write_failure() {
        let mut driver = PinDriver::new([BrokenPin], Blink::default()).unwrap();
        assert_eq!(driver.resume().err(), Some(TaskError::PinWrite { index: 0 }));
    }

    #[test]
    fn test_pwm_driver() {
        let mut driver = PwmDriver::new([MockPwm::new(), MockPwm::new()], Blink::default(), PwmConfig::default()).unwrap();
        assert_eq!(driver.outputs()[0].frequency, Some(10_000));

        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));
        assert_eq!(driver.buffer().as_slice(), &[u16::MAX, u16::MAX]);
        assert!(matches!(driver.resume(), Ok(Tick::Delay(800))));
        assert_eq!(driver.outputs()[1].duties, vec![1000, 0]);
    }

    #[test]
    fn test_pwm_frequency_rejected() {
        let broken = MockPwm {
            reject_frequency: true,
            ..MockPwm::new()
        };
        let result = PwmDriver::new([MockPwm::new(), broken], Blink::default(), PwmConfig::default());
        assert_eq!(result.err(), Some(DriverError::Setup { index: 1 }));
    }

    #[test]
    fn test_bitstream_bits_msb_first() {
        let mut driver = BitstreamDriver::<_, _, _, 1>::new(
            LevelLog::default(),
            DelayLog::default(),
            lit(rgbw(0x80, 0, 0, 0x01)),
            1,
            4,
            BitTiming::default(),
        )
        .unwrap();
        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));

        let delays = &driver.delay().delays;
        assert_eq!(delays.len(), 64);
        // wire order is g, r, b, w
        assert_eq!(&delays[0..2], &[400, 850]);
        assert_eq!(&delays[16..18], &[800, 450]);
        assert_eq!(&delays[18..20], &[400, 850]);
        assert_eq!(&delays[62..64], &[800, 450]);

        let levels = &driver.pin().levels;
        assert_eq!(levels.len(), 64);
        assert!(levels.iter().step_by(2).all(|&level| level));
    }

    #[test]
    fn test_bitstream_rejects_three_channels() {
        let result = BitstreamDriver::<_, _, _, 4>::new(
            LevelLog::default(),
            DelayLog::default(),
            lit(rgb(1, 1, 1)),
            1,
            3,
            BitTiming::KHZ_400,
        );
        assert_eq!(
            result.err(),
            Some(DriverError::UnsupportedChannelCount {
                driver: "bitstream",
                bpp: 3
            })
        );
    }

    #[test]
    fn test_bitstream_capacity() {
        let result = BitstreamDriver::<_, _, _, 4>::new(
            LevelLog::default(),
            DelayLog::default(),
            lit(rgb(1, 1, 1)),
            5,
            4,
            BitTiming::KHZ_800,
        );
        assert_eq!(
            result.err(),
            Some(DriverError::Buffer {
                source: BufferError::Capacity {
                    requested: 5,
                    capacity: 4
                }
            })
        );
    }

    #[test]
    fn test_dma_driver_streams_frames() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let mut driver = DmaDriver::<_, _, 8>::new(
            &pool,
            &mut pio,
            MockDma::default(),
            2,
            lit(rgb(255, 255, 255)),
            3,
            3,
            LedDriverConfig::default(),
        )
        .unwrap();
        assert_eq!(driver.state_machine(), 0);
        assert_eq!(driver.dma_channel(), 11);
        assert_eq!(
            pool.in_use(),
            ResourceUsage {
                dma_channels: 1 << 11,
                state_machines: 1,
                programs: 1
            }
        );

        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));
        let (channel, registers, words) = &driver.dma().started[0];
        assert_eq!(*channel, 11);
        assert_eq!(registers.write_addr, 0x5020_0010);
        assert_eq!(registers.trans_count, 3);
        assert_eq!(registers.ctrl, DmaCtrl::mem_to_peripheral(11, 0));
        assert_eq!(words, &vec![0xffff_ff00; 3]);

        drop(driver);
        assert_eq!(pool.in_use().dma_channels, 0);
        assert_eq!(pool.in_use().state_machines, 0);

        let (state_machine, program, config) = pio.installed[0];
        assert_eq!(state_machine, 0);
        assert_eq!(program, Some(WS2812_PROGRAM));
        assert_eq!(config.sideset_pin, 2);
        assert_eq!(config.clock_divider, (15, 160));
        assert_eq!(config.pull_threshold, 24);
    }

    #[test]
    fn test_dma_driver_waits_for_idle_channel() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let dma = MockDma {
            busy_reads: Cell::new(2),
            ..MockDma::default()
        };
        let mut driver = DmaDriver::<_, _, 2>::new(&pool, &mut pio, dma, 0, lit(rgb(1, 2, 3)), 2, 3, LedDriverConfig::default()).unwrap();

        assert!(matches!(driver.resume(), Ok(Tick::Delay(0))));
        assert!(matches!(driver.resume(), Ok(Tick::Delay(0))));
        assert!(driver.dma().started.is_empty());
        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));
        assert_eq!(driver.dma().started.len(), 1);
    }

    #[test]
    fn test_dma_driver_reports_bus_errors() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let dma = MockDma {
            fault: true,
            ..MockDma::default()
        };
        let mut driver = DmaDriver::<_, _, 2>::new(&pool, &mut pio, dma, 0, lit(rgb(1, 2, 3)), 2, 3, LedDriverConfig::default()).unwrap();
        assert_eq!(driver.resume().err(), Some(TaskError::Transmission));
    }

    #[test]
    fn test_dma_drivers_share_the_pool() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let first = DmaDriver::<_, _, 1>::new(&pool, &mut pio, MockDma::default(), 0, lit(OFF_PIXEL), 1, 3, LedDriverConfig::default()).unwrap();
        let second = DmaDriver::<_, _, 1>::new(&pool, &mut pio, MockDma::default(), 1, lit(OFF_PIXEL), 1, 4, LedDriverConfig::default()).unwrap();
        assert_eq!((first.state_machine(), first.dma_channel()), (0, 11));
        assert_eq!((second.state_machine(), second.dma_channel()), (1, 10));
        assert_eq!(pio.installed[1].1, Some(SK6812_PROGRAM));
        assert_eq!(pool.in_use().programs, 0b11);

        let taken = LedDriverConfig {
            state_machine: Some(0),
            ..LedDriverConfig::default()
        };
        let third = DmaDriver::<_, _, 1>::new(&pool, &mut pio, MockDma::default(), 2, lit(OFF_PIXEL), 1, 3, taken);
        assert_eq!(third.err(), Some(DriverError::StateMachineTaken { index: 0 }));
    }

    #[test]
    fn test_dropping_dma_driver_aborts_transfer() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let mut dma = LatchedDma::new(&pool);

        let idle = DmaDriver::<_, _, 2>::new(&pool, &mut pio, &mut dma, 0, lit(rgb(1, 2, 3)), 2, 3, LedDriverConfig::default()).unwrap();
        drop(idle);
        assert!(dma.aborts.is_empty());

        let mut driver = DmaDriver::<_, _, 2>::new(&pool, &mut pio, &mut dma, 0, lit(rgb(1, 2, 3)), 2, 3, LedDriverConfig::default()).unwrap();
        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));
        assert!(matches!(driver.resume(), Ok(Tick::Delay(0))));
        drop(driver);

        // aborted while the channel was still claimed
        assert_eq!(dma.aborts, vec![(11, 1 << 11)]);
        assert!(!dma.busy.get());
        assert_eq!(pool.in_use().dma_channels, 0);
    }

    #[test]
    fn test_program_is_loaded_once_per_block() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let first = PioDriver::<_, _, 1>::new(&pool, &mut pio, 0, lit(OFF_PIXEL), 1, 3, LedDriverConfig::default()).unwrap();
        drop(first);
        let second = PioDriver::<_, _, 1>::new(&pool, &mut pio, 1, lit(OFF_PIXEL), 1, 3, LedDriverConfig::default()).unwrap();
        drop(second);
        let other_block = LedDriverConfig {
            state_machine: Some(4),
            ..LedDriverConfig::default()
        };
        let third = PioDriver::<_, _, 1>::new(&pool, &mut pio, 2, lit(OFF_PIXEL), 1, 3, other_block).unwrap();
        drop(third);

        let programs: Vec<_> = pio.installed.iter().map(|(sm, program, _)| (*sm, *program)).collect();
        assert_eq!(
            programs,
            vec![(0, Some(WS2812_PROGRAM)), (0, None), (4, Some(WS2812_PROGRAM))]
        );
        assert_eq!(pool.in_use().programs, 0b101);
    }

    const OFF_PIXEL: Rgbw = rgb(0, 0, 0);

    #[test]
    fn test_pio_driver_pushes_words() {
        let pool = ResourcePool::new();
        let mut pio = MockPio::default();
        let config = LedDriverConfig {
            state_machine: Some(5),
            ..LedDriverConfig::default()
        };
        let mut driver = PioDriver::<_, _, 4>::new(&pool, &mut pio, 7, lit(rgbw(1, 2, 3, 4)), 2, 4, config).unwrap();
        assert!(matches!(driver.resume(), Ok(Tick::Delay(200))));
        assert_eq!(driver.pio().pushed, vec![(5, 0x0201_0304), (5, 0x0201_0304)]);
        assert_eq!(pool.in_use().programs, 1 << 3);

        assert!(matches!(driver.resume(), Ok(Tick::Delay(800))));
        assert_eq!(driver.pio().pushed[2..], [(5, 0), (5, 0)]);
    }

    #[test]
    fn test_pio_install_failure_releases_state_machine() {
        let pool = ResourcePool::new();
        let pio = MockPio {
            reject_install: true,
            ..MockPio::default()
        };
        let result = PioDriver::<_, _, 1>::new(&pool, pio, 0, lit(OFF_PIXEL), 1, 3, LedDriverConfig::default());
        assert_eq!(result.err(), Some(DriverError::Setup { index: 0 }));
        assert_eq!(pool.in_use().state_machines, 0);
    }
}
