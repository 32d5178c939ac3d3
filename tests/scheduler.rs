mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use myrtio_strip_engine::error::{SchedulerError, TaskError};
    use myrtio_strip_engine::event::Event;
    use myrtio_strip_engine::hw::{ResourcePool, ResourceUsage};
    use myrtio_strip_engine::scheduler::{
        Clock, Deadline, EmbassyClock, Scheduler, SchedulerConfig, Task, Tick,
    };
    use myrtio_strip_engine::{Duration, Instant};

    /// Simulated time: sleeping jumps straight to the deadline
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

    fn sim() -> (SimClock, Rc<Cell<u64>>) {
        let time = Rc::new(Cell::new(0));
        (SimClock { time: time.clone() }, time)
    }

    struct Ticker {
        time: Rc<Cell<u64>>,
        period: u32,
        work_ms: u64,
        overrun_once: u64,
        resumed: Vec<u64>,
    }

    impl Ticker {
        fn new(time: &Rc<Cell<u64>>, period: u32) -> Self {
            Self {
                time: time.clone(),
                period,
                work_ms: 0,
                overrun_once: 0,
                resumed: Vec::new(),
            }
        }
    }

    impl Task for Ticker {
        fn resume(&mut self) -> Result<Tick, TaskError> {
            let now = self.time.get();
            self.resumed.push(now);
            let work = self.work_ms + std::mem::take(&mut self.overrun_once);
            self.time.set(now + work);
            Ok(Tick::Delay(self.period))
        }
    }

    /// Fails on its second resume
    struct Flaky {
        resumes: u32,
    }

    impl Task for Flaky {
        fn resume(&mut self) -> Result<Tick, TaskError> {
            self.resumes += 1;
            if self.resumes == 2 {
                return Err(TaskError::Failed { message: "boom" });
            }
            Ok(Tick::Delay(100))
        }
    }

    struct Once;

    impl Task for Once {
        fn resume(&mut self) -> Result<Tick, TaskError> {
            Ok(Tick::Done)
        }
    }

    /// Awaits `event`, then runs one timed frame and finishes
    struct Sleeper {
        time: Rc<Cell<u64>>,
        event: &'static Event,
        resumed: Vec<u64>,
    }

    impl Task for Sleeper {
        fn resume(&mut self) -> Result<Tick, TaskError> {
            self.resumed.push(self.time.get());
            Ok(match self.resumed.len() {
                1 => Tick::Await(self.event),
                2 => {
                    self.event.take();
                    Tick::Delay(100)
                }
                _ => Tick::Done,
            })
        }
    }

    #[test]
    fn test_deadlines_do_not_drift() {
        let (clock, time) = sim();
        let mut ticker = Ticker {
            work_ms: 7,
            ..Ticker::new(&time, 100)
        };
        {
            let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
            scheduler.register(&mut ticker).unwrap();
            scheduler.run_until(Instant::from_millis(1000)).unwrap();
        }
        let expected: Vec<u64> = (0..=10).map(|i| i * 100).collect();
        assert_eq!(ticker.resumed, expected);
    }

    #[test]
    fn test_late_task_catches_up() {
        let (clock, time) = sim();
        let mut ticker = Ticker {
            overrun_once: 250,
            ..Ticker::new(&time, 100)
        };
        {
            let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
            scheduler.register(&mut ticker).unwrap();
            scheduler.run_until(Instant::from_millis(400)).unwrap();
        }
        assert_eq!(ticker.resumed, vec![0, 250, 250, 300, 400]);
    }

    #[test]
    fn test_tasks_interleave() {
        let (clock, time) = sim();
        let mut fast = Ticker::new(&time, 30);
        let mut slow = Ticker::new(&time, 50);
        {
            let mut scheduler = Scheduler::<_, 2>::new(clock, SchedulerConfig::default());
            scheduler.register(&mut fast).unwrap();
            scheduler.register(&mut slow).unwrap();
            scheduler.run_until(Instant::from_millis(150)).unwrap();
        }
        assert_eq!(fast.resumed, vec![0, 30, 60, 90, 120, 150]);
        assert_eq!(slow.resumed, vec![0, 50, 100, 150]);
    }

    #[test]
    fn test_await_restarts_timing_at_wake_up() {
        static WAKE: Event = Event::new();
        let (clock, time) = sim();
        let mut sleeper = Sleeper {
            time: time.clone(),
            event: &WAKE,
            resumed: Vec::new(),
        };
        {
            let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
            scheduler.register(&mut sleeper).unwrap();

            // waiting tasks are polled every millisecond
            assert_eq!(scheduler.step(), Ok(Some(Instant::from_millis(1))));
            time.set(40);
            assert_eq!(scheduler.step(), Ok(Some(Instant::from_millis(41))));

            WAKE.signal(Instant::from_millis(45));
            time.set(50);
            assert_eq!(scheduler.step(), Ok(Some(Instant::from_millis(150))));

            time.set(150);
            assert_eq!(scheduler.step(), Ok(None));
            assert_eq!(scheduler.live_tasks(), 0);
        }
        assert_eq!(sleeper.resumed, vec![0, 50, 150]);
    }

    #[test]
    fn test_already_set_event_wakes_at_once() {
        static READY: Event = Event::new();
        READY.raise(1);
        let (clock, time) = sim();
        let mut sleeper = Sleeper {
            time,
            event: &READY,
            resumed: Vec::new(),
        };
        let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
        scheduler.register(&mut sleeper).unwrap();
        assert_eq!(scheduler.step(), Ok(Some(Instant::from_millis(0))));
    }

    #[test]
    fn test_handled_error_retires_task() {
        static HANDLED: AtomicUsize = AtomicUsize::new(0);
        fn count_failure(error: &TaskError) {
            assert_eq!(*error, TaskError::Failed { message: "boom" });
            HANDLED.fetch_add(1, Ordering::SeqCst);
        }

        let (clock, time) = sim();
        let mut flaky = Flaky { resumes: 0 };
        let mut ticker = Ticker::new(&time, 100);
        {
            let mut scheduler = Scheduler::<_, 2>::new(clock, SchedulerConfig::default());
            scheduler.register_with_handler(&mut flaky, count_failure).unwrap();
            scheduler.register(&mut ticker).unwrap();
            scheduler.run_until(Instant::from_millis(300)).unwrap();
            assert_eq!(scheduler.live_tasks(), 1);
        }
        assert_eq!(HANDLED.load(Ordering::SeqCst), 1);
        assert_eq!(flaky.resumes, 2);
        assert_eq!(ticker.resumed, vec![0, 100, 200, 300]);
    }

    #[test]
    fn test_unhandled_error_stops_and_releases() {
        let pool = ResourcePool::new();
        let dma = pool.claim_dma().unwrap();
        let state_machine = pool.claim_state_machine(None).unwrap();
        assert_ne!(pool.in_use(), ResourceUsage::default());

        let (clock, _time) = sim();
        let mut flaky = Flaky { resumes: 0 };
        let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default()).with_resources(&pool);
        scheduler.register(&mut flaky).unwrap();
        assert_eq!(
            scheduler.run_forever(),
            Err(TaskError::Failed { message: "boom" })
        );
        assert_eq!(pool.in_use(), ResourceUsage::default());
        // still owned until the claims are dropped
        assert_eq!(
            pool.retired(),
            ResourceUsage {
                dma_channels: 1 << 11,
                state_machines: 1,
                programs: 0
            }
        );

        drop(dma);
        drop(state_machine);
        assert_eq!(pool.in_use(), ResourceUsage::default());
        assert_eq!(pool.retired(), ResourceUsage::default());
    }

    #[test]
    fn test_claims_stay_exclusive_after_shutdown() {
        let pool = ResourcePool::new();
        let held = pool.claim_dma().unwrap();
        assert_eq!(held.channel(), 11);
        {
            let (clock, _time) = sim();
            let mut flaky = Flaky { resumes: 0 };
            let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default()).with_resources(&pool);
            scheduler.register(&mut flaky).unwrap();
            assert!(scheduler.run_forever().is_err());
        }

        let second = pool.claim_dma().unwrap();
        assert_eq!(second.channel(), 10);

        // dropping the older claim must not free the newer owner's channel
        drop(held);
        assert_eq!(pool.in_use().dma_channels, 1 << 10);
        assert_eq!(pool.retired().dma_channels, 0);
        let third = pool.claim_dma().unwrap();
        assert_eq!(third.channel(), 11);
        assert_eq!(pool.in_use().dma_channels, (1 << 10) | (1 << 11));
    }

    #[test]
    fn test_run_forever_returns_when_all_done() {
        let pool = ResourcePool::new();
        let _dma = pool.claim_dma().unwrap();
        let (clock, _time) = sim();
        let mut first = Once;
        let mut second = Once;
        let mut scheduler = Scheduler::<_, 2>::new(clock, SchedulerConfig::default()).with_resources(&pool);
        scheduler.register(&mut first).unwrap();
        scheduler.register(&mut second).unwrap();
        assert_eq!(scheduler.run_forever(), Ok(()));
        assert_eq!(scheduler.live_tasks(), 0);
        assert_eq!(pool.in_use().dma_channels, 0);
    }

    #[test]
    fn test_housekeeping_interval() {
        let (clock, time) = sim();
        let mut ticker = Ticker::new(&time, 10);
        let mut calls = 0;
        {
            let mut hook = || calls += 1;
            let config = SchedulerConfig {
                housekeeping_interval: 2,
                ..SchedulerConfig::default()
            };
            let mut scheduler = Scheduler::<_, 1>::new(clock, config).with_housekeeping(&mut hook);
            scheduler.register(&mut ticker).unwrap();
            scheduler.run_until(Instant::from_millis(90)).unwrap();
        }
        assert_eq!(ticker.resumed.len(), 10);
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_task_table_full() {
        let (clock, _time) = sim();
        let mut first = Once;
        let mut second = Once;
        let mut scheduler = Scheduler::<_, 1>::new(clock, SchedulerConfig::default());
        scheduler.register(&mut first).unwrap();
        assert_eq!(
            scheduler.register(&mut second),
            Err(SchedulerError::TooManyTasks { capacity: 1 })
        );
    }

    #[test]
    fn test_deadline() {
        let mut deadline = Deadline::new(Instant::from_millis(10));
        assert_eq!(deadline.advance(20), Instant::from_millis(30));
        assert!(!deadline.is_due(Instant::from_millis(29)));
        assert!(deadline.is_due(Instant::from_millis(30)));
        assert_eq!(deadline.sleep_duration(Instant::from_millis(25)), Duration::from_millis(5));
        assert_eq!(deadline.sleep_duration(Instant::from_millis(40)), Duration::from_millis(0));

        deadline.reset(Instant::from_millis(100));
        assert_eq!(deadline.at(), Instant::from_millis(100));
    }

    #[test]
    fn test_embassy_clock_sleeps() {
        let mut clock = EmbassyClock;
        let start = clock.now();
        clock.sleep_until(start + Duration::from_millis(2));
        assert!(clock.now() >= start + Duration::from_millis(2));
    }

    #[test]
    fn test_event_state() {
        let event = Event::new();
        assert!(!event.is_set());

        event.signal(Instant::from_millis(5));
        event.signal(Instant::from_millis(3));
        event.raise(1);
        event.raise(8);
        assert!(event.is_set());

        let state = event.take();
        assert_eq!(state.at, Some(Instant::from_millis(3)));
        assert_eq!(state.bits, 9);
        assert!(!event.is_set());
    }
}
