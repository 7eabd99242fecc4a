use super::*;

fn observer() -> PlanSizeObserver {
    PlanSizeObserver::new(&EditorConfig::default())
}

#[test]
fn starts_without_size() {
    let obs = observer();
    assert!(obs.size().is_none());
    assert!(obs.next_deadline().is_none());
}

#[test]
fn mount_latches_after_settle_delay() {
    let mut obs = observer();
    obs.mount(PlanSize::new(1000.0, 800.0), 0);
    assert_eq!(obs.next_deadline(), Some(100));
    assert_eq!(obs.tick(99), None);
    assert!(obs.size().is_none());
    assert_eq!(obs.tick(100), Some(PlanSize::new(1000.0, 800.0)));
    assert_eq!(obs.size(), Some(PlanSize::new(1000.0, 800.0)));
}

#[test]
fn zero_measurement_is_not_latched() {
    let mut obs = observer();
    obs.mount(PlanSize::new(0.0, 800.0), 0);
    assert_eq!(obs.tick(500), None);
    assert!(obs.size().is_none());
    assert!(obs.next_deadline().is_none());
}

#[test]
fn zero_measurement_keeps_previous_size() {
    let mut obs = observer();
    obs.mount(PlanSize::new(1000.0, 800.0), 0);
    obs.tick(100);
    obs.on_resize(PlanSize::new(0.0, 0.0), 200);
    assert_eq!(obs.tick(1000), None);
    assert_eq!(obs.size(), Some(PlanSize::new(1000.0, 800.0)));
}

#[test]
fn resize_is_debounced() {
    let mut obs = observer();
    obs.mount(PlanSize::new(1000.0, 800.0), 0);
    obs.tick(100);

    obs.on_resize(PlanSize::new(900.0, 800.0), 1000);
    assert_eq!(obs.tick(1249), None);
    assert_eq!(obs.tick(1250), Some(PlanSize::new(900.0, 800.0)));
}

#[test]
fn intermediate_sizes_are_never_latched() {
    let mut obs = observer();
    obs.mount(PlanSize::new(1000.0, 800.0), 0);
    obs.tick(100);

    // A sidebar collapse animating over 200ms, one frame every 50ms.
    for (i, width) in [1050.0, 1100.0, 1150.0, 1200.0].into_iter().enumerate() {
        let now = 1000 + 50 * i64::try_from(i).unwrap();
        obs.on_resize(PlanSize::new(width, 800.0), now);
        assert_eq!(obs.tick(now), None);
    }
    assert_eq!(obs.size(), Some(PlanSize::new(1000.0, 800.0)));
    assert_eq!(obs.tick(1150 + 250), Some(PlanSize::new(1200.0, 800.0)));
}

#[test]
fn unchanged_size_is_not_reported_again() {
    let mut obs = observer();
    obs.mount(PlanSize::new(1000.0, 800.0), 0);
    obs.tick(100);
    obs.on_resize(PlanSize::new(1000.0, 800.0), 200);
    assert_eq!(obs.tick(450), None);
}

#[test]
fn custom_debounce_is_honored() {
    let config = EditorConfig { resize_debounce_ms: 10, settle_delay_ms: 0, ..Default::default() };
    let mut obs = PlanSizeObserver::new(&config);
    obs.mount(PlanSize::new(300.0, 200.0), 5);
    assert_eq!(obs.tick(5), Some(PlanSize::new(300.0, 200.0)));
    obs.on_resize(PlanSize::new(320.0, 200.0), 6);
    assert_eq!(obs.tick(16), Some(PlanSize::new(320.0, 200.0)));
}
