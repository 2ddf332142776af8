//! Render loop behavior against the emulated driver.

use std::thread;
use std::time::{Duration, Instant};

use ledstrand::{Color, EmulatedStrip, EmulatedStripHandle, LedStrip, StripInfo};

fn eventually(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

fn strip_with_handle(info: StripInfo) -> (LedStrip, EmulatedStripHandle) {
    let _ = env_logger::builder().is_test(true).try_init();
    let driver = EmulatedStrip::new(info.num_leds);
    let handle = driver.handle();
    let strip = LedStrip::new(Box::new(driver), info).unwrap();
    (strip, handle)
}

#[test]
fn pixel_state_reaches_the_driver() {
    let (strip, handle) = strip_with_handle(StripInfo::new(4));
    strip.root_section().set_prolonged(1, Color::RED).unwrap();

    assert!(
        eventually(Duration::from_secs(2), || handle.pixel(1)
            == Some(Color::RED)),
        "driver never showed the written color, last frame: {:?}",
        handle.displayed()
    );
    assert_eq!(handle.pixel(0), Some(Color::BLACK));
}

#[test]
fn displayed_colors_fade_in_rather_than_jump() {
    let mut info = StripInfo::new(2);
    info.render_delay_ms = 20;
    let (strip, handle) = strip_with_handle(info);

    strip.root_section().set_prolonged(0, Color::WHITE).unwrap();

    // With a 20 ms tick the first blend step lands around 120 ms, and full
    // brightness needs several more. Shortly after the write the pixel must
    // still be in transit.
    thread::sleep(Duration::from_millis(100));
    assert_ne!(handle.pixel(0), Some(Color::WHITE), "faded in too fast");

    assert!(
        eventually(Duration::from_secs(3), || handle.pixel(0)
            == Some(Color::WHITE)),
        "never converged to white, got {:?}",
        handle.pixel(0)
    );
}

#[test]
fn stopping_rendering_freezes_the_driver_but_not_the_state() {
    let (strip, handle) = strip_with_handle(StripInfo::new(3));
    let root = strip.root_section();

    root.set_prolonged(0, Color::RED).unwrap();
    assert!(eventually(Duration::from_secs(2), || handle.pixel(0)
        == Some(Color::RED)));

    strip.stop_rendering();
    assert!(!strip.is_rendering());
    // Let any in-flight tick drain before sampling the counter.
    thread::sleep(Duration::from_millis(100));
    let pushes = handle.render_count();

    root.set_prolonged(0, Color::GREEN).unwrap();
    thread::sleep(Duration::from_millis(200));

    // No new frames, the driver still shows red, but state moved on.
    assert_eq!(handle.render_count(), pushes);
    assert_eq!(handle.pixel(0), Some(Color::RED));
    assert_eq!(root.effective_color(0).unwrap(), Color::GREEN);

    strip.start_rendering();
    assert!(eventually(Duration::from_secs(2), || handle.pixel(0)
        == Some(Color::GREEN)));
}

#[test]
fn driver_failures_are_retried_not_fatal() {
    let (strip, handle) = strip_with_handle(StripInfo::new(2));
    assert!(eventually(Duration::from_secs(2), || handle.render_count() > 0));

    handle.set_failing(true);
    thread::sleep(Duration::from_millis(100));
    handle.set_failing(false);

    strip.root_section().set_prolonged(1, Color::BLUE).unwrap();
    assert!(
        eventually(Duration::from_secs(5), || handle.pixel(1)
            == Some(Color::BLUE)),
        "loop did not recover after a driver failure"
    );
}

#[test]
fn frame_history_is_recorded_and_bounded() {
    let mut info = StripInfo::new(3);
    info.log_renders = true;
    info.frame_history_size = 8;
    let (strip, _handle) = strip_with_handle(info);

    assert!(eventually(Duration::from_secs(2), || strip
        .frame_history()
        .len()
        == 8));

    thread::sleep(Duration::from_millis(100));
    let frames = strip.frame_history();
    assert_eq!(frames.len(), 8, "history must stay at its cap");
    assert!(frames.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    assert!(frames.iter().all(|f| f.pixels.len() == 3));
}

#[test]
fn history_stays_empty_unless_enabled() {
    let (strip, handle) = strip_with_handle(StripInfo::new(3));
    assert!(eventually(Duration::from_secs(2), || handle.render_count() > 5));
    assert!(strip.frame_history().is_empty());
}

#[test]
fn dropping_the_strip_closes_the_driver() {
    let handle = {
        let (strip, handle) = strip_with_handle(StripInfo::new(3));
        assert!(eventually(Duration::from_secs(2), || handle.render_count() > 0));
        drop(strip);
        handle
    };

    assert!(handle.is_closed());
    let after_close = handle.render_count();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(handle.render_count(), after_close, "loop kept pushing");
}
