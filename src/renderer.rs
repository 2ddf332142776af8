//! The render loop that pushes pixel state to the hardware.
//!
//! One thread per strip samples the effective color of every pixel on a
//! fixed cadence and forwards it to the driver. Displayed colors ease toward
//! their targets: a blend step runs on every sixth tick, with small deltas
//! snapped so transitions settle instead of crawling asymptotically.
//! Stopping rendering keeps the thread ticking but stops pushing, so a
//! restart picks up exactly where the state says it should.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Serialize;

use crate::color::Color;
use crate::state::PixelBuffer;
use crate::strip::{NativeStrip, StripInfo};
use crate::sync::CancelToken;

/// Blend step cadence, in ticks. At the default 5 ms tick this fades roughly
/// every 30 ms.
const FADE_EVERY: u64 = 6;
/// How far displayed colors move toward their target per blend step.
const FADE_AMOUNT: f32 = 0.5;
/// Channel delta below which a fading pixel snaps to its target.
const SNAP_DELTA: u8 = 24;
/// Pause after a driver failure before pushing frames again.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// One pushed frame, as recorded in the bounded history.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    /// Milliseconds since the render loop started.
    pub timestamp_ms: u64,
    pub pixels: Vec<Color>,
}

/// Shared switchboard between a strip and its render thread.
pub(crate) struct RendererControl {
    rendering: AtomicBool,
    shutdown: CancelToken,
    history: Mutex<VecDeque<Frame>>,
}

impl RendererControl {
    pub(crate) fn new(rendering: bool) -> Arc<RendererControl> {
        Arc::new(RendererControl {
            rendering: AtomicBool::new(rendering),
            shutdown: CancelToken::new(),
            history: Mutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn set_rendering(&self, on: bool) {
        let was = self.rendering.swap(on, Ordering::Relaxed);
        if was != on {
            info!(
                "[RENDER] Rendering {}",
                if on { "started" } else { "stopped" }
            );
        }
    }

    pub(crate) fn is_rendering(&self) -> bool {
        self.rendering.load(Ordering::Relaxed)
    }

    /// Tells the loop to exit; it closes the driver on its way out.
    pub(crate) fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub(crate) fn frames(&self) -> Vec<Frame> {
        self.history.lock().unwrap().iter().cloned().collect()
    }

    fn push_frame(&self, timestamp_ms: u64, pixels: &[Color], cap: usize) {
        if cap == 0 {
            return;
        }
        let mut history = self.history.lock().unwrap();
        while history.len() >= cap {
            history.pop_front();
        }
        history.push_back(Frame {
            timestamp_ms,
            pixels: pixels.to_vec(),
        });
    }
}

/// Spawns the render thread. The driver moves into the thread and is closed
/// there when the control signals shutdown.
pub(crate) fn spawn(
    mut driver: Box<dyn NativeStrip>,
    buffer: Arc<PixelBuffer>,
    info: Arc<StripInfo>,
    control: Arc<RendererControl>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let num_leds = buffer.len();
        let tick = Duration::from_millis(info.render_delay_ms.max(1));
        let started = Instant::now();
        let mut displayed = vec![Color::BLACK; num_leds];
        let mut ticks: u64 = 0;

        info!(
            "[RENDER] Loop started: {} pixels, {:?} per tick",
            num_leds, tick
        );

        loop {
            ticks += 1;
            if control.is_rendering() {
                let fade_tick = ticks % FADE_EVERY == 0;
                for (i, shown) in displayed.iter_mut().enumerate() {
                    let target = buffer.effective_at(i);
                    if fade_tick && *shown != target {
                        *shown = if shown.max_channel_delta(target) <= SNAP_DELTA {
                            target
                        } else {
                            shown.blend(target, FADE_AMOUNT)
                        };
                    }
                    driver.set_pixel_color(i, *shown);
                }
                match driver.render() {
                    Ok(()) => {
                        if info.log_renders {
                            control.push_frame(
                                started.elapsed().as_millis() as u64,
                                &displayed,
                                info.frame_history_size,
                            );
                        }
                    }
                    Err(err) => {
                        warn!("[RENDER] Driver error, backing off: {}", err);
                        if !control.shutdown.sleep(ERROR_BACKOFF) {
                            break;
                        }
                    }
                }
            }
            if !control.shutdown.sleep(tick) {
                break;
            }
        }

        driver.close();
        info!("[RENDER] Loop stopped after {} ticks", ticks);
    })
}
