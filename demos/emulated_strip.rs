//! Drives the full engine against an emulated strip and draws it in the
//! terminal. Run with: cargo run --example emulated_strip

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use ledstrand::{
    AnimationDefinition, AnimationToRunParams, Color, ColorSequence, EmulatedStrip,
    EmulatedStripHandle, LedStrip, RunCount, StripInfo,
};

const NUM_LEDS: usize = 60;

fn main() -> Result<()> {
    env_logger::init();

    let driver = EmulatedStrip::new(NUM_LEDS);
    let handle = driver.handle();
    let mut info = StripInfo::new(NUM_LEDS);
    info.log_renders = true;
    info.frame_history_size = 100;
    let strip = LedStrip::new(Box::new(driver), info)?;

    println!("=== ledstrand demo: {NUM_LEDS} emulated pixels ===");
    println!();

    strip.create_section("left", 0, 29)?;
    strip.create_section("right", 30, 59)?;
    println!("Sections:   {:?}", strip.section_names());
    println!("Animations: {}", strip.animation_names().join(", "));
    println!();

    // Rainbow base layer across the whole strip.
    let mut rainbow = ColorSequence::new();
    for step in 0..6 {
        rainbow.push(Color::from_hsv(step as f32 * 60.0, 1.0, 0.6));
    }
    let base = strip.start_animation(
        AnimationToRunParams::new("solid")
            .with_color(rainbow)
            .with_delay(1),
    )?;
    strip.wait_for_animation(&base, Duration::from_secs(2));

    // Sparkle over the left half, a meteor sweeping the right half. The
    // request round-trips through JSON the way a remote client would send it.
    let sparkle = AnimationToRunParams::new("sparkle")
        .with_section("left")
        .with_run_count(RunCount::Infinite);
    println!("Request JSON: {}", serde_json::to_string(&sparkle)?);
    println!();
    strip.start_animation(sparkle)?;
    strip.start_animation(
        AnimationToRunParams::new("meteor")
            .with_section("right")
            .with_color(ColorSequence::solid(Color::WHITE))
            .with_delay(20)
            .with_run_count(RunCount::Infinite),
    )?;

    println!("Sparkle left, meteor right:");
    for _ in 0..40 {
        draw(&handle);
        thread::sleep(Duration::from_millis(100));
    }
    println!();
    strip.end_all_animations();

    // An ordered group cycling three sweeps, each bounded to 1.5 seconds.
    strip.register_animation(
        AnimationDefinition::ordered_group(
            "showcase",
            vec!["wipe".into(), "bounce".into(), "ripple".into()],
        )
        .with_member_timeout(1500)
        .with_post_delay(100),
    );
    let show = strip.start_animation(
        AnimationToRunParams::new("showcase")
            .with_color(ColorSequence::solid(Color::CYAN))
            .with_run_count(RunCount::Count(3)),
    )?;

    println!("Showcase group (wipe, bounce, ripple):");
    for _ in 0..120 {
        if strip.running_animation(&show).is_none() {
            break;
        }
        draw(&handle);
        thread::sleep(Duration::from_millis(100));
    }
    println!();

    println!();
    println!("Recorded {} frames in the history buffer", strip.frame_history().len());
    strip.end_all_animations();
    Ok(())
}

/// One line of terminal pixels, brightness-mapped like a bar meter.
fn draw(handle: &EmulatedStripHandle) {
    let mut line = String::with_capacity(NUM_LEDS * 3);
    for color in handle.displayed() {
        let brightness = color.red().max(color.green()).max(color.blue());
        line.push(match brightness {
            0 => '·',
            1..=84 => '░',
            85..=170 => '▒',
            _ => '█',
        });
    }
    print!("\r{line}");
    let _ = std::io::stdout().flush();
}
