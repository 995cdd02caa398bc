//! Animated condition renderer.
//!
//! Owns a fixed-rate clock on its own thread, decoupled from network
//! activity: every tick clears the canvas and redraws the scene selected by
//! the current condition keyword. Hosts supply the drawing surface through
//! the [`Canvas`] trait; on toolkits without automatic thread-marshaling the
//! canvas implementation is responsible for forwarding draw calls to the UI
//! thread's task queue.

use anyhow::Result;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub mod scenes;

/// Clock period of the animation loop.
pub const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Drawing surface abstraction. Coordinates are logical pixels with the
/// origin at the top-left; colors are `#rrggbb` strings.
pub trait Canvas: Send {
    /// Logical (width, height) of the surface.
    fn size(&self) -> (f64, f64);

    fn clear(&mut self) -> Result<()>;

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) -> Result<()>;

    fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        fill: &str,
        outline: Option<&str>,
    ) -> Result<()>;

    fn rect(
        &mut self,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        fill: &str,
        outline: Option<&str>,
    ) -> Result<()>;

    fn text(&mut self, at: (f64, f64), text: &str, color: &str) -> Result<()>;
}

/// The six scene categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Rain,
    Snow,
    Clouds,
    Fog,
    Storm,
    Sun,
}

/// Select a scene by substring matching on the condition keyword. Priority
/// order matters: "thunderstorm with rain" is a rain scene.
pub fn scene_for(condition: &str) -> Scene {
    let cond = condition.to_lowercase();
    if cond.contains("rain") || cond.contains("drizzle") {
        Scene::Rain
    } else if cond.contains("snow") {
        Scene::Snow
    } else if cond.contains("cloud") {
        Scene::Clouds
    } else if cond.contains("fog") || cond.contains("mist") || cond.contains("haze") {
        Scene::Fog
    } else if cond.contains("thunder") || cond.contains("storm") {
        Scene::Storm
    } else {
        Scene::Sun
    }
}

/// Condition keyword plus the animation clock's tick counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    pub condition: String,
    pub tick: u64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self { condition: "clear".to_string(), tick: 0 }
    }
}

impl AnimationState {
    /// Replace the condition (lowercased, empty → "clear") and restart the
    /// tick sequence so the new scene begins from a consistent phase.
    pub fn set_condition(&mut self, condition: &str) {
        let cond = condition.trim().to_lowercase();
        self.condition = if cond.is_empty() { "clear".to_string() } else { cond };
        self.tick = 0;
    }
}

/// Anything that accepts condition-change notifications. The poller talks to
/// the renderer through this seam so tests can observe routing.
pub trait SceneSink: Send {
    fn set_condition(&mut self, condition: &str);
}

/// Draw one frame for `condition` at `tick`. Clears first, so a frame is
/// always self-contained.
pub fn draw_frame(canvas: &mut dyn Canvas, condition: &str, tick: u64) -> Result<()> {
    canvas.clear()?;
    match scene_for(condition) {
        Scene::Rain => {
            scenes::cloud(canvas, 0.5)?;
            scenes::rain(canvas, tick)?;
        }
        Scene::Snow => {
            scenes::cloud(canvas, 0.5)?;
            scenes::snow(canvas, tick)?;
        }
        Scene::Clouds => scenes::cloud(canvas, 0.7)?,
        Scene::Fog => scenes::fog(canvas, tick)?,
        Scene::Storm => {
            scenes::cloud(canvas, 0.5)?;
            // 15-tick flash window (~0.75s at the 50ms clock) every 150 ticks.
            if (tick / 15) % 10 == 0 {
                scenes::lightning(canvas)?;
            }
        }
        Scene::Sun => scenes::sun(canvas, tick)?,
    }
    Ok(())
}

struct RendererShared {
    anim: AnimationState,
    canvas: Box<dyn Canvas>,
}

/// Handle for pushing condition changes into a running renderer.
#[derive(Clone)]
pub struct RendererHandle {
    shared: Arc<Mutex<RendererShared>>,
}

impl RendererHandle {
    fn apply_condition(&self, condition: &str) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.anim.set_condition(condition);
            if let Err(err) = shared.canvas.clear() {
                debug!("canvas clear failed on condition change: {err}");
            }
        }
    }
}

impl SceneSink for RendererHandle {
    fn set_condition(&mut self, condition: &str) {
        self.apply_condition(condition);
    }
}

/// The renderer: Running from construction until [`ConditionRenderer::stop`],
/// which is terminal. Starts out drawing the default "clear" scene before
/// any fetch has completed.
pub struct ConditionRenderer {
    shared: Arc<Mutex<RendererShared>>,
    running: Arc<AtomicBool>,
    clock: Option<thread::JoinHandle<()>>,
}

impl ConditionRenderer {
    /// Start the clock at the standard [`TICK_PERIOD`].
    pub fn start(canvas: Box<dyn Canvas>) -> Self {
        Self::with_tick_period(canvas, TICK_PERIOD)
    }

    /// Start the clock at a custom period (tests run it fast).
    pub fn with_tick_period(canvas: Box<dyn Canvas>, period: Duration) -> Self {
        let shared = Arc::new(Mutex::new(RendererShared {
            anim: AnimationState::default(),
            canvas,
        }));
        let running = Arc::new(AtomicBool::new(true));

        let clock_shared = Arc::clone(&shared);
        let clock_running = Arc::clone(&running);
        let clock = thread::spawn(move || clock_loop(&clock_shared, &clock_running, period));

        Self { shared, running, clock: Some(clock) }
    }

    /// Replace the condition and restart the animation phase.
    pub fn set_condition(&self, condition: &str) {
        self.handle().apply_condition(condition);
    }

    /// A cloneable [`SceneSink`] for the poller.
    pub fn handle(&self) -> RendererHandle {
        RendererHandle { shared: Arc::clone(&self.shared) }
    }

    pub fn condition(&self) -> String {
        self.shared.lock().map(|s| s.anim.condition.clone()).unwrap_or_default()
    }

    pub fn tick(&self) -> u64 {
        self.shared.lock().map(|s| s.anim.tick).unwrap_or(0)
    }

    /// Stop the clock and clear the canvas. Terminal: no tick fires after
    /// this returns.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(clock) = self.clock.take() {
            let _ = clock.join();
        }
        if let Ok(mut shared) = self.shared.lock() {
            if let Err(err) = shared.canvas.clear() {
                debug!("final canvas clear failed: {err}");
            }
        }
    }
}

impl Drop for ConditionRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn clock_loop(shared: &Arc<Mutex<RendererShared>>, running: &Arc<AtomicBool>, period: Duration) {
    while running.load(Ordering::SeqCst) {
        if let Ok(mut guard) = shared.lock() {
            let RendererShared { anim, canvas } = &mut *guard;
            // A bad frame is skipped; the clock itself never dies.
            if let Err(err) = draw_frame(canvas.as_mut(), &anim.condition, anim.tick) {
                debug!("skipping frame {}: {err}", anim.tick);
            }
            anim.tick += 1;
        }
        thread::sleep(period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Line,
        Circle,
        Rect,
        Text,
    }

    #[derive(Clone, Default)]
    struct RecordingCanvas {
        ops: Arc<Mutex<Vec<Op>>>,
    }

    impl RecordingCanvas {
        fn ops(&self) -> Vec<Op> {
            self.ops.lock().expect("ops lock").clone()
        }

        fn push(&self, op: Op) -> Result<()> {
            self.ops.lock().expect("ops lock").push(op);
            Ok(())
        }
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (f64, f64) {
            (420.0, 240.0)
        }

        fn clear(&mut self) -> Result<()> {
            self.push(Op::Clear)
        }

        fn line(&mut self, _: (f64, f64), _: (f64, f64), _: &str, _: f64) -> Result<()> {
            self.push(Op::Line)
        }

        fn circle(&mut self, _: (f64, f64), _: f64, _: &str, _: Option<&str>) -> Result<()> {
            self.push(Op::Circle)
        }

        fn rect(&mut self, _: (f64, f64), _: (f64, f64), _: &str, _: Option<&str>) -> Result<()> {
            self.push(Op::Rect)
        }

        fn text(&mut self, _: (f64, f64), _: &str, _: &str) -> Result<()> {
            self.push(Op::Text)
        }
    }

    /// Canvas whose every operation fails.
    struct BrokenCanvas;

    impl Canvas for BrokenCanvas {
        fn size(&self) -> (f64, f64) {
            (420.0, 240.0)
        }
        fn clear(&mut self) -> Result<()> {
            Err(anyhow!("surface gone"))
        }
        fn line(&mut self, _: (f64, f64), _: (f64, f64), _: &str, _: f64) -> Result<()> {
            Err(anyhow!("surface gone"))
        }
        fn circle(&mut self, _: (f64, f64), _: f64, _: &str, _: Option<&str>) -> Result<()> {
            Err(anyhow!("surface gone"))
        }
        fn rect(&mut self, _: (f64, f64), _: (f64, f64), _: &str, _: Option<&str>) -> Result<()> {
            Err(anyhow!("surface gone"))
        }
        fn text(&mut self, _: (f64, f64), _: &str, _: &str) -> Result<()> {
            Err(anyhow!("surface gone"))
        }
    }

    #[test]
    fn every_keyword_selects_exactly_one_scene() {
        assert_eq!(scene_for("rain"), Scene::Rain);
        assert_eq!(scene_for("light rain"), Scene::Rain);
        assert_eq!(scene_for("drizzle"), Scene::Rain);
        assert_eq!(scene_for("snow"), Scene::Snow);
        assert_eq!(scene_for("clouds"), Scene::Clouds);
        assert_eq!(scene_for("broken clouds"), Scene::Clouds);
        assert_eq!(scene_for("fog"), Scene::Fog);
        assert_eq!(scene_for("mist"), Scene::Fog);
        assert_eq!(scene_for("haze"), Scene::Fog);
        assert_eq!(scene_for("thunderstorm"), Scene::Storm);
        assert_eq!(scene_for("clear"), Scene::Sun);
        assert_eq!(scene_for(""), Scene::Sun);
        assert_eq!(scene_for("tornado"), Scene::Sun);
        // Case-insensitive.
        assert_eq!(scene_for("Rain"), Scene::Rain);
    }

    #[test]
    fn rain_beats_thunder_in_priority_order() {
        assert_eq!(scene_for("thunderstorm with rain"), Scene::Rain);
    }

    #[test]
    fn animation_state_resets_tick_on_condition_change() {
        let mut anim = AnimationState::default();
        assert_eq!(anim.condition, "clear");

        anim.tick = 42;
        anim.set_condition("Rain");
        assert_eq!(anim.condition, "rain");
        assert_eq!(anim.tick, 0);

        anim.tick = 7;
        anim.set_condition("  ");
        assert_eq!(anim.condition, "clear");
        assert_eq!(anim.tick, 0);
    }

    #[test]
    fn frame_starts_with_a_clear() {
        let canvas = RecordingCanvas::default();
        let mut surface = canvas.clone();
        draw_frame(&mut surface, "clear", 0).expect("draw");
        assert_eq!(canvas.ops().first(), Some(&Op::Clear));
    }

    #[test]
    fn storm_flash_is_gated_by_tick_window() {
        let flashing = RecordingCanvas::default();
        let mut surface = flashing.clone();
        draw_frame(&mut surface, "thunderstorm", 0).expect("draw");
        let flash_lines = flashing.ops().iter().filter(|op| **op == Op::Line).count();

        let quiet = RecordingCanvas::default();
        let mut surface = quiet.clone();
        draw_frame(&mut surface, "thunderstorm", 20).expect("draw");
        let quiet_lines = quiet.ops().iter().filter(|op| **op == Op::Line).count();

        assert!(flash_lines > quiet_lines, "lightning draws extra line segments");
        assert_eq!(quiet_lines, 0, "no lightning outside the flash window");
    }

    #[test]
    fn renderer_ticks_and_resets_on_condition_change() {
        let canvas = RecordingCanvas::default();
        let mut renderer =
            ConditionRenderer::with_tick_period(Box::new(canvas.clone()), Duration::from_millis(5));

        // Let the clock run a few ticks on the default condition.
        while renderer.tick() < 3 {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(renderer.condition(), "clear");

        renderer.set_condition("Rain");
        let after_reset = renderer.tick();
        assert!(after_reset < 3, "tick restarted from 0, observed {after_reset}");
        assert_eq!(renderer.condition(), "rain");

        // The sequence resumes from the reset point.
        while renderer.tick() < 2 {
            thread::sleep(Duration::from_millis(5));
        }

        renderer.stop();
    }

    #[test]
    fn stop_is_terminal_and_clears_the_canvas() {
        let canvas = RecordingCanvas::default();
        let mut renderer =
            ConditionRenderer::with_tick_period(Box::new(canvas.clone()), Duration::from_millis(5));

        while renderer.tick() < 2 {
            thread::sleep(Duration::from_millis(5));
        }
        renderer.stop();

        let ops_after_stop = canvas.ops();
        assert_eq!(ops_after_stop.last(), Some(&Op::Clear));

        // No further ticks fire.
        let frozen = renderer.tick();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(renderer.tick(), frozen);
        assert_eq!(canvas.ops().len(), ops_after_stop.len());
    }

    #[test]
    fn bad_frames_do_not_stall_the_clock() {
        let mut renderer = ConditionRenderer::with_tick_period(
            Box::new(BrokenCanvas),
            Duration::from_millis(5),
        );

        while renderer.tick() < 3 {
            thread::sleep(Duration::from_millis(5));
        }

        renderer.stop();
    }
}
