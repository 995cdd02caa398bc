//! Scene geometry for the condition renderer.
//!
//! Each function draws one tick's worth of a scene onto the canvas. All
//! motion derives from the tick counter, so a given (scene, tick, size)
//! always produces the same frame.

use anyhow::Result;

use super::Canvas;

const SUN_RAY: &str = "#FFD166";
const SUN_FILL: &str = "#FFB703";
const SUN_OUTLINE: &str = "#FB8500";
const CLOUD_FILL: &str = "#d1d5db";
const CLOUD_OUTLINE: &str = "#9ca3af";
const RAIN: &str = "#60a5fa";
const SNOW: &str = "#ffffff";
const FOG: &str = "#e6e7e8";
const LIGHTNING: &str = "#facc15";

/// Sun disc with 8 rays rotating at 3 degrees per tick.
pub fn sun(canvas: &mut dyn Canvas, tick: u64) -> Result<()> {
    let (w, h) = canvas.size();
    let (cx, cy) = (w * 0.5, h * 0.45);
    let r = w.min(h) * 0.18;

    const RAYS: u64 = 8;
    for i in 0..RAYS {
        let angle = ((tick * 3 + i * (360 / RAYS)) as f64).to_radians();
        let from = (cx + angle.cos() * (r + 8.0), cy + angle.sin() * (r + 8.0));
        let to = (cx + angle.cos() * (r + 24.0), cy + angle.sin() * (r + 24.0));
        canvas.line(from, to, SUN_RAY, 3.0)?;
    }

    canvas.circle((cx, cy), r, SUN_FILL, Some(SUN_OUTLINE))
}

/// Three overlapping puffs over a base slab. `cover` scales the puffs;
/// 0.5 is the backdrop for precipitation scenes, 0.7 a standalone overcast.
pub fn cloud(canvas: &mut dyn Canvas, cover: f64) -> Result<()> {
    let (w, h) = canvas.size();
    let base_x = w * 0.5;
    let base_y = h * 0.55;
    let scale = cover / 0.5;

    const PUFFS: [(f64, f64); 3] = [(50.0, -60.0), (36.0, -10.0), (42.0, 40.0)];
    for (radius, dx) in PUFFS {
        canvas.circle((base_x + dx, base_y - 10.0), radius * scale, CLOUD_FILL, Some(CLOUD_OUTLINE))?;
    }

    canvas.rect(
        (base_x - 90.0, base_y - 6.0),
        (base_x + 90.0, base_y + 24.0),
        CLOUD_FILL,
        Some(CLOUD_OUTLINE),
    )
}

/// 18 streaks falling below the cloud base.
pub fn rain(canvas: &mut dyn Canvas, tick: u64) -> Result<()> {
    let (w, h) = canvas.size();
    let base_y = h * 0.72;

    const DROPS: usize = 18;
    for i in 0..DROPS {
        let phase = (tick as f64 / 2.0 + i as f64 * 13.0) % 60.0;
        let x = i as f64 * (w / DROPS as f64) + (phase % 10.0) - 10.0;
        let y = base_y + (phase % 40.0);
        canvas.line((x, y), (x, y + 10.0), RAIN, 2.0)?;
    }

    Ok(())
}

/// 14 flake glyphs drifting below the cloud base.
pub fn snow(canvas: &mut dyn Canvas, tick: u64) -> Result<()> {
    let (w, h) = canvas.size();
    let base_y = h * 0.72;

    const FLAKES: usize = 14;
    for i in 0..FLAKES {
        let phase = ((tick + i as u64 * 17) % 100) as f64;
        let x = i as f64 * (w / FLAKES as f64) + (phase % 20.0) - 10.0;
        let y = base_y + (phase % 60.0);
        canvas.text((x, y), "❆", SNOW)?;
    }

    Ok(())
}

/// Four horizontal bands drifting at 0.6 px per tick, wrapping across the
/// canvas width.
pub fn fog(canvas: &mut dyn Canvas, tick: u64) -> Result<()> {
    let (w, h) = canvas.size();

    for i in 0..4 {
        let offset = (tick as f64 * 0.6 + f64::from(i) * 40.0) % (w + 200.0) - 100.0;
        let y = h * (0.45 + f64::from(i) * 0.08);
        canvas.rect((offset, y), (offset + w * 0.6, y + 18.0), FOG, None)?;
    }

    Ok(())
}

/// Jagged bolt anchored under the cloud.
pub fn lightning(canvas: &mut dyn Canvas) -> Result<()> {
    let (w, h) = canvas.size();
    let (x, y) = (w * 0.5, h * 0.55);

    let points = [
        (x - 10.0, y - 10.0),
        (x + 10.0, y),
        (x - 6.0, y + 6.0),
        (x + 12.0, y + 22.0),
    ];
    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], LIGHTNING, 4.0)?;
    }

    Ok(())
}
