//! Character-grid canvas backend for terminals.
//!
//! Maps the renderer's logical 420x240 surface onto a grid of cells. The
//! renderer's clock thread draws into the shared grid; the main loop reads
//! complete frames out with [`TextCanvas::frame`], so no draw call needs
//! marshaling onto any particular thread.

use anyhow::Result;
use skydeck_core::Canvas;
use std::sync::{Arc, Mutex};

/// Logical surface size the scene geometry is designed for.
pub const LOGICAL_WIDTH: f64 = 420.0;
pub const LOGICAL_HEIGHT: f64 = 240.0;

#[derive(Clone)]
pub struct TextCanvas {
    cols: usize,
    rows: usize,
    cells: Arc<Mutex<Vec<char>>>,
}

impl TextCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows, cells: Arc::new(Mutex::new(vec![' '; cols * rows])) }
    }

    /// Snapshot of the current frame, one string per row.
    pub fn frame(&self) -> String {
        let Ok(cells) = self.cells.lock() else {
            return String::new();
        };
        cells
            .chunks(self.cols)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plot(&self, x: f64, y: f64, glyph: char) {
        let col = (x / LOGICAL_WIDTH * self.cols as f64).floor();
        let row = (y / LOGICAL_HEIGHT * self.rows as f64).floor();
        if col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return;
        }
        if let Ok(mut cells) = self.cells.lock() {
            cells[row * self.cols + col] = glyph;
        }
    }

    fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            (col as f64 + 0.5) * (LOGICAL_WIDTH / self.cols as f64),
            (row as f64 + 0.5) * (LOGICAL_HEIGHT / self.rows as f64),
        )
    }
}

impl Canvas for TextCanvas {
    fn size(&self) -> (f64, f64) {
        (LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }

    fn clear(&mut self) -> Result<()> {
        if let Ok(mut cells) = self.cells.lock() {
            cells.fill(' ');
        }
        Ok(())
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), _color: &str, _width: f64) -> Result<()> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let glyph = if dy.abs() > 2.0 * dx.abs() {
            '|'
        } else if dx.abs() > 2.0 * dy.abs() {
            '-'
        } else if (dx > 0.0) == (dy > 0.0) {
            '\\'
        } else {
            '/'
        };

        let steps = (dx.abs().max(dy.abs()) / 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            self.plot(from.0 + dx * t, from.1 + dy * t, glyph);
        }
        Ok(())
    }

    fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        _fill: &str,
        _outline: Option<&str>,
    ) -> Result<()> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (x, y) = self.cell_center(col, row);
                let (dx, dy) = (x - center.0, y - center.1);
                if dx * dx + dy * dy <= radius * radius {
                    self.plot(x, y, 'o');
                }
            }
        }
        Ok(())
    }

    fn rect(
        &mut self,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        _fill: &str,
        outline: Option<&str>,
    ) -> Result<()> {
        // Outlined slabs read as solid, borderless bands as haze.
        let glyph = if outline.is_some() { '#' } else { '~' };
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (x, y) = self.cell_center(col, row);
                if x >= top_left.0 && x <= bottom_right.0 && y >= top_left.1 && y <= bottom_right.1 {
                    self.plot(x, y, glyph);
                }
            }
        }
        Ok(())
    }

    fn text(&mut self, at: (f64, f64), text: &str, _color: &str) -> Result<()> {
        let step = LOGICAL_WIDTH / self.cols as f64;
        for (i, glyph) in text.chars().enumerate() {
            self.plot(at.0 + i as f64 * step, at.1, glyph);
        }
        Ok(())
    }
}
