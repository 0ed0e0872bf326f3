//! Renderer contract consumed by [`Grid::render`].
//!
//! The grid drives a per-cell callback; whichever collaborator realizes the
//! output (console, file, in-memory capture in tests) only has to honor the
//! two-method capability below.
//!
//! [`Grid::render`]: crate::grid::Grid::render

use std::io::Write;

/// Capability exposed to [`crate::grid::Grid::render`]: draw one character at
/// a column/row, and learn when the grid is complete.
pub trait GridRenderer {
    /// Draw the resolved character `ch` at column `x`, row `y`. Row breaks
    /// arrive as a `'\n'` cell one column past the row's last cell.
    fn draw_cell(&mut self, x: i32, y: i32, ch: char);

    /// Signal that the grid has been fully emitted.
    fn finish(&mut self);
}

/// Renderer writing plain text to any [`Write`] sink.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Hand back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GridRenderer for TextRenderer<W> {
    fn draw_cell(&mut self, _x: i32, _y: i32, ch: char) {
        let _ = write!(self.out, "{ch}");
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Grid, Placement, Point};

    #[test]
    fn test_text_renderer_draws_crossed_words() {
        let mut g = Grid::new();
        assert!(g.place_word(&Placement::new("ROOM", Point::new(0, 0), Direction::Horizontal)));
        assert!(g.place_word(&Placement::new("OMEGA", Point::new(1, 0), Direction::Vertical)));

        let mut renderer = TextRenderer::new(Vec::new());
        g.render(&mut renderer);

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(text, "ROOM\n.M..\n.E..\n.G..\n.A..\n\n");
    }

    #[test]
    fn test_text_renderer_empty_grid_only_finishes() {
        let mut renderer = TextRenderer::new(Vec::new());
        Grid::new().render(&mut renderer);

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(text, "\n");
    }
}
