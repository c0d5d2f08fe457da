//! Canvas geometry, clipping and the primitive interface every display
//! driver implements.
//!
//! Public drawing calls (`draw_pixel`, `fill_rect`, ...) clip against the
//! logical canvas, bracket one transaction and hand the trimmed geometry to a
//! single `write_*` primitive. Drivers only have to provide `write_pixel` and
//! the transaction bracket; the remaining primitives fall back to per-pixel
//! writes unless the driver can do better.

/// Axis aligned rectangle in logical canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, w: i16, h: i16) -> Self {
        Rect { x, y, w, h }
    }
}

/// Physical panel size plus the logical size seen through the current
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    raw_width: i16,
    raw_height: i16,
    width: i16,
    height: i16,
    rotation: u8,
}

impl Canvas {
    pub const fn new(width: i16, height: i16) -> Self {
        Canvas {
            raw_width: width,
            raw_height: height,
            width,
            height,
            rotation: 0,
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn raw_width(&self) -> i16 {
        self.raw_width
    }

    pub fn raw_height(&self) -> i16 {
        self.raw_height
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Stores `r & 3` and swaps the logical axes for odd rotations.
    pub fn set_rotation(&mut self, r: u8) {
        self.rotation = r & 0x03;
        if self.rotation & 0x01 != 0 {
            self.width = self.raw_height;
            self.height = self.raw_width;
        } else {
            self.width = self.raw_width;
            self.height = self.raw_height;
        }
    }

    pub fn contains(&self, x: i16, y: i16) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Trims `rect` to the canvas.
    ///
    /// Returns `None` for non-positive sizes and for rectangles that do not
    /// overlap `[0, width) x [0, height)`.
    pub fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        if rect.w <= 0 || rect.h <= 0 {
            return None;
        }

        // Widen so that x + w cannot overflow
        let (mut x, mut y) = (i32::from(rect.x), i32::from(rect.y));
        let (mut w, mut h) = (i32::from(rect.w), i32::from(rect.h));
        let (width, height) = (i32::from(self.width), i32::from(self.height));

        if x >= width || y >= height || x + w <= 0 || y + h <= 0 {
            return None;
        }
        if x < 0 {
            w += x;
            x = 0;
        }
        if y < 0 {
            h += y;
            y = 0;
        }
        if x + w > width {
            w = width - x;
        }
        if y + h > height {
            h = height - y;
        }
        if w <= 0 || h <= 0 {
            return None;
        }

        // Everything is inside the canvas now, which itself fits in i16
        Some(Rect::new(x as i16, y as i16, w as i16, h as i16))
    }
}

/// Drawing interface shared by all display drivers.
///
/// Colors are 16 bit RGB565 values.
pub trait Graphics {
    type Error;

    fn canvas(&self) -> &Canvas;

    fn canvas_mut(&mut self) -> &mut Canvas;

    /// Claims the bus. Nested calls must not claim it again.
    fn start_write(&mut self) -> Result<(), Self::Error>;

    /// Releases the bus once the outermost bracket closes. No-op when idle.
    fn end_write(&mut self) -> Result<(), Self::Error>;

    fn write_pixel(&mut self, x: i16, y: i16, color: u16) -> Result<(), Self::Error>;

    fn write_fast_hline(&mut self, x: i16, y: i16, w: i16, color: u16) -> Result<(), Self::Error> {
        self.write_fill_rect(x, y, w, 1, color)
    }

    fn write_fast_vline(&mut self, x: i16, y: i16, h: i16, color: u16) -> Result<(), Self::Error> {
        self.write_fill_rect(x, y, 1, h, color)
    }

    fn write_fill_rect(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: u16,
    ) -> Result<(), Self::Error> {
        for row in 0..h {
            for col in 0..w {
                self.write_pixel(x.saturating_add(col), y.saturating_add(row), color)?;
            }
        }
        Ok(())
    }

    /// Writes a flat, row-major run of pixels starting at the canvas origin:
    /// index `i` lands on `(i % width, i / width)`.
    fn write_pixels(&mut self, colors: &[u16]) -> Result<(), Self::Error> {
        let width = self.canvas().width();
        if width <= 0 {
            return Ok(());
        }
        let width = width as usize;
        for (i, &color) in colors.iter().enumerate() {
            let x = (i % width) as i16;
            let y = i16::try_from(i / width).unwrap_or(i16::MAX);
            self.write_pixel(x, y, color)?;
        }
        Ok(())
    }

    fn set_rotation(&mut self, r: u8) -> Result<(), Self::Error> {
        self.canvas_mut().set_rotation(r);
        Ok(())
    }

    fn width(&self) -> i16 {
        self.canvas().width()
    }

    fn height(&self) -> i16 {
        self.canvas().height()
    }

    fn rotation(&self) -> u8 {
        self.canvas().rotation()
    }

    /// Runs `op` inside one transaction bracket. The bracket is closed even
    /// when `op` fails; the first error wins.
    fn transaction<F>(&mut self, op: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.start_write()?;
        let result = op(self);
        let closed = self.end_write();
        result.and(closed)
    }

    fn draw_pixel(&mut self, x: i16, y: i16, color: u16) -> Result<(), Self::Error> {
        if !self.canvas().contains(x, y) {
            return Ok(());
        }
        self.transaction(|gfx| gfx.write_pixel(x, y, color))
    }

    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, color: u16) -> Result<(), Self::Error> {
        match self.canvas().clip_rect(Rect::new(x, y, w, 1)) {
            Some(r) => self.transaction(|gfx| gfx.write_fast_hline(r.x, r.y, r.w, color)),
            None => Ok(()),
        }
    }

    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, color: u16) -> Result<(), Self::Error> {
        match self.canvas().clip_rect(Rect::new(x, y, 1, h)) {
            Some(r) => self.transaction(|gfx| gfx.write_fast_vline(r.x, r.y, r.h, color)),
            None => Ok(()),
        }
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: u16) -> Result<(), Self::Error> {
        match self.canvas().clip_rect(Rect::new(x, y, w, h)) {
            Some(r) => self.transaction(|gfx| gfx.write_fill_rect(r.x, r.y, r.w, r.h, color)),
            None => Ok(()),
        }
    }

    fn fill_screen(&mut self, color: u16) -> Result<(), Self::Error> {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0, 0, w, h, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Op {
        Start,
        End,
        Pixel(i16, i16, u16),
    }

    /// Driver that only implements the required primitives and records them.
    struct Recorder {
        canvas: Canvas,
        ops: Vec<Op>,
    }

    impl Recorder {
        fn new(width: i16, height: i16) -> Self {
            Recorder {
                canvas: Canvas::new(width, height),
                ops: Vec::new(),
            }
        }

        fn pixels(&self) -> Vec<(i16, i16)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Pixel(x, y, _) => Some((*x, *y)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Graphics for Recorder {
        type Error = ();

        fn canvas(&self) -> &Canvas {
            &self.canvas
        }

        fn canvas_mut(&mut self) -> &mut Canvas {
            &mut self.canvas
        }

        fn start_write(&mut self) -> Result<(), ()> {
            self.ops.push(Op::Start);
            Ok(())
        }

        fn end_write(&mut self) -> Result<(), ()> {
            self.ops.push(Op::End);
            Ok(())
        }

        fn write_pixel(&mut self, x: i16, y: i16, color: u16) -> Result<(), ()> {
            self.ops.push(Op::Pixel(x, y, color));
            Ok(())
        }
    }

    /// Reference intersection computed cell by cell.
    fn brute_force_clip(canvas: &Canvas, rect: Rect) -> Option<Rect> {
        let mut cells = (rect.x..rect.x.saturating_add(rect.w.max(0)))
            .flat_map(|x| (rect.y..rect.y.saturating_add(rect.h.max(0))).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.contains(x, y))
            .peekable();
        let &(x0, y0) = cells.peek()?;
        let (mut x1, mut y1) = (x0, y0);
        for (x, y) in cells {
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    #[test]
    fn clip_matches_exact_intersection() {
        let canvas = Canvas::new(5, 4);
        for x in -7..8 {
            for y in -6..7 {
                for w in -1..10 {
                    for h in -1..9 {
                        let rect = Rect::new(x, y, w, h);
                        assert_eq!(
                            canvas.clip_rect(rect),
                            brute_force_clip(&canvas, rect),
                            "{:?}",
                            rect
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn clip_does_not_overflow_near_i16_limits() {
        let canvas = Canvas::new(240, 240);
        assert_eq!(canvas.clip_rect(Rect::new(i16::MAX, 0, i16::MAX, 1)), None);
        assert_eq!(
            canvas.clip_rect(Rect::new(i16::MIN, 10, i16::MAX, 1)),
            None
        );
        assert_eq!(
            canvas.clip_rect(Rect::new(-100, -100, i16::MAX, i16::MAX)),
            Some(Rect::new(0, 0, 240, 240))
        );
    }

    #[test]
    fn rotation_swaps_axes_on_odd_values() {
        let mut canvas = Canvas::new(320, 240);
        for r in 0..16u8 {
            canvas.set_rotation(r);
            assert_eq!(canvas.rotation(), r % 4);
            if r % 2 == 0 {
                assert_eq!((canvas.width(), canvas.height()), (320, 240));
            } else {
                assert_eq!((canvas.width(), canvas.height()), (240, 320));
            }
            assert_eq!((canvas.raw_width(), canvas.raw_height()), (320, 240));
        }
    }

    #[test]
    fn rotation_wraps_modulo_four() {
        let mut a = Canvas::new(320, 240);
        let mut b = Canvas::new(320, 240);
        for r in 0..4u8 {
            a.set_rotation(r);
            b.set_rotation(r + 4);
            assert_eq!(a, b);
            b.set_rotation(r + 252);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn draw_pixel_brackets_one_write() {
        let mut gfx = Recorder::new(4, 4);
        gfx.draw_pixel(1, 2, 0xF800).unwrap();
        assert_eq!(gfx.ops, vec![Op::Start, Op::Pixel(1, 2, 0xF800), Op::End]);
    }

    #[test]
    fn off_canvas_drawing_is_silent() {
        let mut gfx = Recorder::new(4, 4);
        gfx.draw_pixel(-1, 0, 1).unwrap();
        gfx.draw_pixel(4, 0, 1).unwrap();
        gfx.draw_fast_hline(0, 4, 3, 1).unwrap();
        gfx.draw_fast_vline(0, 0, 0, 1).unwrap();
        gfx.fill_rect(10, 10, 2, 2, 1).unwrap();
        gfx.fill_rect(0, 0, -2, 2, 1).unwrap();
        assert!(gfx.ops.is_empty());
    }

    #[test]
    fn default_lines_are_clipped_rect_fills() {
        let mut gfx = Recorder::new(4, 3);
        gfx.draw_fast_hline(-2, 1, 4, 7).unwrap();
        assert_eq!(gfx.pixels(), vec![(0, 1), (1, 1)]);

        let mut gfx = Recorder::new(4, 3);
        gfx.draw_fast_vline(3, 1, 10, 7).unwrap();
        assert_eq!(gfx.pixels(), vec![(3, 1), (3, 2)]);
        assert_eq!(gfx.ops.first(), Some(&Op::Start));
        assert_eq!(gfx.ops.last(), Some(&Op::End));
    }

    #[test]
    fn default_fill_rect_visits_every_cell_row_by_row() {
        let mut gfx = Recorder::new(4, 4);
        gfx.fill_rect(2, 2, 5, 5, 9).unwrap();
        assert_eq!(gfx.pixels(), vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
    }

    #[test]
    fn fill_screen_covers_rotated_canvas() {
        let mut gfx = Recorder::new(3, 2);
        gfx.set_rotation(1).unwrap();
        gfx.fill_screen(0).unwrap();
        assert_eq!(gfx.pixels().len(), 6);
        assert!(gfx.pixels().iter().all(|&(x, y)| x < 2 && y < 3));
        assert_eq!(gfx.ops.iter().filter(|op| **op == Op::Start).count(), 1);
    }

    #[test]
    fn default_write_pixels_is_row_major() {
        let mut gfx = Recorder::new(3, 3);
        gfx.write_pixels(&[10, 11, 12, 13, 14]).unwrap();
        assert_eq!(
            gfx.ops,
            vec![
                Op::Pixel(0, 0, 10),
                Op::Pixel(1, 0, 11),
                Op::Pixel(2, 0, 12),
                Op::Pixel(0, 1, 13),
                Op::Pixel(1, 1, 14),
            ]
        );
    }

    #[test]
    fn transaction_closes_after_error() {
        struct Failing(Canvas, Vec<Op>);

        impl Graphics for Failing {
            type Error = &'static str;

            fn canvas(&self) -> &Canvas {
                &self.0
            }

            fn canvas_mut(&mut self) -> &mut Canvas {
                &mut self.0
            }

            fn start_write(&mut self) -> Result<(), Self::Error> {
                self.1.push(Op::Start);
                Ok(())
            }

            fn end_write(&mut self) -> Result<(), Self::Error> {
                self.1.push(Op::End);
                Ok(())
            }

            fn write_pixel(&mut self, _x: i16, _y: i16, _color: u16) -> Result<(), Self::Error> {
                Err("bus")
            }
        }

        let mut gfx = Failing(Canvas::new(2, 2), Vec::new());
        assert_eq!(gfx.draw_pixel(0, 0, 1), Err("bus"));
        assert_eq!(gfx.1, vec![Op::Start, Op::End]);
    }
}
