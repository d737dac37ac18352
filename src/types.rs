// Core types shared by the capture pipeline, the window and the exporter.

use image::{Rgb, RgbImage, RgbaImage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Pack an RGBA image into 0x00RRGGBB pixels (alpha is dropped).
    pub fn from_rgba(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let mut out = Vec::with_capacity((w as usize) * (h as usize));
        for pixel in img.pixels() {
            let r = pixel[0] as u32;
            let g = pixel[1] as u32;
            let b = pixel[2] as u32;
            out.push((r << 16) | (g << 8) | b);
        }
        Self { width: w as usize, height: h as usize, pixels: out }
    }

    /// Unpack into an RGB image for PNG encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let px = self.pixels[y as usize * self.width + x as usize];
            Rgb([((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8])
        })
    }

    pub fn center(&self) -> Point {
        Point::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Copy the part of `rect` that overlaps this buffer.
    /// The result is smaller than requested when `rect` pokes outside.
    pub fn crop(&self, rect: Rect) -> FrameBuffer {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width as i32).min(self.width as i32);
        let y1 = (rect.y + rect.height as i32).min(self.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return FrameBuffer::new(0, 0);
        }

        let (w, h) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let mut pixels = Vec::with_capacity(w * h);
        for y in y0 as usize..y1 as usize {
            let row = y * self.width;
            pixels.extend_from_slice(&self.pixels[row + x0 as usize..row + x1 as usize]);
        }
        FrameBuffer { width: w, height: h, pixels }
    }

    /// Nearest-neighbour blow-up so single screen pixels stay crisp.
    pub fn magnify(&self, factor: usize) -> FrameBuffer {
        let (w, h) = (self.width * factor, self.height * factor);
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            let row = (y / factor) * self.width;
            for x in 0..w {
                pixels.push(self.pixels[row + x / factor]);
            }
        }
        FrameBuffer { width: w, height: h, pixels }
    }

    /// Paste `src` with its top-left at (x, y), clipping at the edges.
    pub fn blit(&mut self, src: &FrameBuffer, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let w = src.width.min(self.width - x);
        let h = src.height.min(self.height - y);
        for row in 0..h {
            let dst = (y + row) * self.width + x;
            let from = row * src.width;
            self.pixels[dst..dst + w].copy_from_slice(&src.pixels[from..from + w]);
        }
    }
}

/// A screen or image coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle; may extend past whatever it is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer { width: w, height: h, pixels: (0..(w * h) as u32).collect() }
    }

    #[test]
    fn crop_inside_keeps_requested_size() {
        let fb = numbered(8, 8);
        let c = fb.crop(Rect::new(2, 3, 4, 2));
        assert_eq!((c.width, c.height), (4, 2));
        assert_eq!(c.pixels, vec![26, 27, 28, 29, 34, 35, 36, 37]);
    }

    #[test]
    fn crop_past_edge_is_clipped() {
        let fb = numbered(8, 8);
        let c = fb.crop(Rect::new(-2, 6, 4, 4));
        assert_eq!((c.width, c.height), (2, 2));
        assert_eq!(c.pixels, vec![48, 49, 56, 57]);

        let gone = fb.crop(Rect::new(20, 20, 4, 4));
        assert_eq!((gone.width, gone.height), (0, 0));
    }

    #[test]
    fn magnify_repeats_each_pixel() {
        let fb = numbered(2, 1);
        let m = fb.magnify(2);
        assert_eq!((m.width, m.height), (4, 2));
        assert_eq!(m.pixels, vec![0, 0, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn rgba_packing_drops_alpha() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0x12, 0x34, 0x56, 0x00]));
        let fb = FrameBuffer::from_rgba(&img);
        assert_eq!(fb.pixels, vec![0x0012_3456]);
        assert_eq!(fb.to_rgb_image().get_pixel(0, 0), &Rgb([0x12, 0x34, 0x56]));
    }

    #[test]
    fn blit_clips_at_destination_edge() {
        let mut dst = FrameBuffer::new(3, 3);
        let src = FrameBuffer { width: 2, height: 2, pixels: vec![7; 4] };
        dst.blit(&src, 2, 2);
        assert_eq!(dst.pixels[8], 7);
        assert_eq!(dst.pixels.iter().filter(|&&p| p == 7).count(), 1);
    }
}
