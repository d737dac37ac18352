// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window showing the zoomed live view, the looping recorded frames and a status line.
// 2) Rectangle outlines (the grab box in the live view).
// 3) A tiny 5x7 bitmap font for the HUD.

use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::FrameBuffer;

const BACKGROUND: u32 = 0x00_10_10_10;
const GAP: usize = 8;
const LINE_HEIGHT: usize = 10;

/// User actions read from the keyboard this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleRecord,
    RecordKey(bool),
    ClearFrames,
    Export,
    FpsUp,
    FpsDown,
    ToggleSnap,
    ToggleLockX,
    ToggleLockY,
    LoopStart,
    LoopEnd,
    LoopReset,
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window; buffers are drawn 1:1 from the top-left corner.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, scale_mode: ScaleMode::UpperLeft, ..WindowOptions::default() };
        let window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Pump window events without drawing (used while waiting for the next tick).
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    fn chord_held(&self) -> bool {
        let ctrl = self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl);
        let alt = self.window.is_key_down(Key::LeftAlt) || self.window.is_key_down(Key::RightAlt);
        ctrl && alt
    }

    fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Edge-triggered key events mapped to commands.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::new();

        // Shift: record while held (press/release edges only, auto-repeat ignored).
        if self.pressed_once(Key::LeftShift) || self.pressed_once(Key::RightShift) {
            out.push(Command::RecordKey(true));
        }
        if self.window.is_key_released(Key::LeftShift) || self.window.is_key_released(Key::RightShift) {
            out.push(Command::RecordKey(false));
        }

        if self.chord_held() {
            if self.pressed_once(Key::S) { out.push(Command::ToggleSnap); }
            if self.pressed_once(Key::X) { out.push(Command::ToggleLockX); }
            if self.pressed_once(Key::Y) { out.push(Command::ToggleLockY); }
            return out;
        }

        if self.pressed_once(Key::Space) { out.push(Command::ToggleRecord); }
        if self.pressed_once(Key::C) { out.push(Command::ClearFrames); }
        if self.pressed_once(Key::E) { out.push(Command::Export); }
        if self.window.is_key_pressed(Key::Up, KeyRepeat::Yes) { out.push(Command::FpsUp); }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::Yes) { out.push(Command::FpsDown); }
        if self.pressed_once(Key::LeftBracket) { out.push(Command::LoopStart); }
        if self.pressed_once(Key::RightBracket) { out.push(Command::LoopEnd); }
        if self.pressed_once(Key::Backspace) { out.push(Command::LoopReset); }
        out
    }
}

/// Lay out live view, recorded frame and HUD lines on one canvas.
pub fn compose(preview: Option<&FrameBuffer>, scrub: Option<&FrameBuffer>, hud: &[String]) -> FrameBuffer {
    let text_w = hud.iter().map(|l| l.chars().count() * 6).max().unwrap_or(0);
    let width = [preview.map_or(0, |p| p.width), scrub.map_or(0, |s| s.width), text_w + 2 * GAP]
        .into_iter()
        .max()
        .unwrap_or(0);
    let height = preview.map_or(0, |p| p.height + GAP)
        + scrub.map_or(0, |s| s.height + GAP)
        + hud.len() * LINE_HEIGHT
        + GAP;

    let mut canvas = FrameBuffer { width, height, pixels: vec![BACKGROUND; width * height] };
    let mut y = 0;
    for img in [preview, scrub].into_iter().flatten() {
        canvas.blit(img, (width - img.width) / 2, y);
        y += img.height + GAP;
    }
    for line in hud {
        draw_text_5x7(&mut canvas, GAP as i32, y as i32, line, 0x00_FF_FF_FF);
        y += LINE_HEIGHT;
    }
    canvas
}

/* ---------- Software drawing: pixels, lines, boxes, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// One-pixel outline covering columns x..x+w-1 and rows y..y+h-1.
pub fn draw_rect_outline(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (x1, y1) = (x + w - 1, y + h - 1);
    draw_line(fb, x, y, x1, y, color);
    draw_line(fb, x, y1, x1, y1, color);
    draw_line(fb, x, y, x, y1, color);
    draw_line(fb, x1, y, x1, y1, color);
}

/* ---------- 5x7 bitmap font (uppercase ASCII subset for the HUD) ---------- */

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch.to_ascii_uppercase()) {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32 + 1, y + ry as i32 + 1, 0x00000000);
                }
            }
        }

        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; unknown characters leave a blank cell.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_touches_only_the_border() {
        let mut fb = FrameBuffer::new(6, 6);
        draw_rect_outline(&mut fb, 1, 1, 4, 4, 9);
        let lit: Vec<usize> = (0..36).filter(|&i| fb.pixels[i] == 9).collect();
        assert_eq!(lit.len(), 12);
        assert_eq!(fb.pixels[2 * 6 + 2], 0);
        assert_eq!(fb.pixels[4 * 6 + 4], 9);
    }

    #[test]
    fn outline_clips_outside_buffer() {
        let mut fb = FrameBuffer::new(4, 4);
        draw_rect_outline(&mut fb, -2, -2, 10, 10, 9);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn hud_letters_have_glyphs() {
        for ch in "RECORDING WAITING IDLE FRAMES FPS SNAP LOCK X Y EXPORTED CANCELLED".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph {ch}");
        }
        assert!(glyph5x7('a'.to_ascii_uppercase()).is_some());
    }

    #[test]
    fn compose_stacks_views_above_text() {
        let preview = FrameBuffer { width: 20, height: 10, pixels: vec![1; 200] };
        let scrub = FrameBuffer { width: 8, height: 8, pixels: vec![2; 64] };
        let canvas = compose(Some(&preview), Some(&scrub), &["IDLE".to_string()]);

        // "IDLE" is 24px of glyphs plus a margin on each side.
        assert_eq!(canvas.width, 40);
        assert_eq!(canvas.height, 10 + GAP + 8 + GAP + LINE_HEIGHT + GAP);
        assert_eq!(canvas.pixels[10], 1); // preview centred: (40-20)/2
        assert_eq!(canvas.pixels[(10 + GAP) * 40 + 16], 2); // scrub centred: (40-8)/2
    }
}
