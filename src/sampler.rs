// Reads screen pixels for a rectangle around the cursor.
// What you get back is an RGBA image of the part of the rectangle that is actually on
// the monitor; near an edge it is smaller than what was asked for.

use image::RgbaImage;
use image::imageops;
use log::{debug, info};
use xcap::Monitor;

use crate::error::{Error, Result};
use crate::types::Rect;

pub trait ScreenSampler {
    /// Pixels inside `rect` (absolute screen coordinates), clipped to the screen.
    fn capture(&mut self, rect: Rect) -> Result<RgbaImage>;
}

/// Samples the monitor that contains the origin, like a single-screen desktop would.
pub struct XcapSampler {
    monitor: Option<Monitor>,
}

impl XcapSampler {
    pub fn new() -> Self {
        Self { monitor: None }
    }

    fn monitor(&mut self) -> Result<&Monitor> {
        if self.monitor.is_none() {
            let monitors = Monitor::all()
                .map_err(|e| Error::Capture(format!("List monitors: {e}")))?;
            let at_origin = monitors
                .iter()
                .position(|m| m.x().unwrap_or(-1) == 0 && m.y().unwrap_or(-1) == 0)
                .or_else(|| monitors.iter().position(|m| m.is_primary().unwrap_or(false)))
                .unwrap_or(0);
            let monitor = monitors
                .into_iter()
                .nth(at_origin)
                .ok_or_else(|| Error::Capture("No monitor found".into()))?;
            info!(
                "sampling monitor {} ({}x{})",
                monitor.name().unwrap_or_default(),
                monitor.width().unwrap_or(0),
                monitor.height().unwrap_or(0)
            );
            self.monitor = Some(monitor);
        }
        self.monitor
            .as_ref()
            .ok_or_else(|| Error::Capture("No monitor found".into()))
    }
}

impl ScreenSampler for XcapSampler {
    fn capture(&mut self, rect: Rect) -> Result<RgbaImage> {
        let monitor = self.monitor()?;
        let origin_x = monitor.x().unwrap_or(0);
        let origin_y = monitor.y().unwrap_or(0);

        let shot = match monitor.capture_image() {
            Ok(shot) => shot,
            Err(e) => {
                // Monitor set may have changed (unplugged, resolution switch); pick again next tick.
                debug!("capture failed, re-selecting monitor: {e}");
                self.monitor = None;
                return Err(Error::Capture(format!("Capture monitor: {e}")));
            }
        };

        Ok(clip_region(&shot, Rect { x: rect.x - origin_x, y: rect.y - origin_y, ..rect }))
    }
}

/// Copy the on-image part of `rect` out of `img`.
pub fn clip_region(img: &RgbaImage, rect: Rect) -> RgbaImage {
    let (iw, ih) = (img.width() as i64, img.height() as i64);
    let x0 = (rect.x as i64).clamp(0, iw);
    let y0 = (rect.y as i64).clamp(0, ih);
    let x1 = (rect.x as i64 + rect.width as i64).clamp(0, iw);
    let y1 = (rect.y as i64 + rect.height as i64).clamp(0, ih);
    if x1 <= x0 || y1 <= y0 {
        return RgbaImage::new(0, 0);
    }
    imageops::crop_imm(img, x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32).to_image()
}
