// Per-tick capture: grab the screen around the cursor, shrink it to the viewport,
// buffer it, and (while recording) cut a grab out of the oldest buffered sample.

use image::imageops::{self, FilterType};
use log::{debug, trace};

use crate::config::Settings;
use crate::draw::draw_rect_outline;
use crate::frames::FrameStore;
use crate::lookahead::{LookaheadBuffer, Sample};
use crate::sampler::ScreenSampler;
use crate::types::{FrameBuffer, Point, Rect};

pub const PREVIEW_ZOOM: usize = 4;
const OUTLINE_COLOR: u32 = 0x00_00_FF_00;

/// What one tick produced for the window.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Magnified live view with the grab outline, if the screen could be read.
    pub preview: Option<FrameBuffer>,
    pub committed: bool,
}

pub struct CaptureEngine {
    buffer: LookaheadBuffer,
}

impl CaptureEngine {
    pub fn new() -> Self {
        Self { buffer: LookaheadBuffer::new() }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Run one tick. `cursor` is the effective position (locks and snapping applied).
    pub fn tick(
        &mut self,
        settings: &Settings,
        cursor: Point,
        sampler: &mut dyn ScreenSampler,
        recording: bool,
        store: &mut FrameStore,
    ) -> TickOutcome {
        let rect = capture_rect(settings, cursor);
        let shot = match sampler.capture(rect) {
            Ok(shot) => shot,
            Err(e) => {
                debug!("tick skipped: {e}");
                return TickOutcome::default();
            }
        };

        let complete = shot.width() == rect.width && shot.height() == rect.height;
        let image = if shot.width() == 0 || shot.height() == 0 {
            FrameBuffer::new(0, 0)
        } else {
            let w = settings.viewport_width;
            let h = ((shot.height() as f64 * w as f64 / shot.width() as f64).round() as u32).max(1);
            FrameBuffer::from_rgba(&imageops::resize(&shot, w, h, FilterType::Nearest))
        };

        let preview = grab_preview(&image, settings).magnify(PREVIEW_ZOOM);

        self.buffer.push(Sample { image, cursor, complete }, settings.lookahead);

        let committed = recording && self.commit(settings, cursor, store);
        TickOutcome { preview: Some(preview), committed }
    }

    /// Crop a grab from the oldest sample, shifted by how far the cursor moved since.
    fn commit(&self, settings: &Settings, cursor: Point, store: &mut FrameStore) -> bool {
        let Some(head) = self.buffer.ready_head(settings.lookahead) else {
            return false;
        };
        if !head.complete {
            trace!("commit dropped: head sample was clipped by the screen edge");
            return false;
        }

        let (gw, gh) = (settings.grab_width, settings.grab_height);
        let moved = cursor - head.cursor;
        let center = head.image.center();
        let origin = Point::new(
            center.x - (gw / 2) as i32 + (moved.x as f64 / settings.scale_divider) as i32,
            center.y - (gh / 2) as i32 + (moved.y as f64 / settings.scale_divider) as i32,
        );

        let grab = head.image.crop(Rect::new(origin.x, origin.y, gw, gh));
        if grab.width != gw as usize || grab.height != gh as usize {
            trace!("commit dropped: grab at {origin:?} leaves the sample");
            return false;
        }
        store.push(grab);
        true
    }
}

/// Screen rectangle for this tick, centred on `cursor` plus the alignment offset.
pub fn capture_rect(settings: &Settings, cursor: Point) -> Rect {
    let w = (settings.viewport_width as f64 * settings.scale_divider).round() as u32;
    let h = (settings.viewport_height as f64 * settings.scale_divider).round() as u32;
    Rect::new(
        cursor.x - (w / 2) as i32 + settings.snap_align_x,
        cursor.y - (h / 2) as i32 + settings.snap_align_y,
        w,
        h,
    )
}

/// Sample copy with a box drawn just outside the region a grab would take.
fn grab_preview(image: &FrameBuffer, settings: &Settings) -> FrameBuffer {
    let mut view = image.clone();
    let center = image.center();
    let (gw, gh) = (settings.grab_width as i32, settings.grab_height as i32);
    draw_rect_outline(
        &mut view,
        center.x - gw / 2 - 1,
        center.y - gh / 2 - 1,
        gw + 2,
        gh + 2,
        OUTLINE_COLOR,
    );
    view
}
