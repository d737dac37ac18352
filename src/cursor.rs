// Global cursor position, plus the lock/snap adjustments applied before capture.

use device_query::{DeviceQuery, DeviceState};

use crate::types::Point;

pub trait CursorSource {
    /// Cursor position in absolute screen pixels.
    fn position(&self) -> Point;
}

/// Reads the OS cursor; works whether or not our window has focus.
pub struct DeviceCursor {
    state: DeviceState,
}

impl DeviceCursor {
    pub fn new() -> Self {
        Self { state: DeviceState::new() }
    }
}

impl CursorSource for DeviceCursor {
    fn position(&self) -> Point {
        let (x, y) = self.state.get_mouse().coords;
        Point::new(x, y)
    }
}

/// Axis locks and pixel snapping, toggled from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorLock {
    pub lock_x: Option<i32>,
    pub lock_y: Option<i32>,
    pub pixel_snap: bool,
}

impl Default for CursorLock {
    fn default() -> Self {
        Self { lock_x: None, lock_y: None, pixel_snap: true }
    }
}

impl CursorLock {
    pub fn toggle_snap(&mut self) {
        self.pixel_snap = !self.pixel_snap;
    }

    /// Locking remembers where the cursor is right now.
    pub fn toggle_lock_x(&mut self, raw: Point) {
        self.lock_x = match self.lock_x {
            Some(_) => None,
            None => Some(raw.x),
        };
    }

    pub fn toggle_lock_y(&mut self, raw: Point) {
        self.lock_y = match self.lock_y {
            Some(_) => None,
            None => Some(raw.y),
        };
    }

    /// Raw position with locked axes replaced, then snapped down to a multiple of `step`.
    pub fn effective(&self, raw: Point, step: i32) -> Point {
        let mut p = Point::new(self.lock_x.unwrap_or(raw.x), self.lock_y.unwrap_or(raw.y));
        if self.pixel_snap {
            let step = step.max(1);
            p.x -= p.x.rem_euclid(step);
            p.y -= p.y.rem_euclid(step);
        }
        p
    }
}
