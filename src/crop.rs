use eframe::egui::Pos2;

/// Smallest selection edge, in image pixels.
pub const MIN_SIZE: f32 = 20.0;
/// Hit radius around a handle, in image pixels.
pub const HANDLE_TOLERANCE: f32 = 15.0;

/// Crop selection in source-image pixel coordinates (never display
/// coordinates; the app converts at the widget boundary).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// Anchor point of a handle, recomputed from the current rect every time.
    pub fn handle_pos(&self, handle: Handle) -> Pos2 {
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.height / 2.0;
        match handle {
            Handle::Nw => Pos2::new(self.x, self.y),
            Handle::Ne => Pos2::new(self.right(), self.y),
            Handle::Sw => Pos2::new(self.x, self.bottom()),
            Handle::Se => Pos2::new(self.right(), self.bottom()),
            Handle::N => Pos2::new(cx, self.y),
            Handle::S => Pos2::new(cx, self.bottom()),
            Handle::E => Pos2::new(self.right(), cy),
            Handle::W => Pos2::new(self.x, cy),
        }
    }

    /// Integer bounds for the pixel copy, clamped to the surface.
    pub fn to_pixel_bounds(&self, surface_w: u32, surface_h: u32) -> (u32, u32, u32, u32) {
        let x = (self.x.round().max(0.0) as u32).min(surface_w.saturating_sub(1));
        let y = (self.y.round().max(0.0) as u32).min(surface_h.saturating_sub(1));
        let w = (self.width.round().max(1.0) as u32).min(surface_w - x);
        let h = (self.height.round().max(1.0) as u32).min(surface_h - y);
        (x, y, w, h)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    E,
    W,
}

impl Handle {
    /// Hit-test order. Corners first so a corner wins over the two edges that
    /// meet at it.
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::Ne,
        Handle::Sw,
        Handle::Se,
        Handle::N,
        Handle::S,
        Handle::E,
        Handle::W,
    ];

    /// Handles that drag the left edge; min-size clamping re-anchors `x` so
    /// the right edge stays put.
    fn moves_west_edge(&self) -> bool {
        matches!(self, Handle::Nw | Handle::Sw | Handle::W)
    }

    /// Handles that drag the top edge; min-size clamping re-anchors `y` so
    /// the bottom edge stays put.
    fn moves_north_edge(&self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne | Handle::N)
    }
}

/// Where a pointer-down landed relative to the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitZone {
    Handle(Handle),
    Inside,
    Outside,
}

/// One pointer-down-to-pointer-up gesture. The rect is recomputed from
/// `original` plus the cumulative delta on every move, so intermediate
/// clamping never accumulates drift.
#[derive(Clone, Copy, Debug)]
struct DragSession {
    start: Pos2,
    original: CropRect,
    /// `None` = move the whole rect.
    handle: Option<Handle>,
}

/// Pointer-driven crop selection editor. `selection = None` is the inactive
/// state; while active, an in-flight [`DragSession`] marks the dragging state.
pub struct CropEngine {
    surface_w: f32,
    surface_h: f32,
    selection: Option<CropRect>,
    drag: Option<DragSession>,
}

impl CropEngine {
    pub fn new() -> Self {
        Self {
            surface_w: 0.0,
            surface_h: 0.0,
            selection: None,
            drag: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection(&self) -> Option<CropRect> {
        self.selection
    }

    /// Enter crop mode: a centered selection covering half the surface in
    /// each dimension.
    pub fn begin(&mut self, surface_w: u32, surface_h: u32) {
        let (w, h) = (surface_w as f32, surface_h as f32);
        self.surface_w = w;
        self.surface_h = h;
        let rect = CropRect::new(w / 4.0, h / 4.0, w / 2.0, h / 2.0);
        self.selection = Some(clamp_to_surface(rect, w, h));
        self.drag = None;
    }

    /// Leave crop mode without touching pixels (used when the image goes
    /// away, e.g. a new file is loaded mid-crop).
    pub fn cancel(&mut self) {
        self.selection = None;
        self.drag = None;
    }

    /// Classify a pointer position against the selection. Handles win over
    /// the interior, and the first handle within tolerance wins.
    pub fn hit_test(&self, pos: Pos2) -> HitZone {
        let Some(rect) = self.selection else {
            return HitZone::Outside;
        };
        for handle in Handle::ALL {
            if rect.handle_pos(handle).distance(pos) <= HANDLE_TOLERANCE {
                return HitZone::Handle(handle);
            }
        }
        if rect.contains(pos) {
            HitZone::Inside
        } else {
            HitZone::Outside
        }
    }

    /// Start a gesture. A down event arriving while a drag is already live
    /// closes the previous session implicitly.
    pub fn pointer_down(&mut self, pos: Pos2) {
        if self.selection.is_none() {
            return;
        }
        self.drag = None;
        let session = match self.hit_test(pos) {
            HitZone::Handle(handle) => DragSession {
                start: pos,
                original: self.selection.unwrap(),
                handle: Some(handle),
            },
            HitZone::Inside => DragSession {
                start: pos,
                original: self.selection.unwrap(),
                handle: None,
            },
            HitZone::Outside => {
                // Fresh rect anchored at the pointer; the drag pulls its
                // far corner like a south-east resize.
                let fresh = CropRect::new(pos.x, pos.y, 0.0, 0.0);
                self.selection = Some(fresh);
                DragSession {
                    start: pos,
                    original: fresh,
                    handle: Some(Handle::Se),
                }
            }
        };
        self.drag = Some(session);
    }

    /// Update the selection from the cumulative delta since drag start.
    pub fn pointer_move(&mut self, pos: Pos2) {
        let Some(drag) = self.drag else {
            return;
        };
        let dx = pos.x - drag.start.x;
        let dy = pos.y - drag.start.y;
        let rect = apply_drag(&drag.original, drag.handle, dx, dy);
        self.selection = Some(clamp_to_surface(rect, self.surface_w, self.surface_h));
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Confirm the crop: returns the integer sub-region to rasterize and
    /// leaves crop mode. `None` if crop mode was not active.
    pub fn commit(&mut self) -> Option<(u32, u32, u32, u32)> {
        self.drag = None;
        let rect = self.selection.take()?;
        if self.surface_w < 1.0 || self.surface_h < 1.0 {
            return None;
        }
        Some(rect.to_pixel_bounds(self.surface_w as u32, self.surface_h as u32))
    }
}

impl Default for CropEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resize contract: each handle shifts a fixed subset of `{x, y, w, h}` by
/// the drag delta. Falling below [`MIN_SIZE`] clamps the size and, for
/// handles dragging the west/north edge, re-derives the position so the
/// opposite edge stays where it was at drag start. `handle = None` translates
/// without resizing.
fn apply_drag(original: &CropRect, handle: Option<Handle>, dx: f32, dy: f32) -> CropRect {
    let mut r = *original;
    let Some(handle) = handle else {
        r.x += dx;
        r.y += dy;
        return r;
    };

    match handle {
        Handle::Nw => {
            r.x += dx;
            r.width -= dx;
            r.y += dy;
            r.height -= dy;
        }
        Handle::Ne => {
            r.width += dx;
            r.y += dy;
            r.height -= dy;
        }
        Handle::Sw => {
            r.x += dx;
            r.width -= dx;
            r.height += dy;
        }
        Handle::Se => {
            r.width += dx;
            r.height += dy;
        }
        Handle::N => {
            r.y += dy;
            r.height -= dy;
        }
        Handle::S => {
            r.height += dy;
        }
        Handle::E => {
            r.width += dx;
        }
        Handle::W => {
            r.x += dx;
            r.width -= dx;
        }
    }

    if r.width < MIN_SIZE {
        r.width = MIN_SIZE;
        if handle.moves_west_edge() {
            r.x = original.right() - MIN_SIZE;
        }
    }
    if r.height < MIN_SIZE {
        r.height = MIN_SIZE;
        if handle.moves_north_edge() {
            r.y = original.bottom() - MIN_SIZE;
        }
    }
    r
}

/// Bounds constraint: shrink-and-clamp, never clamp-and-preserve-size, so an
/// overhanging rect loses the overhang instead of bouncing back inside.
fn clamp_to_surface(mut r: CropRect, surface_w: f32, surface_h: f32) -> CropRect {
    if r.x < 0.0 {
        r.width += r.x;
        r.x = 0.0;
    }
    if r.y < 0.0 {
        r.height += r.y;
        r.y = 0.0;
    }
    if r.right() > surface_w {
        r.width = surface_w - r.x;
    }
    if r.bottom() > surface_h {
        r.height = surface_h - r.y;
    }
    // A rect pushed entirely past an edge would go negative here; pin it to
    // the border instead.
    if r.width < 0.0 {
        r.x = (r.x + r.width).clamp(0.0, surface_w);
        r.width = 0.0;
    }
    if r.height < 0.0 {
        r.y = (r.y + r.height).clamp(0.0, surface_h);
        r.height = 0.0;
    }
    r
}
