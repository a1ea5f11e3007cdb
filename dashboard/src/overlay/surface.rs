//! Drawing and viewport contracts the overlay renders through.
//!
//! The overlay depends only on these traits, not on any specific mapping or
//! canvas library. `MapViewport` is the projection authority: screen
//! positions are worth nothing across a pan or zoom, so the overlay asks for
//! them fresh on every redraw.

use crate::domain::Coordinate;

/// A position in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// Horizontal pixel offset from the surface's left edge.
    pub x: f64,
    /// Vertical pixel offset from the surface's top edge.
    pub y: f64,
}

/// Drawable surface extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    /// Surface width in pixels.
    pub width: f64,
    /// Surface height in pixels.
    pub height: f64,
}

/// Viewport transitions the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    /// A pan (or an instant zoom step) settled.
    PanOrZoomEnd,
    /// An animated zoom transition started.
    ZoomStart,
    /// An animated zoom transition completed.
    ZoomEnd,
    /// The surface container was resized.
    Resize,
}

/// Callback invoked by the map collaborator on viewport transitions.
pub type ViewportListener = Box<dyn FnMut(ViewportEvent)>;

/// The map collaborator: projection plus viewport-change notification.
///
/// The listener slot holds at most one callback; registering again replaces
/// the previous registration, so stacked duplicate subscriptions cannot
/// exist.
pub trait MapViewport {
    /// Project a coordinate into surface pixels under the current view.
    fn project(&self, coordinate: Coordinate) -> ScreenPoint;

    /// Current drawable extent.
    fn surface_size(&self) -> SurfaceSize;

    /// Replace the viewport listener; `None` clears it.
    fn set_viewport_listener(&self, listener: Option<ViewportListener>);
}

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Rgba {
    /// Construct a colour from channels and opacity.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// How a line is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Uniform colour.
    Solid(Rgba),
    /// Linear fade from the colour at the line start to transparent at its
    /// end.
    FadeOut(Rgba),
}

/// Stroke style for lines and polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line width in pixels.
    pub width: f64,
    /// Paint applied along the stroke.
    pub paint: Paint,
}

/// The transparent layer the overlay draws onto.
///
/// A frame is everything between one `begin_frame` and the next; the overlay
/// always clears before drawing, so two redraws with unchanged state produce
/// identical frames.
pub trait OverlaySurface {
    /// Clear the surface and size it to the current viewport.
    fn begin_frame(&mut self, size: SurfaceSize);

    /// Fill a circle.
    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, fill: Rgba);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: &Stroke);

    /// Stroke a connected polyline.
    fn stroke_polyline(&mut self, points: &[ScreenPoint], stroke: &Stroke);

    /// Show or hide the whole layer without touching its contents.
    fn set_visible(&mut self, visible: bool);
}
