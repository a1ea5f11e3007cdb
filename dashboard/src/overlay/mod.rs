//! Viewport overlay: geo-anchored markers and lines above the base map.
//!
//! The overlay draws a pulsing origin marker, one dot per visible target,
//! connecting lines, and the active route polyline onto a transparent layer.
//! Screen geometry is recomputed from the map's current projection on every
//! redraw; nothing pixel-valued survives a pan, zoom, or resize. The overlay
//! owns its viewport subscription: it registers a single listener slot at
//! attach time, so repeated target updates can never stack duplicate
//! listeners.

mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::domain::{Coordinate, OverlayTarget, RouteGeometry};

pub use surface::{
    MapViewport, OverlaySurface, Paint, Rgba, ScreenPoint, Stroke, SurfaceSize, ViewportEvent,
    ViewportListener,
};

/// Accent colour shared by lines and the route polyline.
pub const ACCENT: Rgba = Rgba::new(59, 130, 246, 1.0);
/// Soft accent fill behind the origin marker.
pub const ORIGIN_PULSE_FILL: Rgba = Rgba::new(59, 130, 246, 0.4);
/// Fill colour for destination dots.
pub const DESTINATION_FILL: Rgba = Rgba::new(255, 71, 87, 1.0);
/// Start colour of the browsing-mode fade-out lines.
pub const BROWSE_LINE_START: Rgba = Rgba::new(59, 130, 246, 0.5);

/// Radius of the origin pulse, pixels.
pub const ORIGIN_PULSE_RADIUS: f64 = 15.0;
/// Destination dot radius when a single target is focused.
pub const FOCUS_DOT_RADIUS: f64 = 8.0;
/// Destination dot radius when browsing many targets.
pub const BROWSE_DOT_RADIUS: f64 = 4.0;
/// Width of the single bold focus line and the route polyline.
pub const FOCUS_LINE_WIDTH: f64 = 4.0;
/// Width of the faint browsing lines.
pub const BROWSE_LINE_WIDTH: f64 = 2.0;

/// What the overlay is currently showing.
///
/// Replaced wholesale by [`OverlayHandle::set_targets`] and
/// [`OverlayHandle::set_route`]; the overlay never diffs against a previous
/// scene.
#[derive(Debug, Clone, Default)]
struct OverlayScene {
    origin: Option<Coordinate>,
    targets: Vec<OverlayTarget>,
    route: Option<RouteGeometry>,
}

struct ViewportOverlay<M, S> {
    map: Rc<M>,
    surface: Rc<RefCell<S>>,
    scene: OverlayScene,
}

impl<M: MapViewport, S: OverlaySurface> ViewportOverlay<M, S> {
    fn set_targets(&mut self, origin: Option<Coordinate>, targets: Vec<OverlayTarget>) {
        self.scene.origin = origin;
        self.scene.targets = targets;
        self.redraw();
    }

    fn set_route(&mut self, route: Option<RouteGeometry>) {
        self.scene.route = route;
        self.redraw();
    }

    fn handle_viewport_event(&mut self, event: ViewportEvent) {
        match event {
            ViewportEvent::PanOrZoomEnd | ViewportEvent::Resize => self.redraw(),
            ViewportEvent::ZoomStart => {
                // Mid-animation projections are stale; hide instead of
                // drawing against them.
                self.surface.borrow_mut().set_visible(false);
            }
            ViewportEvent::ZoomEnd => {
                self.surface.borrow_mut().set_visible(true);
                self.redraw();
            }
        }
    }

    fn redraw(&mut self) {
        let mut surface = self.surface.borrow_mut();
        surface.begin_frame(self.map.surface_size());

        let Some(origin) = self.scene.origin else {
            return;
        };
        let origin_point = self.map.project(origin);
        surface.fill_circle(origin_point, ORIGIN_PULSE_RADIUS, ORIGIN_PULSE_FILL);

        let has_route = self.draw_route(&mut surface);

        let finite: Vec<Coordinate> = self
            .scene
            .targets
            .iter()
            .map(|target| target.coordinate)
            .filter(|coordinate| {
                let usable = coordinate.is_finite();
                if !usable {
                    debug!("skipping overlay target with non-finite coordinate");
                }
                usable
            })
            .collect();

        let single_focus = finite.len() == 1;
        for coordinate in finite {
            let point = self.map.project(coordinate);
            if single_focus {
                if !has_route {
                    surface.stroke_line(
                        origin_point,
                        point,
                        &Stroke {
                            width: FOCUS_LINE_WIDTH,
                            paint: Paint::Solid(ACCENT),
                        },
                    );
                }
                surface.fill_circle(point, FOCUS_DOT_RADIUS, DESTINATION_FILL);
            } else {
                surface.stroke_line(
                    origin_point,
                    point,
                    &Stroke {
                        width: BROWSE_LINE_WIDTH,
                        paint: Paint::FadeOut(BROWSE_LINE_START),
                    },
                );
                surface.fill_circle(point, BROWSE_DOT_RADIUS, DESTINATION_FILL);
            }
        }
    }

    fn draw_route(&self, surface: &mut std::cell::RefMut<'_, S>) -> bool {
        let Some(route) = &self.scene.route else {
            return false;
        };
        let points: Vec<ScreenPoint> = route
            .points()
            .iter()
            .filter(|coordinate| coordinate.is_finite())
            .map(|coordinate| self.map.project(*coordinate))
            .collect();
        if points.len() < 2 {
            return false;
        }
        surface.stroke_polyline(
            &points,
            &Stroke {
                width: FOCUS_LINE_WIDTH,
                paint: Paint::Solid(ACCENT),
            },
        );
        true
    }
}

/// Handle owning an overlay bound to one map instance and one surface.
///
/// Dropping every clone of the handle leaves the map's listener slot holding
/// a no-op callback; [`OverlayHandle::detach`] clears it eagerly.
pub struct OverlayHandle<M, S> {
    inner: Rc<RefCell<ViewportOverlay<M, S>>>,
}

impl<M, S> Clone for OverlayHandle<M, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: MapViewport + 'static, S: OverlaySurface + 'static> OverlayHandle<M, S> {
    /// Bind an overlay to a map and a surface, registering the viewport
    /// listener exactly once.
    ///
    /// Attaching another overlay to the same map replaces the previous
    /// listener rather than stacking a second one.
    pub fn attach(map: Rc<M>, surface: Rc<RefCell<S>>) -> Self {
        let overlay = ViewportOverlay {
            map: Rc::clone(&map),
            surface,
            scene: OverlayScene::default(),
        };
        let inner = Rc::new(RefCell::new(overlay));
        let weak = Rc::downgrade(&inner);
        map.set_viewport_listener(Some(Box::new(move |event| {
            if let Some(overlay) = weak.upgrade() {
                overlay.borrow_mut().handle_viewport_event(event);
            }
        })));
        Self { inner }
    }

    /// Replace the entire target set and redraw immediately.
    pub fn set_targets(&self, origin: Option<Coordinate>, targets: Vec<OverlayTarget>) {
        self.inner.borrow_mut().set_targets(origin, targets);
    }

    /// Replace the route polyline wholesale and redraw immediately.
    pub fn set_route(&self, route: Option<RouteGeometry>) {
        self.inner.borrow_mut().set_route(route);
    }

    /// Force a redraw against the current projection.
    pub fn redraw(&self) {
        self.inner.borrow_mut().redraw();
    }

    /// Clear the map's listener slot.
    pub fn detach(&self) {
        self.inner.borrow().map.set_viewport_listener(None);
    }
}
