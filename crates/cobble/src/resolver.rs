//! Axis-separated sweep resolution of requested movement.
//!
//! Given a collider, a requested displacement and two sets of rectangles,
//! the resolver computes the largest displacement the collider can actually
//! make:
//!
//! - **Obstacles** may never be overlapped
//! - **Fences** may never be exited (containment, not blocking)
//!
//! Each axis is resolved independently, the second one starting from the
//! collider already moved along the first. Resolving one axis at a time lets
//! an agent pushing diagonally into a wall slide along it instead of
//! stopping dead.
//!
//! # Invariants
//!
//! - `|achieved.x| <= |requested.x|` and `|achieved.y| <= |requested.y|`,
//!   with matching signs
//! - The moved collider overlaps no obstacle it did not already overlap
//! - The moved collider stays inside every fence that contained it before
//! - Degenerate input (empty collider, zero request) yields zero
//!
//! Obstacles already overlapping the collider are ignored so an agent that
//! ends up inside one can still move out.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geom::Rect;

/// Order in which the two axes are resolved.
///
/// The order changes how corners are handled: with `XThenY` a collider
/// pushing diagonally into an outside corner keeps its horizontal progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisOrder {
    /// Resolve horizontal movement first
    #[default]
    XThenY,
    /// Resolve vertical movement first
    YThenX,
}

/// Outcome of a resolution with per-axis blocking flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Displacement actually achieved
    pub achieved: IVec2,
    /// Horizontal movement was cut short
    pub blocked_x: bool,
    /// Vertical movement was cut short
    pub blocked_y: bool,
}

impl Resolution {
    /// True if either axis was cut short.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked_x || self.blocked_y
    }
}

/// Sweep resolver for rectangular colliders.
///
/// # Example
///
/// ```
/// use cobble::{MovementResolver, Rect};
/// use glam::IVec2;
///
/// let resolver = MovementResolver::new();
/// let wall = Rect::new(48, 0, 16, 64);
/// let fence = Rect::new(0, 0, 160, 160);
///
/// // Moving diagonally into the wall: x stops at the wall, y continues.
/// let collider = Rect::new(36, 20, 8, 8);
/// let achieved = resolver.resolve(collider, IVec2::new(10, 6), &[wall], &[fence]);
/// assert_eq!(achieved, IVec2::new(4, 6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementResolver {
    order: AxisOrder,
}

impl MovementResolver {
    /// Creates a resolver with the default `XThenY` order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with a specific axis order.
    #[must_use]
    pub fn with_order(order: AxisOrder) -> Self {
        Self { order }
    }

    /// Returns the axis order.
    #[must_use]
    pub fn order(&self) -> AxisOrder {
        self.order
    }

    /// Computes the achieved displacement for `requested`.
    #[must_use]
    pub fn resolve(
        &self,
        collider: Rect,
        requested: IVec2,
        obstacles: &[Rect],
        fences: &[Rect],
    ) -> IVec2 {
        self.resolve_detailed(collider, requested, obstacles, fences)
            .achieved
    }

    /// Like [`resolve`](Self::resolve), also reporting which axes were cut short.
    #[must_use]
    pub fn resolve_detailed(
        &self,
        collider: Rect,
        requested: IVec2,
        obstacles: &[Rect],
        fences: &[Rect],
    ) -> Resolution {
        if collider.is_empty() || requested == IVec2::ZERO {
            return Resolution {
                achieved: IVec2::ZERO,
                blocked_x: collider.is_empty() && requested.x != 0,
                blocked_y: collider.is_empty() && requested.y != 0,
            };
        }

        let achieved = match self.order {
            AxisOrder::XThenY => {
                let dx = sweep_x(collider, requested.x, obstacles, fences);
                let moved = collider.translated(IVec2::new(dx, 0));
                let dy = sweep_y(moved, requested.y, obstacles, fences);
                IVec2::new(dx, dy)
            }
            AxisOrder::YThenX => {
                let dy = sweep_y(collider, requested.y, obstacles, fences);
                let moved = collider.translated(IVec2::new(0, dy));
                let dx = sweep_x(moved, requested.x, obstacles, fences);
                IVec2::new(dx, dy)
            }
        };

        let resolution = Resolution {
            achieved,
            blocked_x: achieved.x != requested.x,
            blocked_y: achieved.y != requested.y,
        };
        if resolution.is_blocked() {
            trace!(
                ?collider,
                ?requested,
                ?achieved,
                obstacles = obstacles.len(),
                "movement cut short"
            );
        }
        resolution
    }
}

/// True if the two rects overlap on the vertical axis.
fn spans_y(a: &Rect, b: &Rect) -> bool {
    a.y < b.bottom() && b.y < a.bottom()
}

/// True if the two rects overlap on the horizontal axis.
fn spans_x(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right()
}

/// Maximal horizontal displacement with `|d| <= |dx|`.
fn sweep_x(collider: Rect, dx: i32, obstacles: &[Rect], fences: &[Rect]) -> i32 {
    if dx > 0 {
        let mut limit = dx;
        for fence in fences {
            limit = limit.min((fence.right() - collider.right()).max(0));
        }
        for obstacle in obstacles.iter().filter(|o| !o.is_empty()) {
            if spans_y(obstacle, &collider) && obstacle.x >= collider.right() {
                limit = limit.min(obstacle.x - collider.right());
            }
        }
        limit
    } else if dx < 0 {
        let mut limit = -dx;
        for fence in fences {
            limit = limit.min((collider.x - fence.x).max(0));
        }
        for obstacle in obstacles.iter().filter(|o| !o.is_empty()) {
            if spans_y(obstacle, &collider) && obstacle.right() <= collider.x {
                limit = limit.min(collider.x - obstacle.right());
            }
        }
        -limit
    } else {
        0
    }
}

/// Maximal vertical displacement with `|d| <= |dy|`.
fn sweep_y(collider: Rect, dy: i32, obstacles: &[Rect], fences: &[Rect]) -> i32 {
    if dy > 0 {
        let mut limit = dy;
        for fence in fences {
            limit = limit.min((fence.bottom() - collider.bottom()).max(0));
        }
        for obstacle in obstacles.iter().filter(|o| !o.is_empty()) {
            if spans_x(obstacle, &collider) && obstacle.y >= collider.bottom() {
                limit = limit.min(obstacle.y - collider.bottom());
            }
        }
        limit
    } else if dy < 0 {
        let mut limit = -dy;
        for fence in fences {
            limit = limit.min((collider.y - fence.y).max(0));
        }
        for obstacle in obstacles.iter().filter(|o| !o.is_empty()) {
            if spans_x(obstacle, &collider) && obstacle.bottom() <= collider.y {
                limit = limit.min(collider.y - obstacle.bottom());
            }
        }
        -limit
    } else {
        0
    }
}
