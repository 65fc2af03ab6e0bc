//! Sinks for the sequential tracer's visualization stream.
//!
//! The tracer never reads anything back from a sink; renderers implement
//! [`DebugSink`] to draw the overlay, tests use [`RecordingSink`].

use meshcast_math::{Point3, Vec3};

/// Receiver of intermediate geometry from the sequential tracer.
pub trait DebugSink {
    /// The ray being traced, emitted once per trace.
    fn ray(&mut self, origin: Point3, direction: Vec3);
    /// A triangle vertex.
    fn vertex(&mut self, point: Point3);
    /// An edge vector anchored at `from`.
    fn edge(&mut self, from: Point3, vector: Vec3);
    /// A segment between two points.
    fn line(&mut self, from: Point3, to: Point3);
    /// A surface point where the ray hit a triangle.
    fn hit(&mut self, point: Point3);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn ray(&mut self, _: Point3, _: Vec3) {}
    fn vertex(&mut self, _: Point3) {}
    fn edge(&mut self, _: Point3, _: Vec3) {}
    fn line(&mut self, _: Point3, _: Point3) {}
    fn hit(&mut self, _: Point3) {}
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugPrimitive {
    /// See [`DebugSink::ray`].
    Ray {
        /// Ray origin.
        origin: Point3,
        /// Ray direction.
        direction: Vec3,
    },
    /// See [`DebugSink::vertex`].
    Vertex(Point3),
    /// See [`DebugSink::edge`].
    Edge {
        /// Anchor point.
        from: Point3,
        /// Edge vector.
        vector: Vec3,
    },
    /// See [`DebugSink::line`].
    Line {
        /// Start point.
        from: Point3,
        /// End point.
        to: Point3,
    },
    /// See [`DebugSink::hit`].
    Hit(Point3),
}

/// Sink that keeps every primitive in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Recorded primitives.
    pub primitives: Vec<DebugPrimitive>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded hit points, in emission order.
    pub fn hits(&self) -> impl Iterator<Item = Point3> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            DebugPrimitive::Hit(point) => Some(*point),
            _ => None,
        })
    }
}

impl DebugSink for RecordingSink {
    fn ray(&mut self, origin: Point3, direction: Vec3) {
        self.primitives.push(DebugPrimitive::Ray { origin, direction });
    }

    fn vertex(&mut self, point: Point3) {
        self.primitives.push(DebugPrimitive::Vertex(point));
    }

    fn edge(&mut self, from: Point3, vector: Vec3) {
        self.primitives.push(DebugPrimitive::Edge { from, vector });
    }

    fn line(&mut self, from: Point3, to: Point3) {
        self.primitives.push(DebugPrimitive::Line { from, to });
    }

    fn hit(&mut self, point: Point3) {
        self.primitives.push(DebugPrimitive::Hit(point));
    }
}

/// Sink that writes each primitive to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn ray(&mut self, origin: Point3, direction: Vec3) {
        log::debug!("ray {} dir {}", xyz(&origin.coords), xyz(&direction));
    }

    fn vertex(&mut self, point: Point3) {
        log::debug!("vertex {}", xyz(&point.coords));
    }

    fn edge(&mut self, from: Point3, vector: Vec3) {
        log::debug!("edge {} + {}", xyz(&from.coords), xyz(&vector));
    }

    fn line(&mut self, from: Point3, to: Point3) {
        log::debug!("line {} -> {}", xyz(&from.coords), xyz(&to.coords));
    }

    fn hit(&mut self, point: Point3) {
        log::debug!("hit {}", xyz(&point.coords));
    }
}

fn xyz(v: &Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}
