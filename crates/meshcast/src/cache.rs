//! Staged geometry reused across queries.

use std::sync::Arc;

use meshcast_math::Transform;

use crate::debug::DebugSink;
use crate::dispatch::{group_count, sequential, ComputeBackend, ParallelBackend, TriangleHit};
use crate::error::Result;
use crate::mesh::{MeshGeometry, MeshSource};
use crate::{reduce, MeshRaycastResult, Ray, RaycastConfig};

/// Everything staged for one mesh + transform pair.
struct Staged<T> {
    geometry: Arc<MeshGeometry>,
    buffers: T,
    groups: [u32; 3],
}

/// World-space geometry staged on a backend, reused until disposed.
///
/// The first query snapshots the mesh, applies the transform and stages the
/// result; later queries only upload the ray. The cache never looks at the
/// mesh again after staging, so a changed mesh or transform needs an
/// explicit [`dispose`](Self::dispose). Dropping the cache disposes it.
///
/// ```
/// use meshcast::{GeometryCache, ParallelBackend, Ray, RaycastConfig, TriangleMesh};
/// use meshcast_math::{Point3, Transform, Vec3};
///
/// let mesh = TriangleMesh::quad(1.0);
/// let mut cache = GeometryCache::new(ParallelBackend::default(), RaycastConfig::default());
///
/// let ray = Ray::new(Point3::new(0.2, 0.1, 2.0), Vec3::new(0.0, 0.0, -1.0));
/// let hit = cache.raycast(&ray, &mesh, &Transform::identity()).unwrap();
/// assert!(hit.hit);
/// assert!(cache.is_initialized());
///
/// cache.dispose();
/// assert!(!cache.is_initialized());
/// ```
pub struct GeometryCache<B: ComputeBackend> {
    backend: B,
    config: RaycastConfig,
    staged: Option<Staged<B::Buffers>>,
}

impl<B: ComputeBackend> GeometryCache<B> {
    /// Create an empty cache; nothing is staged until the first query.
    pub fn new(backend: B, config: RaycastConfig) -> Self {
        Self {
            backend,
            config,
            staged: None,
        }
    }

    /// The execution backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Settings used for staging and reduction.
    pub fn config(&self) -> &RaycastConfig {
        &self.config
    }

    /// Whether geometry is currently staged.
    pub fn is_initialized(&self) -> bool {
        self.staged.is_some()
    }

    /// The staged world-space snapshot, if any.
    pub fn geometry(&self) -> Option<&MeshGeometry> {
        self.staged.as_ref().map(|s| s.geometry.as_ref())
    }

    /// Work groups dispatched per query, if staged.
    pub fn groups(&self) -> Option<[u32; 3]> {
        self.staged.as_ref().map(|s| s.groups)
    }

    /// Snapshot and stage `mesh` under `transform`. No-op once staged.
    ///
    /// On failure nothing is kept, so the next call starts over.
    pub fn initialize<M: MeshSource + ?Sized>(&mut self, mesh: &M, transform: &Transform) -> Result<()> {
        if self.staged.is_some() {
            return Ok(());
        }
        match self.stage(mesh, transform) {
            Ok(staged) => {
                self.staged = Some(staged);
                Ok(())
            }
            Err(err) => {
                log::error!("{} backend failed to stage mesh: {err}", self.backend.name());
                Err(err)
            }
        }
    }

    fn stage<M: MeshSource + ?Sized>(&self, mesh: &M, transform: &Transform) -> Result<Staged<B::Buffers>> {
        self.config.validate()?;
        let geometry = Arc::new(MeshGeometry::from_source(mesh, transform)?);
        let groups = [
            group_count(geometry.triangle_count(), self.backend.group_width()),
            1,
            1,
        ];
        log::debug!(
            "staging {} vertices, {} triangles on {} backend ({} groups of {})",
            geometry.vertex_count(),
            geometry.triangle_count(),
            self.backend.name(),
            groups[0],
            self.backend.group_width(),
        );
        log::trace!("triangle indices {:?}", geometry.indices());

        let buffers = self.backend.stage(geometry.clone(), &self.config)?;
        Ok(Staged {
            geometry,
            buffers,
            groups,
        })
    }

    /// Nearest hit of `ray` against the mesh.
    ///
    /// A mesh without vertices is a miss and never reaches the backend.
    /// Otherwise the geometry is staged on first use and the dispatch blocks
    /// until every triangle has been tested.
    pub fn raycast<M: MeshSource + ?Sized>(
        &mut self,
        ray: &Ray,
        mesh: &M,
        transform: &Transform,
    ) -> Result<MeshRaycastResult> {
        if mesh.positions().is_empty() {
            return Ok(MeshRaycastResult::miss());
        }
        self.initialize(mesh, transform)?;

        let backend = &self.backend;
        let Some(staged) = self.staged.as_mut() else {
            return Ok(MeshRaycastResult::miss());
        };

        log::trace!("{} dispatch {:?}", backend.name(), staged.groups);
        backend.dispatch(&mut staged.buffers, ray, staged.groups)?;

        Ok(reduce::resolve(
            ray,
            backend.outcomes(&staged.buffers),
            self.config.miss_distance,
        ))
    }

    /// Sequential trace over the staged geometry, streaming intermediate
    /// triangles to `sink` and returning every hit.
    pub fn trace_debug<M: MeshSource + ?Sized>(
        &mut self,
        ray: &Ray,
        mesh: &M,
        transform: &Transform,
        sink: &mut dyn DebugSink,
    ) -> Result<Vec<TriangleHit>> {
        if mesh.positions().is_empty() {
            return Ok(Vec::new());
        }
        self.initialize(mesh, transform)?;
        Ok(match self.geometry() {
            Some(geometry) => sequential::trace(ray, geometry, self.config.epsilon, sink),
            None => Vec::new(),
        })
    }

    /// Release staged buffers and the snapshot. The next query re-stages.
    pub fn dispose(&mut self) {
        if let Some(staged) = self.staged.take() {
            log::debug!(
                "releasing {} staged triangles from {} backend",
                staged.geometry.triangle_count(),
                self.backend.name()
            );
        }
    }
}

impl<B: ComputeBackend> Drop for GeometryCache<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// One-shot nearest-hit query on the CPU parallel backend with default
/// settings. Use a [`GeometryCache`] to amortize staging over many rays.
pub fn raycast<M: MeshSource + ?Sized>(
    ray: &Ray,
    mesh: &M,
    transform: &Transform,
) -> Result<MeshRaycastResult> {
    let config = RaycastConfig::default();
    GeometryCache::new(ParallelBackend::from_config(&config), config).raycast(ray, mesh, transform)
}
