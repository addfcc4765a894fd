use crate::shape::{PositionBuffer, ShapeGenerator, ShapeId};

/// Progress within this distance of 1.0 is treated as finished.
const SNAP_EPSILON: f32 = 1e-4;

/// Double-buffered morph between two index-aligned point clouds.
///
/// The GPU stage receives both buffers plus [`progress`](Self::progress) and
/// lerps per particle every frame. [`version`](Self::version) changes whenever
/// either buffer is replaced so the renderer knows to re-upload.
#[derive(Debug, Clone)]
pub struct MorphEngine {
    current: PositionBuffer,
    target: PositionBuffer,
    progress: f32,
    step: f32,
    shape: ShapeId,
    count: usize,
    version: u64,
}

impl MorphEngine {
    /// Starts settled on `shape`: progress is 1.0 and no morph runs.
    pub fn new(generator: &ShapeGenerator, shape: ShapeId, count: usize, step: f32) -> Self {
        Self {
            current: generator.generate(shape, count),
            target: generator.generate(shape, count),
            progress: 1.0,
            step,
            shape,
            count,
            version: 0,
        }
    }

    pub fn current(&self) -> &PositionBuffer {
        &self.current
    }

    pub fn target(&self) -> &PositionBuffer {
        &self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    /// Brings the buffers in line with the requested shape and count.
    ///
    /// A count change wins over a shape change in the same call: the cloud is
    /// regenerated for the new shape without a morph.
    pub fn sync(&mut self, generator: &ShapeGenerator, shape: ShapeId, count: usize) {
        if count != self.count {
            self.shape = shape;
            self.resize(generator, count);
        } else if shape != self.shape {
            self.set_shape(generator, shape);
        }
    }

    /// Starts a morph to `shape`. The old target becomes the start buffer.
    pub fn set_shape(&mut self, generator: &ShapeGenerator, shape: ShapeId) {
        let fresh = generator.generate(shape, self.count);
        self.current = std::mem::replace(&mut self.target, fresh);
        self.shape = shape;
        self.progress = 0.0;
        self.version += 1;
    }

    /// Regenerates both buffers at `count` points and skips the morph.
    pub fn resize(&mut self, generator: &ShapeGenerator, count: usize) {
        let fresh = generator.generate(self.shape, count);
        self.current = fresh.clone();
        self.target = fresh;
        self.count = count;
        self.progress = 1.0;
        self.version += 1;
    }

    /// One frame of progress, clamped at 1.0.
    pub fn advance(&mut self) {
        if self.progress >= 1.0 {
            return;
        }
        self.progress = (self.progress + self.step).min(1.0);
        if 1.0 - self.progress < SNAP_EPSILON {
            self.progress = 1.0;
        }
    }

    /// CPU lerp of particle `i`, matching the vertex stage.
    pub fn mixed(&self, i: usize) -> [f32; 3] {
        let a = self.current.point(i);
        let b = self.target.point(i);
        let t = self.progress;
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    }
}
