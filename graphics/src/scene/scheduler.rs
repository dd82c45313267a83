//! Draw scheduler.
//!
//! Per frame the scheduler moves through
//! `Collecting → SortedOpaque → SortedTransparent → Issued`:
//!
//! 1. Drawables are submitted in any order and classified into the opaque or
//!    the transparent bucket.
//! 2. The opaque bucket is stable-sorted by program, so drawables sharing a
//!    program stay in submission order.
//! 3. The transparent bucket keeps submission order exactly.
//! 4. Opaque draws are issued first, then transparent ones. A draw that fails
//!    is logged and skipped; the frame always reaches `Issued`.
//!
//! [`reset`](DrawScheduler::reset) empties both buckets and returns to
//! `Collecting`.

use crate::error::{DrawError, SchedulerError};
use crate::program::ProgramId;

use super::drawable::{Drawable, RenderBucket};

/// Frame state of the [`DrawScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    Collecting,
    SortedOpaque,
    SortedTransparent,
    Issued,
}

/// A submitted drawable and its position in submission order.
#[derive(Debug, Clone)]
pub struct QueuedDraw {
    pub index: usize,
    pub drawable: Drawable,
}

/// A draw that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDraw {
    /// Submission index within the frame.
    pub index: usize,
    pub label: Option<String>,
    pub bucket: RenderBucket,
    pub error: DrawError,
}

/// Outcome of [`DrawScheduler::issue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSummary {
    pub issued: usize,
    pub skipped: Vec<SkippedDraw>,
}

/// Orders drawables into buckets and issues them deterministically.
#[derive(Debug)]
pub struct DrawScheduler {
    state: FrameState,
    opaque: Vec<QueuedDraw>,
    transparent: Vec<QueuedDraw>,
    submitted: usize,
}

impl Default for DrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawScheduler {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(opaque: usize, transparent: usize) -> Self {
        Self {
            state: FrameState::Collecting,
            opaque: Vec::with_capacity(opaque),
            transparent: Vec::with_capacity(transparent),
            submitted: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Queue a drawable. Only allowed while collecting.
    pub fn submit(&mut self, drawable: Drawable) -> Result<RenderBucket, SchedulerError> {
        if self.state != FrameState::Collecting {
            return Err(SchedulerError::NotCollecting(self.state));
        }
        let bucket = drawable.bucket();
        let queued = QueuedDraw {
            index: self.submitted,
            drawable,
        };
        self.submitted += 1;
        match bucket {
            RenderBucket::Opaque => self.opaque.push(queued),
            RenderBucket::Transparent => self.transparent.push(queued),
        }
        Ok(bucket)
    }

    /// Stable-sort the opaque bucket by program.
    ///
    /// `program_of` yields `None` for drawables whose material has no usable
    /// program; those sort after every other draw and fail when issued.
    pub fn sort_opaque<F>(&mut self, mut program_of: F) -> Result<(), SchedulerError>
    where
        F: FnMut(&Drawable) -> Option<ProgramId>,
    {
        self.transition("sort opaque drawables", FrameState::Collecting, FrameState::SortedOpaque)?;
        self.opaque.sort_by_cached_key(|queued| {
            let program = program_of(&queued.drawable);
            (program.is_none(), program)
        });
        Ok(())
    }

    /// Seal the transparent bucket. Its order is never changed.
    pub fn sort_transparent(&mut self) -> Result<(), SchedulerError> {
        self.transition(
            "sort transparent drawables",
            FrameState::SortedOpaque,
            FrameState::SortedTransparent,
        )
    }

    /// Issue the opaque bucket, then the transparent bucket.
    ///
    /// A draw whose `issue_draw` fails is logged and recorded as skipped.
    pub fn issue<F>(&mut self, mut issue_draw: F) -> Result<IssueSummary, SchedulerError>
    where
        F: FnMut(&QueuedDraw) -> Result<(), DrawError>,
    {
        self.transition("issue drawables", FrameState::SortedTransparent, FrameState::Issued)?;

        let mut summary = IssueSummary::default();
        let buckets = [
            (RenderBucket::Opaque, &self.opaque),
            (RenderBucket::Transparent, &self.transparent),
        ];
        for (bucket, queue) in buckets {
            for queued in queue.iter() {
                match issue_draw(queued) {
                    Ok(()) => summary.issued += 1,
                    Err(error) => {
                        log::warn!(
                            "Skipping draw #{} ({}): {}",
                            queued.index,
                            queued.drawable.label.as_deref().unwrap_or("unnamed"),
                            error
                        );
                        summary.skipped.push(SkippedDraw {
                            index: queued.index,
                            label: queued.drawable.label.clone(),
                            bucket,
                            error,
                        });
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Empty both buckets and start collecting the next frame.
    pub fn reset(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.submitted = 0;
        self.state = FrameState::Collecting;
    }

    pub fn opaque(&self) -> &[QueuedDraw] {
        &self.opaque
    }

    pub fn transparent(&self) -> &[QueuedDraw] {
        &self.transparent
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn transition(
        &mut self,
        operation: &'static str,
        from: FrameState,
        to: FrameState,
    ) -> Result<(), SchedulerError> {
        if self.state != from {
            return Err(SchedulerError::InvalidTransition {
                operation,
                state: self.state,
            });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::backend::BufferHandle;
    use crate::materials::{MaterialDescriptor, MaterialKind};
    use crate::mesh::{Mesh, VertexLayout};

    fn mesh() -> Arc<Mesh> {
        Arc::new(Mesh::new(
            VertexLayout::standard(),
            vec![BufferHandle::from_raw(1)],
            3,
        ))
    }

    fn drawable(descriptor: &Arc<MaterialDescriptor>, label: &str) -> Drawable {
        Drawable::new(mesh(), Arc::clone(descriptor)).with_label(label)
    }

    fn run_to_issued(
        scheduler: &mut DrawScheduler,
        programs: &HashMap<String, ProgramId>,
    ) -> Vec<String> {
        scheduler
            .sort_opaque(|d| programs.get(d.material.material().as_str()).copied())
            .unwrap();
        scheduler.sort_transparent().unwrap();
        let mut order = Vec::new();
        scheduler
            .issue(|queued| {
                order.push(queued.drawable.label.clone().unwrap_or_default());
                Ok(())
            })
            .unwrap();
        order
    }

    #[test]
    fn test_opaque_sorted_stably_by_program() {
        let flat = MaterialKind::FlatLit.descriptor();
        let color = MaterialKind::VertexColor.descriptor();
        let programs = HashMap::from([
            ("flat_lit".to_string(), ProgramId::new(1)),
            ("vertex_color".to_string(), ProgramId::new(0)),
        ]);
        let mut scheduler = DrawScheduler::new();
        scheduler.submit(drawable(&flat, "f1")).unwrap();
        scheduler.submit(drawable(&color, "c1")).unwrap();
        scheduler.submit(drawable(&flat, "f2")).unwrap();
        scheduler.submit(drawable(&color, "c2")).unwrap();

        assert_eq!(run_to_issued(&mut scheduler, &programs), ["c1", "c2", "f1", "f2"]);
        assert_eq!(scheduler.state(), FrameState::Issued);
    }

    #[test]
    fn test_transparent_keeps_submission_order() {
        let glyph = MaterialKind::Glyph.descriptor();
        let light = MaterialKind::PointLight.descriptor();
        let programs = HashMap::from([
            ("glyph".to_string(), ProgramId::new(1)),
            ("point_light".to_string(), ProgramId::new(0)),
        ]);
        let mut scheduler = DrawScheduler::new();
        let submissions = [(&glyph, "g1"), (&light, "l1"), (&glyph, "g2"), (&light, "l2")];
        for (descriptor, label) in submissions {
            assert_eq!(
                scheduler.submit(drawable(descriptor, label)).unwrap(),
                RenderBucket::Transparent
            );
        }

        assert_eq!(run_to_issued(&mut scheduler, &programs), ["g1", "l1", "g2", "l2"]);
    }

    #[test]
    fn test_unusable_programs_sort_last() {
        let flat = MaterialKind::FlatLit.descriptor();
        let noise = MaterialKind::Noise.descriptor();
        let programs = HashMap::from([("flat_lit".to_string(), ProgramId::new(5))]);
        let mut scheduler = DrawScheduler::new();
        scheduler.submit(drawable(&noise, "broken")).unwrap();
        scheduler.submit(drawable(&flat, "ok")).unwrap();

        assert_eq!(run_to_issued(&mut scheduler, &programs), ["ok", "broken"]);
    }

    #[test]
    fn test_submit_after_sort_is_rejected() {
        let flat = MaterialKind::FlatLit.descriptor();
        let mut scheduler = DrawScheduler::new();
        scheduler.sort_opaque(|_| None).unwrap();

        assert_eq!(
            scheduler.submit(drawable(&flat, "late")).unwrap_err(),
            SchedulerError::NotCollecting(FrameState::SortedOpaque)
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_out_of_order_transitions() {
        let mut scheduler = DrawScheduler::new();
        assert!(matches!(
            scheduler.sort_transparent(),
            Err(SchedulerError::InvalidTransition { state: FrameState::Collecting, .. })
        ));
        assert!(scheduler.issue(|_| Ok(())).is_err());
        assert_eq!(scheduler.state(), FrameState::Collecting);
    }

    #[test]
    fn test_failed_draw_is_skipped() {
        let flat = MaterialKind::FlatLit.descriptor();
        let mut scheduler = DrawScheduler::new();
        for label in ["a", "bad", "c"] {
            scheduler.submit(drawable(&flat, label)).unwrap();
        }
        scheduler.sort_opaque(|_| Some(ProgramId::new(0))).unwrap();
        scheduler.sort_transparent().unwrap();

        let summary = scheduler
            .issue(|queued| match queued.drawable.label.as_deref() {
                Some("bad") => Err(DrawError::MissingUniform("u_color".into())),
                _ => Ok(()),
            })
            .unwrap();

        assert_eq!(summary.issued, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].index, 1);
        assert_eq!(scheduler.state(), FrameState::Issued);
    }

    #[test]
    fn test_reset_clears_buckets() {
        let flat = MaterialKind::FlatLit.descriptor();
        let glyph = MaterialKind::Glyph.descriptor();
        let mut scheduler = DrawScheduler::with_capacity(4, 4);
        scheduler.submit(drawable(&flat, "a")).unwrap();
        scheduler.submit(drawable(&glyph, "b")).unwrap();
        run_to_issued(&mut scheduler, &HashMap::new());

        scheduler.reset();

        assert_eq!(scheduler.state(), FrameState::Collecting);
        assert!(scheduler.opaque().is_empty());
        assert!(scheduler.transparent().is_empty());

        run_to_issued(&mut scheduler, &HashMap::new());
        let summary = {
            scheduler.reset();
            scheduler.sort_opaque(|_| None).unwrap();
            scheduler.sort_transparent().unwrap();
            scheduler.issue(|_| Ok(())).unwrap()
        };
        assert_eq!(summary, IssueSummary::default());
    }
}
