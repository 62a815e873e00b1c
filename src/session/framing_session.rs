use std::sync::Arc;

use rayon::prelude::*;

use crate::eval::declaration::DeclarationBuilder;
use crate::eval::evaluator::{CacheStats, ContextKind, EvalContext, FramingEvaluator, FramingSolution};
use crate::foundation::config::FramingConfig;
use crate::foundation::core::{FrameIndex, FrameRange, SampleTime};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::PlanarTarget;
use crate::render::resolution::RenderResolution;
use crate::scene::document::Scene;
use crate::scene::host::{SampleSource, SceneHost};

/// Options controlling `FramingSession` range solving.
#[derive(Clone, Debug)]
pub struct SessionOpts {
    /// Solve samples on a dedicated rayon pool, one evaluation context per worker.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Samples per frame. `1` solves whole frames only.
    pub subframes: u32,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            subframes: 1,
        }
    }
}

/// Result for one sample of a range.
#[derive(Debug)]
pub struct SampleOutcome {
    /// Sample time.
    pub time: SampleTime,
    /// Solution, or the per-sample error that prevented it.
    pub result: SquinchResult<FramingSolution>,
}

/// Range solve statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RangeStats {
    /// Total samples in the requested range.
    pub samples_total: u64,
    /// Samples with a solution.
    pub samples_solved: u64,
    /// Samples that failed with a per-sample error.
    pub samples_failed: u64,
}

/// Outcomes of a range solve, in sample order.
#[derive(Debug)]
pub struct RangeSolve {
    /// One outcome per sample.
    pub outcomes: Vec<SampleOutcome>,
    /// Summary counts.
    pub stats: RangeStats,
}

/// Comparison of a sequential preview pass against a parallel final pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ParityReport {
    /// Samples compared.
    pub samples: u64,
    /// Samples whose outputs (or failure status) differ.
    pub mismatches: Vec<SampleTime>,
}

impl ParityReport {
    /// Return `true` when every sample matched bit for bit.
    pub fn is_identical(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Session-oriented framing solver.
///
/// A session front-loads target setup, the dependency declaration and the evaluator, then serves
/// single samples (through a persistent preview context) and ranges.
pub struct FramingSession {
    source: Arc<dyn SampleSource>,
    evaluator: FramingEvaluator,
    preview: EvalContext,
    duration_frames: u64,
    base_resolution_x: u32,
    opts: SessionOpts,
}

impl FramingSession {
    /// Construct a session for a scene description.
    pub fn new(scene: &Scene, opts: SessionOpts) -> SquinchResult<Self> {
        let host = SceneHost::new(scene)?;
        let target = host.target().clone();
        let def = scene.def();
        Self::from_source(
            Arc::new(host),
            target,
            def.config,
            def.duration,
            def.base_resolution_x,
            opts,
        )
    }

    /// Construct a session around any host implementation.
    pub fn from_source(
        source: Arc<dyn SampleSource>,
        target: PlanarTarget,
        config: FramingConfig,
        duration_frames: u64,
        base_resolution_x: u32,
        opts: SessionOpts,
    ) -> SquinchResult<Self> {
        if opts.subframes == 0 {
            return Err(SquinchError::validation("subframes must be >= 1"));
        }
        let declaration = source
            .path_parameters()
            .into_iter()
            .fold(DeclarationBuilder::new(), DeclarationBuilder::path_parameter)
            .build()?;
        let evaluator = FramingEvaluator::new(target, config, declaration)?;
        let preview = evaluator.context(ContextKind::Preview);
        tracing::debug!(
            duration_frames,
            subframes = opts.subframes,
            parallel = opts.parallel,
            "framing session ready"
        );
        Ok(Self {
            source,
            evaluator,
            preview,
            duration_frames,
            base_resolution_x,
            opts,
        })
    }

    /// Shared evaluator.
    pub fn evaluator(&self) -> &FramingEvaluator {
        &self.evaluator
    }

    /// Cache counters of the persistent preview context.
    pub fn preview_stats(&self) -> CacheStats {
        self.preview.stats()
    }

    /// Full duration as a frame range.
    pub fn full_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.duration_frames),
        }
    }

    /// Solve one sample through the preview context.
    pub fn solve_sample(&mut self, time: SampleTime) -> SquinchResult<FramingSolution> {
        if !self.full_range().contains(time.frame) {
            return Err(SquinchError::validation(
                "solve_sample frame must be within scene duration",
            ));
        }
        let snapshot = self.source.snapshot(time)?;
        self.preview.evaluate(&snapshot)
    }

    /// Solve every sample of a frame range.
    ///
    /// Sequential solving reuses the preview context. Parallel solving gives each rayon worker its
    /// own final-render context. Either way outcomes come back in sample order, and per-sample
    /// failures are recorded without aborting the range.
    #[tracing::instrument(skip(self), fields(parallel = self.opts.parallel))]
    pub fn solve_range(&mut self, range: FrameRange) -> SquinchResult<RangeSolve> {
        let times = self.sample_times(range)?;
        let outcomes = if self.opts.parallel {
            self.solve_parallel(&times)?
        } else {
            let mut out = Vec::with_capacity(times.len());
            for &time in &times {
                let result = self
                    .source
                    .snapshot(time)
                    .and_then(|s| self.preview.evaluate(&s));
                out.push(SampleOutcome { time, result });
            }
            out
        };
        finish_range(outcomes)
    }

    /// Solve `range` sequentially in a fresh preview context and in parallel final-render
    /// contexts, then compare outputs bit for bit.
    pub fn parity(&self, range: FrameRange) -> SquinchResult<ParityReport> {
        let times = self.sample_times(range)?;

        let mut preview = self.evaluator.context(ContextKind::Preview);
        let sequential: Vec<SampleOutcome> = times
            .iter()
            .map(|&time| SampleOutcome {
                time,
                result: self.source.snapshot(time).and_then(|s| preview.evaluate(&s)),
            })
            .collect();
        let parallel = self.solve_parallel(&times)?;

        let mut report = ParityReport {
            samples: times.len() as u64,
            mismatches: Vec::new(),
        };
        for (a, b) in sequential.iter().zip(&parallel) {
            let same = match (&a.result, &b.result) {
                (Ok(x), Ok(y)) => x.output_fingerprint() == y.output_fingerprint(),
                (Err(x), Err(y)) => x.to_string() == y.to_string(),
                _ => false,
            };
            if !same {
                report.mismatches.push(a.time);
            }
        }
        tracing::info!(
            samples = report.samples,
            mismatches = report.mismatches.len(),
            "parity check finished"
        );
        Ok(report)
    }

    /// Render resolution matching the target footprint.
    pub fn render_resolution(&self) -> SquinchResult<RenderResolution> {
        RenderResolution::for_footprint(self.evaluator.target().footprint(), self.base_resolution_x)
    }

    fn sample_times(&self, range: FrameRange) -> SquinchResult<Vec<SampleTime>> {
        if range.is_empty() {
            return Err(SquinchError::validation("solve_range range must be non-empty"));
        }
        if range.end.0 > self.duration_frames {
            return Err(SquinchError::validation(
                "solve_range range must be within scene duration",
            ));
        }
        Ok(range.sample_times(self.opts.subframes))
    }

    fn solve_parallel(&self, times: &[SampleTime]) -> SquinchResult<Vec<SampleOutcome>> {
        let pool = build_thread_pool(self.opts.threads)?;
        let source = &self.source;
        let evaluator = &self.evaluator;
        Ok(pool.install(|| {
            times
                .par_iter()
                .map_init(
                    || evaluator.context(ContextKind::FinalRender),
                    |ctx, &time| SampleOutcome {
                        time,
                        result: source.snapshot(time).and_then(|s| ctx.evaluate(&s)),
                    },
                )
                .collect()
        }))
    }
}

fn finish_range(mut outcomes: Vec<SampleOutcome>) -> SquinchResult<RangeSolve> {
    if let Some(pos) = outcomes
        .iter()
        .position(|o| o.result.as_ref().is_err_and(|e| !e.is_per_sample()))
    {
        let aborted = outcomes.swap_remove(pos);
        if let Err(e) = aborted.result {
            tracing::error!(
                frame = aborted.time.frame.0,
                subframe = aborted.time.subframe,
                error = %e,
                "range aborted"
            );
            return Err(e);
        }
    }

    let mut stats = RangeStats {
        samples_total: outcomes.len() as u64,
        ..RangeStats::default()
    };
    for o in &outcomes {
        match &o.result {
            Ok(_) => stats.samples_solved += 1,
            Err(e) => {
                tracing::warn!(frame = o.time.frame.0, subframe = o.time.subframe, error = %e, "sample not framed");
                stats.samples_failed += 1;
            }
        }
    }
    tracing::info!(
        total = stats.samples_total,
        solved = stats.samples_solved,
        failed = stats.samples_failed,
        "range solved"
    );
    Ok(RangeSolve { outcomes, stats })
}

fn build_thread_pool(threads: Option<usize>) -> SquinchResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SquinchError::validation(
            "solve_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SquinchError::validation(format!("failed to build rayon thread pool: {e}")))
}
