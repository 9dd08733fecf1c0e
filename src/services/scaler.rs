use crate::error::{ConfigError, ScaleError};
use crate::models::{AppConfig, Block, FailurePolicy, Image, SectionId};
use crate::services::progress::ProgressReporter;
use crate::services::worker_pool::{PoolReport, Task, TaskQueueBuilder, WorkerPool};
use dominant_tiles::{reduce_section, ColorKey, Factor, Remainder, Section, SectionPlan};

/// Result of a downscale run.
#[derive(Debug)]
pub struct ScaleOutcome {
    pub image: Image,
    /// `None` when the factor was 1x1 and nothing was planned.
    pub plan: Option<SectionPlan>,
    /// Sections left black under [`FailurePolicy::Continue`].
    pub failed_sections: Vec<SectionId>,
}

/// Plans sections, reduces them on a worker pool and assembles the result.
pub struct Downscaler {
    config: AppConfig,
}

impl Downscaler {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn downscale(&self, image: &Image, factor: Factor) -> Result<ScaleOutcome, ScaleError> {
        if factor.is_identity() {
            tracing::info!("Factor is 1x1, passing image through unchanged");
            return Ok(ScaleOutcome {
                image: image.clone(),
                plan: None,
                failed_sections: Vec::new(),
            });
        }

        ColorKey::check_bands(image.bands()).map_err(ConfigError::from)?;
        let plan = SectionPlan::new(
            image.width(),
            image.height(),
            factor,
            self.config.hardware_concurrency()?,
            self.config.remainder.into(),
        )
        .map_err(ConfigError::from)?;

        let mut outcome = self.run_plan(image, &plan)?;
        outcome.plan = Some(plan);
        Ok(outcome)
    }

    /// Execute an existing plan against `image`.
    pub fn run_plan(&self, image: &Image, plan: &SectionPlan) -> Result<ScaleOutcome, ScaleError> {
        let bands = image.bands();
        let factor = plan.factor();
        let pad_edge = plan.remainder() == Remainder::PadEdge;

        tracing::info!(
            workers = plan.worker_count(),
            sections = plan.section_count(),
            section_width = plan.x_section_size(),
            section_height = plan.y_section_size(),
            output_width = plan.output_width(),
            output_height = plan.output_height(),
            "Planned sections"
        );
        let dropped_columns = image.width().saturating_sub(plan.processed_width());
        let dropped_rows = image.height().saturating_sub(plan.processed_height());
        if !pad_edge && (dropped_columns > 0 || dropped_rows > 0) {
            tracing::info!(
                columns = dropped_columns,
                rows = dropped_rows,
                "Discarding trailing remainder"
            );
        }

        tracing::info!("Creating tasks");
        let sections: Vec<Section> = plan.sections().collect();
        let mut results: Vec<Vec<u8>> = sections
            .iter()
            .map(|section| vec![0u8; section.output_len(bands)])
            .collect();

        let mut builder = TaskQueueBuilder::with_capacity(sections.len());
        for (section, out) in sections.iter().zip(results.iter_mut()) {
            builder.push(Task::new(SectionId::from(section), move || {
                let block = if pad_edge {
                    image.extract_region_clamped(section.x, section.y, section.width, section.height)?
                } else {
                    image.extract_region(section.x, section.y, section.width, section.height)?
                };
                reduce_section(
                    &block,
                    section.width as usize,
                    section.height as usize,
                    bands,
                    factor,
                    out,
                )?;
                Ok(())
            }));
        }
        let queue = builder.build();
        tracing::info!(tasks = queue.len(), "Created tasks");
        tracing::info!(pixels = plan.scheduled_pixels(), "Total pixels to be processed");

        let progress = ProgressReporter::new(
            plan.scheduled_pixels(),
            plan.task_pixels(),
            self.config.progress_interval(),
        );
        let report = WorkerPool::new(plan.worker_count())
            .cancel_on_failure(self.config.on_failure == FailurePolicy::Abort)
            .run(queue, &progress)
            .map_err(ScaleError::WorkerSpawn)?;
        let failed_sections = self.check_failures(report)?;

        let blocks = sections.iter().zip(results).map(|(section, pixels)| Block {
            x: section.output_x,
            y: section.output_y,
            width: section.output_width,
            height: section.output_height,
            pixels,
        });
        let output = Image::compose_from_blocks(
            plan.output_width(),
            plan.output_height(),
            image.format(),
            blocks,
        )?;
        progress.finish();

        Ok(ScaleOutcome {
            image: output,
            plan: None,
            failed_sections,
        })
    }

    /// Apply the failure policy to a finished pool run.
    fn check_failures(&self, report: PoolReport<SectionId>) -> Result<Vec<SectionId>, ScaleError> {
        for failure in &report.failures {
            tracing::error!(section = %failure.key, error = %failure.error, "Section failed");
        }
        if report.failures.is_empty() {
            return Ok(Vec::new());
        }

        match self.config.on_failure {
            FailurePolicy::Abort => Err(ScaleError::SectionsFailed {
                total: report.total,
                failures: report.failures,
            }),
            FailurePolicy::Continue => {
                tracing::warn!(
                    failed = report.failures.len(),
                    total = report.total,
                    "Continuing with failed sections left black"
                );
                let mut failed: Vec<SectionId> = report.failures.into_iter().map(|f| f.key).collect();
                failed.sort();
                Ok(failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::models::{PixelFormat, RemainderPolicy};
    use crate::services::worker_pool::TaskFailure;
    use pretty_assertions::assert_eq;

    fn config(threads: usize) -> AppConfig {
        AppConfig {
            threads: Some(threads),
            ..Default::default()
        }
    }

    fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Image {
        Image::new(width, height, PixelFormat::Gray, pixels).unwrap()
    }

    /// Every output pixel computed directly from its tile, without sections.
    fn reference(image: &Image, factor: Factor, out_w: u32, out_h: u32) -> Vec<u8> {
        let bands = image.bands();
        let mut out = vec![0u8; out_w as usize * out_h as usize * bands];
        for ty in 0..out_h {
            for tx in 0..out_w {
                let block = image
                    .extract_region(tx * factor.x(), ty * factor.y(), factor.x(), factor.y())
                    .unwrap();
                let at = (ty as usize * out_w as usize + tx as usize) * bands;
                reduce_section(
                    &block,
                    factor.x() as usize,
                    factor.y() as usize,
                    bands,
                    factor,
                    &mut out[at..at + bands],
                )
                .unwrap();
            }
        }
        out
    }

    #[test]
    fn test_four_by_four_downscale() {
        let image = gray(
            4,
            4,
            vec![
                1, 1, 2, 2, //
                1, 1, 2, 2, //
                3, 3, 4, 4, //
                3, 3, 4, 4,
            ],
        );
        let outcome = Downscaler::new(config(1))
            .downscale(&image, Factor::new(2, 2).unwrap())
            .unwrap();

        assert_eq!(outcome.image, gray(2, 2, vec![1, 2, 3, 4]));
        assert!(outcome.plan.is_some());
        assert!(outcome.failed_sections.is_empty());
    }

    #[test]
    fn test_identity_factor_passes_through() {
        let image = gray(3, 1, vec![9, 8, 7]);
        let outcome = Downscaler::new(config(4))
            .downscale(&image, Factor::new(1, 1).unwrap())
            .unwrap();

        assert_eq!(outcome.image, image);
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn test_truncates_to_processed_area() {
        // 10 wide with factor 3: column 9 is dropped.
        let mut pixels = vec![0u8; 30];
        for y in 0..3 {
            pixels[y * 10 + 9] = 200;
        }
        let outcome = Downscaler::new(config(2))
            .downscale(&gray(10, 3, pixels), Factor::new(3, 1).unwrap())
            .unwrap();

        let plan = outcome.plan.unwrap();
        assert_eq!(outcome.image.width(), plan.output_width());
        assert!(outcome.image.width() <= 3);
        assert!(outcome.image.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_pad_edge_covers_remainder() {
        let mut pixels = vec![0u8; 30];
        for y in 0..3 {
            pixels[y * 10 + 9] = 200;
        }
        let config = AppConfig {
            threads: Some(2),
            remainder: RemainderPolicy::PadEdge,
            ..Default::default()
        };
        let outcome = Downscaler::new(config)
            .downscale(&gray(10, 3, pixels), Factor::new(3, 1).unwrap())
            .unwrap();

        let width = outcome.image.width();
        assert_eq!(outcome.image.pixel(width - 1, 0), Some(&[200u8][..]));
    }

    #[test]
    fn test_parallel_result_matches_reference() {
        let (width, height) = (96u32, 64u32);
        let pixels: Vec<u8> = (0..width * height * 3)
            .map(|i| ((i / 3) * 7 % 5) as u8 * 50 + (i % 3) as u8)
            .collect();
        let image = Image::new(width, height, PixelFormat::Rgb, pixels).unwrap();
        let factor = Factor::new(3, 2).unwrap();

        for threads in [1, 2, 4, 8] {
            let outcome = Downscaler::new(config(threads))
                .downscale(&image, factor)
                .unwrap();
            let expected = reference(
                &image,
                factor,
                outcome.image.width(),
                outcome.image.height(),
            );
            assert_eq!(outcome.image.pixels(), expected.as_slice(), "threads {}", threads);
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let pixels: Vec<u8> = (0..40u32 * 40).map(|i| (i * 31 % 7) as u8).collect();
        let image = gray(40, 40, pixels);
        let factor = Factor::new(2, 2).unwrap();
        let downscaler = Downscaler::new(config(4));

        let a = downscaler.downscale(&image, factor).unwrap();
        let b = downscaler.downscale(&image, factor).unwrap();
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn test_factor_not_smaller_than_image_is_rejected() {
        let err = Downscaler::new(config(1))
            .downscale(&gray(4, 4, vec![0; 16]), Factor::new(4, 2).unwrap())
            .unwrap_err();
        assert!(matches!(err, ScaleError::Configuration(ConfigError::Plan(_))));
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let err = Downscaler::new(config(0))
            .downscale(&gray(4, 4, vec![0; 16]), Factor::new(2, 2).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ScaleError::Configuration(ConfigError::ZeroThreads)
        ));
    }

    fn failed_report() -> PoolReport<SectionId> {
        PoolReport {
            total: 4,
            completed: 2,
            skipped: 0,
            failures: vec![
                TaskFailure {
                    key: SectionId { column: 1, row: 1 },
                    error: TaskError::Panicked("late".into()),
                },
                TaskFailure {
                    key: SectionId { column: 0, row: 1 },
                    error: TaskError::Panicked("early".into()),
                },
            ],
        }
    }

    #[test]
    fn test_abort_policy_fails_run() {
        let err = Downscaler::new(config(1))
            .check_failures(failed_report())
            .unwrap_err();
        assert_eq!(err.to_string(), "2 of 4 sections failed");
    }

    #[test]
    fn test_continue_policy_lists_failed_sections() {
        let config = AppConfig {
            on_failure: FailurePolicy::Continue,
            ..Default::default()
        };
        let failed = Downscaler::new(config)
            .check_failures(failed_report())
            .unwrap();
        assert_eq!(
            failed,
            vec![SectionId { column: 0, row: 1 }, SectionId { column: 1, row: 1 }]
        );
    }
}
