// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::geometry::GeometryGraph;
use crate::core::history::TrackHistory;
use crate::core::photon::Photon;
use crate::core::rng::photon_rng;
use crate::tracking::tracker::{ Tracker, TrackingLimits };
use indicatif::{ ProgressBar, ProgressStyle };
use log::info;
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::{ mpsc, Arc };
use std::thread;

pub use super::runner::{ RunReport, Runner };

pub struct ParallelRunner {
    limits: TrackingLimits,
    seed: u64,
    threads: Option<usize>,
    progress: bool,
}

impl ParallelRunner {
    pub fn new(limits: TrackingLimits, seed: u64) -> Self {
        Self { limits, seed, threads: None, progress: true }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

impl Runner for ParallelRunner {
    fn run(&self, geometry: &GeometryGraph, photons: &[Photon]) -> Result<RunReport, TrackError> {
        let total = photons.len();
        let thread_count = self.thread_count().min(total.max(1));
        info!("Tracing {} photons on {} threads (seed {}).", total, thread_count, self.seed);

        let progress = if self.progress { ProgressBar::new(total as u64) } else { ProgressBar::hidden() };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} photons")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let tracker = Tracker::new(geometry, self.limits);
        let tracker_ref = &tracker;
        let next_photon = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<(usize, Result<TrackHistory, TrackError>)>();
        let mut slots: Vec<Option<TrackHistory>> = (0..total).map(|_| None).collect();
        let mut first_error: Option<TrackError> = None;

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_photon = Arc::clone(&next_photon);
                let failed = Arc::clone(&failed);
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        if failed.load(Ordering::Relaxed) {
                            break;
                        }
                        let id = next_photon.fetch_add(1, Ordering::Relaxed);
                        if id >= total {
                            break;
                        }

                        let mut rng = photon_rng(self.seed, id);
                        let result = tracker_ref.track(id, photons[id].clone(), &mut rng);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        if tx.send((id, result)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for (id, result) in rx.iter() {
                match result {
                    Ok(history) => slots[id] = Some(history),
                    Err(err) => {
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        if let Some(err) = first_error {
            return Err(err);
        }
        let report = RunReport::from_histories(slots.into_iter().flatten().collect());
        info!("Finished: {}", report.summary);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::GeometryBuilder;
    use crate::core::history::TerminationReason;
    use crate::core::material::MaterialLibrary;
    use crate::core::volume::VolumeKind;
    use crate::math::constants::Vector3f;
    use crate::sources::isotropic::IsotropicPointSource;
    use crate::sources::PhotonSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assembly(shell_material: &str) -> GeometryGraph {
        let library = MaterialLibrary::builtin();
        let mut builder = GeometryBuilder::new();
        builder.add_volume("world", VolumeKind::Ambient, library.get("Air").unwrap(),
                           Vector3f::zeros(), Vector3f::new(100.0, 100.0, 100.0)).unwrap();
        builder.add_volume("reflector", VolumeKind::Shell, library.get(shell_material).unwrap(),
                           Vector3f::zeros(), Vector3f::new(10.0, 10.0, 10.0)).unwrap();
        builder.add_volume("pillar", VolumeKind::Ordinary, library.get("EJ-204").unwrap(),
                           Vector3f::zeros(), Vector3f::new(3.0, 3.0, 3.0)).unwrap();
        builder.lenient(true).build().unwrap()
    }

    fn photons(graph: &GeometryGraph, count: usize) -> Vec<Photon> {
        let library = MaterialLibrary::builtin();
        let source = IsotropicPointSource::new(Vector3f::new(0.0, 0.0, 0.0), graph.id("pillar").unwrap(),
                                               library.get("EJ-204").unwrap(), count);
        source.emit(&mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_results_do_not_depend_on_thread_count() {
        let graph = assembly("Teflon");
        let photons = photons(&graph, 40);

        let single = ParallelRunner::new(TrackingLimits::default(), 7)
            .with_threads(1)
            .with_progress(false)
            .run(&graph, &photons)
            .unwrap();
        let many = ParallelRunner::new(TrackingLimits::default(), 7)
            .with_threads(4)
            .with_progress(false)
            .run(&graph, &photons)
            .unwrap();

        assert_eq!(single.histories.len(), 40);
        assert_eq!(single.summary, many.summary);
        assert_eq!(single.summary.total(), 40);
        for (i, (a, b)) in single.histories.iter().zip(many.histories.iter()).enumerate() {
            assert_eq!(a.photon_id, i);
            assert_eq!(a.records, b.records);
        }
        assert_eq!(single.summary.count(TerminationReason::Detected), 0);
    }

    #[test]
    fn test_first_fatal_error_is_returned() {
        let graph = assembly("Air");
        let photons = photons(&graph, 16);
        let result = ParallelRunner::new(TrackingLimits::default(), 7)
            .with_threads(2)
            .with_progress(false)
            .run(&graph, &photons);
        assert_eq!(result.err(), Some(TrackError::MissingReflectorModel("reflector".to_string())));
    }
}
