// Copyright 2020 TwoCookingMice

use scintrace::core::photon::Photon;
use scintrace::core::scene_loader::load_assembly;
use scintrace::io::history_writer::{ HistoryWriter, RecordMode };
use scintrace::runners::parallel::{ ParallelRunner, Runner };
use scintrace::tracking::tracker::TrackingLimits;

use log::{ error, info };
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <assembly.xml> <history.jsonl> [--seed N] [--threads N] [--photons N] [--record all|detected] [--quiet]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut seed_override: Option<u64> = None;
    let mut threads_override: Option<usize> = None;
    let mut photons_override: Option<usize> = None;
    let mut record_override: Option<RecordMode> = None;
    let mut quiet = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed_override = args.get(i).and_then(|v| v.parse::<u64>().ok());
            }
            "--threads" => {
                i += 1;
                threads_override = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--photons" => {
                i += 1;
                photons_override = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--record" => {
                i += 1;
                record_override = args.get(i).and_then(|v| RecordMode::from_name(v));
            }
            "--quiet" => quiet = true,
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let assembly = match load_assembly(input_path) {
        Ok(assembly) => assembly,
        Err(e) => {
            error!("Failed to load {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let seed = seed_override.or(assembly.tracking.seed).unwrap_or(0);
    let record = record_override.or(assembly.tracking.record).unwrap_or(RecordMode::All);

    let mut source_rng = StdRng::seed_from_u64(seed);
    let mut photons: Vec<Photon> = Vec::new();
    for source in assembly.sources.iter() {
        match source.emit(&mut source_rng) {
            Ok(emitted) => photons.extend(emitted),
            Err(e) => {
                error!("{} failed to emit: {}", source.describe(), e);
                std::process::exit(1);
            }
        }
    }
    if let Some(limit) = photons_override {
        photons.truncate(limit);
    }
    info!("Generated {} photons from {} sources.", photons.len(), assembly.sources.len());

    let mut runner = ParallelRunner::new(TrackingLimits::default(), seed).with_progress(!quiet);
    if let Some(threads) = threads_override.or(assembly.tracking.threads) {
        runner = runner.with_threads(threads);
    }
    let report = match runner.run(&assembly.geometry, &photons) {
        Ok(report) => report,
        Err(e) => {
            error!("Tracing aborted: {}", e);
            std::process::exit(2);
        }
    };

    let written = HistoryWriter::create(output_path, record).and_then(|mut writer| {
        writer.write_all(&report.histories)?;
        Ok(writer.written())
    });
    match written {
        Ok(count) => info!("Wrote {} records to {}", count, output_path),
        Err(e) => {
            error!("Failed to write {}: {}", output_path, e);
            std::process::exit(3);
        }
    }
    info!("Detection efficiency: {:.4}", report.summary.detection_efficiency());
}
