use scintrace::core::photon::Photon;
use scintrace::core::rng::photon_rng;
use scintrace::core::scene_loader::load_assembly;
use scintrace::math::constants::{ Float, Vector3f, UM_PER_MM };
use scintrace::tracking::tracker::{ Tracker, TrackingLimits };
use std::env;

fn parse_vec3(value: &str) -> Option<Vector3f> {
    let parts: Vec<Float> = value.split(',').filter_map(|s| s.trim().parse::<Float>().ok()).collect();
    if parts.len() == 3 {
        Some(Vector3f::new(parts[0], parts[1], parts[2]))
    } else {
        None
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <assembly.xml> <volume> [--position x,y,z (mm)] [--direction x,y,z] [--seed N] [--id N]", args[0]);
        std::process::exit(1);
    }

    let assembly_path = &args[1];
    let volume_name = &args[2];
    let mut position = Vector3f::zeros();
    let mut direction = Vector3f::new(0.0, 0.0, 1.0);
    let mut seed: u64 = 0;
    let mut photon_id: usize = 0;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--position" => {
                i += 1;
                position = args.get(i).and_then(|v| parse_vec3(v)).unwrap_or(position);
            }
            "--direction" => {
                i += 1;
                direction = args.get(i).and_then(|v| parse_vec3(v)).unwrap_or(direction);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            "--id" => {
                i += 1;
                photon_id = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(photon_id);
            }
            _ => {}
        }
        i += 1;
    }

    let assembly = match load_assembly(assembly_path) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprintln!("Failed to load assembly: {}", e);
            std::process::exit(1);
        }
    };
    let geometry = &assembly.geometry;
    let volume = match geometry.id(volume_name) {
        Some(id) => id,
        None => {
            eprintln!("Unknown volume: {}", volume_name);
            std::process::exit(2);
        }
    };
    if direction.norm() == 0.0 {
        eprintln!("Direction must be non-zero");
        std::process::exit(2);
    }

    // Any polarization perpendicular to the momentum.
    let helper = if direction.x.abs() < 0.9 { Vector3f::new(1.0, 0.0, 0.0) } else { Vector3f::new(0.0, 1.0, 0.0) };
    let polarization = direction.cross(&helper);
    let photon = Photon::new(position * UM_PER_MM, 0.0, direction, polarization, 0.0, volume);

    let tracker = Tracker::new(geometry, TrackingLimits::default());
    let mut rng = photon_rng(seed, photon_id);
    let history = match tracker.track(photon_id, photon, &mut rng) {
        Ok(history) => history,
        Err(e) => {
            eprintln!("Tracing failed: {}", e);
            std::process::exit(3);
        }
    };

    for record in history.records.iter() {
        let plane = record.plane.map(|p| p.label()).unwrap_or("-");
        println!("step {:>3} {:<12} plane {:>2} volume {:<12} pos ({:.6}, {:.6}, {:.6}) mm dir ({:.4}, {:.4}, {:.4}) t {:.4} ns w {:.6}",
                 record.step,
                 format!("{:?}", record.interaction),
                 plane,
                 record.volume,
                 record.position.x, record.position.y, record.position.z,
                 record.momentum_out.x, record.momentum_out.y, record.momentum_out.z,
                 record.abs_time,
                 record.weight);
    }
    println!("outcome: {}", history.outcome);
}
