#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const HALF: f64 = 11.1972167393518;

pub fn write_frame(path: &Path, records: &[(u64, u8, [f64; 3])]) {
    let mut text = String::new();
    writeln!(text, "ITEM: TIMESTEP\n0\nITEM: NUMBER OF ATOMS\n{}", records.len()).unwrap();
    writeln!(text, "ITEM: BOX BOUNDS pp pp pp").unwrap();
    for _ in 0..3 {
        writeln!(text, "{} {}", -HALF, HALF).unwrap();
    }
    writeln!(text, "ITEM: ATOMS id mol type xu yu zu").unwrap();
    for (id, kind, [x, y, z]) in records {
        writeln!(text, "{} 1 {} {} {} {} 0 0 0", id, kind, x, y, z).unwrap();
    }
    fs::write(path, text).expect("write frame");
}

pub fn write_results(path: &Path, parameter: f64, conductivity: f64, diffusion: Option<(f64, f64)>) {
    let mut text = String::new();
    for i in 0..11 {
        writeln!(text, "header line {}", i).unwrap();
    }
    writeln!(text, "{}\n{}", parameter, conductivity).unwrap();
    if let Some((dc, da)) = diffusion {
        writeln!(text, "{}\n{}", dc, da).unwrap();
    }
    fs::write(path, text).expect("write results");
}

/// A run with `cations` cations, the i-th surrounded by i anions within 1.0.
/// Positions repeat in every frame, shifted by whole box lengths in odd frames.
pub fn write_run(dir: &Path, parameter: f64, conductivity: f64, cations: usize, frames: &[u64]) {
    fs::create_dir_all(dir).expect("create run dir");
    write_results(&dir.join("conductivity.data"), parameter, conductivity, Some((3.0e-6, 1.0e-6)));
    for (n, frame) in frames.iter().enumerate() {
        let shift = if n % 2 == 1 { 2.0 * HALF } else { 0.0 };
        let mut records = Vec::new();
        let mut id = 1;
        for i in 0..cations {
            let cx = -9.0 + 4.0 * i as f64;
            records.push((id, 2, [cx + shift, 0.0, -shift]));
            id += 1;
            for k in 0..i {
                records.push((id, 3, [cx + shift, 0.25 * (k + 1) as f64, -shift]));
                id += 1;
            }
        }
        write_frame(&dir.join(format!("dump{}", frame)), &records);
    }
}
