use std::error::Error;
use std::path::Path;

use image::ImageReader;
use transiscope::{AcquisitionMeta, Analyzer, ImageStack};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <fps> <roi: r0,c0,r1,c1> <frame.png>... [--out report.json]",
            args[0]
        );
        std::process::exit(2);
    }

    let fps: f64 = args[1].parse()?;
    let corners: Vec<f64> = args[2]
        .split(',')
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    if corners.len() != 4 {
        return Err("ROI must be given as r0,c0,r1,c1".into());
    }

    let mut out_path = None;
    let mut frames = Vec::new();
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--out" {
            out_path = rest.next().cloned();
        } else {
            frames.push(ImageReader::open(Path::new(arg))?.decode()?);
        }
    }

    let stack = ImageStack::from_dynamic_frames(&frames)?;
    let meta = AcquisitionMeta::new(fps);
    let analyzer = Analyzer::new();
    let mut rois = analyzer.registry_for(&stack, &meta)?;
    let (r0, c0, r1, c1) = (corners[0], corners[1], corners[2], corners[3]);
    rois.add(&[[r0, c0], [r0, c1], [r1, c1], [r1, c0]])?;

    let report = analyzer.analyze(&rois, &stack, &meta);
    for row in report.summary() {
        println!(
            "ROI {}: {} events, rate {:.6} ± {:.6} /s/um^2",
            row.roi_id, row.event_count, row.rate, row.standard_error
        );
    }

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
