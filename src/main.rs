// SPDX-License-Identifier: MPL-2.0
use scanlens::config;
use scanlens::render::PixmapSurface;
use scanlens::{Reference, Viewer};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: scanlens <reference> [options]

Loads an archive or single image, preloads every frame and renders one.

Options:
  --frame N          0-based frame to render (default 0)
  --out FILE         write the rendered surface as PNG
  --size WxH         surface size in pixels (default 512x512)
  --config-dir DIR   directory holding settings.toml
  -h, --help         show this help";

struct Args {
    reference: String,
    frame: usize,
    out: Option<PathBuf>,
    size: (u32, u32),
    config_dir: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {value:?}"))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if w == 0 || h == 0 {
        return Err("surface size must be non-zero".into());
    }
    Ok((w, h))
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let frame = args.opt_value_from_str("--frame")?.unwrap_or(0);
    let out = args.opt_value_from_str("--out")?;
    let size = args
        .opt_value_from_fn("--size", parse_size)?
        .unwrap_or((512, 512));
    let config_dir = args.opt_value_from_str("--config-dir")?;
    let reference: String = args.free_from_str()?;

    let rest = args.finish();
    if !rest.is_empty() {
        tracing::warn!(?rest, "ignoring extra arguments");
    }

    Ok(Some(Args {
        reference,
        frame,
        out,
        size,
        config_dir,
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SCANLENS_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let (config, warning) = config::load_with_override(args.config_dir);
    if let Some(warning) = warning {
        tracing::warn!("{warning}");
    }

    let surface = PixmapSurface::new(args.size.0, args.size.1);
    let mut viewer = match Viewer::new(config, surface) {
        Ok(viewer) => viewer,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    viewer.on_progress(|progress| {
        tracing::info!(
            percent = progress.percent,
            completed = progress.completed,
            total = progress.total,
            "preloading"
        );
    });

    let summary = match viewer.load(Reference::parse(&args.reference)).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    viewer.wait_for_preload().await;

    if args.frame >= summary.total_frames {
        eprintln!(
            "error: frame {} out of range, reference has {} frame(s)",
            args.frame, summary.total_frames
        );
        viewer.teardown();
        return ExitCode::FAILURE;
    }
    viewer.select_frame(args.frame).await;

    if let Some(overlay) = viewer.overlay() {
        println!("{overlay}");
    }
    if let Some(stats) = viewer.preload_stats() {
        println!(
            "{} frame(s): {} decoded, {} failed",
            summary.total_frames, stats.loaded, stats.failed
        );
    }
    let render = viewer.renderer().stats();
    tracing::debug!(
        paints = render.paints,
        hit_rate = render.hit_rate(),
        "render cache"
    );

    let mut status = ExitCode::SUCCESS;
    if let Some(path) = &args.out {
        match viewer.surface().save_png(path) {
            Ok(()) => println!("wrote {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                status = ExitCode::FAILURE;
            }
        }
    }

    viewer.teardown();
    status
}
