// Copyright 2020 TwoCookingMice

use spectral_pt::core::scene_loader::{load_builtin_scene, BUILTIN_SCENES};
use spectral_pt::integrators::path::{PTOptions, PathIntegrator};
use spectral_pt::io::exr_utils;
use spectral_pt::renderers::cpu::CpuRenderer;
use spectral_pt::renderers::film::Film;
use spectral_pt::renderers::renderer::{RenderSettings, Renderer};
use spectral_pt::renderers::wavefront::WavefrontRenderer;

use console::style;
use std::env;
use std::time::Instant;

struct CliOptions {
    output_path: String,
    scene: String,
    backend: String,
    width: usize,
    height: usize,
    options: PTOptions,
    settings: RenderSettings,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Option<T> {
    let value = args.get(i).and_then(|v| v.parse::<T>().ok());
    if value.is_none() {
        log::warn!("Ignoring {}: missing or invalid value.", flag);
    }
    value
}

fn parse_args(args: &[String]) -> Option<CliOptions> {
    if args.len() < 2 {
        return None;
    }

    let mut cli = CliOptions {
        output_path: args[1].clone(),
        scene: String::from("cornell"),
        backend: String::from("cpu"),
        width: 256,
        height: 256,
        options: PTOptions { iterations: 16, ..PTOptions::default() },
        settings: RenderSettings::default(),
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--scene" => cli.scene = args.get(i).cloned().unwrap_or(cli.scene),
            "--backend" => cli.backend = args.get(i).cloned().unwrap_or(cli.backend),
            "--spp" => cli.options.iterations = parse_value(args, i, flag).unwrap_or(cli.options.iterations),
            "--max-depth" => cli.options.max_depth = parse_value(args, i, flag).unwrap_or(cli.options.max_depth),
            "--rr-start" => cli.options.rr_start = parse_value(args, i, flag).unwrap_or(cli.options.rr_start),
            "--seed" => cli.settings.seed = parse_value(args, i, flag).unwrap_or(cli.settings.seed),
            "--lanes" => cli.settings.lanes = parse_value(args, i, flag).unwrap_or(cli.settings.lanes),
            "--threads" => cli.settings.threads = parse_value(args, i, flag).unwrap_or(cli.settings.threads),
            "--width" => cli.width = parse_value(args, i, flag).unwrap_or(cli.width),
            "--height" => cli.height = parse_value(args, i, flag).unwrap_or(cli.height),
            _ => {
                log::warn!("Unknown argument: {}", flag);
                continue;
            }
        }
        i += 1;
    }

    if cli.options.iterations == 0 {
        log::warn!("--spp 0 requested, rendering one sample per pixel.");
        cli.options.iterations = 1;
    }
    Some(cli)
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Some(cli) => cli,
        None => {
            eprintln!("Usage: {} <output.exr> [--scene {}] [--backend cpu|wavefront] [--spp N] [--max-depth N] \
                       [--rr-start N] [--seed N] [--lanes N] [--threads N] [--width N] [--height N]",
                      args.first().map(String::as_str).unwrap_or("spectral_pt"), BUILTIN_SCENES.join("|"));
            std::process::exit(1);
        }
    };

    let scene = match load_builtin_scene(&cli.scene, cli.width, cli.height) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let renderer: Box<dyn Renderer> = match cli.backend.as_str() {
        "wavefront" => Box::new(WavefrontRenderer::new(cli.settings.clone())),
        "cpu" => Box::new(CpuRenderer::new(cli.settings.clone())),
        other => {
            log::error!("Unknown backend '{}', expected cpu or wavefront.", other);
            std::process::exit(1);
        }
    };

    let integrator = PathIntegrator::new(cli.options);
    let mut film = Film::new(cli.width, cli.height);
    let start = Instant::now();
    let result = renderer.render(&scene, &integrator, &mut film)
        .and_then(|stats| exr_utils::write_exr_to_file(&film.resolve(), &cli.output_path).map(|_| stats));

    match result {
        Ok(stats) => {
            println!("{} {} paths on the {} backend in {:.2?} -> {}",
                     style("Rendered").green().bold(),
                     stats.paths,
                     renderer.name(),
                     start.elapsed(),
                     style(&cli.output_path).cyan());
        }
        Err(e) => {
            log::error!("Render failed: {}", e);
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}
