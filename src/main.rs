// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod driver;
mod drops;
mod frame;
mod geometry;
mod logging;
mod palette;
mod panel;
mod render;
mod runtime;
mod settings;
mod simulation;
mod storage;
mod surface;
mod terminal;
mod ticker;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use color_eyre::eyre::WrapErr as _;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Screen;
use crate::config::{color_enabled_stdout, default_params_usage_for_help, print_list_colors, Args};
use crate::driver::{AnimationDriver, ConfigEffect};
use crate::frame::Frame;
use crate::panel::Panel;
use crate::runtime::ColorMode;
use crate::settings::RainConfig;
use crate::storage::{load_config, persist_config, FileStorage, MemoryStorage, Storage};
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::ticker::Ticker;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// How long to block on input while no frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn build_info() -> &'static str {
    env!("LLUVIA_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

fn install_hooks() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let eyre_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal_best_effort();
        eyre_hook(info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    Ok(())
}

fn open_storage(args: &Args) -> color_eyre::Result<Box<dyn Storage>> {
    if args.no_persist {
        return Ok(Box::new(MemoryStorage::default()));
    }
    let dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => storage::default_directory()?,
    };
    Ok(Box::new(FileStorage::new(dir)))
}

fn main() -> color_eyre::Result<()> {
    install_hooks()?;

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(effective));
        }
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });

    logging::setup_logging(args.log_level, args.log_path.as_deref())?;

    let mut storage = open_storage(&args)?;
    let saved = if args.reset {
        RainConfig::default()
    } else {
        load_config(storage.as_ref())
    };
    let config = match args.apply_overrides(saved) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if args.print_config {
        println!("{}", config.to_json());
        return Ok(());
    }

    info!(
        build = build_info(),
        color_mode = color_mode_label(color_mode),
        fps = target_fps,
        ?config,
        "starting"
    );

    let end_time = duration_s.map(|s| Instant::now() + Duration::from_secs_f64(s));
    rain(config, storage.as_mut(), color_mode, target_fps, end_time)
}

fn rain(
    config: RainConfig,
    storage: &mut dyn Storage,
    color_mode: ColorMode,
    target_fps: f64,
    end_time: Option<Instant>,
) -> color_eyre::Result<()> {
    let mut term = Terminal::new().wrap_err("setting up the terminal")?;
    let (w, h) = term.size().wrap_err("reading the terminal size")?;

    let mut screen = Screen::new(w, h);
    let mut frame = Frame::new(w, h);
    let mut panel = Panel::default();
    let mut ticker = Ticker::new(target_fps, Instant::now());
    let mut driver = AnimationDriver::new(config, StdRng::from_os_rng());
    driver.start(&mut screen, &mut ticker);

    let mut raining = true;
    while raining {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            break;
        }

        let mut timeout = ticker.timeout(now).unwrap_or(IDLE_POLL);
        if let Some(end) = end_time {
            timeout = timeout.min(end - now);
        }

        let mut pending_resize: Option<(u16, u16)> = None;
        if Terminal::poll_event(timeout)? {
            loop {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
                        (KeyCode::Char('c'), KeyModifiers::CONTROL) => raining = false,
                        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => raining = false,
                        (code, _) => {
                            let current = *driver.config();
                            if let Some(action) = panel.handle_key(code, &current) {
                                let next = action.apply(&current);
                                let effect =
                                    driver.on_config_change(next, &mut screen, &mut ticker);
                                if effect != ConfigEffect::Unchanged {
                                    persist_config(storage, &next);
                                }
                            }
                        }
                    },
                    _ => {}
                }
                if !raining || !Terminal::poll_event(Duration::ZERO)? {
                    break;
                }
            }
        }

        if !raining {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            screen.resize(nw, nh);
            frame = Frame::new(nw, nh);
            driver.on_resize(&mut screen, &mut ticker);
        }

        let Some(handle) = ticker.take_due(Instant::now()) else {
            continue;
        };
        if driver.on_frame(handle, &mut screen, &mut ticker) {
            if let Some(canvas) = screen.canvas() {
                canvas.present(&mut frame, color_mode);
            }
            panel.draw(&mut frame, driver.config(), color_mode);
            if frame.has_changes() {
                term.draw(&mut frame)?;
            }
        }
    }

    driver.stop(&mut ticker);
    info!(frames = driver.frames(), "stopped");
    Ok(())
}
