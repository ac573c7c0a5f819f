// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogLevel;
use crate::palette::NeonColor;
use crate::runtime::Angle;
use crate::settings::RainConfig;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  lluvia --fps 60 --angle vertical --drop-size 2 --color yellow --quantity 150 --speed 8";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        if !line.starts_with(' ') && line.ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  lluvia") {
            out.push_str("  \x1b[1;34mlluvia\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lluvia",
    version,
    disable_version_flag = true,
    about = "Neon rain in your terminal"
)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "GENERAL",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "colormode",
        help_heading = "GENERAL",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'a',
        long = "angle",
        value_enum,
        help_heading = "RAIN",
        help = "Rain angle (overrides the saved setting)"
    )]
    pub angle: Option<Angle>,

    #[arg(
        long = "drop-size",
        help_heading = "RAIN",
        help = "Drop size (min 1 max 8)"
    )]
    pub drop_size: Option<i64>,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "RAIN",
        help = "Drop color name or #RRGGBB (see --list-colors)"
    )]
    pub color: Option<String>,

    #[arg(
        short = 'q',
        long = "quantity",
        help_heading = "RAIN",
        help = "Number of drops (min 20 max 400)"
    )]
    pub quantity: Option<i64>,

    #[arg(
        short = 'S',
        long = "speed",
        help_heading = "RAIN",
        help = "Fall speed (min 1 max 15)"
    )]
    pub speed: Option<i64>,

    #[arg(
        long = "config-dir",
        help_heading = "SETTINGS",
        help = "Directory the settings are saved in (default: user config dir)"
    )]
    pub config_dir: Option<PathBuf>,

    #[arg(
        long = "no-persist",
        help_heading = "SETTINGS",
        help = "Neither read nor write saved settings"
    )]
    pub no_persist: bool,

    #[arg(
        long = "reset",
        help_heading = "SETTINGS",
        help = "Ignore saved settings and start from the defaults"
    )]
    pub reset: bool,

    #[arg(
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Off,
        help_heading = "LOGGING",
        help = "Log level written to the log file (LLUVIA_LOG overrides)"
    )]
    pub log_level: LogLevel,

    #[arg(
        long = "log-path",
        help_heading = "LOGGING",
        help = "Log file (default: user state dir)"
    )]
    pub log_path: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available drop colors and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "print-config",
        help_heading = "HELP",
        help = "Print the effective settings as JSON and exit"
    )]
    pub print_config: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    /// Layers the command-line overrides on top of `base`. Numbers are clamped
    /// into range the same way saved settings are.
    pub fn apply_overrides(&self, base: RainConfig) -> Result<RainConfig, String> {
        let mut config = base;
        if let Some(angle) = self.angle {
            config.angle = angle;
        }
        if let Some(v) = self.drop_size {
            config.drop_size = v.clamp(1, u8::MAX as i64) as u8;
        }
        if let Some(name) = &self.color {
            config.color = NeonColor::parse(name)?;
        }
        if let Some(v) = self.quantity {
            config.quantity = v.clamp(0, u32::MAX as i64) as u32;
        }
        if let Some(v) = self.speed {
            config.speed = v.clamp(1, u8::MAX as i64) as u8;
        }
        Ok(config.clamped())
    }
}

pub fn print_list_colors() {
    let color = color_enabled_stdout();
    if color {
        println!("\x1b[1;36mAVAILABLE DROP COLORS:\x1b[0m");
        println!("\x1b[2mNOTE: Use the VALUE or the HEX with --color; KEY picks it while running.\x1b[0m");
    } else {
        println!("AVAILABLE DROP COLORS:");
        println!("NOTE: Use the VALUE or the HEX with --color; KEY picks it while running.");
    }
    println!();
    println!("KEY  VALUE    HEX");
    for c in NeonColor::ALL {
        let swatch = if color {
            let rgb = c.rgb();
            format!("  \x1b[48;2;{};{};{}m    \x1b[0m", rgb.r, rgb.g, rgb.b)
        } else {
            String::new()
        };
        println!(
            "{:<4} {:<8} {}{}",
            c.index() + 1,
            c.name().to_ascii_lowercase(),
            c.hex(),
            swatch
        );
    }
}
