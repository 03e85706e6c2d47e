use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use lumafx::animator::PhaseAnimator;
use lumafx::config::Config;
use lumafx::dither::Dither;
use lumafx::engine::{AsciiEngine, EngineState, MAX_COLUMNS};
use lumafx::glyph::{self, Charset, EncodeOptions};
use lumafx::media::TestPattern;
use lumafx::pixel::Rgba;

/// Parse and validate column count (1-512)
fn parse_columns(s: &str) -> Result<u32, String> {
    let columns: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid column count", s))?;
    if !(1..=MAX_COLUMNS).contains(&columns) {
        return Err(format!(
            "Columns must be between 1 and {}, got {}",
            MAX_COLUMNS, columns
        ));
    }
    Ok(columns)
}

/// Parse and validate framerate (1.0-120.0 fps)
fn parse_fps(s: &str) -> Result<f64, String> {
    let fps: f64 = s.parse().map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1.0..=120.0).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1.0 and 120.0 fps, got {}",
            fps
        ));
    }
    Ok(fps)
}

/// Parse and validate run duration in seconds (0 = until Ctrl+C)
fn parse_duration(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a valid duration", s))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("Duration must be zero or positive, got {}", s));
    }
    Ok(secs)
}

/// Parse character set name
fn parse_charset(s: &str) -> Result<Charset, String> {
    Charset::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Charset::all().iter().map(|c| c.name()).collect();
        format!(
            "Unknown charset '{}'. Available charsets: {}",
            s,
            names.join(", ")
        )
    })
}

/// Parse dither mode name
fn parse_dither(s: &str) -> Result<Dither, String> {
    Dither::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Dither::all().iter().map(|d| d.name()).collect();
        format!(
            "Unknown dither mode '{}'. Available modes: {}",
            s,
            names.join(", ")
        )
    })
}

/// lumafx: character-art video effects for the terminal
#[derive(Parser)]
#[command(name = "lumafx")]
#[command(version, about = "Character-art video effects for the terminal")]
#[command(long_about = "Convert video frames to ASCII, block, or braille art and \
    run procedural particle-and-wave animations, rendered with ANSI true color. \
    The same pipeline drives the library's masks and HTML output.")]
#[command(after_help = "EXAMPLES:
    # Animated test pattern as colored ASCII
    lumafx play

    # Braille art at 100 columns with Atkinson dithering
    lumafx play -C 100 -s braille -d atkinson

    # Monochrome blocks, cycling through every charset
    lumafx play -s blocks --no-color --cycle

    # The seeded intro animation, five seconds
    lumafx wave -t 5

    # Same animation, different seed and denser grid
    lumafx wave --seed 7 --grid-cols 12 --grid-rows 7

    # List available character sets and dither modes
    lumafx charsets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an animated test pattern as character art
    #[command(after_help = "EXAMPLES:
    lumafx play                          # Defaults: 80 columns, simple ramp
    lumafx play -C 120 -s detailed       # Wide, fine tonal ramp
    lumafx play -s quadrant -d bayer     # Block glyphs with ordered dithering
    lumafx play -t 10 --fps 15           # Ten seconds at 15 fps")]
    Play {
        /// Output width in character cells (1-512)
        #[arg(long, short = 'C', value_parser = parse_columns)]
        columns: Option<u32>,

        /// Character set (simple, detailed, blocks, minimal, quadrant, braille)
        #[arg(long, short = 's', value_parser = parse_charset)]
        charset: Option<Charset>,

        /// Dither mode (none, floyd-steinberg, atkinson, bayer)
        #[arg(long, short = 'd', value_parser = parse_dither)]
        dither: Option<Dither>,

        /// Swap dark and bright glyphs (for light terminals)
        #[arg(long)]
        invert: bool,

        /// Apply gamma correction before ramp mapping
        #[arg(long)]
        gamma: bool,

        /// Disable per-cell ANSI true color
        #[arg(long)]
        no_color: bool,

        /// Cycle through every character set while playing
        #[arg(long)]
        cycle: bool,

        /// Frame rate ceiling (1.0-120.0)
        #[arg(long, short = 'f', value_parser = parse_fps)]
        fps: Option<f64>,

        /// Run duration in seconds (0 = until Ctrl+C)
        #[arg(long, short = 't', value_parser = parse_duration, default_value = "0")]
        duration: f64,

        /// Custom config file path (default: ~/.config/lumafx/config.toml)
        #[arg(long, short = 'c')]
        config: Option<std::path::PathBuf>,
    },

    /// Run the seeded particle-and-wave intro animation
    #[command(after_help = "EXAMPLES:
    lumafx wave                          # Default seed, braille rendering
    lumafx wave --seed 42 -s quadrant    # Reproducible run, block glyphs
    lumafx wave -t 8 --fps 60            # Eight seconds at 60 fps")]
    Wave {
        /// Deterministic animation seed
        #[arg(long)]
        seed: Option<u32>,

        /// Particle grid width in dots
        #[arg(long)]
        grid_cols: Option<u32>,

        /// Particle grid height in dots
        #[arg(long)]
        grid_rows: Option<u32>,

        /// Surface width in pixels
        #[arg(long, default_value = "160")]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "96")]
        height: u32,

        /// Character set used to rasterize the surface
        #[arg(long, short = 's', value_parser = parse_charset, default_value = "braille")]
        charset: Charset,

        /// Frame rate ceiling (1.0-120.0)
        #[arg(long, short = 'f', value_parser = parse_fps)]
        fps: Option<f64>,

        /// Run duration in seconds (0 = until Ctrl+C)
        #[arg(long, short = 't', value_parser = parse_duration, default_value = "0")]
        duration: f64,

        /// Render the settled end state once instead of animating
        #[arg(long)]
        reduced_motion: bool,

        /// Custom config file path (default: ~/.config/lumafx/config.toml)
        #[arg(long, short = 'c')]
        config: Option<std::path::PathBuf>,
    },

    /// List available character sets and dither modes
    Charsets,
}

static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received
fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Install the Ctrl+C handler that flags the render loops to exit
fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
    })
}

/// Load the config file, warning and defaulting when the default file is
/// absent or malformed. An explicitly given path must exist and parse.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, String> {
    if let Some(p) = path {
        if !p.exists() {
            return Err(format!("Config file '{}' not found", p.display()));
        }
    }
    match Config::load(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            if path.is_some() {
                Err(e.to_string())
            } else {
                eprintln!("Warning: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        }
    }
}

/// Build one ANSI frame: home the cursor, then glyph rows with optional
/// per-cell true color. Color codes are only emitted when the cell color
/// changes, which keeps frames small across flat regions.
fn render_ansi(engine: &AsciiEngine, color: bool) -> String {
    let grid = engine.grid();
    let colors = engine.cell_colors();
    let mut out = String::with_capacity(grid.cols() * grid.rows() * 4 + 16);
    out.push_str("\x1b[H");
    if !color || colors.len() != grid.cols() * grid.rows() {
        for row in grid.iter_rows() {
            out.extend(row.iter());
            out.push('\n');
        }
        return out;
    }
    let mut last: Option<Rgba> = None;
    for (row_idx, row) in grid.iter_rows().enumerate() {
        for (col_idx, &ch) in row.iter().enumerate() {
            let cell = colors[row_idx * grid.cols() + col_idx];
            if last != Some(cell) {
                out.push_str(&format!("\x1b[38;2;{};{};{}m", cell.r, cell.g, cell.b));
                last = Some(cell);
            }
            out.push(ch);
        }
        out.push('\n');
    }
    out.push_str("\x1b[0m");
    out
}

/// Run the play command: the animated test pattern through the engine
fn run_play(
    mut engine: AsciiEngine,
    color: bool,
    cycle: bool,
    duration_secs: f64,
) -> Result<(), String> {
    engine.attach_media(Box::new(TestPattern::new(512, 288)));

    match engine.play() {
        EngineState::Playing => {}
        EngineState::Paused => {
            // Reduced motion: a single still frame was rendered on play
            let mut stdout = std::io::stdout();
            stdout
                .write_all(render_ansi(&engine, color).as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("Failed to write frame: {}", e))?;
            return Ok(());
        }
        state => return Err(format!("Playback did not start (engine is {:?})", state)),
    }

    if let Err(e) = setup_ctrlc_handler() {
        eprintln!("Warning: Could not set up Ctrl+C handler: {}", e);
    }

    let mut stdout = std::io::stdout();
    print!("\x1b[2J\x1b[?25l");

    let start = Instant::now();
    let mut last_cycle_ms = 0.0f64;

    loop {
        if ctrlc_received() {
            break;
        }
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        if duration_secs > 0.0 && now_ms >= duration_secs * 1000.0 {
            break;
        }

        // Rotate through the charsets every three seconds when requested
        if cycle && now_ms - last_cycle_ms >= 3000.0 {
            let next = engine.options().charset.next();
            engine.set_charset(next);
            last_cycle_ms = now_ms;
        }

        if engine.frame(now_ms) {
            let frame = render_ansi(&engine, color);
            if stdout
                .write_all(frame.as_bytes())
                .and_then(|_| stdout.flush())
                .is_err()
            {
                break;
            }
        }

        std::thread::sleep(Duration::from_millis(4));
    }

    print!("\x1b[0m\x1b[?25h\n");
    let _ = std::io::stdout().flush();

    if let Some(stats) = engine.stats() {
        println!("{} fps, {:.2} ms/frame", stats.fps, stats.avg_frame_ms);
    }
    engine.destroy();
    Ok(())
}

/// Write one frame of the wave animation, rasterized through a charset
fn draw_wave_frame(
    stdout: &mut std::io::Stdout,
    animator: &PhaseAnimator,
    charset: Charset,
    opts: &EncodeOptions,
) -> Result<(), String> {
    let grid = glyph::encode(animator.surface().buffer(), charset, opts);
    let mut out = String::with_capacity(grid.cols() * grid.rows() + 32);
    out.push_str("\x1b[H");
    out.push_str(&grid.to_text());
    out.push_str(&format!("\nphase: {:<10}", animator.phase().to_string()));
    stdout
        .write_all(out.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("Failed to write frame: {}", e))
}

/// Run the wave command: phase animation rasterized as character art
fn run_wave(
    mut animator: PhaseAnimator,
    charset: Charset,
    fps: f64,
    duration_secs: f64,
) -> Result<(), String> {
    animator.start();

    let encode_opts = EncodeOptions::default();
    let mut stdout = std::io::stdout();
    print!("\x1b[2J\x1b[?25l");

    draw_wave_frame(&mut stdout, &animator, charset, &encode_opts)?;

    if !animator.is_running() {
        // Reduced motion rendered its single settled frame above
        print!("\x1b[0m\x1b[?25h\n");
        let _ = stdout.flush();
        return Ok(());
    }

    if let Err(e) = setup_ctrlc_handler() {
        eprintln!("Warning: Could not set up Ctrl+C handler: {}", e);
    }

    let frame_interval_ms = 1000.0 / fps;
    let start = Instant::now();
    let mut last_ms = 0.0f64;

    loop {
        if ctrlc_received() {
            break;
        }
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        if duration_secs > 0.0 && now_ms >= duration_secs * 1000.0 {
            break;
        }

        if now_ms - last_ms >= frame_interval_ms {
            let dt = now_ms - last_ms;
            last_ms = now_ms;
            if animator.advance(dt) {
                draw_wave_frame(&mut stdout, &animator, charset, &encode_opts)?;
            }
        }

        std::thread::sleep(Duration::from_millis(2));
    }

    print!("\x1b[0m\x1b[?25h\n");
    let _ = stdout.flush();
    animator.stop();
    Ok(())
}

/// Run the charsets command: list sets with sample ramps
fn run_charsets() {
    println!("Character sets:\n");
    for set in Charset::all() {
        let sample: String = match set {
            Charset::Quadrant => "▖▌▛█".to_string(),
            Charset::Braille => "⠁⠃⠇⡇⡿⣿".to_string(),
            _ => set.ramp().iter().collect(),
        };
        println!("  {:<10} {}", set.name(), sample);
    }
    println!("\nDither modes:\n");
    for mode in Dither::all() {
        println!("  {}", mode.name());
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play {
            columns,
            charset,
            dither,
            invert,
            gamma,
            no_color,
            cycle,
            fps,
            duration,
            config: config_path,
        }) => {
            let cfg = match load_config(config_path.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            // Merge settings: CLI args > config file > built-in defaults
            let mut options = cfg.engine_options();
            if let Some(c) = columns {
                options.columns = c;
            }
            if let Some(set) = charset {
                options.charset = set;
            }
            if let Some(mode) = dither {
                options.dither = mode;
            }
            options.invert = options.invert || invert;
            options.gamma = options.gamma || gamma;
            if no_color {
                options.color = false;
            }
            if let Some(fps) = fps {
                options.target_fps = fps;
            }

            let color = options.color;
            let engine = AsciiEngine::new(options);
            if let Err(e) = run_play(engine, color, cycle, duration) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Wave {
            seed,
            grid_cols,
            grid_rows,
            width,
            height,
            charset,
            fps,
            duration,
            reduced_motion,
            config: config_path,
        }) => {
            let cfg = match load_config(config_path.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            // Merge settings: CLI args > config file > built-in defaults
            let mut options = cfg.animator_options();
            if let Some(seed) = seed {
                options.seed = seed;
            }
            if let Some(cols) = grid_cols {
                options.grid_cols = cols;
            }
            if let Some(rows) = grid_rows {
                options.grid_rows = rows;
            }
            options.reduced_motion = options.reduced_motion || reduced_motion;

            // Framerate: CLI > config render fps > default (30)
            let fps = fps.or(cfg.render.fps).unwrap_or(30.0).clamp(1.0, 120.0);

            let animator = PhaseAnimator::new(width.max(8), height.max(8), 1.0, options);
            if let Err(e) = run_wave(animator, charset, fps, duration) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Charsets) => {
            run_charsets();
        }
        None => {
            // Show brief help when no command is provided
            println!("lumafx {}", env!("CARGO_PKG_VERSION"));
            println!("Character-art video effects for the terminal\n");
            println!("USAGE:");
            println!("    lumafx <COMMAND>\n");
            println!("COMMANDS:");
            println!("    play      Render an animated test pattern as character art");
            println!("    wave      Run the seeded particle-and-wave intro animation");
            println!("    charsets  List available character sets and dither modes");
            println!("    help      Print this message or the help of a subcommand\n");
            println!("Run 'lumafx --help' for more details and examples.");
        }
    }
}
