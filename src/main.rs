#[macro_use]
// 启用tracing宏，允许在代码中使用如info!、warn!等日志宏
extern crate tracing;

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use image_switcher::animation::Clock;
use image_switcher::cli::{Cli, Kind, Scene, Sub};
use image_switcher::config::Config;
use image_switcher::render::{paint, ImageBuffer};
use image_switcher::switcher::{ImageSlot, PhaseEnd, Switcher};
use image_switcher::utils::{write_png_rgba8, Rect};
use serde::Serialize;
// 日志过滤
use tracing_subscriber::EnvFilter;

// 默认日志过滤规则
const DEFAULT_LOG_FILTER: &str = "image_switcher=debug";

/// 配置文件路径的环境变量名
const CONFIG_PATH_ENV: &str = "IMAGE_SWITCHER_CONFIG";

/// 模拟时钟的起点，任意非零值即可
const START_TIME: Duration = Duration::from_secs(1);

/// 防止配置异常时无限模拟
const MAX_SIMULATED: Duration = Duration::from_secs(60);

const BACKGROUND: [u8; 4] = [0x20, 0x20, 0x20, 0xFF];

fn main() -> anyhow::Result<()> {
    // 配置日志过滤器
    // 从环境变量RUST_LOG获取，否则使用默认值
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    // 初始化日志系统：紧凑格式、输出到stderr、应用过滤器
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    if let Sub::Completions { shell } = cli.subcommand {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "image-switcher",
            &mut io::stdout(),
        );
        return Ok(());
    }

    // 启动性能分析器
    tracy_client::Client::start();

    info!("starting version {}", image_switcher::utils::version());

    let config = load_config(cli.config)?;

    match cli.subcommand {
        Sub::Simulate {
            kind,
            prev,
            scene,
            fps,
            start,
            turn_point,
            json,
        } => {
            anyhow::ensure!(fps > 0, "fps must be positive");
            let turn_point = turn_point.unwrap_or(config.bounce_turn_point);
            anyhow::ensure!(
                start.is_finite() && turn_point.is_finite(),
                "progress values must be finite numbers"
            );
            simulate(config, kind, !prev, scene, fps, start, turn_point, json)?;
        }
        Sub::Frame {
            progress,
            prev,
            scene,
            output,
        } => render_frame(config, progress, !prev, scene, output)?,
        Sub::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    // 命令行参数优先于环境变量
    let path = path.or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let Some(path) = path else {
        debug!("no config file given, using defaults");
        return Ok(Config::default());
    };

    Config::load(&path).context("error loading config")
}

/// The two demo images: a checkerboard as the current one, a flat color as the coming one.
fn scene_images(scene: Scene) -> (ImageBuffer, ImageBuffer) {
    let current = ImageBuffer::checkerboard(
        scene.image_width,
        scene.image_height,
        64,
        [0xE0, 0xE0, 0xE0, 0xFF],
        [0x40, 0x80, 0xC0, 0xFF],
    );
    let coming = ImageBuffer::solid(
        scene.image_width,
        scene.image_height,
        [0xC0, 0x50, 0x40, 0xFF],
    );
    (current, coming)
}

#[derive(Serialize)]
struct SlotInfo {
    rect: Rect,
    alpha: u8,
}

#[derive(Serialize)]
struct FrameInfo {
    frame: u32,
    time_ms: u128,
    state: String,
    current: Option<SlotInfo>,
    coming: Option<SlotInfo>,
}

impl SlotInfo {
    fn from_slot(slot: &ImageSlot<'_, ImageBuffer>) -> Option<Self> {
        slot.is_valid().then(|| Self {
            rect: slot.rect(),
            alpha: slot.paint_alpha(),
        })
    }
}

fn describe(slot: &Option<SlotInfo>) -> String {
    match slot {
        Some(info) => {
            let r = info.rect;
            format!(
                "({}, {}) {}×{} α={}",
                r.left(),
                r.top(),
                r.size.w,
                r.size.h,
                info.alpha
            )
        }
        None => String::from("-"),
    }
}

fn print_frame(
    out: &mut impl Write,
    switcher: &Switcher<'_, ImageBuffer>,
    frame: u32,
    time: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let info = FrameInfo {
        frame,
        time_ms: time.as_millis(),
        state: format!("{:?}", switcher.state()),
        current: SlotInfo::from_slot(switcher.current()),
        coming: SlotInfo::from_slot(switcher.coming()),
    };

    if json {
        serde_json::to_writer(&mut *out, &info)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{:>4} {:>6}ms {:<12} current {:<28} coming {}",
            info.frame,
            info.time_ms,
            info.state,
            describe(&info.current),
            describe(&info.coming),
        )?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    config: Config,
    kind: Kind,
    as_next: bool,
    scene: Scene,
    fps: u32,
    start: f64,
    turn_point: f64,
    json: bool,
) -> anyhow::Result<()> {
    let (current, coming) = scene_images(scene);

    let mut clock = Clock::with_time(START_TIME);
    let mut switcher = Switcher::new(clock.clone(), config);
    switcher.resize(scene.width, scene.height);
    switcher.show(Some(&current));

    let mut out = io::stdout().lock();

    if kind == Kind::Scroll {
        // 手势驱动：没有时钟，按固定步长把进度从 start 推到 1
        let start = start.clamp(0., 1.);
        for frame in 0..=fps {
            let progress = start + (1. - start) * f64::from(frame) / f64::from(fps);
            switcher.scroll(Some(&current), Some(&coming), as_next, progress);
            print_frame(&mut out, &switcher, frame, Duration::ZERO, json)?;
        }
        return Ok(());
    }

    let started = match kind {
        Kind::Switch => switcher.switch_to(Some(&current), Some(&coming), as_next, start),
        Kind::Fallback => {
            switcher.switch_and_fall_back(Some(&current), Some(&coming), as_next, turn_point)
        }
        Kind::Scroll => unreachable!(),
    };
    anyhow::ensure!(started, "the switcher refused to start");

    let frame_time = Duration::from_secs(1) / fps;
    let mut frame = 0;
    let mut elapsed = Duration::ZERO;
    print_frame(&mut out, &switcher, frame, elapsed, json)?;

    loop {
        clock.advance_unadjusted(frame_time);
        elapsed += frame_time;
        frame += 1;

        let end = switcher.advance_animations();
        print_frame(&mut out, &switcher, frame, elapsed, json)?;

        match end {
            Some(PhaseEnd::Committed) => {
                info!("switch committed after {frame} frames");
                break;
            }
            Some(PhaseEnd::FellBack) => {
                info!("fell back after {frame} frames");
                break;
            }
            None => (),
        }

        if elapsed > MAX_SIMULATED {
            warn!("animation did not finish, stopping");
            switcher.finish();
            break;
        }
    }

    Ok(())
}

fn render_frame(
    config: Config,
    progress: f64,
    as_next: bool,
    scene: Scene,
    output: PathBuf,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        scene.width > 0 && scene.height > 0,
        "host size must be positive"
    );
    anyhow::ensure!(progress.is_finite(), "progress must be a finite number");

    let (current, coming) = scene_images(scene);

    let mut switcher = Switcher::new(Clock::with_time(START_TIME), config);
    switcher.resize(scene.width, scene.height);
    switcher.scroll(Some(&current), Some(&coming), as_next, progress);

    let mut canvas = ImageBuffer::solid(scene.width as u32, scene.height as u32, BACKGROUND);
    paint(&mut canvas, &switcher.render_layers());

    let file = File::create(&output).with_context(|| format!("error creating {output:?}"))?;
    let mut writer = BufWriter::new(file);
    write_png_rgba8(
        &mut writer,
        canvas.width(),
        canvas.height(),
        canvas.pixels(),
    )
    .context("error encoding PNG")?;
    writer.flush()?;

    info!("wrote frame at progress {progress} to {output:?}");
    Ok(())
}
