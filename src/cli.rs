/// cli.rs - 演示程序的命令行接口
/// 职责：使用 clap 定义参数和子命令，驱动切换器离屏运行

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::utils::version;

/// 主命令行结构
#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to a JSON config file (default: built-in values).
    ///
    /// This can also be set with the `IMAGE_SWITCHER_CONFIG` environment variable. If both are
    /// set, the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Run a transition with a fixed frame rate and print every frame.
    Simulate {
        #[arg(short, long, value_enum, default_value_t = Kind::Switch)]
        kind: Kind,
        /// The coming image is the previous one rather than the next one.
        #[arg(long)]
        prev: bool,
        #[command(flatten)]
        scene: Scene,
        /// Frames per second of the simulated clock.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Progress to start from (switch), or to scroll to (scroll).
        #[arg(long, default_value_t = 0.)]
        start: f64,
        /// Progress at which a fallback turns back (default: from the config).
        #[arg(long)]
        turn_point: Option<f64>,
        /// Print frames as JSON lines.
        #[arg(short, long)]
        json: bool,
    },
    /// Render a single scrolled frame into a PNG file.
    Frame {
        /// Scroll progress in [0, 1].
        #[arg(short, long)]
        progress: f64,
        #[arg(long)]
        prev: bool,
        #[command(flatten)]
        scene: Scene,
        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate shell completions.
    Completions { shell: Shell },
}

/// Host and image sizes shared by the subcommands.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Scene {
    #[arg(long, default_value_t = 1000)]
    pub width: i32,
    #[arg(long, default_value_t = 1000)]
    pub height: i32,
    #[arg(long, default_value_t = 2000)]
    pub image_width: u32,
    #[arg(long, default_value_t = 1000)]
    pub image_height: u32,
}

/// 演示的动画种类
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Full switch to the coming image.
    Switch,
    /// Forth-and-back bounce, the current image stays.
    Fallback,
    /// Gesture-driven displacement, no clock involved.
    Scroll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate() {
        let cli = Cli::try_parse_from([
            "image-switcher",
            "simulate",
            "--kind",
            "fallback",
            "--prev",
            "--fps",
            "10",
        ])
        .unwrap();

        let Sub::Simulate {
            kind, prev, fps, ..
        } = cli.subcommand
        else {
            panic!("wrong subcommand");
        };
        assert_eq!(kind, Kind::Fallback);
        assert!(prev);
        assert_eq!(fps, 10);
    }
}
