mod animation;
mod app;
mod config;
mod error;
mod framebuffer;
mod mesh;
mod rasterizer;
mod renderer;
mod shader;
mod transform;
mod vertex;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use log::info;

use crate::config::DemoConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// 球体公转 + 自转
    Orbit,
    /// 长方体线框透视旋转
    Box,
}

impl Demo {
    fn config(self) -> DemoConfig {
        match self {
            Demo::Orbit => DemoConfig::orbit(),
            Demo::Box => DemoConfig::box_spin(),
        }
    }
}

/// 动画矩阵演示：打开窗口实时渲染，或离屏导出 PNG 帧
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// 内置演示
    #[arg(long, value_enum, default_value_t = Demo::Orbit)]
    demo: Demo,

    /// JSON 配置文件，指定后忽略 --demo
    #[arg(long)]
    config: Option<PathBuf>,

    /// 导出的帧数；不指定则打开窗口
    #[arg(long)]
    frames: Option<usize>,

    /// 导出时的帧率（决定每帧的时间）
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// 导出目录
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("无法加载配置 {}", path.display()))?,
        None => args.demo.config(),
    };
    info!("使用配置：{}", config.title);

    match args.frames {
        Some(frames) => app::render_frames(&config, frames, args.fps, &args.output),
        None => app::run_window(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_headless_export() {
        let args = Args::parse_from([
            "glprimer", "--demo", "box", "--frames", "12", "--fps", "24", "--output", "out",
        ]);
        assert_eq!(args.demo, Demo::Box);
        assert_eq!(args.frames, Some(12));
        assert_eq!(args.fps, 24.0);
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.demo.config(), DemoConfig::box_spin());
    }

    #[test]
    fn defaults_open_orbit_window() {
        let args = Args::parse_from(["glprimer"]);
        assert_eq!(args.demo, Demo::Orbit);
        assert!(args.frames.is_none());
        assert!(args.config.is_none());
    }
}
