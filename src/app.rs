//! 窗口循环与离屏导出
//!
//! 两种运行方式共用 [`Scene::render_frame`]：先写 `time`，再按配置求出每个矩阵
//! uniform 并上传，最后画网格。

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Context as _;
use cgmath::Vector3 as Vec3;
use log::{debug, info};
use minifb::{Key, Window, WindowOptions};

use crate::animation::Composition;
use crate::config::{DemoConfig, MeshSource};
use crate::error::{Error, Result};
use crate::framebuffer::{self, FrameBuffer};
use crate::mesh::TriangleSoup;
use crate::renderer::Renderer;
use crate::shader::{ShaderProgram, TIME_UNIFORM, UniformLocation};

struct MatrixBinding {
    name: String,
    location: UniformLocation,
    stages: Composition,
}

pub struct Scene {
    mesh: TriangleSoup,
    program: ShaderProgram,
    renderer: Renderer,
    time_location: Option<UniformLocation>,
    bindings: Vec<MatrixBinding>,
    clear_color: u32,
}

impl Scene {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        config.validate()?;
        let mesh = match &config.mesh {
            MeshSource::Triangle => TriangleSoup::triangle(),
            MeshSource::Builtin(mesh) => TriangleSoup::builtin(*mesh)?,
            MeshSource::Obj(path) => TriangleSoup::load(path)?,
        };
        Ok(Self::with_mesh(config, mesh))
    }

    /// 着色器里找不到的 uniform 只警告一次，之后每帧跳过
    pub fn with_mesh(config: &DemoConfig, mesh: TriangleSoup) -> Self {
        let program = ShaderProgram::new(config.program.clone(), config.fragment);
        let time_location = program.uniform_location(TIME_UNIFORM);
        let bindings = config
            .matrices
            .iter()
            .filter_map(|m| {
                program.uniform_location(&m.name).map(|location| MatrixBinding {
                    name: m.name.clone(),
                    location,
                    stages: m.stages.clone(),
                })
            })
            .collect();

        let mut renderer = Renderer::new(config.width, config.height);
        renderer.polygon_mode = config.polygon_mode;
        renderer.cull_face = config.cull_face;

        let [r, g, b] = config.clear_color;
        Self {
            mesh,
            program,
            renderer,
            time_location,
            bindings,
            clear_color: framebuffer::pack_color(Vec3::new(r, g, b)),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.renderer.resize(width, height);
    }

    /// 画一帧，返回进入光栅化的三角形数量
    pub fn render_frame(&mut self, time: f32) -> usize {
        self.renderer.clear(self.clear_color);

        if let Some(location) = self.time_location {
            self.program.set_float(location, time);
        }
        for binding in &self.bindings {
            let matrix = binding.stages.at(time);
            if !matrix.is_finite() {
                debug!("矩阵 {} 含非有限值，相关三角形会被裁掉", binding.name);
            }
            debug!("{} @ {time:.3}s\n{matrix}", binding.name);
            self.program.set_matrix4fv(binding.location, matrix.as_array());
        }

        self.renderer.draw(&self.mesh, &self.program)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        self.renderer.framebuffer()
    }
}

/// 打开窗口一直渲染，直到窗口关闭或按下 Esc
pub fn run_window(config: &DemoConfig) -> anyhow::Result<()> {
    let mut scene = Scene::new(config).context("初始化场景失败")?;

    let mut window = Window::new(
        &config.title,
        config.width,
        config.height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .map_err(Error::from)?;
    // 不等待屏幕刷新
    window.set_target_fps(0);
    info!("窗口大小：{}x{}", config.width, config.height);
    info!("网格三角形数量：{}", scene.mesh.len());

    let start = Instant::now();
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let (width, height) = window.get_size();
        if width == 0 || height == 0 {
            window.update();
            continue;
        }
        scene.resize(width, height);

        let time = start.elapsed().as_secs_f32();
        scene.render_frame(time);

        let fb = scene.framebuffer();
        window
            .update_with_buffer(&fb.data, fb.width, fb.height)
            .map_err(Error::from)?;
    }

    info!("窗口已关闭");
    Ok(())
}

/// 不开窗口，按固定帧率导出 `frames` 帧 PNG
pub fn render_frames(config: &DemoConfig, frames: usize, fps: f32, dir: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0 && fps.is_finite(), "帧率必须为正数，当前为 {fps}");
    let mut scene = Scene::new(config).context("初始化场景失败")?;
    fs::create_dir_all(dir).with_context(|| format!("无法创建输出目录 {}", dir.display()))?;

    for i in 0..frames {
        let time = i as f32 / fps;
        let drawn = scene.render_frame(time);
        let path = dir.join(format!("frame_{i:03}.png"));
        scene
            .framebuffer()
            .save_to_image(&path)
            .map_err(Error::from)
            .with_context(|| format!("保存第 {i} 帧失败"))?;
        debug!("第 {i} 帧：{drawn} 个三角形 -> {}", path.display());
    }

    info!("已导出 {frames} 帧到 {}", dir.display());
    Ok(())
}
