pub mod clip;
pub mod fragment_shader;
pub mod vertex_shader;

use crate::framebuffer::{self, FrameBuffer};
use crate::mesh::TriangleSoup;
use crate::rasterizer;
use crate::shader::{ShaderProgram, TIME_UNIFORM};
use crate::vertex::{ClipSpaceVertex, RasterPoint};
use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3};
use serde::{Deserialize, Serialize};

use self::clip::{Clipper, SimpleClipper};
use self::fragment_shader::{FragmentData, FragmentShader};
use self::vertex_shader::{DefaultVertexShader, VertexShader, VertexShaderUniforms};

/// 对应 glPolygonMode 的填充 / 线框
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

pub struct Renderer {
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) viewport: Viewport,
    pub polygon_mode: PolygonMode,
    /// 剔除背面（逆时针为正面）
    pub cull_face: bool,
}

impl Renderer {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(w, h),
            viewport: Viewport {
                x: 0,
                y: 0,
                w: w as i32,
                h: h as i32,
            },
            polygon_mode: PolygonMode::Fill,
            cull_face: false,
        }
    }

    /// 窗口尺寸变化时同步帧缓冲和视口
    pub fn resize(&mut self, w: usize, h: usize) {
        self.framebuffer.resize(w, h);
        self.viewport = Viewport {
            x: 0,
            y: 0,
            w: w as i32,
            h: h as i32,
        };
    }

    pub fn clear(&mut self, color: u32) {
        self.framebuffer.clear(color);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// 用当前 uniform 画一个网格，返回实际进入光栅化的三角形数量
    pub fn draw(&mut self, mesh: &TriangleSoup, program: &ShaderProgram) -> usize {
        let (mvp, model_view) = program.clip_matrices();
        let uniforms = VertexShaderUniforms::new(mvp, model_view);
        let time = program.float(TIME_UNIFORM);
        let fragment_shader = fragment_shader::for_program(program.fragment());

        let vertex_shader = DefaultVertexShader;
        let clipper = SimpleClipper;
        let mut drawn = 0;

        for triangle in mesh.triangles() {
            // 阶段 1: 顶点着色
            let clip_space_triangle = vertex_shader.shade_triangle(triangle, &uniforms);

            // 阶段 2: 裁剪
            for clipped in clipper.clip_triangle(&clip_space_triangle) {
                // 阶段 3: 屏幕映射
                let Some(points) = self.viewport_transform(&clipped) else {
                    continue;
                };

                // 阶段 4: 背面剔除
                if self.cull_face && is_back_facing(&points) {
                    continue;
                }

                // 阶段 5: 光栅化和像素着色
                match self.polygon_mode {
                    PolygonMode::Fill => {
                        self.rasterize_triangle(&points, &*fragment_shader, time)
                    }
                    PolygonMode::Line => self.draw_wireframe(&points, &*fragment_shader, time),
                }
                drawn += 1;
            }
        }
        drawn
    }

    //视口变换
    fn viewport_transform(&self, clip_triangle: &[ClipSpaceVertex; 3]) -> Option<[RasterPoint; 3]> {
        let raster_vertices = clip_triangle.map(|clip_v| {
            // 透视除法
            let ndc_pos = clip_v.position / clip_v.position.w;

            // 转换到屏幕空间
            let screen_x =
                (ndc_pos.x + 1.0) * 0.5 * self.viewport.w as f32 + self.viewport.x as f32;
            let screen_y = self.viewport.h as f32 - (ndc_pos.y + 1.0) * 0.5 * self.viewport.h as f32
                + self.viewport.y as f32;

            RasterPoint {
                pos: Vec2::new(screen_x, screen_y),
                z: (ndc_pos.z + 1.0) * 0.5,
                normal: clip_v.normal,
                color: clip_v.color,
            }
        });
        let finite = raster_vertices
            .iter()
            .all(|p| p.pos.x.is_finite() && p.pos.y.is_finite() && p.z.is_finite());
        finite.then_some(raster_vertices)
    }

    // 进行光栅化
    fn rasterize_triangle(
        &mut self,
        points: &[RasterPoint; 3],
        shader: &dyn FragmentShader,
        time: f32,
    ) {
        let corners = [points[0].pos, points[1].pos, points[2].pos];
        let Some((min_x, min_y, max_x, max_y)) =
            rasterizer::get_box(&corners, self.framebuffer.width, self.framebuffer.height)
        else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if !rasterizer::is_inside_triangle(&corners, &p) {
                    continue;
                }
                let Some(bary) = rasterizer::get_barycentric_coords(&corners, &p) else {
                    continue;
                };

                let depth = rasterizer::interpolate_depth(points, bary);
                let normal = rasterizer::interpolate_normal(points, bary);
                let fragment = FragmentData {
                    normal: if normal.magnitude2() > 0.0 {
                        normal.normalize()
                    } else {
                        normal
                    },
                    color: rasterizer::interpolate_color(points, bary),
                    time,
                };

                let color = framebuffer::pack_color(shader.shade(fragment));
                self.framebuffer.put_pixel(x, y, color, depth);
            }
        }
    }

    fn draw_wireframe(&mut self, points: &[RasterPoint; 3], shader: &dyn FragmentShader, time: f32) {
        let colors = points.map(|p| {
            shader.shade(FragmentData {
                normal: p.normal,
                color: p.color,
                time,
            })
        });
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            self.draw_line(
                (points[a].pos, points[a].z, colors[a]),
                (points[b].pos, points[b].z, colors[b]),
            );
        }
    }

    //布雷森汉姆算法 画线段，颜色和深度沿线段线性插值
    fn draw_line(&mut self, from: (Vec2<f32>, f32, Vec3<f32>), to: (Vec2<f32>, f32, Vec3<f32>)) {
        let width = self.framebuffer.width as f32;
        let height = self.framebuffer.height as f32;
        let Some((t0, t1)) = clip_segment(from.0, to.0, width - 1.0, height - 1.0) else {
            return;
        };
        let lerp = |t: f32| {
            (
                from.0 + (to.0 - from.0) * t,
                from.1 + (to.1 - from.1) * t,
                from.2 + (to.2 - from.2) * t,
            )
        };
        let (p0, z0, c0) = lerp(t0);
        let (p1, z1, c1) = lerp(t1);

        let mut x0 = p0.x.round() as i32;
        let mut y0 = p0.y.round() as i32;
        let x1 = p1.x.round() as i32;
        let y1 = p1.y.round() as i32;

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        let steps = dx.max(dy).max(1) as f32;
        let mut step = 0.0;

        loop {
            let t = step / steps;
            let color = framebuffer::pack_color(c0 + (c1 - c0) * t);
            if x0 >= 0 && y0 >= 0 {
                self.framebuffer
                    .put_pixel(x0 as usize, y0 as usize, color, z0 + (z1 - z0) * t);
            }

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }
}

/// 屏幕空间 y 向下，逆时针（正面）三角形的有向面积为负
fn is_back_facing(points: &[RasterPoint; 3]) -> bool {
    rasterizer::signed_area(&[points[0].pos, points[1].pos, points[2].pos]) >= 0.0
}

/// 把线段 p0→p1 裁到 `[0, max_x] x [0, max_y]`，返回保留部分的参数区间
fn clip_segment(p0: Vec2<f32>, p1: Vec2<f32>, max_x: f32, max_y: f32) -> Option<(f32, f32)> {
    let d = p1 - p0;
    let mut t0: f32 = 0.0;
    let mut t1: f32 = 1.0;
    // 左、右、上、下四条边
    for (p, q) in [
        (-d.x, p0.x),
        (d.x, max_x - p0.x),
        (-d.y, p0.y),
        (d.y, max_y - p0.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{FragmentProgram, VertexProgram};
    use crate::transform::Matrix4;
    use crate::vertex::{Triangle, Vertex};

    const BACKGROUND: u32 = 0xFF000000;

    fn program(matrix: Matrix4) -> ShaderProgram {
        let mut program = ShaderProgram::new(
            VertexProgram::Combined { matrix: "B".into() },
            FragmentProgram::Normal,
        );
        let b = program.uniform_location("B").unwrap();
        program.set_matrix4fv(b, matrix.as_array());
        program
    }

    fn renderer() -> Renderer {
        let mut r = Renderer::new(32, 32);
        r.clear(BACKGROUND);
        r
    }

    fn lit_pixels(r: &Renderer) -> usize {
        r.framebuffer().data.iter().filter(|&&c| c != BACKGROUND).count()
    }

    #[test]
    fn fills_visible_triangle() {
        let mut r = renderer();
        let drawn = r.draw(&TriangleSoup::triangle(), &program(Matrix4::identity()));
        assert_eq!(drawn, 1);
        assert_ne!(r.framebuffer().pixel(16, 18), BACKGROUND);
        assert_eq!(r.framebuffer().pixel(1, 1), BACKGROUND);
    }

    #[test]
    fn non_finite_matrix_draws_nothing() {
        let mut r = renderer();
        let broken = Matrix4::perspective(0.0, 1.0, 1.0, 1.0);
        let drawn = r.draw(&TriangleSoup::triangle(), &program(broken));
        assert_eq!(drawn, 0);
        assert_eq!(lit_pixels(&r), 0);
    }

    #[test]
    fn culling_removes_back_faces() {
        let mut r = renderer();
        r.cull_face = true;
        // 绕 y 轴转半圈后背对观察者
        let flipped = Matrix4::rotate_y(std::f32::consts::PI);
        assert_eq!(r.draw(&TriangleSoup::triangle(), &program(flipped)), 0);
        assert_eq!(lit_pixels(&r), 0);

        assert_eq!(
            r.draw(&TriangleSoup::triangle(), &program(Matrix4::identity())),
            1
        );
        assert!(lit_pixels(&r) > 0);
    }

    #[test]
    fn line_mode_leaves_interior_empty() {
        let mut r = renderer();
        r.polygon_mode = PolygonMode::Line;
        r.draw(&TriangleSoup::triangle(), &program(Matrix4::identity()));
        assert_eq!(r.framebuffer().pixel(16, 18), BACKGROUND);
        assert!(lit_pixels(&r) > 0);
    }

    #[test]
    fn huge_wireframe_is_clipped_to_screen() {
        let mut r = renderer();
        r.polygon_mode = PolygonMode::Line;
        r.draw(&TriangleSoup::triangle(), &program(Matrix4::scale(1e7)));
        assert!(lit_pixels(&r) <= 32 * 32);
    }

    #[test]
    fn nearer_triangle_wins() {
        let mut r = renderer();
        let n = Vec3::new(0.0, 0.0, 1.0);
        let quad = |z: f32, color: Vec3<f32>| {
            let v = |x: f32, y: f32| Vertex {
                pos: Vec3::new(x, y, z),
                normal: n,
                color,
            };
            Triangle::new(v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0))
        };
        let mut program = ShaderProgram::new(
            VertexProgram::Combined { matrix: "B".into() },
            FragmentProgram::Lambert,
        );
        let b = program.uniform_location("B").unwrap();
        program.set_matrix4fv(b, Matrix4::identity().as_array());

        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        // NDC 中 z 越小越靠近近平面；先画近的，远的要被深度测试挡掉
        let mesh = TriangleSoup::from_triangles(vec![quad(-0.5, red), quad(0.5, blue)]);
        r.draw(&mesh, &program);
        let c = r.framebuffer().pixel(16, 16);
        assert!((c >> 16) & 0xFF > 0);
        assert_eq!(c & 0xFF, 0);
    }

    #[test]
    fn segment_clipping() {
        let full = clip_segment(Vec2::new(1.0, 1.0), Vec2::new(5.0, 5.0), 9.0, 9.0);
        assert_eq!(full, Some((0.0, 1.0)));
        let outside = clip_segment(Vec2::new(-5.0, -1.0), Vec2::new(-1.0, -3.0), 9.0, 9.0);
        assert_eq!(outside, None);
        let (t0, t1) = clip_segment(Vec2::new(-10.0, 5.0), Vec2::new(20.0, 5.0), 9.0, 9.0).unwrap();
        assert!((t0 - 1.0 / 3.0).abs() < 1e-6);
        assert!((t1 - 19.0 / 30.0).abs() < 1e-6);
    }
}
