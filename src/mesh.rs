use std::io::BufReader;
use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Vector3 as Vec3, Zero};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vertex::{Triangle, Vertex};

fn default_color() -> Vec3<f32> {
    Vec3::new(0.8, 0.8, 0.8)
}

/// 编译进程序的模型，不依赖运行时的工作目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinMesh {
    Sphere,
    Box,
}

impl BuiltinMesh {
    fn source(self) -> &'static str {
        match self {
            BuiltinMesh::Sphere => include_str!("../assets/sphere.obj"),
            BuiltinMesh::Box => include_str!("../assets/box.obj"),
        }
    }
}

/// 一组独立的三角形，渲染时逐个送进管线
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    triangles: Vec<Triangle>,
}

impl TriangleSoup {
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// 位于 z = 0 平面、逆时针绕序的单个三角形
    pub fn triangle() -> Self {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let vertex = |x: f32, y: f32, color: Vec3<f32>| Vertex {
            pos: Vec3::new(x, y, 0.0),
            normal,
            color,
        };
        Self::from_triangles(vec![Triangle::new(
            vertex(-0.6, -0.6, Vec3::new(1.0, 0.0, 0.0)),
            vertex(0.6, -0.6, Vec3::new(0.0, 1.0, 0.0)),
            vertex(0.0, 0.6, Vec3::new(0.0, 0.0, 1.0)),
        )])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let (models, _materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| Error::MeshLoad {
                path: path.to_path_buf(),
                source,
            })?;
        let soup = Self::from_models(&models);
        if soup.is_empty() {
            return Err(Error::EmptyMesh(path.to_path_buf()));
        }
        info!("已加载模型 {}：{} 个三角形", path.display(), soup.len());
        Ok(soup)
    }

    pub fn builtin(mesh: BuiltinMesh) -> Result<Self> {
        let soup = Self::from_obj_source(mesh.source())?;
        debug!("内置模型 {mesh:?}：{} 个三角形", soup.len());
        Ok(soup)
    }

    /// 直接解析 OBJ 文本，忽略 mtllib
    pub fn from_obj_source(source: &str) -> Result<Self> {
        let mut reader = BufReader::new(source.as_bytes());
        let (models, _materials) = tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|source| Error::MeshLoad {
            path: PathBuf::from("<memory>"),
            source,
        })?;
        Ok(Self::from_models(&models))
    }

    fn from_models(models: &[tobj::Model]) -> Self {
        let mut triangles = Vec::new();
        for model in models {
            let mesh = &model.mesh;
            let positions: Vec<Vec3<f32>> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect();

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2]))
                    .collect()
            } else {
                debug!("模型 {} 没有法线，按相邻面平均生成", model.name);
                smooth_normals(&positions, &mesh.indices)
            };

            let colors: Vec<Vec3<f32>> = if mesh.vertex_color.len() == mesh.positions.len() {
                mesh.vertex_color
                    .chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2]))
                    .collect()
            } else {
                vec![default_color(); positions.len()]
            };

            for face in mesh.indices.chunks_exact(3) {
                let vertex = |i: u32| {
                    let i = i as usize;
                    Vertex {
                        pos: positions[i],
                        normal: normals[i],
                        color: colors[i],
                    }
                };
                triangles.push(Triangle::new(vertex(face[0]), vertex(face[1]), vertex(face[2])));
            }
        }
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// 顶点法线 = 相邻面法线的平均
fn smooth_normals(positions: &[Vec3<f32>], indices: &[u32]) -> Vec<Vec3<f32>> {
    let mut normals = vec![Vec3::zero(); positions.len()];
    for face in indices.chunks_exact(3) {
        let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        if n.magnitude2() == 0.0 {
            continue;
        }
        let n = n.normalize();
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        if n.magnitude2() > 0.0 {
            *n = n.normalize();
        }
    }
    normals
}
