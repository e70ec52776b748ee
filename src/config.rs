use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::animation::{Composition, Stage};
use crate::error::{Error, Result};
use crate::mesh::BuiltinMesh;
use crate::renderer::PolygonMode;
use crate::shader::{FragmentProgram, VertexProgram};

/// 网格来源：单个三角形、内置模型或 OBJ 文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSource {
    Triangle,
    Builtin(BuiltinMesh),
    Obj(PathBuf),
}

/// 一个矩阵 uniform 以及每帧生成它的合成链
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixUniform {
    pub name: String,
    pub stages: Composition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub mesh: MeshSource,
    pub program: VertexProgram,
    #[serde(default = "default_fragment")]
    pub fragment: FragmentProgram,
    #[serde(default)]
    pub polygon_mode: PolygonMode,
    #[serde(default)]
    pub cull_face: bool,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    pub matrices: Vec<MatrixUniform>,
}

fn default_fragment() -> FragmentProgram {
    FragmentProgram::Lambert
}

fn default_clear_color() -> [f32; 3] {
    [0.1, 0.1, 0.1]
}

const WINDOW_SIZE: usize = 540;

impl DemoConfig {
    /// 球体绕原点公转同时自转，整体从斜上方俯视
    pub fn orbit() -> Self {
        Self {
            title: "GLprimer: orbit".to_string(),
            width: WINDOW_SIZE,
            height: WINDOW_SIZE,
            mesh: MeshSource::Builtin(BuiltinMesh::Sphere),
            program: VertexProgram::Combined {
                matrix: "B".to_string(),
            },
            fragment: FragmentProgram::Lambert,
            polygon_mode: PolygonMode::Fill,
            cull_face: true,
            clear_color: default_clear_color(),
            matrices: vec![MatrixUniform {
                name: "B".to_string(),
                stages: Composition::new(vec![
                    Stage::RotateX {
                        angle: -FRAC_PI_4,
                        rate: 0.0,
                    },
                    Stage::RotateY {
                        angle: 0.0,
                        rate: 1.0,
                    },
                    Stage::Translate {
                        x: 0.5,
                        y: 0.0,
                        z: 0.0,
                    },
                    Stage::RotateY {
                        angle: 0.0,
                        rate: 1.5,
                    },
                    Stage::Scale { factor: 0.2 },
                ]),
            }],
        }
    }

    /// 长方体在相机前方绕 y 轴旋转，线框透视显示
    pub fn box_spin() -> Self {
        Self {
            title: "GLprimer: box".to_string(),
            width: WINDOW_SIZE,
            height: WINDOW_SIZE,
            mesh: MeshSource::Builtin(BuiltinMesh::Box),
            program: VertexProgram::Split {
                projection: "P".to_string(),
                model_view: "MV".to_string(),
            },
            fragment: FragmentProgram::Normal,
            polygon_mode: PolygonMode::Line,
            cull_face: false,
            clear_color: default_clear_color(),
            matrices: vec![
                MatrixUniform {
                    name: "P".to_string(),
                    stages: Composition::new(vec![Stage::Perspective {
                        fov: FRAC_PI_2,
                        aspect: 1.0,
                        near: 0.1,
                        far: 100.0,
                    }]),
                },
                MatrixUniform {
                    name: "MV".to_string(),
                    stages: Composition::new(vec![
                        Stage::Translate {
                            x: 0.0,
                            y: 0.0,
                            z: -0.7,
                        },
                        Stage::RotateY {
                            angle: 0.0,
                            rate: 0.5,
                        },
                    ]),
                },
            ],
        }
    }

    /// 读取 JSON 配置，OBJ 的相对路径相对于配置文件所在目录
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: DemoConfig =
            serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        if let MeshSource::Obj(mesh) = &mut config.mesh {
            if mesh.is_relative() {
                if let Some(dir) = path.parent() {
                    *mesh = dir.join(&*mesh);
                }
            }
        }
        config.validate()?;
        info!("成功读取配置 {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "窗口尺寸必须大于 0，当前为 {}x{}",
                self.width, self.height
            )));
        }
        if let Some(bad) = self.matrices.iter().find(|m| m.name.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "矩阵 uniform 名不能为空（{} 个阶段）",
                bad.stages.stages().len()
            )));
        }
        if self.clear_color.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidConfig("清屏颜色必须是有限值".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glprimer-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn presets_validate() {
        DemoConfig::orbit().validate().unwrap();
        DemoConfig::box_spin().validate().unwrap();
    }

    #[test]
    fn presets_use_embedded_meshes() {
        assert_eq!(DemoConfig::orbit().mesh, MeshSource::Builtin(BuiltinMesh::Sphere));
        assert_eq!(DemoConfig::box_spin().mesh, MeshSource::Builtin(BuiltinMesh::Box));

        let config: DemoConfig = serde_json::from_str(
            r#"{
                "title": "builtin",
                "width": 8,
                "height": 8,
                "mesh": {"builtin": "box"},
                "program": {"kind": "combined", "matrix": "B"},
                "matrices": []
            }"#,
        )
        .unwrap();
        assert_eq!(config.mesh, MeshSource::Builtin(BuiltinMesh::Box));
    }

    #[test]
    fn box_preset_model_view_starts_as_translation() {
        let config = DemoConfig::box_spin();
        let mv = config.matrices.iter().find(|m| m.name == "MV").unwrap();
        assert_eq!(
            mv.stages.at(0.0),
            crate::transform::Matrix4::translate(0.0, 0.0, -0.7)
        );
    }

    #[test]
    fn round_trips_through_json() {
        let config = DemoConfig::orbit();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: DemoConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_resolves_relative_mesh_and_defaults() {
        let dir = temp_dir("load");
        let path = dir.join("demo.json");
        fs::write(
            &path,
            r#"{
                "title": "custom",
                "width": 64,
                "height": 48,
                "mesh": {"obj": "meshes/thing.obj"},
                "program": {"kind": "combined", "matrix": "B"},
                "matrices": [
                    {"name": "B", "stages": [{"op": "rotate_z", "rate": 2.0}]}
                ]
            }"#,
        )
        .unwrap();

        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.mesh, MeshSource::Obj(dir.join("meshes/thing.obj")));
        assert_eq!(config.fragment, FragmentProgram::Lambert);
        assert_eq!(config.polygon_mode, PolygonMode::Fill);
        assert!(!config.cull_face);
        assert_eq!(config.clear_color, [0.1, 0.1, 0.1]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_reports_errors() {
        let dir = temp_dir("errors");
        let missing = DemoConfig::load(&dir.join("missing.json")).unwrap_err();
        assert!(matches!(missing, Error::ConfigRead { .. }));

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            DemoConfig::load(&broken).unwrap_err(),
            Error::ConfigParse { .. }
        ));

        let zero = dir.join("zero.json");
        let mut config = DemoConfig::orbit();
        config.width = 0;
        fs::write(&zero, serde_json::to_string(&config).unwrap()).unwrap();
        assert!(matches!(
            DemoConfig::load(&zero).unwrap_err(),
            Error::InvalidConfig(_)
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/tumble.json");
        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.fragment, FragmentProgram::Pulse);
        assert!(config.cull_face);
        assert_eq!(config.matrices.len(), 2);
        assert_eq!(config.matrices[1].stages.stages().len(), 5);
        let MeshSource::Obj(mesh) = &config.mesh else {
            panic!("expected an OBJ mesh");
        };
        assert!(mesh.exists());
    }

    #[test]
    fn empty_uniform_name_is_rejected() {
        let mut config = DemoConfig::box_spin();
        config.matrices[0].name = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
