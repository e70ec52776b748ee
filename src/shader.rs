//! 着色器程序与 uniform 上传
//!
//! 程序在创建时声明自己读取哪些 uniform；按名字查位置，再按位置写值，
//! 和 `glGetUniformLocation` / `glUniform*` 的用法一致。

use log::warn;
use serde::{Deserialize, Serialize};

use crate::transform::Matrix4;

/// 顶点程序：gl_Position 的计算方式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexProgram {
    /// gl_Position = M * p
    Combined { matrix: String },
    /// gl_Position = P * MV * p
    Split {
        projection: String,
        model_view: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentProgram {
    Normal,
    Lambert,
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
enum UniformValue {
    Float(f32),
    Matrix4([f32; 16]),
}

#[derive(Debug, Clone)]
struct Uniform {
    name: String,
    value: UniformValue,
}

#[derive(Debug, Clone)]
pub struct ShaderProgram {
    vertex: VertexProgram,
    fragment: FragmentProgram,
    uniforms: Vec<Uniform>,
}

pub const TIME_UNIFORM: &str = "time";

impl ShaderProgram {
    pub fn new(vertex: VertexProgram, fragment: FragmentProgram) -> Self {
        let identity = UniformValue::Matrix4(*Matrix4::IDENTITY.as_array());
        let mut uniforms = vec![Uniform {
            name: TIME_UNIFORM.to_string(),
            value: UniformValue::Float(0.0),
        }];
        let matrix_names: Vec<&String> = match &vertex {
            VertexProgram::Combined { matrix } => vec![matrix],
            VertexProgram::Split {
                projection,
                model_view,
            } => vec![projection, model_view],
        };
        for name in matrix_names {
            uniforms.push(Uniform {
                name: name.clone(),
                value: identity,
            });
        }
        Self {
            vertex,
            fragment,
            uniforms,
        }
    }

    pub fn fragment(&self) -> FragmentProgram {
        self.fragment
    }

    /// 找不到时给出警告并返回 `None`
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let location = self
            .uniforms
            .iter()
            .position(|u| u.name == name)
            .map(UniformLocation);
        if location.is_none() {
            warn!("Unable to locate the variable '{name}' in shader!");
        }
        location
    }

    pub fn set_float(&mut self, location: UniformLocation, value: f32) {
        self.set(location, UniformValue::Float(value));
    }

    /// 上传列主序的 16 个浮点数
    pub fn set_matrix4fv(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.set(location, UniformValue::Matrix4(*value));
    }

    fn set(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(uniform) = self.uniforms.get_mut(location.0) else {
            warn!("uniform 位置 {} 无效", location.0);
            return;
        };
        let same_kind = matches!(
            (&uniform.value, &value),
            (UniformValue::Float(_), UniformValue::Float(_))
                | (UniformValue::Matrix4(_), UniformValue::Matrix4(_))
        );
        if same_kind {
            uniform.value = value;
        } else {
            warn!("uniform '{}' 类型不匹配，忽略本次上传", uniform.name);
        }
    }

    pub fn float(&self, name: &str) -> f32 {
        match self.value(name) {
            Some(UniformValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    pub fn matrix(&self, name: &str) -> Matrix4 {
        match self.value(name) {
            Some(UniformValue::Matrix4(m)) => Matrix4::from_cols_array(m),
            _ => Matrix4::IDENTITY,
        }
    }

    fn value(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.iter().find(|u| u.name == name).map(|u| u.value)
    }

    /// 返回 (完整的裁剪矩阵, 模型视图部分)
    pub fn clip_matrices(&self) -> (Matrix4, Matrix4) {
        match &self.vertex {
            VertexProgram::Combined { matrix } => {
                let m = self.matrix(matrix);
                (m, m)
            }
            VertexProgram::Split {
                projection,
                model_view,
            } => {
                let mv = self.matrix(model_view);
                (self.matrix(projection) * mv, mv)
            }
        }
    }
}
