//! 每帧的矩阵合成
//!
//! 一个 [`Composition`] 是按顺序排列的若干 [`Stage`]，每帧用当前时间求出各自的
//! 矩阵后从左往右相乘。第一个阶段是最外层的变换，最后一个阶段最先作用到顶点上。

use serde::{Deserialize, Serialize};

use crate::transform::Matrix4;

/// 由时间参数化的基本变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Stage {
    Identity,
    Scale {
        factor: f32,
    },
    Translate {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    },
    /// 实际角度 = `angle + rate * time`
    RotateX {
        #[serde(default)]
        angle: f32,
        #[serde(default)]
        rate: f32,
    },
    RotateY {
        #[serde(default)]
        angle: f32,
        #[serde(default)]
        rate: f32,
    },
    RotateZ {
        #[serde(default)]
        angle: f32,
        #[serde(default)]
        rate: f32,
    },
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Stage {
    pub fn matrix(&self, time: f32) -> Matrix4 {
        match *self {
            Stage::Identity => Matrix4::identity(),
            Stage::Scale { factor } => Matrix4::scale(factor),
            Stage::Translate { x, y, z } => Matrix4::translate(x, y, z),
            Stage::RotateX { angle, rate } => Matrix4::rotate_x(angle + rate * time),
            Stage::RotateY { angle, rate } => Matrix4::rotate_y(angle + rate * time),
            Stage::RotateZ { angle, rate } => Matrix4::rotate_z(angle + rate * time),
            Stage::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Matrix4::perspective(fov, aspect, near, far),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    stages: Vec<Stage>,
}

impl Composition {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// 求 `time` 时刻的合成矩阵，空列表得到单位阵
    pub fn at(&self, time: f32) -> Matrix4 {
        let mut acc = Matrix4::identity();
        for stage in &self.stages {
            acc = acc * stage.matrix(time);
        }
        acc
    }
}
