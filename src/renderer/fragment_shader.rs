use cgmath::{ElementWise, InnerSpace, Vector3 as Vec3};

use crate::shader::FragmentProgram;

#[derive(Debug, Clone, Copy)]
pub struct FragmentData {
    pub normal: Vec3<f32>,
    pub color: Vec3<f32>, // 顶点颜色插值结果
    pub time: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub direction: Vec3<f32>,
    pub color: Vec3<f32>,
    pub intensity: f32,
    pub ambient_strength: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            // 视空间中从左上前方照过来
            direction: Vec3::new(0.4, -0.5, -1.0).normalize(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 0.9,
            ambient_strength: 0.2,
        }
    }
}

impl Light {
    fn lambert(&self, normal: Vec3<f32>) -> Vec3<f32> {
        let diff = normal.dot(-self.direction).max(0.0);
        self.color * (self.ambient_strength + self.intensity * diff)
    }
}

// 定义 Shader 的通用行为
pub trait FragmentShader {
    // 输入插值后的片元数据，输出最终的颜色 (0.0 ~ 1.0 范围的 Vec3)
    fn shade(&self, data: FragmentData) -> Vec3<f32>;
}

pub fn for_program(program: FragmentProgram) -> Box<dyn FragmentShader> {
    match program {
        FragmentProgram::Normal => Box::new(NormalShader),
        FragmentProgram::Lambert => Box::new(LambertShader {
            light: Light::default(),
        }),
        FragmentProgram::Pulse => Box::new(PulseShader {
            light: Light::default(),
        }),
    }
}

pub struct NormalShader;

impl FragmentShader for NormalShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        (data.normal + Vec3::new(1.0, 1.0, 1.0)) * 0.5
    }
}

pub struct LambertShader {
    pub light: Light,
}

impl FragmentShader for LambertShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        clamp(data.color.mul_element_wise(self.light.lambert(data.normal)))
    }
}

/// 亮度随 `time` uniform 周期变化
pub struct PulseShader {
    pub light: Light,
}

impl FragmentShader for PulseShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        let pulse = 0.75 + 0.25 * (data.time * 2.0).sin();
        clamp(data.color.mul_element_wise(self.light.lambert(data.normal)) * pulse)
    }
}

fn clamp(mut color: Vec3<f32>) -> Vec3<f32> {
    color.x = color.x.clamp(0.0, 1.0);
    color.y = color.y.clamp(0.0, 1.0);
    color.z = color.z.clamp(0.0, 1.0);
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_light() -> FragmentData {
        FragmentData {
            normal: -Light::default().direction,
            color: Vec3::new(1.0, 1.0, 1.0),
            time: 0.0,
        }
    }

    #[test]
    fn normal_shader_maps_to_unit_cube() {
        let c = NormalShader.shade(FragmentData {
            normal: Vec3::new(0.0, 0.0, 1.0),
            ..facing_light()
        });
        assert_eq!(c, Vec3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn lambert_is_brightest_facing_light() {
        let shader = LambertShader {
            light: Light::default(),
        };
        let lit = shader.shade(facing_light());
        let away = shader.shade(FragmentData {
            normal: Light::default().direction,
            ..facing_light()
        });
        assert!(lit.x > away.x);
        assert!((away.x - Light::default().ambient_strength).abs() < 1e-6);
        assert!(lit.x <= 1.0);
    }

    #[test]
    fn pulse_varies_with_time() {
        let shader = PulseShader {
            light: Light::default(),
        };
        let a = shader.shade(facing_light());
        let b = shader.shade(FragmentData {
            time: std::f32::consts::FRAC_PI_4,
            ..facing_light()
        });
        assert!(b.x > a.x);
    }
}
