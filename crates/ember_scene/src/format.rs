//! Serde model of the JSON scene file format.
//!
//! Primitive, material, texture and light kinds are tagged by a `type`
//! field; an unknown kind fails at parse time rather than rendering
//! garbage.

use serde::Deserialize;

/// Top-level scene file.
#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub camera: CameraDesc,
    #[serde(default)]
    pub objects: Vec<PrimitiveDesc>,
    #[serde(default)]
    pub lights: Vec<LightDesc>,
}

/// Camera parameters.
#[derive(Debug, Deserialize)]
pub struct CameraDesc {
    pub lookfrom: [f32; 3],
    pub lookat: [f32; 3],
    #[serde(default = "default_vup")]
    pub vup: [f32; 3],
    pub vfov: f32,
    pub aspect_ratio: f32,
    #[serde(default)]
    pub aperture: f32,
    #[serde(default = "default_focus_dist")]
    pub focus_dist: f32,
}

fn default_vup() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_focus_dist() -> f32 {
    1.0
}

/// A primitive plus its material.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrimitiveDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
        material: MaterialDesc,
    },
    Plane {
        point: [f32; 3],
        normal: [f32; 3],
        material: MaterialDesc,
    },
    Triangle {
        v0: [f32; 3],
        v1: [f32; 3],
        v2: [f32; 3],
        material: MaterialDesc,
    },
    Mesh {
        vertices: Vec<[f32; 3]>,
        faces: Vec<[u32; 3]>,
        material: MaterialDesc,
    },
}

/// Material kinds.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        albedo: [f32; 3],
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        ior: f32,
    },
    Emissive {
        radiance: [f32; 3],
    },
    TexturedLambertian {
        texture: TextureDesc,
        #[serde(default)]
        normal_map: Option<NormalMapDesc>,
    },
}

/// Texture kinds.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureDesc {
    Solid {
        color: [f32; 3],
    },
    Checker {
        color1: [f32; 3],
        color2: [f32; 3],
        #[serde(default = "default_frequency")]
        frequency: f32,
    },
    Image {
        path: String,
    },
}

fn default_frequency() -> f32 {
    10.0
}

/// A tangent-space normal map attached to a material.
#[derive(Debug, Deserialize)]
pub struct NormalMapDesc {
    pub path: String,
    #[serde(default = "default_strength")]
    pub strength: f32,
}

fn default_strength() -> f32 {
    1.0
}

/// Light kinds.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDesc {
    Point {
        position: [f32; 3],
        intensity: [f32; 3],
    },
    Area {
        center: [f32; 3],
        u_edge: [f32; 3],
        v_edge: [f32; 3],
        emission: [f32; 3],
    },
}
