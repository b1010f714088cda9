//! Build render-core objects from a parsed scene file.

use std::collections::HashMap;
use std::sync::Arc;

use ember_math::Vec3;
use ember_render::{
    AreaLight, Camera, CheckerTexture, Dielectric, Emissive, ImageTexture, Lambertian, Material,
    Mesh, Metal, NormalMap, Plane, PointLight, Scene, SolidColor, Sphere, Texture,
    TexturedLambertian, Triangle,
};
use rand::RngCore;

use crate::error::SceneError;
use crate::format::{
    CameraDesc, LightDesc, MaterialDesc, PrimitiveDesc, SceneFile, TextureDesc,
};

#[inline]
fn vec3(a: [f32; 3]) -> Vec3 {
    Vec3::from_array(a)
}

/// Build a scene and camera from a parsed file.
///
/// All validation happens here: malformed values and unloadable
/// textures fail construction, so the hot path never checks them. The
/// BVH is built last, over the finished primitive set.
pub fn build_scene(file: &SceneFile, rng: &mut dyn RngCore) -> Result<(Scene, Camera), SceneError> {
    let camera = build_camera(&file.camera)?;

    let mut scene = Scene::new();
    let mut textures = TextureCache::new();

    for object in &file.objects {
        scene.add(build_primitive(object, &mut textures, rng)?);
    }
    for light in &file.lights {
        scene.add_light(build_light(light)?);
    }

    scene.build_bvh(rng);
    log::debug!(
        "Built scene: {} primitives, {} lights",
        scene.object_count(),
        scene.lights().len()
    );

    Ok((scene, camera))
}

fn build_camera(desc: &CameraDesc) -> Result<Camera, SceneError> {
    if desc.vfov <= 0.0 || desc.vfov >= 180.0 {
        return Err(SceneError::invalid(
            "camera",
            "vfov",
            format!("{} is outside (0, 180)", desc.vfov),
        ));
    }
    if desc.aspect_ratio <= 0.0 {
        return Err(SceneError::invalid(
            "camera",
            "aspect_ratio",
            "must be positive",
        ));
    }

    Ok(Camera::new(
        vec3(desc.lookfrom),
        vec3(desc.lookat),
        vec3(desc.vup),
        desc.vfov,
        desc.aspect_ratio,
        desc.aperture,
        desc.focus_dist,
    ))
}

fn build_primitive(
    desc: &PrimitiveDesc,
    textures: &mut TextureCache,
    rng: &mut dyn RngCore,
) -> Result<Arc<dyn ember_render::Hittable>, SceneError> {
    match desc {
        PrimitiveDesc::Sphere {
            center,
            radius,
            material,
        } => {
            if *radius <= 0.0 {
                return Err(SceneError::invalid("sphere", "radius", "must be positive"));
            }
            let material = build_material(material, textures)?;
            Ok(Arc::new(Sphere::new(vec3(*center), *radius, material)))
        }
        PrimitiveDesc::Plane {
            point,
            normal,
            material,
        } => {
            if vec3(*normal).length_squared() < 1e-12 {
                return Err(SceneError::invalid("plane", "normal", "must be non-zero"));
            }
            let material = build_material(material, textures)?;
            Ok(Arc::new(Plane::new(vec3(*point), vec3(*normal), material)))
        }
        PrimitiveDesc::Triangle { v0, v1, v2, material } => {
            let (v0, v1, v2) = (vec3(*v0), vec3(*v1), vec3(*v2));
            if (v1 - v0).cross(v2 - v0).length_squared() < 1e-12 {
                return Err(SceneError::invalid(
                    "triangle",
                    "vertices",
                    "triangle has zero area",
                ));
            }
            let material = build_material(material, textures)?;
            Ok(Arc::new(Triangle::new(v0, v1, v2, material)))
        }
        PrimitiveDesc::Mesh {
            vertices,
            faces,
            material,
        } => {
            let material = build_material(material, textures)?;
            let mesh = Mesh::new(
                vertices.iter().map(|v| vec3(*v)).collect(),
                faces.clone(),
                material,
                rng,
            );
            if mesh.is_empty() {
                return Err(SceneError::invalid("mesh", "faces", "no valid faces"));
            }
            Ok(Arc::new(mesh))
        }
    }
}

fn build_material(
    desc: &MaterialDesc,
    textures: &mut TextureCache,
) -> Result<Arc<dyn Material>, SceneError> {
    match desc {
        MaterialDesc::Lambertian { albedo } => Ok(Arc::new(Lambertian::new(vec3(*albedo)))),
        MaterialDesc::Metal { albedo, fuzz } => Ok(Arc::new(Metal::new(vec3(*albedo), *fuzz))),
        MaterialDesc::Dielectric { ior } => {
            if *ior <= 0.0 {
                return Err(SceneError::invalid("dielectric", "ior", "must be positive"));
            }
            Ok(Arc::new(Dielectric::new(*ior)))
        }
        MaterialDesc::Emissive { radiance } => Ok(Arc::new(Emissive::new(vec3(*radiance)))),
        MaterialDesc::TexturedLambertian {
            texture,
            normal_map,
        } => {
            let texture = build_texture(texture, textures)?;
            match normal_map {
                Some(map) => {
                    let normal_texture = textures.load_linear(&map.path)?;
                    let normal_map = Arc::new(NormalMap::new(normal_texture, map.strength));
                    Ok(Arc::new(TexturedLambertian::with_normal_map(
                        texture, normal_map,
                    )))
                }
                None => Ok(Arc::new(TexturedLambertian::new(texture))),
            }
        }
    }
}

fn build_texture(
    desc: &TextureDesc,
    textures: &mut TextureCache,
) -> Result<Arc<dyn Texture>, SceneError> {
    match desc {
        TextureDesc::Solid { color } => Ok(Arc::new(SolidColor::new(vec3(*color)))),
        TextureDesc::Checker {
            color1,
            color2,
            frequency,
        } => Ok(Arc::new(CheckerTexture::new(
            vec3(*color1),
            vec3(*color2),
            *frequency,
        ))),
        TextureDesc::Image { path } => Ok(textures.load(path)?),
    }
}

fn build_light(desc: &LightDesc) -> Result<Arc<dyn ember_render::Light>, SceneError> {
    match desc {
        LightDesc::Point {
            position,
            intensity,
        } => Ok(Arc::new(PointLight::new(vec3(*position), vec3(*intensity)))),
        LightDesc::Area {
            center,
            u_edge,
            v_edge,
            emission,
        } => {
            let (u_edge, v_edge) = (vec3(*u_edge), vec3(*v_edge));
            if u_edge.cross(v_edge).length_squared() < 1e-12 {
                return Err(SceneError::invalid(
                    "area light",
                    "edges",
                    "edges span zero area",
                ));
            }
            Ok(Arc::new(AreaLight::new(
                vec3(*center),
                u_edge,
                v_edge,
                vec3(*emission),
            )))
        }
    }
}

/// Image textures decode once per path and are shared by reference.
struct TextureCache {
    srgb: HashMap<String, Arc<ImageTexture>>,
    linear: HashMap<String, Arc<ImageTexture>>,
}

impl TextureCache {
    fn new() -> Self {
        Self {
            srgb: HashMap::new(),
            linear: HashMap::new(),
        }
    }

    fn load(&mut self, path: &str) -> Result<Arc<ImageTexture>, SceneError> {
        if let Some(texture) = self.srgb.get(path) {
            return Ok(texture.clone());
        }
        let texture = Arc::new(ImageTexture::load(path)?);
        self.srgb.insert(path.to_string(), texture.clone());
        Ok(texture)
    }

    fn load_linear(&mut self, path: &str) -> Result<Arc<ImageTexture>, SceneError> {
        if let Some(texture) = self.linear.get(path) {
            return Ok(texture.clone());
        }
        let texture = Arc::new(ImageTexture::load_linear(path)?);
        self.linear.insert(path.to_string(), texture.clone());
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_scene_from_str;
    use ember_render::{HitRecord, Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_build_scene_from_json() {
        let json = r#"{
            "camera": {
                "lookfrom": [0, 0, 5], "lookat": [0, 0, 0],
                "vfov": 60, "aspect_ratio": 1.0
            },
            "objects": [
                {
                    "type": "sphere", "center": [0, 0, 0], "radius": 1,
                    "material": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] }
                },
                {
                    "type": "plane", "point": [0, -2, 0], "normal": [0, 1, 0],
                    "material": {
                        "type": "textured_lambertian",
                        "texture": {
                            "type": "checker",
                            "color1": [1, 1, 1], "color2": [0.1, 0.1, 0.1]
                        }
                    }
                },
                {
                    "type": "mesh",
                    "vertices": [[0, 2, 0], [1, 2, 0], [0, 3, 0]],
                    "faces": [[0, 1, 2]],
                    "material": { "type": "metal", "albedo": [0.9, 0.9, 0.9], "fuzz": 0.1 }
                }
            ],
            "lights": [
                { "type": "point", "position": [0, 5, 0], "intensity": [20, 20, 20] },
                {
                    "type": "area", "center": [0, 4, 0],
                    "u_edge": [1, 0, 0], "v_edge": [0, 0, 1],
                    "emission": [5, 5, 5]
                }
            ]
        }"#;

        let mut rng = StdRng::seed_from_u64(1);
        let (scene, camera) = load_scene_from_str(json, &mut rng).unwrap();
        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.lights().len(), 2);

        // The built scene answers hit queries through its BVH
        let mut rec = HitRecord::default();
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert!(scene.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_invalid_radius_fails() {
        let json = r#"{
            "camera": {
                "lookfrom": [0, 0, 5], "lookat": [0, 0, 0],
                "vfov": 60, "aspect_ratio": 1.0
            },
            "objects": [
                {
                    "type": "sphere", "center": [0, 0, 0], "radius": -1,
                    "material": { "type": "lambertian", "albedo": [1, 1, 1] }
                }
            ]
        }"#;

        let mut rng = StdRng::seed_from_u64(1);
        let result = load_scene_from_str(json, &mut rng);
        assert!(matches!(result, Err(SceneError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_texture_file_fails() {
        let json = r#"{
            "camera": {
                "lookfrom": [0, 0, 5], "lookat": [0, 0, 0],
                "vfov": 60, "aspect_ratio": 1.0
            },
            "objects": [
                {
                    "type": "sphere", "center": [0, 0, 0], "radius": 1,
                    "material": {
                        "type": "textured_lambertian",
                        "texture": { "type": "image", "path": "does_not_exist.png" }
                    }
                }
            ]
        }"#;

        let mut rng = StdRng::seed_from_u64(1);
        let result = load_scene_from_str(json, &mut rng);
        assert!(matches!(result, Err(SceneError::Texture(_))));
    }

    #[test]
    fn test_degenerate_area_light_fails() {
        let json = r#"{
            "camera": {
                "lookfrom": [0, 0, 5], "lookat": [0, 0, 0],
                "vfov": 60, "aspect_ratio": 1.0
            },
            "lights": [
                {
                    "type": "area", "center": [0, 4, 0],
                    "u_edge": [1, 0, 0], "v_edge": [2, 0, 0],
                    "emission": [5, 5, 5]
                }
            ]
        }"#;

        let mut rng = StdRng::seed_from_u64(1);
        let result = load_scene_from_str(json, &mut rng);
        assert!(matches!(result, Err(SceneError::InvalidValue { .. })));
    }
}
