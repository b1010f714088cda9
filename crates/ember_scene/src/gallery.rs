//! Built-in demo scenes.
//!
//! Handy starting points for examples and end-to-end tests, built with
//! the same pieces a loaded scene file would use.

use std::sync::Arc;

use ember_math::Vec3;
use ember_render::{
    AreaLight, Camera, CheckerTexture, Color, Dielectric, Emissive, Lambertian, Material, Metal,
    Plane, PointLight, Scene, Sphere, TexturedLambertian,
};
use rand::RngCore;

/// Open-air demo: checkered ground plane, one glass, one metal and one
/// diffuse sphere under a point light and the sky gradient.
pub fn three_spheres(rng: &mut dyn RngCore) -> (Scene, Camera) {
    let mut scene = Scene::new();

    let checker = Arc::new(CheckerTexture::new(
        Color::new(0.9, 0.9, 0.9),
        Color::new(0.2, 0.3, 0.2),
        20.0,
    ));
    let ground: Arc<dyn Material> = Arc::new(TexturedLambertian::new(checker));
    let diffuse: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.3)));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 0.05));

    scene.add(Arc::new(Plane::new(Vec3::ZERO, Vec3::Y, ground)));
    scene.add(Arc::new(Sphere::new(Vec3::new(-2.2, 1.0, 0.0), 1.0, diffuse)));
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)));
    scene.add(Arc::new(Sphere::new(Vec3::new(2.2, 1.0, 0.0), 1.0, metal)));

    scene.add_light(Arc::new(PointLight::new(
        Vec3::new(-4.0, 7.0, 3.0),
        Color::splat(60.0),
    )));

    scene.build_bvh(rng);

    let camera = Camera::new(
        Vec3::new(0.0, 2.0, 8.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        40.0,
        16.0 / 9.0,
        0.0,
        1.0,
    );

    (scene, camera)
}

/// An enclosed room lit only by a ceiling area light.
///
/// The lamp is registered twice on purpose: once as emissive geometry
/// so camera rays can see it, once as a light so the integrator can
/// sample it directly.
pub fn light_room(rng: &mut dyn RngCore) -> (Scene, Camera) {
    let mut scene = Scene::new();

    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let lamp: Arc<dyn Material> = Arc::new(Emissive::new(Color::splat(15.0)));

    // Room walls
    scene.add(Arc::new(Plane::new(Vec3::ZERO, Vec3::Y, white.clone())));
    scene.add(Arc::new(Plane::new(
        Vec3::new(0.0, 6.0, 0.0),
        -Vec3::Y,
        white.clone(),
    )));
    scene.add(Arc::new(Plane::new(
        Vec3::new(-3.0, 0.0, 0.0),
        Vec3::X,
        red,
    )));
    scene.add(Arc::new(Plane::new(
        Vec3::new(3.0, 0.0, 0.0),
        -Vec3::X,
        green,
    )));
    scene.add(Arc::new(Plane::new(
        Vec3::new(0.0, 0.0, -3.0),
        Vec3::Z,
        white.clone(),
    )));
    scene.add(Arc::new(Plane::new(
        Vec3::new(0.0, 0.0, 9.5),
        -Vec3::Z,
        white.clone(),
    )));

    // Center piece
    let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::splat(0.85), 0.0));
    scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 1.2, 0.0), 1.2, mirror)));

    // Ceiling lamp, as geometry and as a sampled light
    let lamp_center = Vec3::new(0.0, 5.95, 0.0);
    let u_edge = Vec3::new(2.0, 0.0, 0.0);
    let v_edge = Vec3::new(0.0, 0.0, 2.0);
    scene.add(Arc::new(Sphere::new(lamp_center, 0.4, lamp)));
    scene.add_light(Arc::new(AreaLight::new(
        lamp_center - (u_edge + v_edge) / 2.0,
        u_edge,
        v_edge,
        Color::splat(15.0),
    )));

    scene.build_bvh(rng);

    let camera = Camera::new(
        Vec3::new(0.0, 3.0, 9.0),
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::Y,
        50.0,
        1.0,
        0.0,
        1.0,
    );

    (scene, camera)
}
