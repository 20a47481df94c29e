// Copyright @yucwang 2026

use crate::core::error::RenderError;
use crate::core::material::Material;
use crate::core::scene::Scene;
use crate::emitters::directional::DirectionalEmitter;
use crate::emitters::environment::EnvironmentEmitter;
use crate::materials::coating::CoatingBSDF;
use crate::materials::conductor::ConductorBSDF;
use crate::materials::dielectric::DielectricBSDF;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::plastic::PlasticBSDF;
use crate::media::homogeneous_medium::HomogeneousMedium;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::cube::cuboid;
use crate::shapes::triangle::quad;

/// Names accepted by `load_builtin_scene`.
pub const BUILTIN_SCENES: [&str; 3] = ["cornell", "fog", "sky"];

fn diffuse(scene: &mut Scene, r: Float, g: Float, b: Float) -> usize {
    scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::new(r, g, b), None)))
}

fn add_quad(scene: &mut Scene, p: [Vector3f; 4], material: usize) {
    for tri in quad(p[0], p[1], p[2], p[3], material).iter() {
        scene.add_triangle(tri.clone());
    }
}

fn add_objects(scene: &mut Scene, glass_exterior: Option<usize>) {
    let coating = scene.add_material(Material::Coating(CoatingBSDF::new(
        RGBSpectrum::new(0.2, 0.3, 0.6), RGBSpectrum::splat(0.04), Vector2f::new(0.15, 0.15), 1.5, 1.0)));
    let glass = scene.add_material(Material::Dielectric(
        DielectricBSDF::new(Vector2f::zeros(), 1.5, 1.0).with_media(None, glass_exterior)));
    let gold = scene.add_material(Material::Conductor(ConductorBSDF::new(
        Vector2f::new(0.2, 0.2), RGBSpectrum::new(1.0, 0.78, 0.34))));

    for tri in cuboid(Vector3f::new(-0.7, -0.1, 0.0), Vector3f::new(-0.15, 0.5, 1.2), coating) {
        scene.add_triangle(tri);
    }
    for tri in cuboid(Vector3f::new(0.1, -0.6, 0.0), Vector3f::new(0.65, -0.05, 0.55), glass) {
        scene.add_triangle(tri);
    }
    for tri in cuboid(Vector3f::new(0.3, 0.3, 0.0), Vector3f::new(0.6, 0.6, 0.3), gold) {
        scene.add_triangle(tri);
    }
}

// Open-front box spanning [-1, 1] x [-1, 1] x [0, 2], lit from the ceiling.
fn cornell(width: usize, height: usize, fog: bool) -> Scene {
    let camera = PerspectiveCamera::new(Vector3f::new(0.0, -3.6, 1.0), Vector3f::new(0.0, 0.0, 1.0),
                                        Vector3f::new(0.0, 0.0, 1.0), 0.68, width, height);
    let mut scene = Scene::new(camera);
    let fog_index = if fog {
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.15), RGBSpectrum::new(0.9, 0.9, 0.95))
            .with_anisotropy(0.3);
        let index = scene.add_medium(Box::new(medium));
        scene.set_camera_medium(Some(index));
        Some(index)
    } else {
        None
    };

    let white = diffuse(&mut scene, 0.73, 0.73, 0.73);
    let red = diffuse(&mut scene, 0.65, 0.05, 0.05);
    let green = diffuse(&mut scene, 0.12, 0.45, 0.15);
    let floor = scene.add_material(Material::Plastic(PlasticBSDF::new(
        RGBSpectrum::splat(0.6), RGBSpectrum::splat(1.0), Vector2f::new(0.3, 0.3), 1.5, 1.0)));
    let v = Vector3f::new;

    add_quad(&mut scene, [v(-1.0, -1.0, 0.0), v(1.0, -1.0, 0.0), v(1.0, 1.0, 0.0), v(-1.0, 1.0, 0.0)], floor);
    add_quad(&mut scene, [v(-1.0, -1.0, 2.0), v(-1.0, 1.0, 2.0), v(1.0, 1.0, 2.0), v(1.0, -1.0, 2.0)], white);
    add_quad(&mut scene, [v(-1.0, 1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, 2.0), v(-1.0, 1.0, 2.0)], white);
    add_quad(&mut scene, [v(-1.0, -1.0, 0.0), v(-1.0, 1.0, 0.0), v(-1.0, 1.0, 2.0), v(-1.0, -1.0, 2.0)], red);
    add_quad(&mut scene, [v(1.0, -1.0, 0.0), v(1.0, -1.0, 2.0), v(1.0, 1.0, 2.0), v(1.0, 1.0, 0.0)], green);

    let light = diffuse(&mut scene, 0.0, 0.0, 0.0);
    for tri in quad(v(-0.3, -0.3, 1.98), v(-0.3, 0.3, 1.98), v(0.3, 0.3, 1.98), v(0.3, -0.3, 1.98), light).iter() {
        scene.add_emissive_triangle(tri.clone(), RGBSpectrum::new(17.0, 12.0, 4.0));
    }

    add_objects(&mut scene, fog_index);
    scene
}

// Ground plane under a sky dome and a sun.
fn sky(width: usize, height: usize) -> Scene {
    let camera = PerspectiveCamera::new(Vector3f::new(0.0, -3.6, 1.4), Vector3f::new(0.0, 0.0, 0.4),
                                        Vector3f::new(0.0, 0.0, 1.0), 0.7, width, height);
    let mut scene = Scene::new(camera);
    let ground = diffuse(&mut scene, 0.5, 0.5, 0.45);
    let v = Vector3f::new;
    add_quad(&mut scene, [v(-20.0, -20.0, 0.0), v(20.0, -20.0, 0.0), v(20.0, 20.0, 0.0), v(-20.0, 20.0, 0.0)], ground);
    add_objects(&mut scene, None);

    scene.add_emitter(Box::new(EnvironmentEmitter::new(RGBSpectrum::new(0.35, 0.5, 0.8))));
    scene.add_emitter(Box::new(DirectionalEmitter::new(Vector3f::new(-0.4, 0.6, -1.0), RGBSpectrum::new(3.0, 2.8, 2.4))));
    scene
}

/// Builds and finalizes one of the `BUILTIN_SCENES`.
pub fn load_builtin_scene(name: &str, width: usize, height: usize) -> Result<Scene, RenderError> {
    let mut scene = match name {
        "cornell" => cornell(width, height, false),
        "fog" => cornell(width, height, true),
        "sky" => sky(width, height),
        _ => {
            return Err(RenderError::InvalidScene(
                format!("unknown scene '{}', expected one of {:?}", name, BUILTIN_SCENES)));
        }
    };
    log::info!("Loaded built-in scene '{}'.", name);
    scene.finalize()?;
    Ok(scene)
}
