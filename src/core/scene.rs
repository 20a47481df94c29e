// Copyright @yucwang 2026

use crate::core::bvh::BVH;
use crate::core::emitter::Emitter;
use crate::core::error::RenderError;
use crate::core::image::Image;
use crate::core::material::Material;
use crate::core::medium::Medium;
use crate::emitters::area::AreaEmitter;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::distribution::Distribution1D;
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::triangle::Triangle;

/// Read-only scene snapshot shared by every path of a render pass.
/// Media are addressed by index; `None` is vacuum.
pub struct Scene {
    triangles: Vec<Triangle>,
    materials: Vec<Material>,
    media: Vec<Box<dyn Medium>>,
    emitters: Vec<Box<dyn Emitter>>,
    images: Vec<Image>,
    camera: PerspectiveCamera,
    camera_medium: Option<usize>,
    emitter_distribution: Distribution1D,
    environment_emitters: Vec<usize>,
    scene_bounds: AABB,
    bvh: Option<BVH>,
}

impl Scene {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            triangles: Vec::new(),
            materials: Vec::new(),
            media: Vec::new(),
            emitters: Vec::new(),
            images: Vec::new(),
            camera,
            camera_medium: None,
            emitter_distribution: Distribution1D::default(),
            environment_emitters: Vec::new(),
            scene_bounds: AABB::default(),
            bvh: None,
        }
    }

    pub fn with_camera(mut self, camera: PerspectiveCamera) -> Self {
        self.camera = camera;
        self
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_medium(&mut self, medium: Box<dyn Medium>) -> usize {
        self.media.push(medium);
        self.media.len() - 1
    }

    pub fn add_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn add_triangle(&mut self, triangle: Triangle) -> usize {
        self.triangles.push(triangle);
        self.bvh = None;
        self.triangles.len() - 1
    }

    /// Adds a triangle that also radiates `radiance` from its front face.
    pub fn add_emissive_triangle(&mut self, mut triangle: Triangle, radiance: RGBSpectrum) -> usize {
        let emitter_index = self.emitters.len();
        triangle.emitter_index = Some(emitter_index);
        self.emitters.push(Box::new(AreaEmitter::new(triangle.clone(), radiance)));
        self.add_triangle(triangle)
    }

    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) -> usize {
        self.emitters.push(emitter);
        self.emitters.len() - 1
    }

    pub fn set_camera_medium(&mut self, medium: Option<usize>) {
        self.camera_medium = medium;
    }

    /// Validates indices and builds the acceleration structure and the
    /// emitter selection distribution. Must run before rendering.
    pub fn finalize(&mut self) -> Result<(), RenderError> {
        for (i, tri) in self.triangles.iter().enumerate() {
            if tri.material_index >= self.materials.len() {
                return Err(RenderError::InvalidScene(
                    format!("triangle {} references missing material {}", i, tri.material_index)));
            }
        }
        for (i, material) in self.materials.iter().enumerate() {
            for m in material.media().iter().flatten() {
                if *m >= self.media.len() {
                    return Err(RenderError::InvalidScene(
                        format!("{} material {} references missing medium {}", material.name(), i, m)));
                }
            }
        }
        if let Some(m) = self.camera_medium {
            if m >= self.media.len() {
                return Err(RenderError::InvalidScene(format!("camera medium {} does not exist", m)));
            }
        }

        let mut scene_bounds = AABB::default();
        for tri in &self.triangles {
            scene_bounds.expand_by_aabb(&tri.bounding_box());
        }
        self.scene_bounds = scene_bounds;
        for emitter in self.emitters.iter_mut() {
            emitter.set_scene_bounds(&scene_bounds);
        }

        let powers: Vec<Float> = self.emitters.iter().map(|e| e.power()).collect();
        self.emitter_distribution = Distribution1D::new(&powers);
        self.environment_emitters = self.emitters.iter()
            .enumerate()
            .filter(|(_, e)| e.is_environment())
            .map(|(i, _)| i)
            .collect();
        if self.emitters.is_empty() {
            log::warn!("Scene has no emitters; the image will be black.");
        }

        self.bvh = Some(BVH::build(&self.triangles));
        log::info!("Scene finalized: {} triangles, {} materials, {} media, {} emitters",
                   self.triangles.len(), self.materials.len(), self.media.len(), self.emitters.len());
        Ok(())
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn media(&self) -> &[Box<dyn Medium>] {
        &self.media
    }

    /// Medium behind `index`; `None` for vacuum or an unknown index.
    pub fn medium(&self, index: Option<usize>) -> Option<&dyn Medium> {
        index.and_then(|i| self.media.get(i)).map(|m| m.as_ref())
    }

    pub fn emitters(&self) -> &[Box<dyn Emitter>] {
        &self.emitters
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_medium(&self) -> Option<usize> {
        self.camera_medium
    }

    pub fn environment_emitters(&self) -> &[usize] {
        &self.environment_emitters
    }

    pub fn scene_bounds(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn bvh(&self) -> Option<&BVH> {
        self.bvh.as_ref()
    }

    /// Picks an emitter proportionally to its power.
    pub fn sample_emitter_index(&self, u: Float) -> Option<(usize, Float)> {
        self.emitter_distribution.sample(u)
    }

    pub fn emitter_discrete_pdf(&self, index: usize) -> Float {
        self.emitter_distribution.pdf(index)
    }
}
