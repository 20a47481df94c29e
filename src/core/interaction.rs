// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f, RAY_EPSILON };
use crate::math::frame::Frame;

/// Closest hit reported by the intersection oracle. Read-only for consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub pos: Vector3f,
    pub geo_normal: Vector3f,
    pub sh_normal: Vector3f,
    pub barycentric: Vector3f,
    pub tex: Vector2f,
    pub t: Float,
    pub triangle_index: usize,
    pub material_index: usize,
    pub emitter_index: Option<usize>,
}

impl Intersection {
    /// Shading frame oriented against the incoming direction.
    pub fn facing_frame(&self, w_i: &Vector3f) -> Frame {
        let frame = Frame::from_normal(self.sh_normal);
        if self.sh_normal.dot(w_i) > 0.0 {
            frame.flipped()
        } else {
            frame
        }
    }

    /// Whether a ray along `w_i` enters the primitive's interior side.
    pub fn is_entering(&self, w_i: &Vector3f) -> bool {
        self.geo_normal.dot(w_i) < 0.0
    }

    /// Origin for a ray leaving the surface along `w_o`, offset to the matching side.
    pub fn shading_pos(&self, w_o: &Vector3f) -> Vector3f {
        let side = if self.geo_normal.dot(w_o) >= 0.0 { 1.0 } else { -1.0 };
        self.pos + self.geo_normal * (side * RAY_EPSILON)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Hit at the origin of the z = 0 plane, normal +z.
    pub fn sample_hit() -> Intersection {
        Intersection {
            pos: Vector3f::new(0.0, 0.0, 0.0),
            geo_normal: Vector3f::new(0.0, 0.0, 1.0),
            sh_normal: Vector3f::new(0.0, 0.0, 1.0),
            barycentric: Vector3f::new(1.0, 0.0, 0.0),
            tex: Vector2f::new(0.0, 0.0),
            t: 1.0,
            triangle_index: 0,
            material_index: 0,
            emitter_index: None,
        }
    }

    #[test]
    fn test_facing_frame_flips_for_back_hits() {
        let hit = sample_hit();
        let front = hit.facing_frame(&Vector3f::new(0.0, 0.0, -1.0));
        let back = hit.facing_frame(&Vector3f::new(0.0, 0.0, 1.0));
        assert!(front.nrm().z > 0.0);
        assert!(back.nrm().z < 0.0);
        assert!(hit.is_entering(&Vector3f::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_shading_pos_offsets_to_outgoing_side() {
        let hit = sample_hit();
        assert!(hit.shading_pos(&Vector3f::new(0.0, 0.0, 1.0)).z > 0.0);
        assert!(hit.shading_pos(&Vector3f::new(0.0, 0.0, -1.0)).z < 0.0);
    }
}
