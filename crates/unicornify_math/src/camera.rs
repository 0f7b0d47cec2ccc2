//! Pinhole camera ("world view") and sphere projection.
//!
//! Camera space has the camera at the origin and the view direction along
//! +Z; screen coordinates are positions on the image plane at distance
//! `focal_length`, measured along the camera's `ux`/`uy` axes.

use crate::{cross_axes, intersection_of_plane_and_line, Vector};

/// Camera position, look-at point and focal length, plus the screen basis
/// derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldView {
    position: Vector,
    look_at: Vector,
    focal_length: f64,
    ux: Vector,
    uy: Vector,
    normal: Vector,
    zero: Vector,
}

/// Result of projecting a sphere (or a point, with radius 0) into a view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SphereProjection {
    /// Center in camera space.
    pub center_cs: Vector,
    /// Projection onto the image plane in camera space; z is the focal length.
    pub projected_center_cs: Vector,
    /// Projection onto the image plane in world space.
    pub projected_center_os: Vector,
    /// Half extent of the projected sphere on screen.
    pub projected_radius: f64,
}

impl SphereProjection {
    /// Screen x.
    pub fn x(&self) -> f64 {
        self.projected_center_cs.x
    }

    /// Screen y.
    pub fn y(&self) -> f64 {
        self.projected_center_cs.y
    }

    /// Distance of the center from the camera.
    pub fn z(&self) -> f64 {
        self.center_cs.length()
    }
}

impl WorldView {
    /// Create a view; `position` and `look_at` must differ.
    pub fn new(position: Vector, look_at: Vector, focal_length: f64) -> Self {
        let normal = (look_at - position).normalize();
        let (ux, uy) = cross_axes(normal);
        Self {
            position,
            look_at,
            focal_length,
            ux,
            uy,
            normal,
            zero: position + normal * focal_length,
        }
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn look_at(&self) -> Vector {
        self.look_at
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Unit view direction.
    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// Camera-space unit ray through the screen position.
    pub fn ray(&self, x: f64, y: f64) -> Vector {
        Vector::new(x, y, self.focal_length).normalize()
    }

    /// Project a world-space sphere into this view.
    ///
    /// Returns a default (all zero) projection if the center lies exactly in
    /// the camera's plane, where no projection exists.
    pub fn project_sphere(&self, center: Vector, radius: f64) -> SphereProjection {
        let cam2c = center - self.position;
        let dist = cam2c.length();

        let Some(inter) =
            intersection_of_plane_and_line(self.zero, self.ux, self.uy, self.position, cam2c)
        else {
            return SphereProjection::default();
        };

        let mut projection = SphereProjection {
            center_cs: Vector::ZERO,
            projected_center_cs: Vector::new(inter.x, inter.y, self.focal_length),
            projected_center_os: self.position + cam2c * inter.z,
            projected_radius: 0.0,
        };
        // behind the camera the line meets the image plane on the far side
        let dir = if inter.z < 0.0 { -1.0 } else { 1.0 };
        projection.center_cs = projection.projected_center_cs
            * (dir * dist / projection.projected_center_cs.length());
        if inter.z < 0.0 {
            projection.projected_center_cs.x *= -1.0;
            projection.projected_center_cs.y *= -1.0;
        }
        if radius == 0.0 {
            return projection;
        }

        let closest_to_cam = self.position + cam2c * (1.0 - radius / dist);
        let (u1, u2) = cross_axes(cam2c / dist);
        let mut r: f64 = 0.0;
        for c1 in [-1.0, 1.0] {
            for c2 in [-1.0, 1.0] {
                let p = closest_to_cam + u1 * (c1 * radius) + u2 * (c2 * radius);
                let pr = self.project_sphere(p, 0.0);
                r = r.max((pr.x() - projection.x()).abs());
                r = r.max((pr.y() - projection.y()).abs());
            }
        }
        projection.projected_radius = r;
        projection
    }

    /// Inverse of the projection: screen x/y plus distance from the camera
    /// back to a world-space point.
    pub fn un_project(&self, p: Vector) -> Vector {
        let on_plane = self.zero + self.ux * p.x + self.uy * p.y;
        self.position + (on_plane - self.position).normalize() * p.z
    }

    /// Express a world-space direction in camera space by projecting a
    /// reference point and the shifted point and taking the difference.
    pub fn camera_space_direction(&self, reference: Vector, direction: Vector) -> Vector {
        let base = self.project_sphere(reference, 0.0).center_cs;
        self.project_sphere(reference + direction, 0.0).center_cs - base
    }
}
