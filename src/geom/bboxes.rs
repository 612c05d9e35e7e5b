use crate::geom::EPS;
use crate::geom::point::Point;
use crate::geom::ray::Ray;

/// Returns the (min, max) corners of the box holding all points `pts`.
///
/// Returns `None` for an empty slice.
pub fn bounding_box(pts: &[Point]) -> Option<(Point, Point)> {
    let first = *pts.first()?;
    let (pmin, pmax) = pts.iter().skip(1).fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
        )
    });
    Some((pmin, pmax))
}

/// Slab test: checks whether the ray enters the box `(pmin, pmax)` in front of its origin.
pub fn ray_hits_bbox(ray: &Ray, pmin: Point, pmax: Point) -> bool {
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.dx, ray.direction.dy, ray.direction.dz];
    let lo = [pmin.x, pmin.y, pmin.z];
    let hi = [pmax.x, pmax.y, pmax.z];

    let mut t_near = f64::NEG_INFINITY;
    let mut t_far = f64::INFINITY;

    for axis in 0..3 {
        if dir[axis].abs() < EPS {
            // Parallel to the slab: must start inside it
            if origin[axis] < lo[axis] - EPS || origin[axis] > hi[axis] + EPS {
                return false;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let mut t0 = (lo[axis] - origin[axis]) * inv;
        let mut t1 = (hi[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far + EPS {
            return false;
        }
    }

    t_far >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    #[test]
    fn test_bounding_box() {
        let pts = [
            Point::new(1., -2., 3.),
            Point::new(-1., 5., 0.),
            Point::new(0., 0., 7.),
        ];
        let (pmin, pmax) = bounding_box(&pts).unwrap();
        assert!(pmin.is_close(&Point::new(-1., -2., 0.)));
        assert!(pmax.is_close(&Point::new(1., 5., 7.)));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_ray_hits_bbox() {
        let pmin = Point::new(-1., -1., -1.);
        let pmax = Point::new(1., 1., 1.);

        let ray = Ray::new(Point::new(-5., 0., 0.), Vector::new(1., 0., 0.)).unwrap();
        assert!(ray_hits_bbox(&ray, pmin, pmax));

        // Box behind the ray
        let ray = Ray::new(Point::new(-5., 0., 0.), Vector::new(-1., 0., 0.)).unwrap();
        assert!(!ray_hits_bbox(&ray, pmin, pmax));

        // Parallel ray passing beside the box
        let ray = Ray::new(Point::new(-5., 3., 0.), Vector::new(1., 0., 0.)).unwrap();
        assert!(!ray_hits_bbox(&ray, pmin, pmax));

        // Origin inside the box
        let ray = Ray::new(Point::new(0., 0., 0.), Vector::new(0., 1., 1.)).unwrap();
        assert!(ray_hits_bbox(&ray, pmin, pmax));
    }
}
