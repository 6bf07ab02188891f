use vista_geom::Vec3;

/// One cell visited by a [`GridWalk`], with the travel (distance from the
/// start, along the full 3D path) at which the path's centre line enters and
/// leaves the main cell it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStep {
    pub x: i32,
    pub z: i32,
    pub s_travel: f32,
    pub e_travel: f32,
}

/// Digital-line traversal of the x/z grid along a path.
///
/// Each cell on the centre line is followed by the other cells within
/// `ceil(radius / grid_size)` of it, so wide shapes visit a cell more than
/// once.
#[derive(Clone, Debug)]
pub struct GridWalk {
    grid_size: f32,
    length: f32,
    reach: i32,
    cell: (i32, i32),
    step: (i32, i32),
    t: f32,
    t_max: (f32, f32),
    t_delta: (f32, f32),
    // Neighbourhood cursor around `anchor`, the centre-line cell being expanded.
    anchor: (i32, i32),
    ring: i32,
    done: bool,
    current: Option<(f32, f32)>,
}

fn axis_setup(origin: f32, d: f32, cell: i32, grid: f32) -> (i32, f32, f32) {
    if d > 0.0 {
        (1, (((cell + 1) as f32 * grid) - origin) / d, grid / d)
    } else if d < 0.0 {
        (-1, ((cell as f32 * grid) - origin) / d, -grid / d)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}

impl GridWalk {
    pub fn new(start: Vec3, end: Vec3, radius: f32, grid_size: f32) -> Self {
        let delta = end - start;
        let cell = (
            (start.x / grid_size).floor() as i32,
            (start.z / grid_size).floor() as i32,
        );
        let (sx, tmx, tdx) = axis_setup(start.x, delta.x, cell.0, grid_size);
        let (sz, tmz, tdz) = axis_setup(start.z, delta.z, cell.1, grid_size);
        let reach = if radius > 0.0 {
            (radius / grid_size).ceil() as i32
        } else {
            0
        };
        Self {
            grid_size,
            length: delta.length(),
            reach,
            cell,
            step: (sx, sz),
            t: 0.0,
            t_max: (tmx, tmz),
            t_delta: (tdx, tdz),
            anchor: cell,
            ring: 0,
            done: false,
            current: None,
        }
    }

    #[inline]
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Fraction range of the current centre-line cell; moves on to the next.
    fn centre_span(&mut self) -> Option<(f32, f32)> {
        if self.done {
            return None;
        }
        let exit = self.t_max.0.min(self.t_max.1).min(1.0);
        let span = (self.t, exit);
        if exit >= 1.0 {
            self.done = true;
        } else if self.t_max.0 < self.t_max.1 {
            self.cell.0 += self.step.0;
            self.t = self.t_max.0;
            self.t_max.0 += self.t_delta.0;
        } else {
            self.cell.1 += self.step.1;
            self.t = self.t_max.1;
            self.t_max.1 += self.t_delta.1;
        }
        Some(span)
    }
}

impl Iterator for GridWalk {
    type Item = GridStep;

    fn next(&mut self) -> Option<GridStep> {
        let side = 2 * self.reach + 1;
        if self.current.is_none() || self.ring >= side * side {
            let cell = self.cell;
            let span = self.centre_span()?;
            self.current = Some(span);
            self.ring = 0;
            self.anchor = cell;
        }
        let (s, e) = self.current?;
        let dx = self.ring % side - self.reach;
        let dz = self.ring / side - self.reach;
        self.ring += 1;
        Some(GridStep {
            x: self.anchor.0 + dx,
            z: self.anchor.1 + dz,
            s_travel: s * self.length,
            e_travel: e * self.length,
        })
    }
}
