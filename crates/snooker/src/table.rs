use glam::Vec2;
use serde::Serialize;

use crate::balls::BallType;
use crate::config::TableConfig;

/// Axis-aligned rectangle given by centre and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            center: min + size / 2.0,
            half: size / 2.0,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }
}

/// Fixed layout of the table: playing surface, pockets, baulk line, D and spots.
/// Derived once from the table dimensions and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableGeometry {
    pub world: Vec2,
    /// Playing surface (inside the cushions).
    pub surface: Rect,
    pub cushion_width: f32,
    pub boundary_thickness: f32,
    pub ball_diameter: f32,
    pub pocket_diameter: f32,
    /// A ball whose centre comes this close to a pocket centre drops.
    pub capture_radius: f32,
    /// Top-left, top-right, bottom-left, bottom-right, top-middle, bottom-middle.
    pub pockets: [Vec2; 6],
    pub baulk_x: f32,
    pub d_center: Vec2,
    pub d_radius: f32,
    /// Colour spots in `BallType::COLOURS` order.
    spots: [Vec2; 6],
}

impl TableGeometry {
    pub fn new(config: &TableConfig) -> Self {
        let world = Vec2::new(config.world_width, config.world_height);
        let size = Vec2::new(config.table_width, config.table_height);
        let origin = (world - size) / 2.0;
        let surface = Rect::from_min_size(origin, size);
        let (w, h) = (size.x, size.y);

        let ball_diameter = config.ball_diameter();
        let pocket_diameter = config.pocket_diameter();
        let inset = pocket_diameter / 4.0;

        let pockets = [
            Vec2::new(origin.x + inset, origin.y + inset),
            Vec2::new(origin.x + w - inset, origin.y + inset),
            Vec2::new(origin.x + inset, origin.y + h - inset),
            Vec2::new(origin.x + w - inset, origin.y + h - inset),
            Vec2::new(origin.x + w / 2.0, origin.y),
            Vec2::new(origin.x + w / 2.0, origin.y + h),
        ];

        let baulk_x = origin.x + w / 4.0;
        let cy = origin.y + h / 2.0;
        let d_radius = h / 4.0;

        let spots = [
            Vec2::new(baulk_x, cy + d_radius / 2.0),
            Vec2::new(baulk_x, cy),
            Vec2::new(baulk_x, cy - d_radius / 2.0),
            Vec2::new(origin.x + w / 2.0, cy),
            Vec2::new(origin.x + w * 3.0 / 4.0, cy),
            Vec2::new(origin.x + w * 11.0 / 12.0, cy),
        ];

        Self {
            world,
            surface,
            cushion_width: config.cushion_width,
            boundary_thickness: config.boundary_thickness,
            ball_diameter,
            pocket_diameter,
            capture_radius: pocket_diameter / 1.8,
            pockets,
            baulk_x,
            d_center: Vec2::new(baulk_x, cy),
            d_radius,
            spots,
        }
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_diameter / 2.0
    }

    pub fn center(&self) -> Vec2 {
        self.surface.center
    }

    /// Home spot of a colour; `None` for the cue ball and reds.
    pub fn spot(&self, ball: BallType) -> Option<Vec2> {
        BallType::COLOURS
            .iter()
            .position(|&c| c == ball)
            .map(|i| self.spots[i])
    }

    pub fn spots(&self) -> impl Iterator<Item = (BallType, Vec2)> + '_ {
        BallType::COLOURS.into_iter().zip(self.spots)
    }

    pub fn pink_spot(&self) -> Vec2 {
        self.spots[4]
    }

    /// Front red of the triangle, just behind the pink.
    pub fn rack_apex(&self) -> Vec2 {
        self.pink_spot() + Vec2::new(self.ball_diameter * 1.05, 0.0)
    }

    /// Inside the semicircle behind the baulk line (strictly).
    pub fn in_d(&self, p: Vec2) -> bool {
        p.distance(self.d_center) < self.d_radius && p.x < self.baulk_x && p.x > self.surface.min().x
    }

    /// Outer edge of the cushions. A ball centre beyond it has left the table.
    pub fn frame(&self) -> Rect {
        Rect {
            center: self.surface.center,
            half: self.surface.half + Vec2::splat(self.cushion_width),
        }
    }

    /// Where a ball centre may lie without touching a cushion.
    pub fn playable(&self) -> Rect {
        Rect {
            center: self.surface.center,
            half: self.surface.half - Vec2::splat(self.ball_radius()),
        }
    }

    /// Cushion rails: two per long side split by the middle pockets, one per short side.
    pub fn cushions(&self) -> [Rect; 6] {
        let min = self.surface.min();
        let (w, h) = (self.surface.half.x * 2.0, self.surface.half.y * 2.0);
        let cw = self.cushion_width;
        let gap = self.pocket_diameter * 0.9;
        let long = w / 2.0 - gap / 2.0;

        let long_half = Vec2::new(long / 2.0, cw / 2.0);
        let short_half = Vec2::new(cw / 2.0, h / 2.0);
        let top = min.y - cw / 2.0;
        let bottom = min.y + h + cw / 2.0;
        let left_x = min.x + long / 2.0;
        let right_x = min.x + w - long / 2.0;

        [
            Rect { center: Vec2::new(left_x, top), half: long_half },
            Rect { center: Vec2::new(right_x, top), half: long_half },
            Rect { center: Vec2::new(left_x, bottom), half: long_half },
            Rect { center: Vec2::new(right_x, bottom), half: long_half },
            Rect { center: Vec2::new(min.x - cw / 2.0, min.y + h / 2.0), half: short_half },
            Rect { center: Vec2::new(min.x + w + cw / 2.0, min.y + h / 2.0), half: short_half },
        ]
    }

    /// Invisible walls along the outer edge of the cushions, spanning the world.
    pub fn boundaries(&self) -> [Rect; 4] {
        let frame = self.frame();
        let (fmin, fmax) = (frame.min(), frame.max());
        let t = self.boundary_thickness / 2.0;
        let horizontal = Vec2::new(self.world.x / 2.0, t);
        let vertical = Vec2::new(t, self.world.y / 2.0);
        [
            Rect { center: Vec2::new(self.world.x / 2.0, fmin.y), half: horizontal },
            Rect { center: Vec2::new(self.world.x / 2.0, fmax.y), half: horizontal },
            Rect { center: Vec2::new(fmin.x, self.world.y / 2.0), half: vertical },
            Rect { center: Vec2::new(fmax.x, self.world.y / 2.0), half: vertical },
        ]
    }
}
