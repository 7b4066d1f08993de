// The particle field: owns the particle set, the pacing state, and the
// pending-resize record, and runs one tick of the animation per frame budget.

use crate::pacing::{FramePacer, TARGET_FPS};
use crate::particle::Particle;
use crate::renderer::Surface;

// Density cap keeps the O(n^2) connection pass cheap on large viewports
pub const MAX_PARTICLES: usize = 70;
pub const AREA_PER_PARTICLE: f64 = 18000.0;
pub const CONNECT_DISTANCE: f64 = 130.0;
pub const LINE_BASE_ALPHA: f64 = 0.18;
pub const RESIZE_SETTLE_MS: f64 = 200.0;

struct PendingResize {
    deadline: f64,
    width: u32,
    height: u32,
}

pub struct ParticleField {
    width: u32,
    height: u32,
    particles: Vec<Particle>,
    pacer: FramePacer,
    pending_resize: Option<PendingResize>,
    visible: bool,
}

impl ParticleField {
    pub fn new(width: u32, height: u32) -> ParticleField {
        let mut field = ParticleField {
            width,
            height,
            particles: Vec::new(),
            pacer: FramePacer::new(TARGET_FPS),
            pending_resize: None,
            visible: true,
        };
        field.populate();
        field
    }

    pub fn particle_count(width: u32, height: u32) -> usize {
        let by_area = ((width as f64 * height as f64) / AREA_PER_PARTICLE).floor() as usize;
        by_area.min(MAX_PARTICLES)
    }

    // Discards the current batch and spawns a fresh one sized to the surface
    fn populate(&mut self) {
        let count = ParticleField::particle_count(self.width, self.height);
        self.particles.clear();
        self.particles.reserve(count);
        let mut rng = rand::thread_rng();
        for _ in 0..count {
            self.particles
                .push(Particle::random(&mut rng, self.width as f64, self.height as f64));
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // Resumed loops start over from tick-0 timing rather than trying to make
    // up for the hidden interval
    pub fn restart_timing(&mut self) {
        self.pacer.reset();
    }

    // Records a viewport change. Each event pushes the deadline out by the
    // settle delay, so a burst of resize events results in a single
    // re-initialization using the last event's dimensions.
    pub fn note_resize(&mut self, now: f64, width: u32, height: u32) {
        self.pending_resize = Some(PendingResize {
            deadline: now + RESIZE_SETTLE_MS,
            width,
            height,
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.pending_resize = None;
    }

    // One scheduled callback: apply a settled resize, then run a tick if the
    // frame budget has elapsed
    pub fn frame<S: Surface>(&mut self, now: f64, surface: &mut S) {
        if !self.visible {
            return;
        }

        if let Some(pending) = self.pending_resize.take() {
            if now >= pending.deadline {
                self.width = pending.width;
                self.height = pending.height;
                surface.resize(self.width, self.height);
                self.populate();
            } else {
                self.pending_resize = Some(pending);
            }
        }

        if !self.pacer.should_tick(now) {
            return;
        }
        self.tick(surface);
    }

    fn tick<S: Surface>(&mut self, surface: &mut S) {
        let width = self.width as f64;
        let height = self.height as f64;

        surface.clear(self.width, self.height);
        for particle in &mut self.particles {
            particle.update(width, height);
            surface.fill_circle(particle.pos[0], particle.pos[1], particle.radius);
        }
        self.draw_connections(surface);
    }

    // Lines between close pairs, fading out linearly towards the cutoff
    fn draw_connections<S: Surface>(&self, surface: &mut S) {
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let from = self.particles[i].pos;
                let to = self.particles[j].pos;
                let distance = vecmath::vec2_len(vecmath::vec2_sub(from, to));
                if distance < CONNECT_DISTANCE {
                    let opacity = LINE_BASE_ALPHA * (1.0 - distance / CONNECT_DISTANCE);
                    surface.stroke_line(from, to, opacity);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        resizes: Vec<(u32, u32)>,
        clears: usize,
        circles: Vec<(f64, f64, f64)>,
        lines: Vec<([f64; 2], [f64; 2], f64)>,
    }

    impl Surface for RecordingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }
        fn clear(&mut self, _width: u32, _height: u32) {
            self.clears += 1;
        }
        fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
            self.circles.push((x, y, radius));
        }
        fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], opacity: f64) {
            self.lines.push((from, to, opacity));
        }
    }

    fn still_particle(x: f64, y: f64) -> Particle {
        Particle {
            pos: [x, y],
            vel: [0.0, 0.0],
            radius: 1.0,
        }
    }

    #[test]
    fn particle_count_scales_with_area_up_to_the_cap() {
        assert_eq!(ParticleField::particle_count(0, 0), 0);
        assert_eq!(ParticleField::particle_count(0, 600), 0);
        // Just under one particle's worth of area
        assert_eq!(ParticleField::particle_count(1, 17_999), 0);
        assert_eq!(ParticleField::particle_count(300, 60), 1);
        assert_eq!(ParticleField::particle_count(800, 600), 26);
        assert_eq!(ParticleField::particle_count(10_000, 10_000), 70);
    }

    #[test]
    fn new_field_spawns_the_computed_count() {
        let field = ParticleField::new(800, 600);
        assert_eq!(field.particles.len(), 26);
        for p in &field.particles {
            assert!(p.pos[0] >= 0.0 && p.pos[0] <= 800.0);
            assert!(p.pos[1] >= 0.0 && p.pos[1] <= 600.0);
        }
    }

    #[test]
    fn close_pairs_get_a_fading_line() {
        let mut field = ParticleField::new(800, 600);
        field.particles = vec![still_particle(100.0, 100.0), still_particle(150.0, 100.0)];

        let mut surface = RecordingSurface::default();
        field.frame(25.0, &mut surface);

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.circles.len(), 2);
        assert_eq!(surface.lines.len(), 1);
        let expected = LINE_BASE_ALPHA * (1.0 - 50.0 / CONNECT_DISTANCE);
        assert!((surface.lines[0].2 - expected).abs() < 1e-12);
    }

    #[test]
    fn line_opacity_decreases_with_distance() {
        let mut opacities = Vec::new();
        for d in &[20.0, 60.0, 100.0, 129.0] {
            let mut field = ParticleField::new(800, 600);
            field.particles = vec![still_particle(0.0, 0.0), still_particle(*d, 0.0)];
            let mut surface = RecordingSurface::default();
            field.frame(25.0, &mut surface);
            assert_eq!(surface.lines.len(), 1);
            opacities.push(surface.lines[0].2);
        }
        for pair in opacities.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn no_line_at_or_beyond_the_cutoff() {
        let mut field = ParticleField::new(800, 600);
        field.particles = vec![still_particle(0.0, 0.0), still_particle(130.0, 0.0)];
        let mut surface = RecordingSurface::default();
        field.frame(25.0, &mut surface);
        assert!(surface.lines.is_empty());
    }

    #[test]
    fn hidden_field_does_no_work() {
        let mut field = ParticleField::new(800, 600);
        field.set_visible(false);
        let mut surface = RecordingSurface::default();
        field.frame(10_000.0, &mut surface);
        assert_eq!(surface.clears, 0);
        assert!(surface.circles.is_empty());

        // Resuming starts a fresh chain that ticks right away
        field.set_visible(true);
        field.restart_timing();
        field.frame(10_050.0, &mut surface);
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn resize_burst_settles_into_one_reinitialization() {
        let mut field = ParticleField::new(500, 500);
        field.note_resize(0.0, 600, 600);
        field.note_resize(100.0, 700, 500);
        field.note_resize(150.0, 800, 600);

        let mut surface = RecordingSurface::default();
        // Before the 200ms settle deadline nothing is applied
        field.frame(300.0, &mut surface);
        assert!(surface.resizes.is_empty());

        field.frame(351.0, &mut surface);
        assert_eq!(surface.resizes, vec![(800, 600)]);
        assert_eq!(field.width, 800);
        assert_eq!(field.height, 600);
        assert_eq!(field.particles.len(), 26);

        // The record is consumed; later frames do not re-apply it
        field.frame(400.0, &mut surface);
        assert_eq!(surface.resizes.len(), 1);
    }

    #[test]
    fn post_tick_positions_stay_within_one_step_of_the_surface() {
        let mut field = ParticleField::new(800, 600);
        let mut surface = RecordingSurface::default();
        let mut now = 0.0;
        for _ in 0..500 {
            now += 25.0;
            field.frame(now, &mut surface);
            for p in &field.particles {
                assert!(p.pos[0] >= -Particle::MAX_SPEED && p.pos[0] <= 800.0 + Particle::MAX_SPEED);
                assert!(p.pos[1] >= -Particle::MAX_SPEED && p.pos[1] <= 600.0 + Particle::MAX_SPEED);
            }
        }
    }

    #[test]
    fn clear_drops_the_batch() {
        let mut field = ParticleField::new(800, 600);
        field.note_resize(0.0, 900, 900);
        field.clear();
        assert!(field.particles.is_empty());
        assert!(field.pending_resize.is_none());
    }
}
