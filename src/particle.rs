// Simple particle struct to keep track of individual position, velocity, and radius

use rand::Rng;

pub struct Particle {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub radius: f64,
}

impl Particle {
    pub const MAX_SPEED: f64 = 0.2;
    pub const MIN_RADIUS: f64 = 0.8;
    pub const MAX_RADIUS: f64 = 2.6;

    // Spawns a particle somewhere inside the surface rectangle, drifting
    // slowly in a random direction
    pub fn random<R: Rng>(rng: &mut R, width: f64, height: f64) -> Particle {
        let pos_x = rng.gen::<f64>() * width;
        let pos_y = rng.gen::<f64>() * height;
        let vel_x = (rng.gen::<f64>() - 0.5) * (Particle::MAX_SPEED * 2.0);
        let vel_y = (rng.gen::<f64>() - 0.5) * (Particle::MAX_SPEED * 2.0);
        let radius =
            rng.gen::<f64>() * (Particle::MAX_RADIUS - Particle::MIN_RADIUS) + Particle::MIN_RADIUS;
        Particle {
            pos: [pos_x, pos_y],
            vel: [vel_x, vel_y],
            radius,
        }
    }

    // Advances one frame and flips the velocity sign on any axis that left
    // [0, dimension]. The position is left where it landed, so a particle can
    // overshoot the edge by at most one velocity step before turning around.
    pub fn update(&mut self, width: f64, height: f64) {
        self.pos[0] += self.vel[0];
        self.pos[1] += self.vel[1];

        if self.pos[0] < 0.0 || self.pos[0] > width {
            self.vel[0] *= -1.0;
        }
        if self.pos[1] < 0.0 || self.pos[1] > height {
            self.vel[1] *= -1.0;
        }
    }
}
