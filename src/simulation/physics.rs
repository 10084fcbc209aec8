/// Point mass whose acceleration is the applied control response.
pub struct PointMassPhysics {
    // State variables
    position: f64, // m
    velocity: f64, // m/s

    // Input
    response: f64, // m/s²
}

impl PointMassPhysics {
    pub fn new(position: f64, velocity: f64) -> Self {
        Self {
            position,
            velocity,
            response: 0.0,
        }
    }

    pub fn at_rest() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn update(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        self.velocity += self.response * dt;
        self.position += self.velocity * dt;
    }

    pub fn set_response(&mut self, response: f64) {
        self.response = response;
    }

    pub fn get_position(&self) -> f64 {
        self.position
    }

    pub fn get_velocity(&self) -> f64 {
        self.velocity
    }
}
