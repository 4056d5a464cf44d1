//! Scene-based vehicle simulator
//!
//! Stands in for the PiCar when no hardware is attached. The course is a list of
//! scenes, one per obstacle: how far ahead the obstacle starts and how far away
//! the wall on each side is (if there is one). The simulator tracks only what
//! the ranging sensor could observe:
//!
//! - forward motion closes the distance to the obstacle while time passes
//! - a mast angle inside the front cone sees the obstacle, one beyond the side
//!   cone sees that side's wall, anything else sees open floor
//! - a turn held for at least the quarter-turn time clears the scene and brings
//!   up the next one
//!
//! Readings carry Gaussian noise and occasional dropped echoes, drawn from a
//! seeded RNG so runs are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use slalom_core::{MastAngle, MotionCommand, RangeReading, Side, SlalomError, SlalomResult, Vehicle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Noise model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Standard deviation for Gaussian noise (cm)
    pub std_dev: f64,
    /// Mean offset (bias, cm)
    pub mean: f64,
    /// Enable/disable noise
    pub enabled: bool,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            std_dev: 0.0,
            mean: 0.0,
            enabled: false,
        }
    }
}

impl NoiseModel {
    /// Create a noise model with given standard deviation
    pub fn with_std_dev(std_dev: f64) -> Self {
        Self {
            std_dev,
            mean: 0.0,
            enabled: std_dev > 0.0,
        }
    }

    /// Create a noise model with bias
    pub fn with_bias(std_dev: f64, mean: f64) -> Self {
        Self {
            std_dev,
            mean,
            enabled: std_dev > 0.0 || mean != 0.0,
        }
    }

    /// Apply noise to a value
    pub fn apply<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        if !self.enabled {
            return value;
        }

        // Bias only
        if self.std_dev <= 0.0 {
            return value + self.mean;
        }

        match Normal::new(self.mean, self.std_dev) {
            Ok(normal) => value + normal.sample(rng),
            Err(_) => value + self.mean,
        }
    }
}

/// One obstacle on the simulated course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleScene {
    /// Distance to the obstacle when the scene starts
    pub approach_cm: f64,
    /// Distance to the wall on the left once stopped, if there is one
    #[serde(default)]
    pub left_wall_cm: Option<f64>,
    /// Distance to the wall on the right once stopped, if there is one
    #[serde(default)]
    pub right_wall_cm: Option<f64>,
}

impl ObstacleScene {
    pub fn wall_on(side: Side, approach_cm: f64, wall_cm: f64) -> Self {
        let (left_wall_cm, right_wall_cm) = match side {
            Side::Left => (Some(wall_cm), None),
            Side::Right => (None, Some(wall_cm)),
        };
        Self {
            approach_cm,
            left_wall_cm,
            right_wall_cm,
        }
    }

    fn wall(&self, side: Side) -> Option<f64> {
        match side {
            Side::Left => self.left_wall_cm,
            Side::Right => self.right_wall_cm,
        }
    }

    /// The side a turn should go to, away from the nearer wall
    pub fn open_side(&self) -> Option<Side> {
        match (self.left_wall_cm, self.right_wall_cm) {
            (Some(_), None) => Some(Side::Right),
            (None, Some(_)) => Some(Side::Left),
            (Some(left), Some(right)) if left < right => Some(Side::Right),
            (Some(left), Some(right)) if right < left => Some(Side::Left),
            _ => None,
        }
    }
}

/// Simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed for sensor noise
    pub seed: u64,
    /// Forward travel per second for each percent of motor power
    pub cm_per_second_per_speed: f64,
    /// Turn time that counts as a quarter turn
    pub quarter_turn_ms: u64,
    /// Mast angles within ±this many degrees see the obstacle ahead
    pub front_cone_degrees: MastAngle,
    /// Mast angles beyond ±this many degrees see the side walls
    pub side_cone_degrees: MastAngle,
    /// Anything farther than this produces an echo timeout
    pub max_range_cm: f64,
    /// Probability that a reading comes back as a missing echo
    pub dropout_probability: f64,
    /// Sleep for simulated pauses instead of skipping them
    pub realtime: bool,
    pub noise: NoiseModel,
    pub obstacles: Vec<ObstacleScene>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            cm_per_second_per_speed: 2.0,
            quarter_turn_ms: 1500,
            front_cone_degrees: 15,
            side_cone_degrees: 45,
            max_range_cm: 400.0,
            dropout_probability: 0.05,
            realtime: false,
            noise: NoiseModel::with_std_dev(1.0),
            obstacles: vec![
                ObstacleScene::wall_on(Side::Left, 120.0, 25.0),
                ObstacleScene::wall_on(Side::Right, 90.0, 30.0),
                ObstacleScene::wall_on(Side::Right, 150.0, 20.0),
                ObstacleScene::wall_on(Side::Left, 100.0, 35.0),
            ],
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SlalomResult<()> {
        if self.obstacles.is_empty() {
            return Err(SlalomError::Simulation("course has no obstacles".into()));
        }
        if !(self.cm_per_second_per_speed > 0.0) {
            return Err(SlalomError::Simulation(
                "cm_per_second_per_speed must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.dropout_probability) {
            return Err(SlalomError::Simulation(format!(
                "dropout probability must be within 0..=1, got {}",
                self.dropout_probability
            )));
        }
        if self.front_cone_degrees >= self.side_cone_degrees {
            return Err(SlalomError::Simulation(
                "front cone must be narrower than the side cone".into(),
            ));
        }
        for (index, scene) in self.obstacles.iter().enumerate() {
            if !(scene.approach_cm > 0.0) {
                return Err(SlalomError::Simulation(format!(
                    "obstacle {} starts at a non-positive distance",
                    index + 1
                )));
            }
        }
        Ok(())
    }
}

/// How a simulated scene ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOutcome {
    pub scene: usize,
    pub turned: Side,
    /// Whether the vehicle turned toward the scene's nearer wall
    pub toward_wall: bool,
}

/// Simulated vehicle
pub struct SimulatedVehicle {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    scene: usize,
    front_cm: f64,
    motion: MotionCommand,
    turn_elapsed: Duration,
    mast: MastAngle,
    elapsed: Duration,
    outcomes: Vec<SceneOutcome>,
}

impl SimulatedVehicle {
    pub fn new(config: SimulationConfig) -> SlalomResult<Self> {
        config.validate()?;

        let front_cm = config.obstacles[0].approach_cm;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            scene: 0,
            front_cm,
            motion: MotionCommand::Stop,
            turn_elapsed: Duration::ZERO,
            mast: 0,
            elapsed: Duration::ZERO,
            outcomes: Vec::new(),
        })
    }

    /// Index of the scene currently in front of the vehicle
    pub fn scene_index(&self) -> usize {
        self.scene
    }

    pub fn scene_count(&self) -> usize {
        self.config.obstacles.len()
    }

    /// All scenes cleared
    pub fn is_finished(&self) -> bool {
        self.scene >= self.scene_count()
    }

    pub fn outcomes(&self) -> &[SceneOutcome] {
        &self.outcomes
    }

    /// True distance to the obstacle ahead, `None` once the course is cleared
    pub fn front_distance_cm(&self) -> Option<f64> {
        (!self.is_finished()).then_some(self.front_cm)
    }

    pub fn mast_angle(&self) -> MastAngle {
        self.mast
    }

    /// Simulated time since start
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn current_scene(&self) -> Option<&ObstacleScene> {
        self.config.obstacles.get(self.scene)
    }

    /// Noise-free distance the sensor would see at `angle`
    fn ground_truth(&self, angle: MastAngle) -> Option<f64> {
        let scene = self.current_scene()?;
        if angle.abs() <= self.config.front_cone_degrees {
            Some(self.front_cm)
        } else if angle >= self.config.side_cone_degrees {
            scene.wall(Side::Left)
        } else if angle <= -self.config.side_cone_degrees {
            scene.wall(Side::Right)
        } else {
            None
        }
    }

    fn set_motion(&mut self, motion: MotionCommand) {
        let turning_same_way = matches!(
            (self.motion, motion),
            (MotionCommand::TurnLeft(_), MotionCommand::TurnLeft(_))
                | (MotionCommand::TurnRight(_), MotionCommand::TurnRight(_))
        );
        if !turning_same_way {
            self.finish_turn();
        }
        self.motion = motion;
    }

    /// Settle a turn that has just ended
    fn finish_turn(&mut self) {
        let turned = match self.motion {
            MotionCommand::TurnLeft(_) => Side::Left,
            MotionCommand::TurnRight(_) => Side::Right,
            _ => return,
        };
        let held = std::mem::take(&mut self.turn_elapsed);
        if held < Duration::from_millis(self.config.quarter_turn_ms) {
            debug!(?held, "turn too short to clear the obstacle");
            return;
        }

        let Some(scene) = self.current_scene() else {
            return;
        };
        let toward_wall = scene.open_side().is_some_and(|open| open != turned);
        if toward_wall {
            warn!(scene = self.scene + 1, %turned, "simulated vehicle turned toward the wall");
        } else {
            info!(scene = self.scene + 1, %turned, "simulated obstacle cleared");
        }

        self.outcomes.push(SceneOutcome {
            scene: self.scene,
            turned,
            toward_wall,
        });
        self.scene += 1;
        if let Some(next) = self.current_scene() {
            self.front_cm = next.approach_cm;
        }
    }

    fn advance(&mut self, duration: Duration) {
        let secs = duration.as_secs_f64();
        match self.motion {
            MotionCommand::Forward(speed) => {
                self.front_cm -= speed as f64 * self.config.cm_per_second_per_speed * secs;
                if self.front_cm < 0.0 && !self.is_finished() {
                    warn!(scene = self.scene + 1, "simulated vehicle hit the obstacle");
                    self.front_cm = 0.0;
                }
            }
            MotionCommand::Backward(speed) => {
                self.front_cm += speed as f64 * self.config.cm_per_second_per_speed * secs;
            }
            MotionCommand::TurnLeft(_) | MotionCommand::TurnRight(_) => {
                self.turn_elapsed += duration;
            }
            MotionCommand::Stop => {}
        }
        self.elapsed += duration;
    }
}

impl Vehicle for SimulatedVehicle {
    fn name(&self) -> &str {
        "simulation"
    }

    fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
        self.set_motion(MotionCommand::Forward(speed));
        Ok(())
    }

    fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
        self.set_motion(MotionCommand::Backward(speed));
        Ok(())
    }

    fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
        self.set_motion(MotionCommand::TurnLeft(speed));
        Ok(())
    }

    fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
        self.set_motion(MotionCommand::TurnRight(speed));
        Ok(())
    }

    fn stop(&mut self) -> SlalomResult<()> {
        self.set_motion(MotionCommand::Stop);
        Ok(())
    }

    fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
        self.mast = angle;

        let truth = match self.ground_truth(angle) {
            Some(cm) if cm <= self.config.max_range_cm => cm,
            _ => return Ok(RangeReading::ECHO_TIMEOUT),
        };

        if self.rng.gen_bool(self.config.dropout_probability) {
            return Ok(RangeReading::NO_ECHO);
        }

        let noisy = self.config.noise.apply(truth, &mut self.rng).max(0.0);
        Ok(RangeReading::from((noisy * 100.0).round() / 100.0))
    }

    fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
        self.mast = angle;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.advance(duration);
        if self.config.realtime {
            std::thread::sleep(duration);
        }
    }
}
