//! Synthetic detections
//!
//! Emulates the landmark detection service:
//! - Pixel jitter around a template pose
//! - Per-joint visibility, with joints under the floor dropped
//! - Occasional frames with no pose at all

use formcheck_core::{
    ArmJoints, Detection, ImageSize, Joint, PixelJoint, PixelLandmarks, VISIBILITY_FLOOR,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pixel jitter applied to each coordinate
#[derive(Clone, Debug)]
pub enum Jitter {
    None,
    /// Uniform in [-max_px, max_px]
    Uniform { max_px: f64 },
    /// Normal with zero mean
    Normal { stddev_px: f64 },
}

impl Jitter {
    /// Sample one offset in pixels
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            Jitter::None => 0.0,
            Jitter::Uniform { max_px } => rng.gen_range(-max_px..=*max_px),
            Jitter::Normal { stddev_px } => {
                // Box-Muller; u1 kept away from zero for ln
                let u1: f64 = 1.0 - rng.gen::<f64>();
                let u2: f64 = rng.gen();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                stddev_px * z
            }
        }
    }
}

/// Synthesizer configuration
#[derive(Clone, Debug)]
pub struct SynthConfig {
    pub image: ImageSize,
    pub jitter: Jitter,
    /// Visibility drawn uniformly from this range
    pub visibility: (f64, f64),
    /// Probability of a frame with no pose
    pub no_pose_prob: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            image: ImageSize::new(640, 480),
            jitter: Jitter::Normal { stddev_px: 3.0 },
            visibility: (0.6, 1.0),
            no_pose_prob: 0.0,
        }
    }
}

impl SynthConfig {
    /// Exact template, fully visible
    pub fn exact() -> Self {
        SynthConfig {
            jitter: Jitter::None,
            visibility: (1.0, 1.0),
            ..Default::default()
        }
    }

    /// Heavy jitter, frequent occlusion and missed frames
    pub fn noisy() -> Self {
        SynthConfig {
            jitter: Jitter::Normal { stddev_px: 8.0 },
            visibility: (0.3, 1.0),
            no_pose_prob: 0.1,
            ..Default::default()
        }
    }
}

/// Both arms raised in a bowing stance, laid out on a 640x480 frame
pub fn reference_pose() -> PixelLandmarks {
    let left = ArmJoints::new()
        .with(Joint::Shoulder, PixelJoint::new(250, 150, 1.0))
        .with(Joint::Elbow, PixelJoint::new(220, 260, 1.0))
        .with(Joint::Wrist, PixelJoint::new(300, 330, 1.0));
    let right = ArmJoints::new()
        .with(Joint::Shoulder, PixelJoint::new(390, 150, 1.0))
        .with(Joint::Elbow, PixelJoint::new(430, 250, 1.0))
        .with(Joint::Wrist, PixelJoint::new(520, 230, 1.0));
    PixelLandmarks::new(left, right)
}

/// Seeded detection generator
pub struct PoseSynthesizer {
    config: SynthConfig,
    template: PixelLandmarks,
    rng: StdRng,
}

impl PoseSynthesizer {
    /// Create a synthesizer around [`reference_pose`], scaled to the image
    pub fn new(config: SynthConfig, seed: u64) -> Self {
        let sx = f64::from(config.image.width) / 640.0;
        let sy = f64::from(config.image.height) / 480.0;
        let template = reference_pose().map(|_, arm| {
            arm.map(|_, j| {
                PixelJoint::new(
                    (f64::from(j.x) * sx).round() as i32,
                    (f64::from(j.y) * sy).round() as i32,
                    j.visibility,
                )
            })
        });

        PoseSynthesizer {
            config,
            template,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Move every template joint by a pixel offset
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.template = self
            .template
            .map(|_, arm| arm.map(|_, j| PixelJoint::new(j.x + dx, j.y + dy, j.visibility)));
    }

    pub fn template(&self) -> &PixelLandmarks {
        &self.template
    }

    /// Generate the next detection
    pub fn next_detection(&mut self) -> Detection {
        let image = self.config.image;

        if self.config.no_pose_prob > 0.0 && self.rng.gen_bool(self.config.no_pose_prob.min(1.0)) {
            return Detection::no_pose(image);
        }

        let rng = &mut self.rng;
        let config = &self.config;
        let (vis_lo, vis_hi) = config.visibility;
        let max_x = f64::from(image.width.saturating_sub(1));
        let max_y = f64::from(image.height.saturating_sub(1));

        let landmarks = self.template.map(|_, arm| {
            let mut out = ArmJoints::new();
            for (joint, j) in arm.iter() {
                let visibility = rng.gen_range(vis_lo..=vis_hi);
                if visibility < VISIBILITY_FLOOR {
                    continue;
                }
                let x = (f64::from(j.x) + config.jitter.sample(rng)).clamp(0.0, max_x);
                let y = (f64::from(j.y) + config.jitter.sample(rng)).clamp(0.0, max_y);
                out.set(joint, PixelJoint::new(x.round() as i32, y.round() as i32, visibility));
            }
            out
        });

        Detection::new(image, landmarks)
    }

    /// Generate `count` detections
    pub fn batch(&mut self, count: usize) -> Vec<Detection> {
        (0..count).map(|_| self.next_detection()).collect()
    }
}
