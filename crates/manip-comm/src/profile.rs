//! 机械臂型号档案
//!
//! 每个型号给出手臂关节列表（按总线顺序）、关节限位、睡眠位姿，
//! 以及夹爪手指的行程范围。`mobile_` 前缀的型号与对应的固定底座型号共用档案。

/// 单个关节参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    pub name: &'static str,
    /// 位置下限（rad）
    pub lower: f64,
    /// 位置上限（rad）
    pub upper: f64,
    /// 睡眠位姿（rad）
    pub sleep: f64,
}

impl JointSpec {
    const fn new(name: &'static str, lower: f64, upper: f64, sleep: f64) -> Self {
        Self {
            name,
            lower,
            upper,
            sleep,
        }
    }

    /// 位置是否在限位内（含边界）
    pub fn contains(&self, position: f64) -> bool {
        position >= self.lower && position <= self.upper
    }
}

/// 型号档案
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotProfile {
    pub model: &'static str,
    /// 手臂关节（总线顺序）
    pub arm_joints: &'static [JointSpec],
    /// 夹爪手指行程（m）：(完全闭合, 完全张开)
    pub finger_limits: (f64, f64),
}

impl RobotProfile {
    pub fn dof(&self) -> usize {
        self.arm_joints.len()
    }

    pub fn joint(&self, name: &str) -> Option<(usize, &JointSpec)> {
        self.arm_joints
            .iter()
            .enumerate()
            .find(|(_, joint)| joint.name == name)
    }

    pub fn sleep_pose(&self) -> Vec<f64> {
        self.arm_joints.iter().map(|joint| joint.sleep).collect()
    }

    pub fn home_pose(&self) -> Vec<f64> {
        vec![0.0; self.dof()]
    }
}

const PI: f64 = std::f64::consts::PI;

const WAIST: JointSpec = JointSpec::new("waist", -PI, PI, 0.0);
const FOREARM_ROLL: JointSpec = JointSpec::new("forearm_roll", -PI, PI, 0.0);
const WRIST_ROTATE: JointSpec = JointSpec::new("wrist_rotate", -PI, PI, 0.0);

const PX100_JOINTS: &[JointSpec] = &[
    WAIST,
    JointSpec::new("shoulder", -1.937, 1.867, -1.88),
    JointSpec::new("elbow", -2.111, 1.605, 1.5),
    JointSpec::new("wrist_angle", -1.745, 2.147, 0.8),
];

const FIVE_DOF_JOINTS: &[JointSpec] = &[
    WAIST,
    JointSpec::new("shoulder", -1.885, 1.990, -1.80),
    JointSpec::new("elbow", -2.147, 1.605, 1.55),
    JointSpec::new("wrist_angle", -1.745, 2.147, 0.8),
    WRIST_ROTATE,
];

const SIX_DOF_JOINTS: &[JointSpec] = &[
    WAIST,
    JointSpec::new("shoulder", -1.885, 1.990, -1.80),
    JointSpec::new("elbow", -2.147, 1.605, 1.55),
    FOREARM_ROLL,
    JointSpec::new("wrist_angle", -1.745, 2.147, 0.8),
    WRIST_ROTATE,
];

const SMALL_FINGERS: (f64, f64) = (0.015, 0.037);
const LARGE_FINGERS: (f64, f64) = (0.021, 0.057);

const PROFILES: &[RobotProfile] = &[
    RobotProfile {
        model: "px100",
        arm_joints: PX100_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "px150",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "rx150",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "rx200",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "wx200",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "wx250",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "wx250s",
        arm_joints: SIX_DOF_JOINTS,
        finger_limits: SMALL_FINGERS,
    },
    RobotProfile {
        model: "vx250",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: LARGE_FINGERS,
    },
    RobotProfile {
        model: "vx300",
        arm_joints: FIVE_DOF_JOINTS,
        finger_limits: LARGE_FINGERS,
    },
    RobotProfile {
        model: "vx300s",
        arm_joints: SIX_DOF_JOINTS,
        finger_limits: LARGE_FINGERS,
    },
];

/// 按型号查找档案
pub fn lookup(model: &str) -> Option<&'static RobotProfile> {
    let base = model.strip_prefix("mobile_").unwrap_or(model);
    PROFILES.iter().find(|profile| profile.model == base)
}

/// 所有已知型号（不含 `mobile_` 变体）
pub fn known_models() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|profile| profile.model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_models() {
        let wx200 = lookup("wx200").unwrap();
        assert_eq!(wx200.dof(), 5);
        assert_eq!(lookup("px100").unwrap().dof(), 4);
        assert_eq!(lookup("vx300s").unwrap().dof(), 6);
        assert!(lookup("xx999").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_mobile_variant_shares_profile() {
        let mobile = lookup("mobile_wx250s").unwrap();
        assert_eq!(mobile.model, "wx250s");
        assert!(lookup("mobile_").is_none());
    }

    #[test]
    fn test_poses_match_dof() {
        for model in known_models() {
            let profile = lookup(model).unwrap();
            assert_eq!(profile.home_pose().len(), profile.dof());
            let sleep = profile.sleep_pose();
            for (joint, position) in profile.arm_joints.iter().zip(sleep) {
                assert!(joint.contains(position), "{} sleep pose out of range", joint.name);
            }
            let (closed, open) = profile.finger_limits;
            assert!(closed < open);
        }
    }

    #[test]
    fn test_joint_lookup_by_name() {
        let profile = lookup("wx250s").unwrap();
        let (index, joint) = profile.joint("forearm_roll").unwrap();
        assert_eq!(index, 3);
        assert!(joint.contains(0.0));
        assert!(profile.joint("gripper").is_none());
    }
}
