//! 链描述（编译输入）
//!
//! 由上游导入 / 编辑阶段产生的对象图表示，节点以场景图句柄引用。

use glam::Vec3;

// ============================================================================
// 关节参数
// ============================================================================

/// 关节动力学参数（编译器原样复制，由求解器解释）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSettings {
    /// 回复静止姿态的刚度
    pub stiffness_force: f32,
    /// 重力强度
    pub gravity_power: f32,
    /// 重力方向（单位向量）
    pub gravity_dir: Vec3,
    /// 空气阻力 [0, 1]
    pub drag_force: f32,
    /// 碰撞半径
    pub radius: f32,
}

impl Default for JointSettings {
    fn default() -> Self {
        Self {
            stiffness_force: 1.0,
            gravity_power: 0.0,
            gravity_dir: Vec3::NEG_Y,
            drag_force: 0.4,
            radius: 0.02,
        }
    }
}

// ============================================================================
// 碰撞体形状
// ============================================================================

/// 碰撞体形状（挂载节点本地空间）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    Sphere { offset: Vec3, radius: f32 },
    Capsule { offset: Vec3, tail: Vec3, radius: f32 },
    Plane { offset: Vec3, normal: Vec3 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        ColliderShape::Sphere { offset: Vec3::ZERO, radius: 0.0 }
    }
}

// ============================================================================
// 链描述
// ============================================================================

/// 链中的一个关节
#[derive(Clone, Debug)]
pub struct SpringJoint<H> {
    pub node: H,
    pub settings: JointSettings,
}

impl<H> SpringJoint<H> {
    pub fn new(node: H) -> Self {
        Self { node, settings: JointSettings::default() }
    }

    pub fn with_settings(node: H, settings: JointSettings) -> Self {
        Self { node, settings }
    }
}

/// 链关联的一个碰撞体
#[derive(Clone, Debug)]
pub struct SpringCollider<H> {
    pub node: H,
    pub shape: ColliderShape,
}

impl<H> SpringCollider<H> {
    pub fn new(node: H, shape: ColliderShape) -> Self {
        Self { node, shape }
    }
}

/// 一条弹簧骨骼链
///
/// joints 按 根 → 末端 排列，相邻两个关节构成一段骨骼；
/// center 存在时，尾端位置在中心节点本地空间中模拟。
#[derive(Clone, Debug)]
pub struct SpringChain<H> {
    /// 调试用名称
    pub name: String,
    pub joints: Vec<SpringJoint<H>>,
    pub colliders: Vec<SpringCollider<H>>,
    pub center: Option<H>,
}

impl<H> Default for SpringChain<H> {
    fn default() -> Self {
        Self {
            name: String::new(),
            joints: Vec::new(),
            colliders: Vec::new(),
            center: None,
        }
    }
}

impl<H> SpringChain<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_joint(mut self, node: H) -> Self {
        self.joints.push(SpringJoint::new(node));
        self
    }

    pub fn with_joints(mut self, nodes: impl IntoIterator<Item = H>) -> Self {
        self.joints.extend(nodes.into_iter().map(SpringJoint::new));
        self
    }

    pub fn with_collider(mut self, node: H, shape: ColliderShape) -> Self {
        self.colliders.push(SpringCollider::new(node, shape));
        self
    }

    pub fn with_center(mut self, center: H) -> Self {
        self.center = Some(center);
        self
    }

    /// 骨骼段数（关节数 - 1，不足 2 个关节时为 0）
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.joints.len().saturating_sub(1)
    }
}
