//! 扁平缓冲区记录
//!
//! 所有记录都是固定布局的 POD 结构，跨记录引用一律使用索引，
//! -1 表示"无"。求解器可以按 Span 把数组切成互不重叠的片段并行处理。

use std::ops::Range;

use glam::{Mat4, Quat, Vec3};

use super::descriptor::{ColliderShape, JointSettings};

/// 索引转 Option（-1 及其他负数表示无）
#[inline]
fn index_to_option(index: i32) -> Option<usize> {
    if index >= 0 {
        Some(index as usize)
    } else {
        None
    }
}

// ============================================================================
// Span
// ============================================================================

/// 扁平数组中的连续片段 (start, count)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start_index: u32,
    pub count: u32,
}

impl Span {
    #[inline]
    pub fn new(start_index: usize, count: usize) -> Self {
        Self {
            start_index: start_index as u32,
            count: count as u32,
        }
    }

    /// 片段末尾（不含）
    #[inline]
    pub fn end_index(&self) -> usize {
        self.start_index as usize + self.count as usize
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start_index as usize..self.end_index()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ============================================================================
// Spring（每条链一个）
// ============================================================================

/// 一条独立模拟的骨骼链
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlittableSpring {
    /// 碰撞体片段（指向 colliders）
    pub collider_span: Span,
    /// 关节状态片段（同时指向 joints 与 logics，两者下标对齐）
    pub logic_span: Span,
    /// 中心节点的 transform 索引 (-1 表示在世界空间模拟)
    pub center_transform_index: i32,
}

impl BlittableSpring {
    #[inline]
    pub fn center_id(&self) -> Option<usize> {
        index_to_option(self.center_transform_index)
    }
}

// ============================================================================
// Collider（每个 链-碰撞体 对一个）
// ============================================================================

/// 解析了挂载节点索引的碰撞体
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlittableCollider {
    /// 形状参数（编译器不解释）
    pub shape: ColliderShape,
    /// 挂载节点的 transform 索引
    pub transform_index: i32,
}

impl BlittableCollider {
    #[inline]
    pub fn transform_id(&self) -> Option<usize> {
        index_to_option(self.transform_index)
    }
}

// ============================================================================
// Joint（每段骨骼一个，复制自 head 关节）
// ============================================================================

/// 关节动力学参数，与 BlittableLogic 下标对齐
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlittableJoint {
    pub settings: JointSettings,
}

// ============================================================================
// Logic（每段骨骼一个）
// ============================================================================

/// 一根杆（head → tail）的模拟状态
///
/// current_tail / prev_tail 是 Verlet 位置，构建时相同（初速度为 0）。
/// bone_axis / length 是静止姿态下的方向与长度（head 本地空间）。
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlittableLogic {
    /// head 节点的 transform 索引
    pub head_transform_index: i32,
    /// head 父节点的 transform 索引 (-1 表示根)
    pub parent_transform_index: i32,
    /// 当前尾端位置（有中心节点时为中心本地空间，否则为世界空间）
    pub current_tail: Vec3,
    /// 上一帧尾端位置
    pub prev_tail: Vec3,
    /// 求解器写入的本地旋转，初始为单位旋转
    pub local_rotation: Quat,
    /// 静止骨轴（单位向量）
    pub bone_axis: Vec3,
    /// 静止骨长
    pub length: f32,
}

impl BlittableLogic {
    #[inline]
    pub fn head_id(&self) -> Option<usize> {
        index_to_option(self.head_transform_index)
    }

    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        index_to_option(self.parent_transform_index)
    }
}

// ============================================================================
// Transform 快照（每帧由外部填充）
// ============================================================================

/// 每帧节点变换快照，与 transform 句柄数组下标对齐
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlittableTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub local_to_world: Mat4,
    pub world_to_local: Mat4,
}

impl Default for BlittableTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            local_to_world: Mat4::IDENTITY,
            world_to_local: Mat4::IDENTITY,
        }
    }
}
