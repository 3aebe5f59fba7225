//! 场景图接口
//!
//! 编译器不持有场景图本身，只通过 `SceneGraph` 查询节点：
//! - SceneGraph: 外部场景图的句柄提供者（父子关系、本地 TRS、世界矩阵）
//! - NodeTree: 基于数组的简单实现，节点以 NodeHandle 寻址

mod node_tree;

pub use node_tree::{NodeHandle, NodeTree, SceneNode};

use std::fmt::Debug;
use std::hash::Hash;

use glam::{Mat4, Quat, Vec3};

// ============================================================================
// 公共类型定义
// ============================================================================

/// 骨骼变换数据
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    /// 仅平移
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Default::default() }
    }

    /// 转换为 4x4 矩阵
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// 从矩阵分解
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }
}

// ============================================================================
// 场景图 trait
// ============================================================================

/// 外部场景图（不透明句柄提供者）
///
/// 所有方法都假定句柄有效；句柄的生命周期由场景图一方负责。
/// 世界空间相关的默认实现都从 `local_to_world` 推导。
pub trait SceneGraph {
    /// 节点句柄，编译期间作为去重键使用
    type Handle: Copy + Eq + Hash + Debug + Send + Sync;

    /// 父节点（根节点返回 None）
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// 相对父节点的位置
    fn local_position(&self, node: Self::Handle) -> Vec3;

    /// 相对父节点的旋转
    fn local_rotation(&self, node: Self::Handle) -> Quat;

    /// 相对父节点的缩放
    fn local_scale(&self, node: Self::Handle) -> Vec3;

    /// 本地到世界矩阵
    fn local_to_world(&self, node: Self::Handle) -> Mat4;

    /// 世界到本地矩阵
    #[inline]
    fn world_to_local(&self, node: Self::Handle) -> Mat4 {
        self.local_to_world(node).inverse()
    }

    /// 世界空间缩放（从 local_to_world 分解，逐轴）
    #[inline]
    fn lossy_scale(&self, node: Self::Handle) -> Vec3 {
        let (scale, _, _) = self.local_to_world(node).to_scale_rotation_translation();
        scale
    }

    /// 世界位置
    #[inline]
    fn world_position(&self, node: Self::Handle) -> Vec3 {
        self.local_to_world(node).w_axis.truncate()
    }

    /// 世界旋转
    #[inline]
    fn world_rotation(&self, node: Self::Handle) -> Quat {
        let (_, rotation, _) = self.local_to_world(node).to_scale_rotation_translation();
        rotation
    }

    /// 本地点 → 世界点
    #[inline]
    fn transform_point(&self, node: Self::Handle, point: Vec3) -> Vec3 {
        self.local_to_world(node).transform_point3(point)
    }

    /// 世界点 → 本地点
    #[inline]
    fn inverse_transform_point(&self, node: Self::Handle, point: Vec3) -> Vec3 {
        self.world_to_local(node).transform_point3(point)
    }
}
