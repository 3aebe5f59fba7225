//! Spring Bone 缓冲区编译器
//!
//! 将层次化的弹簧骨骼链描述（骨骼、碰撞体、可选中心节点）编译为
//! 扁平的、按索引寻址的连续缓冲区，供批量物理求解器逐帧使用：
//! - 场景节点去重并分配稠密索引
//! - 每条链的碰撞体 / 关节状态按 Span 分段存放
//! - 预计算静止姿态（骨长、骨轴、初始尾端位置）

pub mod scene;
pub mod spring_bone;

pub use scene::{BoneTransform, NodeHandle, NodeTree, SceneGraph};
pub use spring_bone::{
    BlittableCollider, BlittableJoint, BlittableLogic, BlittableSpring, BlittableTransform,
    ChainSliceMut, ColliderShape, InstanceBuffer, JointSettings, Span, SpringChain,
    SpringCollider, SpringJoint, TransformIndex,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpringBoneError {
    /// 节点未在 TransformIndex 中注册（索引构建与编译不一致，属于程序错误）
    #[error("Scene node not registered in transform index: {0}")]
    UnregisteredNode(String),

    #[error("Instance buffer already disposed")]
    Disposed,

    #[error("Invalid buffer layout: {0}")]
    InvalidLayout(String),
}

pub type Result<T> = std::result::Result<T, SpringBoneError>;
