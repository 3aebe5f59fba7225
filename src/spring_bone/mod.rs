//! Spring Bone 缓冲区编译
//!
//! 核心设计思想：
//! - TransformIndex: 场景节点去重，对象图引用 → 稠密索引
//! - InstanceBuffer: 按链生成 Span 分段的扁平数组，预计算静止姿态
//! - ChainSliceMut: 按 Span 切分的每链视图，供求解器无锁并行

mod blittable;
mod descriptor;
mod instance_buffer;
mod partition;
mod transform_index;
pub mod config;

pub use blittable::{
    BlittableCollider, BlittableJoint, BlittableLogic, BlittableSpring, BlittableTransform, Span,
};
pub use config::{get_config, reset_config, set_config, SpringBoneConfig};
pub use descriptor::{ColliderShape, JointSettings, SpringChain, SpringCollider, SpringJoint};
pub use instance_buffer::InstanceBuffer;
pub use partition::ChainSliceMut;
pub use transform_index::TransformIndex;
