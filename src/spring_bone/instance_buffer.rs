//! Spring Bone 实例缓冲区
//!
//! 一个模型实例对应一个 InstanceBuffer，构建时一次性完成：
//! 1. TransformIndex：节点去重并分配索引
//! 2. 逐链生成 Spring / Collider / Joint / Logic 记录，预计算静止姿态
//! 3. 分配与索引对齐的 transform 句柄数组和每帧快照数组
//!
//! 流程：new → 每帧 [pull_transforms → 外部求解器] → dispose

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use glam::{Quat, Vec3};
use rayon::prelude::*;

use crate::scene::SceneGraph;
use crate::{Result, SpringBoneError};

use super::blittable::{
    BlittableCollider, BlittableJoint, BlittableLogic, BlittableSpring, BlittableTransform, Span,
};
use super::config::get_config;
use super::descriptor::SpringChain;
use super::partition::{split_chains, ChainSliceMut};
use super::transform_index::TransformIndex;

/// 一个模型实例的全部 Spring Bone 缓冲区
///
/// 所有数组作为一个整体持有，dispose（或 Drop）时一起释放且只释放一次。
/// 其他组件只能以索引引用这些数组中的元素。
#[derive(Debug)]
pub struct InstanceBuffer<H> {
    springs: Vec<BlittableSpring>,
    joints: Vec<BlittableJoint>,
    colliders: Vec<BlittableCollider>,
    logics: Vec<BlittableLogic>,
    /// 每帧快照（与 transform_handles 下标对齐）
    transforms: Vec<BlittableTransform>,
    /// 索引 → 场景节点句柄（用于回写）
    transform_handles: Vec<H>,
    disposed: bool,
}

impl<H> InstanceBuffer<H>
where
    H: Copy + Eq + Hash + Debug,
{
    /// 构建缓冲区
    ///
    /// 只会因索引构建与编译不一致而失败（UnregisteredNode），属于程序错误。
    pub fn new<S>(scene: &S, chains: &[SpringChain<H>]) -> Result<Self>
    where
        S: SceneGraph<Handle = H> + ?Sized,
    {
        let config = get_config();

        let index = TransformIndex::build(scene, chains);
        let buffer = Self::compile(scene, chains, index)?;

        if config.validate_on_build {
            buffer.validate_layout()?;
        }

        let degenerate = chains.iter().filter(|c| c.joints.len() < 2).count();
        if config.debug_log {
            log::info!(
                "[SpringBone] 缓冲区构建完成: {} 链 ({} 退化), {} 碰撞体, {} 骨骼段, {} 节点",
                buffer.springs.len(),
                degenerate,
                buffer.colliders.len(),
                buffer.logics.len(),
                buffer.transform_handles.len()
            );
        } else {
            log::debug!(
                "[SpringBone] 缓冲区构建完成: {} 链, {} 碰撞体, {} 骨骼段, {} 节点",
                buffer.springs.len(),
                buffer.colliders.len(),
                buffer.logics.len(),
                buffer.transform_handles.len()
            );
        }

        Ok(buffer)
    }

    /// 按链顺序生成所有记录
    fn compile<S>(scene: &S, chains: &[SpringChain<H>], index: TransformIndex<H>) -> Result<Self>
    where
        S: SceneGraph<Handle = H> + ?Sized,
    {
        let collider_total: usize = chains.iter().map(|c| c.colliders.len()).sum();
        let logic_total: usize = chains.iter().map(|c| c.segment_count()).sum();

        let mut springs = Vec::with_capacity(chains.len());
        let mut colliders = Vec::with_capacity(collider_total);
        let mut joints = Vec::with_capacity(logic_total);
        let mut logics = Vec::with_capacity(logic_total);

        for chain in chains {
            springs.push(BlittableSpring {
                collider_span: Span::new(colliders.len(), chain.colliders.len()),
                logic_span: Span::new(logics.len(), chain.segment_count()),
                center_transform_index: index.index_of_optional(chain.center)?,
            });

            for collider in &chain.colliders {
                colliders.push(BlittableCollider {
                    shape: collider.shape,
                    transform_index: index.index_of(collider.node)?,
                });
            }

            for pair in chain.joints.windows(2) {
                let (head, tail) = (&pair[0], &pair[1]);
                joints.push(BlittableJoint { settings: head.settings });
                logics.push(rest_logic(scene, &index, head.node, tail.node, chain.center)?);
            }

            if chain.joints.len() < 2 {
                log::debug!(
                    "[SpringBone] 链 '{}' 只有 {} 个关节，不生成骨骼段",
                    chain.name,
                    chain.joints.len()
                );
            }
        }

        let transform_handles = index.into_handles();
        let transforms = vec![BlittableTransform::default(); transform_handles.len()];

        Ok(Self {
            springs,
            joints,
            colliders,
            logics,
            transforms,
            transform_handles,
            disposed: false,
        })
    }

    // ========================================
    // 访问器
    // ========================================

    #[inline]
    pub fn springs(&self) -> &[BlittableSpring] {
        &self.springs
    }

    #[inline]
    pub fn colliders(&self) -> &[BlittableCollider] {
        &self.colliders
    }

    #[inline]
    pub fn joints(&self) -> &[BlittableJoint] {
        &self.joints
    }

    #[inline]
    pub fn logics(&self) -> &[BlittableLogic] {
        &self.logics
    }

    #[inline]
    pub fn logics_mut(&mut self) -> &mut [BlittableLogic] {
        &mut self.logics
    }

    /// 每帧快照
    #[inline]
    pub fn transforms(&self) -> &[BlittableTransform] {
        &self.transforms
    }

    #[inline]
    pub fn transforms_mut(&mut self) -> &mut [BlittableTransform] {
        &mut self.transforms
    }

    /// 索引 → 场景节点句柄
    #[inline]
    pub fn transform_handles(&self) -> &[H] {
        &self.transform_handles
    }

    #[inline]
    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    #[inline]
    pub fn transform_count(&self) -> usize {
        self.transform_handles.len()
    }

    /// 某条链的碰撞体
    pub fn colliders_of(&self, spring: &BlittableSpring) -> &[BlittableCollider] {
        self.colliders.get(spring.collider_span.range()).unwrap_or(&[])
    }

    /// 某条链的骨骼段状态
    pub fn logics_of(&self, spring: &BlittableSpring) -> &[BlittableLogic] {
        self.logics.get(spring.logic_span.range()).unwrap_or(&[])
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ========================================
    // 每帧
    // ========================================

    /// 从场景图拉取所有节点的变换快照
    ///
    /// 节点数达到 parallel_pull_threshold 时使用 rayon 并行。
    pub fn pull_transforms<S>(&mut self, scene: &S) -> Result<()>
    where
        S: SceneGraph<Handle = H> + Sync + ?Sized,
        H: Send + Sync,
    {
        if self.disposed {
            return Err(SpringBoneError::Disposed);
        }

        if self.transform_handles.len() >= get_config().parallel_pull_threshold {
            self.transforms
                .par_iter_mut()
                .zip(self.transform_handles.par_iter())
                .for_each(|(out, &handle)| *out = snapshot(scene, handle));
        } else {
            for (out, &handle) in self.transforms.iter_mut().zip(&self.transform_handles) {
                *out = snapshot(scene, handle);
            }
        }
        Ok(())
    }

    /// 按链切分为互不重叠的视图
    pub fn chains_mut(&mut self) -> Vec<ChainSliceMut<'_>> {
        split_chains(&self.springs, &self.colliders, &self.joints, &mut self.logics)
    }

    /// 并行处理每条链（各链的 logics 互不重叠，无需同步）
    pub fn par_for_each_chain<F>(&mut self, f: F)
    where
        F: Fn(ChainSliceMut<'_>, &[BlittableTransform]) + Send + Sync,
    {
        let chains = split_chains(&self.springs, &self.colliders, &self.joints, &mut self.logics);
        let transforms = self.transforms.as_slice();
        chains.into_par_iter().for_each(|chain| f(chain, transforms));
    }

    // ========================================
    // 校验
    // ========================================

    /// 检查 Span 分区与索引范围，返回第一处违例
    pub fn validate_layout(&self) -> Result<()> {
        let invalid = |msg: String| Err(SpringBoneError::InvalidLayout(msg));
        let transform_count = self.transform_handles.len() as i32;

        if self.transforms.len() != self.transform_handles.len() {
            return invalid(format!(
                "快照数 {} 与节点数 {} 不一致",
                self.transforms.len(),
                self.transform_handles.len()
            ));
        }
        if self.joints.len() != self.logics.len() {
            return invalid(format!(
                "joints 数 {} 与 logics 数 {} 不一致",
                self.joints.len(),
                self.logics.len()
            ));
        }

        let mut next_collider = 0usize;
        let mut next_logic = 0usize;
        for (i, spring) in self.springs.iter().enumerate() {
            if spring.collider_span.start_index as usize != next_collider {
                return invalid(format!("链 {} 碰撞体片段起点 {:?} 不连续", i, spring.collider_span));
            }
            if spring.logic_span.start_index as usize != next_logic {
                return invalid(format!("链 {} 骨骼段片段起点 {:?} 不连续", i, spring.logic_span));
            }
            next_collider = spring.collider_span.end_index();
            next_logic = spring.logic_span.end_index();

            if spring.center_transform_index < -1 || spring.center_transform_index >= transform_count {
                return invalid(format!("链 {} 中心索引 {} 越界", i, spring.center_transform_index));
            }
        }
        if next_collider != self.colliders.len() {
            return invalid(format!("碰撞体片段覆盖 {} / {}", next_collider, self.colliders.len()));
        }
        if next_logic != self.logics.len() {
            return invalid(format!("骨骼段片段覆盖 {} / {}", next_logic, self.logics.len()));
        }

        for (i, collider) in self.colliders.iter().enumerate() {
            if !(0..transform_count).contains(&collider.transform_index) {
                return invalid(format!("碰撞体 {} 节点索引 {} 越界", i, collider.transform_index));
            }
        }
        for (i, logic) in self.logics.iter().enumerate() {
            if !(0..transform_count).contains(&logic.head_transform_index) {
                return invalid(format!("骨骼段 {} head 索引 {} 越界", i, logic.head_transform_index));
            }
            if !(-1..transform_count).contains(&logic.parent_transform_index) {
                return invalid(format!("骨骼段 {} 父索引 {} 越界", i, logic.parent_transform_index));
            }
        }

        let unique: HashSet<&H> = self.transform_handles.iter().collect();
        if unique.len() != self.transform_handles.len() {
            return invalid("transform 句柄存在重复".to_string());
        }

        Ok(())
    }
}

impl<H> InstanceBuffer<H> {
    /// 释放所有缓冲区
    ///
    /// 可重复调用，只有第一次真正释放，返回本次是否释放。
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            log::trace!("[SpringBone] 缓冲区已释放，忽略重复 dispose");
            return false;
        }
        self.disposed = true;

        self.springs = Vec::new();
        self.joints = Vec::new();
        self.colliders = Vec::new();
        self.logics = Vec::new();
        self.transforms = Vec::new();
        self.transform_handles = Vec::new();
        true
    }
}

impl<H> Drop for InstanceBuffer<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ============================================================================
// 静止姿态预计算
// ============================================================================

/// 计算一段骨骼 (head → tail) 的初始状态
///
/// - local_child_position = tail.local_position * tail.lossy_scale（逐轴）
/// - world_child_position = head.transform_point(local_child_position)
/// - current_tail 有中心节点时转换到中心本地空间
/// - bone_axis / length 取自 local_child_position（未经 head 的世界变换）
fn rest_logic<S, H>(
    scene: &S,
    index: &TransformIndex<H>,
    head: H,
    tail: H,
    center: Option<H>,
) -> Result<BlittableLogic>
where
    S: SceneGraph<Handle = H> + ?Sized,
    H: Copy + Eq + Hash + Debug,
{
    let local_child_position: Vec3 = scene.local_position(tail) * scene.lossy_scale(tail);

    let world_child_position = scene.transform_point(head, local_child_position);
    let current_tail = match center {
        Some(center) => scene.inverse_transform_point(center, world_child_position),
        None => world_child_position,
    };

    Ok(BlittableLogic {
        head_transform_index: index.index_of(head)?,
        parent_transform_index: index.index_of_optional(scene.parent(head))?,
        current_tail,
        prev_tail: current_tail,
        local_rotation: Quat::IDENTITY,
        bone_axis: local_child_position.normalize_or_zero(),
        length: local_child_position.length(),
    })
}

/// 单个节点的变换快照
fn snapshot<S>(scene: &S, handle: S::Handle) -> BlittableTransform
where
    S: SceneGraph + ?Sized,
{
    let local_to_world = scene.local_to_world(handle);
    let (_, rotation, position) = local_to_world.to_scale_rotation_translation();
    BlittableTransform {
        position,
        rotation,
        local_position: scene.local_position(handle),
        local_rotation: scene.local_rotation(handle),
        local_scale: scene.local_scale(handle),
        local_to_world,
        world_to_local: scene.world_to_local(handle),
    }
}
