//! 按链切分缓冲区
//!
//! 各链的 Span 互不重叠且按链顺序首尾相接，因此可以用 split_at_mut
//! 把 logics 切成每链独立的可变切片，交给 rayon 并行处理而无需加锁。

use super::blittable::{BlittableCollider, BlittableJoint, BlittableLogic, BlittableSpring};

/// 一条链在扁平缓冲区中的视图
#[derive(Debug)]
pub struct ChainSliceMut<'a> {
    /// 链在 springs 中的下标
    pub spring_index: usize,
    pub spring: BlittableSpring,
    pub colliders: &'a [BlittableCollider],
    pub joints: &'a [BlittableJoint],
    /// 求解器逐帧改写的状态
    pub logics: &'a mut [BlittableLogic],
}

/// 按 Span 顺序切分
///
/// 调用方保证 Span 已通过 validate_layout（由编译器构造时天然满足）。
pub(crate) fn split_chains<'a>(
    springs: &'a [BlittableSpring],
    colliders: &'a [BlittableCollider],
    joints: &'a [BlittableJoint],
    logics: &'a mut [BlittableLogic],
) -> Vec<ChainSliceMut<'a>> {
    let mut colliders = colliders;
    let mut joints = joints;
    let mut logics = logics;
    let mut chains = Vec::with_capacity(springs.len());

    for (spring_index, spring) in springs.iter().enumerate() {
        let (chain_colliders, rest) = colliders.split_at(spring.collider_span.count as usize);
        colliders = rest;

        let logic_count = spring.logic_span.count as usize;
        let (chain_joints, rest) = joints.split_at(logic_count);
        joints = rest;
        let (chain_logics, rest) = std::mem::take(&mut logics).split_at_mut(logic_count);
        logics = rest;

        chains.push(ChainSliceMut {
            spring_index,
            spring: *spring,
            colliders: chain_colliders,
            joints: chain_joints,
            logics: chain_logics,
        });
    }

    chains
}
