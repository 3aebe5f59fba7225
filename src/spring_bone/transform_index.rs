//! Transform 索引构建
//!
//! 收集所有链引用到的场景节点（关节、关节父节点、碰撞体挂载点、中心节点），
//! 去重后分配稠密的从 0 开始的索引。首次出现的节点获得下一个空闲索引，
//! 因此结果与输入顺序一致且可复现。

use std::collections::HashMap;

use crate::scene::SceneGraph;
use crate::{Result, SpringBoneError};

use super::descriptor::SpringChain;

/// 节点句柄 ↔ 索引 的双向映射（句柄 → 索引 只在编译期间使用）
#[derive(Clone, Debug)]
pub struct TransformIndex<H> {
    handles: Vec<H>,
    index_map: HashMap<H, i32>,
}

impl<H> TransformIndex<H>
where
    H: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// 枚举所有被引用的节点
    pub fn build<S>(scene: &S, chains: &[SpringChain<H>]) -> Self
    where
        S: SceneGraph<Handle = H> + ?Sized,
    {
        let mut index = Self {
            handles: Vec::new(),
            index_map: HashMap::new(),
        };

        for chain in chains {
            for joint in &chain.joints {
                index.register(joint.node);
                if let Some(parent) = scene.parent(joint.node) {
                    index.register(parent);
                }
            }
            for collider in &chain.colliders {
                index.register(collider.node);
            }
            if let Some(center) = chain.center {
                index.register(center);
            }
        }

        index
    }

    /// 注册节点，已存在时返回原索引
    fn register(&mut self, handle: H) -> i32 {
        let next = self.handles.len() as i32;
        let handles = &mut self.handles;
        *self.index_map.entry(handle).or_insert_with(|| {
            handles.push(handle);
            next
        })
    }

    /// 查找节点索引
    ///
    /// 与 build 配套使用时总能找到；找不到说明调用方传入了 build 时没有的链。
    pub fn index_of(&self, handle: H) -> Result<i32> {
        self.index_map
            .get(&handle)
            .copied()
            .ok_or_else(|| SpringBoneError::UnregisteredNode(format!("{:?}", handle)))
    }

    /// 可选节点的索引，None 映射为 -1
    pub fn index_of_optional(&self, handle: Option<H>) -> Result<i32> {
        handle.map_or(Ok(-1), |h| self.index_of(h))
    }

    pub fn contains(&self, handle: H) -> bool {
        self.index_map.contains_key(&handle)
    }

    /// 索引 → 句柄
    pub fn handles(&self) -> &[H] {
        &self.handles
    }

    /// 丢弃查找表，只保留 索引 → 句柄
    pub fn into_handles(self) -> Vec<H> {
        self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{BoneTransform, NodeHandle, NodeTree};
    use crate::spring_bone::descriptor::ColliderShape;
    use glam::Vec3;

    fn sample_tree() -> (NodeTree, Vec<NodeHandle>) {
        let mut tree = NodeTree::new();
        let root = tree.add_node("root", None, BoneTransform::default());
        let a = tree.add_node("a", Some(root), BoneTransform::from_translation(Vec3::Y));
        let b = tree.add_node("b", Some(a), BoneTransform::from_translation(Vec3::Y));
        let c = tree.add_node("c", Some(b), BoneTransform::from_translation(Vec3::Y));
        let unused = tree.add_node("unused", Some(root), BoneTransform::default());
        (tree, vec![root, a, b, c, unused])
    }

    #[test]
    fn test_collects_joints_and_parents() {
        let (tree, n) = sample_tree();
        let chains = vec![SpringChain::new("hair").with_joints([n[2], n[3]])];
        let index = TransformIndex::build(&tree, &chains);

        // b, b 的父节点 a, c（c 的父节点 b 已存在）
        assert_eq!(index.handles(), &[n[2], n[1], n[3]]);
        assert!(!index.contains(n[0]));
        assert!(!index.contains(n[4]));
    }

    #[test]
    fn test_shared_nodes_collapse() {
        let (tree, n) = sample_tree();
        let shape = ColliderShape::Sphere { offset: Vec3::ZERO, radius: 0.1 };
        let chains = vec![
            SpringChain::new("left").with_joint(n[1]).with_collider(n[0], shape),
            SpringChain::new("right").with_joint(n[1]).with_collider(n[0], shape).with_center(n[0]),
        ];
        let index = TransformIndex::build(&tree, &chains);

        assert_eq!(index.len(), 2);
        let mut seen = index.handles().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), index.len());
        assert_eq!(index.index_of(n[0]), Ok(1));
    }

    #[test]
    fn test_unregistered_lookup_is_error() {
        let (tree, n) = sample_tree();
        let index = TransformIndex::build(&tree, &[]);

        assert!(index.is_empty());
        assert!(matches!(index.index_of(n[4]), Err(SpringBoneError::UnregisteredNode(_))));
        assert_eq!(index.index_of_optional(None), Ok(-1));
    }
}
