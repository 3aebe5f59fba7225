//! 场景节点树 - 数组存储的层次结构
//!
//! 每个 SceneNode 代表层次中的一个节点，父节点必须先于子节点加入，
//! 因此按数组顺序遍历即可保证父节点的世界矩阵先于子节点计算。

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use super::{BoneTransform, SceneGraph};

// ============================================================================
// 节点句柄
// ============================================================================

/// 节点句柄（NodeTree 内的数组下标）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// 场景节点
// ============================================================================

/// 场景节点
///
/// - 静态数据：名称、父节点索引
/// - 本地变换：相对父节点的 TRS
/// - 世界变换：local_to_world = parent.local_to_world * local_to_parent
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// 节点名称
    pub name: String,

    /// 父节点索引 (-1 表示根节点)
    pub parent_index: i32,

    /// 本地变换 (local_to_parent)
    pub local: BoneTransform,

    /// 全局变换矩阵 (local_to_world)
    pub local_to_world: Mat4,
}

impl SceneNode {
    /// 父节点索引
    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        if self.parent_index >= 0 {
            Some(self.parent_index as usize)
        } else {
            None
        }
    }

    /// 是否为根节点
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }

    /// 获取世界位置
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.local_to_world.col(3).truncate()
    }
}

// ============================================================================
// 节点树
// ============================================================================

/// 节点树
///
/// 节点只能挂到已存在的节点下；`set_local_transform` 之后需要
/// 调用 `update_world_transforms` 刷新世界矩阵。
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    nodes: Vec<SceneNode>,
    name_to_index: HashMap<String, usize>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，立即计算其世界矩阵
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeHandle>,
        local: BoneTransform,
    ) -> NodeHandle {
        let index = self.nodes.len();
        let name = name.into();

        let parent_to_world = parent
            .and_then(|p| self.nodes.get(p.index()))
            .map_or(Mat4::IDENTITY, |p| p.local_to_world);
        let parent_index = match parent {
            Some(p) if p.index() < index => p.0 as i32,
            Some(p) => {
                log::warn!("[NodeTree] 节点 '{}' 的父节点 {:?} 不存在，按根节点处理", name, p);
                -1
            }
            None => -1,
        };

        self.name_to_index.insert(name.clone(), index);
        self.nodes.push(SceneNode {
            name,
            parent_index,
            local,
            local_to_world: parent_to_world * local.to_matrix(),
        });
        NodeHandle(index as u32)
    }

    /// 按名称查找节点
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.name_to_index.get(name).map(|&i| NodeHandle(i as u32))
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 设置本地变换（世界矩阵不会自动刷新）
    pub fn set_local_transform(&mut self, handle: NodeHandle, local: BoneTransform) {
        if let Some(node) = self.nodes.get_mut(handle.index()) {
            node.local = local;
        }
    }

    /// 按数组顺序重新计算所有世界矩阵
    pub fn update_world_transforms(&mut self) {
        for i in 0..self.nodes.len() {
            let local = self.nodes[i].local.to_matrix();
            self.nodes[i].local_to_world = match self.nodes[i].parent_id() {
                Some(p) => self.nodes[p].local_to_world * local,
                None => local,
            };
        }
    }

    #[inline]
    fn at(&self, handle: NodeHandle) -> &SceneNode {
        &self.nodes[handle.index()]
    }
}

impl SceneGraph for NodeTree {
    type Handle = NodeHandle;

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.at(node).parent_id().map(|p| NodeHandle(p as u32))
    }

    fn local_position(&self, node: NodeHandle) -> Vec3 {
        self.at(node).local.translation
    }

    fn local_rotation(&self, node: NodeHandle) -> Quat {
        self.at(node).local.rotation
    }

    fn local_scale(&self, node: NodeHandle) -> Vec3 {
        self.at(node).local.scale
    }

    fn local_to_world(&self, node: NodeHandle) -> Mat4 {
        self.at(node).local_to_world
    }
}
