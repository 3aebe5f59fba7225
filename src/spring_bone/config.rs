//! Spring Bone 编译配置
//!
//! 参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 编译配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct SpringBoneConfig {
    // ========== 校验 ==========
    /// 构建完成后是否执行 validate_layout，默认 debug 构建开启
    pub validate_on_build: bool,

    // ========== 并行 ==========
    /// pull_transforms 切换为 rayon 并行的节点数阈值，默认 256
    /// 节点数较少时串行更快（避免线程调度开销）
    pub parallel_pull_threshold: usize,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for SpringBoneConfig {
    fn default() -> Self {
        Self {
            validate_on_build: cfg!(debug_assertions),
            parallel_pull_threshold: 256,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static SPRING_BONE_CONFIG: Lazy<RwLock<SpringBoneConfig>> = Lazy::new(|| {
    RwLock::new(SpringBoneConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> SpringBoneConfig {
    SPRING_BONE_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: SpringBoneConfig) {
    *SPRING_BONE_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *SPRING_BONE_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = SpringBoneConfig::default();
}
