// ==========================================
// 商品目录导入 - 分类树重建引擎
// ==========================================
// 规则: 嵌套集合（nested set）编号，每棵树 lft 从 1 开始
// 排序: 同级按 (ordering, identifier) 升序
// 红线: Engine 不拼 SQL，仅做纯计算
// ==========================================

use crate::domain::category::TreePosition;
use std::collections::HashMap;

/// 树重建输入节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub ordering: i64,
    pub identifier: String,
}

/// 被断开父链接的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReason {
    MissingParent, // 父节点不存在
    Cycle,         // 父链成环
}

/// 树重建结果
#[derive(Debug, Clone, Default)]
pub struct TreeRebuild {
    /// (节点 id, 新位置)，按遍历顺序
    pub positions: Vec<(i64, TreePosition)>,
    /// 被提升为根的节点
    pub detached: Vec<(i64, DetachReason)>,
}


// ==========================================
// CategoryTreeEngine
// ==========================================
pub struct CategoryTreeEngine;

impl CategoryTreeEngine {
    /// 重新计算所有节点的嵌套集合编号
    ///
    /// # 说明
    /// - 父节点不在输入集合中: 节点按根处理，记为 MissingParent
    /// - 父链成环: 环上 (ordering, identifier) 最小的节点按根处理，记为 Cycle
    pub fn rebuild(nodes: &[TreeNode]) -> TreeRebuild {
        let index: HashMap<i64, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();

        let sort_key = |idx: &usize| (nodes[*idx].ordering, nodes[*idx].identifier.clone());

        let mut result = TreeRebuild::default();
        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut roots: Vec<usize> = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            match node.parent_id {
                Some(parent_id) if parent_id != node.id && index.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(idx);
                }
                Some(parent_id) if parent_id == node.id => {
                    result.detached.push((node.id, DetachReason::Cycle));
                    roots.push(idx);
                }
                Some(_) => {
                    result.detached.push((node.id, DetachReason::MissingParent));
                    roots.push(idx);
                }
                None => roots.push(idx),
            }
        }

        for list in children.values_mut() {
            list.sort_by_key(sort_key);
        }
        roots.sort_by_key(sort_key);

        let mut visited = vec![false; nodes.len()];
        let mut tree_id = 0;

        for root in roots {
            tree_id += 1;
            let mut counter = 0;
            Self::walk(nodes, &children, root, tree_id, 0, &mut counter, &mut visited, &mut result);
        }

        // 剩余未访问节点: 位于环上，或是环的后代；只断开环上的节点
        loop {
            let next = (0..nodes.len())
                .filter(|idx| !visited[*idx])
                .min_by_key(sort_key);
            let Some(start) = next else { break };

            let idx = Self::cycle_members(nodes, &index, start)
                .into_iter()
                .min_by_key(sort_key)
                .unwrap_or(start);

            result.detached.push((nodes[idx].id, DetachReason::Cycle));
            tree_id += 1;
            let mut counter = 0;
            Self::walk(nodes, &children, idx, tree_id, 0, &mut counter, &mut visited, &mut result);
        }

        result
    }

    /// 沿父链向上直到节点重复，返回重复点所在的环
    fn cycle_members(nodes: &[TreeNode], index: &HashMap<i64, usize>, start: usize) -> Vec<usize> {
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let mut path: Vec<usize> = Vec::new();
        let mut current = start;

        loop {
            if let Some(&pos) = seen.get(&current) {
                return path[pos..].to_vec();
            }
            seen.insert(current, path.len());
            path.push(current);

            match nodes[current].parent_id.and_then(|parent_id| index.get(&parent_id)) {
                Some(&parent) => current = parent,
                None => return vec![start],
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        nodes: &[TreeNode],
        children: &HashMap<i64, Vec<usize>>,
        idx: usize,
        tree_id: i64,
        level: i64,
        counter: &mut i64,
        visited: &mut [bool],
        result: &mut TreeRebuild,
    ) {
        visited[idx] = true;
        *counter += 1;
        let lft = *counter;

        let slot = result.positions.len();
        result.positions.push((
            nodes[idx].id,
            TreePosition {
                tree_id,
                lft,
                rght: 0,
                level,
            },
        ));

        if let Some(kids) = children.get(&nodes[idx].id) {
            for &child in kids {
                if !visited[child] {
                    Self::walk(nodes, children, child, tree_id, level + 1, counter, visited, result);
                }
            }
        }

        *counter += 1;
        result.positions[slot].1.rght = *counter;
    }
}
