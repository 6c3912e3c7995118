//! 配置项数据模型

use serde::{Deserialize, Serialize};

/// 配置项
///
/// 由键、值和优先级组成的值对象。提供者一旦产出便不再修改，
/// 需要更新时整体替换所在的列表。优先级越高，在外部合并时越优先。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    key: String,
    value: String,
    #[serde(default)]
    priority: i64,
}

impl Item {
    /// 创建新的配置项
    pub fn new(key: impl Into<String>, value: impl Into<String>, priority: i64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            priority,
        }
    }

    /// 配置键
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 配置值
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 优先级
    pub fn priority(&self) -> i64 {
        self.priority
    }
}

/// 配置项列表
///
/// 顺序与数据源中的顺序一致，而不是按优先级排序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemList {
    /// 配置项
    pub items: Vec<Item>,
}

impl ItemList {
    /// 创建新的配置项列表
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 遍历配置项
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// 获取指定键的全部配置项，保持原有顺序
    pub fn items_for_key<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a Item> + 'k
    where
        'a: 'k,
    {
        self.items.iter().filter(move |item| item.key == key)
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl FromIterator<Item> for ItemList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ItemList {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
