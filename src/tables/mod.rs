// 咖啡馆桌号配置

use serde::Serialize;

/// (规范化名称, 桌数)
const CAFE_TABLES: &[(&str, u32)] = &[("food court", 8), ("cook house", 12), ("chatkara", 13)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOption {
    pub value: String,
    pub label: String,
}

/// 按名称精确查找桌号
///
/// 只接受登记名称本身及其全大写、首字母大写形式，例如 "food court"、
/// "FOOD COURT"、"Food Court"；其他大小写组合返回空列表。
pub fn table_options(cafe_name: &str) -> Vec<u32> {
    CAFE_TABLES
        .iter()
        .find(|(name, _)| {
            *name == cafe_name || name.to_uppercase() == cafe_name || title_case(name) == cafe_name
        })
        .map(|&(_, count)| (1..=count).collect())
        .unwrap_or_default()
}

/// 去除首尾空白并忽略大小写的查找
pub fn table_options_normalized(cafe_name: &str) -> Vec<u32> {
    let normalized = cafe_name.trim().to_lowercase();
    CAFE_TABLES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, count)| (1..=count).collect())
        .unwrap_or_default()
}

/// 下拉框用的桌号选项
pub fn cafe_table_options(cafe_name: &str) -> Vec<TableOption> {
    to_options(table_options(cafe_name))
}

/// 忽略大小写的桌号选项
pub fn cafe_table_options_normalized(cafe_name: &str) -> Vec<TableOption> {
    to_options(table_options_normalized(cafe_name))
}

fn to_options(tables: Vec<u32>) -> Vec<TableOption> {
    tables
        .into_iter()
        .map(|table| TableOption {
            value: table.to_string(),
            label: format!("Table {}", table),
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
