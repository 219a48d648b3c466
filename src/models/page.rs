//! Paginated department listing as reported by the server.

use serde::{Deserialize, Serialize};

use super::department::Department;

/// One page of the department collection.
///
/// Recomputed from every fetch; never mutated in place. `page` is
/// 1-based and, when `total_pages > 0`, lies in `[1, total_pages]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPage {
    pub departments: Vec<Department>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wire_names() {
        let json = r#"{
            "departments": [{"id": 1, "name": "Engineering"}],
            "total": 11,
            "page": 2,
            "limit": 10,
            "totalPages": 2
        }"#;
        let page: DepartmentPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.departments.len(), 1);
    }
}
