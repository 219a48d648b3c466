//! Department wire types and mutation inputs.

use serde::{Deserialize, Serialize};

/// A department as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    /// May be absent in responses; absent and empty are equivalent.
    #[serde(default)]
    pub sub_departments: Vec<SubDepartment>,
}

/// A sub-department; exists only as a child of exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDepartment {
    pub id: i64,
    pub name: String,
}

/// Input for the CreateDepartment mutation. Sub-departments carry names
/// only, since no server ids exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    pub name: String,
    pub sub_departments: Vec<CreateSubDepartmentInput>,
}

/// Sub-department entry within a create input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubDepartmentInput {
    pub name: String,
}

/// Input for the UpdateDepartment mutation.
///
/// The sub-department list is authoritative: entries carry their id when
/// they pre-existed, omit it when added during the edit, and any
/// sub-department missing from the list is removed server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentInput {
    pub id: i64,
    pub name: String,
    pub sub_departments: Vec<UpdateSubDepartmentInput>,
}

/// Sub-department entry within an update input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSubDepartmentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}
