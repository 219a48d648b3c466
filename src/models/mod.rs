//! Wire types for the department directory API.

pub mod department;
pub mod page;
pub mod user;

pub use department::{
    CreateDepartmentInput, CreateSubDepartmentInput, Department, SubDepartment,
    UpdateDepartmentInput, UpdateSubDepartmentInput,
};
pub use page::DepartmentPage;
pub use user::{AuthPayload, RegisterInput, User};
