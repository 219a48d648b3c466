//! Department form lifecycle: draft state, validation, and the
//! create/edit submission split.

use crate::error::{AppError, FieldError, Result};
use crate::models::{
    CreateDepartmentInput, CreateSubDepartmentInput, Department, UpdateDepartmentInput,
    UpdateSubDepartmentInput,
};

/// Minimum length for department and sub-department names.
const MIN_NAME_LEN: usize = 2;

/// Field-scoped name checks, shared by the form and by the
/// synchronizer's guard over directly-built mutation inputs.
pub(crate) fn check_names<'a>(
    name: &str,
    sub_names: impl Iterator<Item = &'a str>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if name.trim().chars().count() < MIN_NAME_LEN {
        errors.push(FieldError {
            field: "name".to_string(),
            message: format!("Department name must be at least {MIN_NAME_LEN} characters"),
        });
    }

    for (i, sub_name) in sub_names.enumerate() {
        if sub_name.trim().chars().count() < MIN_NAME_LEN {
            errors.push(FieldError {
                field: format!("subDepartments[{i}].name"),
                message: format!("Sub-department name must be at least {MIN_NAME_LEN} characters"),
            });
        }
    }

    errors
}

/// Which submission the form will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Building a new department.
    Creating,
    /// Editing the department with this server id.
    Editing { id: i64 },
}

/// A sub-department row in the draft. `id` is present only for rows
/// preloaded from an existing department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubDraft {
    pub id: Option<i64>,
    pub name: String,
}

/// The mutation a valid draft maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(CreateDepartmentInput),
    Update(UpdateDepartmentInput),
}

/// Draft state for one department being created or edited.
///
/// Starts in `Creating`; `begin_edit` switches to `Editing` with the
/// target's fields preloaded. Cancel or a successful submission resets
/// to an empty `Creating` draft; a failed submission leaves the draft
/// untouched so the user can retry.
#[derive(Debug, Clone)]
pub struct DepartmentForm {
    mode: FormMode,
    name: String,
    sub_departments: Vec<SubDraft>,
}

impl Default for DepartmentForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DepartmentForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Creating,
            name: String::new(),
            sub_departments: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn sub_departments(&self) -> &[SubDraft] {
        &self.sub_departments
    }

    /// Preload the draft from an existing department and enter Editing.
    pub fn begin_edit(&mut self, department: &Department) {
        self.mode = FormMode::Editing { id: department.id };
        self.name = department.name.clone();
        self.sub_departments = department
            .sub_departments
            .iter()
            .map(|sub| SubDraft {
                id: Some(sub.id),
                name: sub.name.clone(),
            })
            .collect();
    }

    /// Discard the draft and return to Creating.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Clear the draft after a successful submission.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Append an empty sub-department row.
    pub fn add_sub_row(&mut self) -> &mut SubDraft {
        self.sub_departments.push(SubDraft::default());
        self.sub_departments.last_mut().expect("row just pushed")
    }

    /// Set the name of the sub-department row at `index`.
    pub fn set_sub_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(row) = self.sub_departments.get_mut(index) {
            row.name = name.into();
        }
    }

    /// Remove the sub-department row at `index`. Out-of-range indices
    /// are ignored. Purely local; removal reaches the server only on
    /// submission of the remaining list.
    pub fn remove_sub_row(&mut self, index: usize) {
        if index < self.sub_departments.len() {
            self.sub_departments.remove(index);
        }
    }

    /// Field-scoped validation, run before any network call.
    pub fn validate(&self) -> Vec<FieldError> {
        check_names(
            &self.name,
            self.sub_departments.iter().map(|sub| sub.name.as_str()),
        )
    }

    /// Validate and map the draft to its mutation input.
    ///
    /// Creating submits names only; Editing submits the target id and
    /// the full sub-department list, ids tagged where they pre-existed.
    pub fn submission(&self) -> Result<Submission> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let name = self.name.trim().to_string();
        match self.mode {
            FormMode::Creating => Ok(Submission::Create(CreateDepartmentInput {
                name,
                sub_departments: self
                    .sub_departments
                    .iter()
                    .map(|sub| CreateSubDepartmentInput {
                        name: sub.name.trim().to_string(),
                    })
                    .collect(),
            })),
            FormMode::Editing { id } => Ok(Submission::Update(UpdateDepartmentInput {
                id,
                name,
                sub_departments: self
                    .sub_departments
                    .iter()
                    .map(|sub| UpdateSubDepartmentInput {
                        id: sub.id,
                        name: sub.name.trim().to_string(),
                    })
                    .collect(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubDepartment;

    fn engineering() -> Department {
        Department {
            id: 3,
            name: "Engineering".to_string(),
            sub_departments: vec![SubDepartment {
                id: 4,
                name: "Backend".to_string(),
            }],
        }
    }

    #[test]
    fn test_short_name_blocks_submission() {
        let mut form = DepartmentForm::new();
        form.set_name("E");
        match form.submission() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_sub_department_errors_are_field_scoped() {
        let mut form = DepartmentForm::new();
        form.set_name("Engineering");
        form.add_sub_row();
        form.add_sub_row();
        form.set_sub_name(0, "Backend");

        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "subDepartments[1].name");
    }

    #[test]
    fn test_empty_sub_list_is_valid() {
        let mut form = DepartmentForm::new();
        form.set_name("Engineering");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_creating_submits_names_only() {
        let mut form = DepartmentForm::new();
        form.set_name("Engineering");
        form.add_sub_row();
        form.set_sub_name(0, "Backend");

        match form.submission().unwrap() {
            Submission::Create(input) => {
                assert_eq!(input.name, "Engineering");
                assert_eq!(input.sub_departments.len(), 1);
                assert_eq!(input.sub_departments[0].name, "Backend");
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_begin_edit_preloads_draft() {
        let mut form = DepartmentForm::new();
        form.begin_edit(&engineering());

        assert_eq!(form.mode(), FormMode::Editing { id: 3 });
        assert_eq!(form.name(), "Engineering");
        assert_eq!(form.sub_departments()[0].id, Some(4));
    }

    #[test]
    fn test_editing_submits_tagged_sub_departments() {
        let mut form = DepartmentForm::new();
        form.begin_edit(&engineering());
        form.add_sub_row();
        form.set_sub_name(1, "Platform");

        match form.submission().unwrap() {
            Submission::Update(input) => {
                assert_eq!(input.id, 3);
                assert_eq!(input.sub_departments[0].id, Some(4));
                assert_eq!(input.sub_departments[1].id, None);
                assert_eq!(input.sub_departments[1].name, "Platform");
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn test_cancel_returns_to_creating() {
        let mut form = DepartmentForm::new();
        form.begin_edit(&engineering());
        form.cancel();

        assert_eq!(form.mode(), FormMode::Creating);
        assert!(form.name().is_empty());
        assert!(form.sub_departments().is_empty());
    }

    #[test]
    fn test_remove_sub_row_by_position() {
        let mut form = DepartmentForm::new();
        form.begin_edit(&engineering());
        form.remove_sub_row(0);
        assert!(form.sub_departments().is_empty());

        // Out of range is a no-op.
        form.remove_sub_row(5);
    }

    #[test]
    fn test_failed_submission_preserves_draft() {
        let mut form = DepartmentForm::new();
        form.begin_edit(&engineering());
        form.set_name("E");

        assert!(form.submission().is_err());
        assert_eq!(form.mode(), FormMode::Editing { id: 3 });
        assert_eq!(form.name(), "E");
    }
}
