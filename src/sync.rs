//! List synchronization: mutation-then-refetch orchestration.

use crate::client::DepartmentApi;
use crate::error::{AppError, Result};
use crate::form::{DepartmentForm, Submission, check_names};
use crate::models::{CreateDepartmentInput, Department, DepartmentPage, UpdateDepartmentInput};
use crate::pagination::Pager;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

/// A page kept for immediate display while the network copy is fetched.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub page: DepartmentPage,
    pub fetched_at: DateTime<Utc>,
}

/// Keeps the visible department list consistent with server state.
///
/// Every create, update, or delete is awaited and then followed by a
/// re-fetch of the current page; there is no optimistic local patching.
/// Reads split stale-while-revalidate into its two halves: `cached`
/// serves the last fetched copy without I/O, `refresh` always
/// revalidates against the server.
pub struct ListSynchronizer<A: DepartmentApi> {
    api: A,
    pager: Pager,
    cache: HashMap<u32, CachedPage>,
}

impl<A: DepartmentApi> ListSynchronizer<A> {
    /// Start on page 1 with the given fixed page size.
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            pager: Pager::new(page_size),
            cache: HashMap::new(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// The last fetched copy of the current page, if any. Possibly
    /// stale; never triggers I/O.
    pub fn cached(&self) -> Option<&CachedPage> {
        self.cache.get(&self.pager.page())
    }

    /// Fetch the current page and replace the cached copy.
    ///
    /// If the server reports fewer total pages than the current
    /// position (the last row of the last page was deleted), the pager
    /// clamps to the new last page and the fetch is repeated once.
    pub async fn refresh(&mut self) -> Result<&DepartmentPage> {
        let (page, limit) = self.pager.params();
        let mut fetched = self.api.get_departments(page, limit).await?;
        self.pager.apply(&fetched);

        if self.pager.is_past_end() {
            let last = self.pager.total_pages();
            info!("Page {page} is past the end, clamping to {last}");
            self.pager.go_to_page(last);
            let (page, limit) = self.pager.params();
            fetched = self.api.get_departments(page, limit).await?;
            self.pager.apply(&fetched);
        }

        let page_no = self.pager.page();
        self.cache.insert(
            page_no,
            CachedPage {
                page: fetched,
                fetched_at: Utc::now(),
            },
        );
        Ok(&self.cache[&page_no].page)
    }

    /// Navigate to page `n` (clamped) and fetch it.
    pub async fn go_to_page(&mut self, n: u32) -> Result<&DepartmentPage> {
        self.pager.go_to_page(n);
        self.refresh().await
    }

    /// Create a department, then re-fetch the current page.
    ///
    /// The input is re-checked against the name rules; an invalid one
    /// fails before anything is sent.
    pub async fn create(&mut self, input: CreateDepartmentInput) -> Result<Department> {
        let errors = check_names(
            &input.name,
            input.sub_departments.iter().map(|sub| sub.name.as_str()),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let created = self.api.create_department(input).await?;
        info!("Created department {} (id {})", created.name, created.id);
        self.refresh().await?;
        Ok(created)
    }

    /// Update a department, then re-fetch the current page.
    ///
    /// The input is re-checked against the name rules; an invalid one
    /// fails before anything is sent.
    pub async fn update(&mut self, input: UpdateDepartmentInput) -> Result<Department> {
        let errors = check_names(
            &input.name,
            input.sub_departments.iter().map(|sub| sub.name.as_str()),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let updated = self.api.update_department(input).await?;
        info!("Updated department {} (id {})", updated.name, updated.id);
        self.refresh().await?;
        Ok(updated)
    }

    /// Delete a department by id, then re-fetch the current page.
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let deleted = self.api.delete_department(id).await?;
        info!("Deleted department id {id}: {deleted}");
        self.refresh().await?;
        Ok(deleted)
    }

    /// Submit the form draft: validate, dispatch by mode, and on
    /// success reset the form and re-fetch. A failed submission leaves
    /// the draft in place.
    pub async fn submit(&mut self, form: &mut DepartmentForm) -> Result<Department> {
        let result = match form.submission()? {
            Submission::Create(input) => self.create(input).await?,
            Submission::Update(input) => self.update(input).await?,
        };
        form.reset();
        Ok(result)
    }
}
