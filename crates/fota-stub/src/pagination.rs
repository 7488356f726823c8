//! Query validation shared by the list endpoints

use std::cmp::Ordering;

use fota_core::paths::MAX_PER_PAGE;
use serde::Deserialize;

use crate::error::ApiError;

const DEFAULT_PER_PAGE: usize = 10;

/// Raw list query; values stay strings so malformed input can be reported
/// as 400 instead of a generic rejection
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
    pub search: Option<String>,
}

/// Validated list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
    /// Items before this page
    pub offset: usize,
    pub sort: String,
    pub descending: bool,
    pub search: Option<String>,
}

fn positive(name: &str, value: &str) -> Result<usize, ApiError> {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n).map_err(|_| {
            ApiError::BadRequest(format!("{} is out of range, got '{}'", name, value))
        }),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be a positive integer, got '{}'",
            name, value
        ))),
    }
}

impl ListParams {
    /// Validate against the sortable fields of an endpoint; the first one is
    /// the default sort
    pub fn validate(&self, sortable: &[&str]) -> Result<PageRequest, ApiError> {
        let page = match &self.page {
            Some(v) => positive("page", v)?,
            None => 1,
        };
        let per_page = match &self.per_page {
            Some(v) => positive("per_page", v)?,
            None => DEFAULT_PER_PAGE,
        };
        if per_page > MAX_PER_PAGE as usize {
            return Err(ApiError::BadRequest(format!(
                "per_page must not exceed {}",
                MAX_PER_PAGE
            )));
        }
        let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
            ApiError::BadRequest(format!("page {} is out of range", page))
        })?;

        let sort = match &self.sort {
            Some(field) if sortable.contains(&field.as_str()) => field.clone(),
            Some(field) => {
                return Err(ApiError::BadRequest(format!(
                    "cannot sort by '{}'",
                    field
                )))
            }
            None => sortable.first().map(|s| s.to_string()).unwrap_or_default(),
        };
        let descending = match self.sort_dir.as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "sort_dir must be asc or desc, got '{}'",
                    other
                )))
            }
        };

        Ok(PageRequest {
            page,
            per_page,
            offset,
            sort,
            descending,
            search: self
                .search
                .as_ref()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        })
    }
}

impl PageRequest {
    /// Whether any of `fields` contains the search term
    pub fn matches(&self, fields: &[&str]) -> bool {
        match &self.search {
            Some(term) => fields.iter().any(|f| f.to_lowercase().contains(term)),
            None => true,
        }
    }

    /// Sort with `compare`, apply the direction, then cut out the page
    pub fn apply<T>(&self, mut items: Vec<T>, compare: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
        items.sort_by(|a, b| {
            let ord = compare(a, b);
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        items
            .into_iter()
            .skip(self.offset)
            .take(self.per_page)
            .collect()
    }
}
