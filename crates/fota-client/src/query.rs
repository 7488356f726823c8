//! Query builder for the paginated list endpoints

use std::fmt;

/// Sort direction accepted by the list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters of `available_updates` and `jobs`.
///
/// Setting a key twice replaces the earlier value. [`raw`](Self::raw) sets
/// any key to any string, which is how scenarios send out-of-range or
/// malformed values such as `page=-1` or `sort_dir=asdc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// `page` and `per_page` set together
    pub fn paged(page: u32, per_page: u32) -> Self {
        Self::new().page(page).per_page(per_page)
    }

    pub fn page(self, page: u32) -> Self {
        self.raw("page", page)
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.raw("per_page", per_page)
    }

    pub fn sort(self, field: &str) -> Self {
        self.raw("sort", field)
    }

    pub fn sort_dir(self, dir: SortDir) -> Self {
        self.raw("sort_dir", dir)
    }

    pub fn search(self, term: &str) -> Self {
        self.raw("search", term)
    }

    /// Set `key` to an arbitrary value
    pub fn raw(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}
